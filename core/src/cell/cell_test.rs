//! Unit tests for cells, lifts and type sets.

use super::*;
use pretty_assertions::assert_eq;

fn series(n: usize) -> SeriesId {
    SeriesId::from_index(n)
}

#[test]
fn test_cell_fits_in_three_words() {
    assert!(core::mem::size_of::<Cell>() <= 24);
    assert_eq!(core::mem::size_of::<Binding>(), 4);
}

#[test]
fn test_lift_of_antiform_is_quasi() {
    let null = Atom::from(Value::null());
    let lifted = null.lift().unwrap();
    assert!(lifted.lift().is_quasi());
    assert_eq!(lifted.lift().quote_depth(), 0);
    assert_eq!(lifted.unlift(), Some(null));
}

#[test]
fn test_lift_of_plain_adds_quote() {
    let five = Atom::from(Element::integer(5));
    let lifted = five.lift().unwrap();
    assert_eq!(lifted.lift().quote_depth(), 1);
    assert!(!lifted.lift().is_quasi());
    assert_eq!(lifted.unlift(), Some(five));
}

#[test]
fn test_lift_of_quasi_keeps_quasi_under_quote() {
    let quasi = Element::word(Symbol::NULL).quasi().unwrap();
    let lifted = Atom::from(quasi).lift().unwrap();
    assert!(lifted.lift().is_quasi());
    assert_eq!(lifted.lift().quote_depth(), 1);
    assert_eq!(lifted.unlift(), Some(Atom::from(quasi)));
}

#[test]
fn test_unlift_of_plain_fails() {
    assert_eq!(Element::integer(1).unlift(), None);
}

#[test]
fn test_quasi_integer_has_no_antiform() {
    let quasi = Element::integer(1).quasi().unwrap();
    assert_eq!(quasi.unlift(), None);
}

#[test]
fn test_quote_unquote() {
    let word = Element::word(Symbol::OKAY);
    let twice = word.quote().unwrap().quote().unwrap();
    assert_eq!(twice.lift().quote_depth(), 2);
    assert_eq!(twice.unquote().unwrap().unquote(), Some(word));
    assert_eq!(word.unquote(), None);
}

#[test]
fn test_unstable_antiforms() {
    assert!(Atom::ghost().is_unstable());
    assert!(Atom::pack(series(0)).is_unstable());
    assert!(Atom::raised(series(0)).is_unstable());
    assert!(Atom::from(Value::null()).as_value().is_some());
    assert!(Atom::ghost().as_value().is_none());
    assert!(Atom::from(Value::trash()).as_element().is_none());
}

#[test]
fn test_bound_only_binds_unbound() {
    let word = Element::word(Symbol::NULL).bound(Some(series(1)));
    assert_eq!(word.binding(), Some(series(1)));
    assert_eq!(word.bound(Some(series(2))).binding(), Some(series(1)));
    assert_eq!(word.rebound(Some(series(2))).binding(), Some(series(2)));
    assert_eq!(Element::integer(3).bound(Some(series(1))).binding(), None);
}

#[test]
fn test_typeset_of() {
    assert_eq!(TypeSet::of(&Element::integer(1)), TypeSet::INTEGER);
    assert_eq!(TypeSet::of(&Value::null()), TypeSet::NULL);
    assert_eq!(TypeSet::of(&Value::trash()), TypeSet::TRASH);
    assert_eq!(TypeSet::of(&Atom::ghost()), TypeSet::GHOST);
    assert_eq!(
        TypeSet::of(&Element::integer(1).quote().unwrap()),
        TypeSet::QUOTED
    );
    assert_eq!(
        TypeSet::of(&Element::word_with(Symbol::OKAY, Sigil::Set)),
        TypeSet::SET_WORD
    );
}

#[test]
fn test_typeset_names() {
    assert_eq!(TypeSet::parse_name("any-value!"), Some(TypeSet::ANY_VALUE));
    assert_eq!(TypeSet::parse_name("no-such!"), None);
    assert_eq!(TypeSet::name_of(&Element::decimal(1.5)), "decimal!");
    assert_eq!(TypeSet::LOGIC.describe(), "logic!");
    assert_eq!(
        (TypeSet::INTEGER | TypeSet::TEXT).describe(),
        "integer! or text!"
    );
    assert!(TypeSet::ANY_VALUE.accepts(&Value::okay()));
    assert!(!TypeSet::ANY_VALUE.accepts(&Atom::ghost()));
}
