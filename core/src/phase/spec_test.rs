//! Unit tests for the parameter-list dialect.

use super::*;
use crate::reader::read;
use pretty_assertions::assert_eq;

struct Parsed {
    symbols: SymbolTable,
    result: Result<ParamList, Error>,
}

fn parse(source: &str) -> Parsed {
    let mut heap = Heap::new();
    let mut symbols = SymbolTable::new();
    let loaded = read(&mut heap, &mut symbols, source).expect("spec should read");
    let result = parse_spec(&heap, &symbols, loaded.block, 0);
    Parsed { symbols, result }
}

#[test]
fn test_parameter_classes() {
    let parsed = parse("a 'b @c :d ^e");
    let list = parsed.result.unwrap();
    let classes: Vec<ParamClass> = list.params.iter().map(|p| p.class).collect();
    assert_eq!(
        classes,
        vec![
            ParamClass::Normal,
            ParamClass::Just,
            ParamClass::The,
            ParamClass::Soft,
            ParamClass::Meta,
        ]
    );
    assert_eq!(parsed.symbols.name(list.params[1].symbol), "b");
}

#[test]
fn test_types_refinements_and_locals() {
    let parsed = parse(
        r#"return: [integer!] "adds" value [integer! decimal! <end>] /flag /limit [integer!] <local> tmp"#,
    );
    let list = parsed.result.unwrap();
    assert_eq!(list.returns, Some(TypeSet::INTEGER));

    let value = &list.params[0];
    assert_eq!(value.types, Some(TypeSet::INTEGER | TypeSet::DECIMAL));
    assert!(value.endable);
    assert!(value.is_positional());

    let flag = &list.params[1];
    assert!(flag.refinement && flag.is_flag());

    let limit = &list.params[2];
    assert!(limit.refinement && !limit.is_flag());
    assert_eq!(limit.class, ParamClass::Normal);

    let tmp = &list.params[3];
    assert_eq!(tmp.class, ParamClass::Local);
    assert!(!tmp.is_positional());
}

#[test]
fn test_keyword_types() {
    let list = parse("x [~null~ integer!]").result.unwrap();
    assert_eq!(list.params[0].types, Some(TypeSet::NULL | TypeSet::INTEGER));
}

#[test]
fn test_bad_specs() {
    for source in ["x [no-such!]", "x x", "<nope> x", "return: 10", "x: [integer!]", "10"] {
        let error = parse(source).result.unwrap_err();
        assert!(
            matches!(error.kind, ErrorKind::BadSpec(_)),
            "{source} gave {error}"
        );
    }
}
