//! Unit tests for series storage and collection.

use super::*;
use crate::cell::ListKind;
use pretty_assertions::assert_eq;

#[test]
fn test_free_recycles_slot() {
    let mut heap = Heap::new();
    let a = heap.alloc(Stub::Text("a".into()));
    heap.free(a);
    assert!(!heap.is_live(a));
    let b = heap.alloc(Stub::Text("b".into()));
    assert_eq!(a, b);
    assert_eq!(heap.text(b), "b");
    assert_eq!(heap.live(), 1);
}

#[test]
#[should_panic(expected = "freeing managed series")]
fn test_free_managed_crashes() {
    let mut heap = Heap::new();
    let a = heap.alloc_text("a");
    heap.free(a);
}

#[test]
fn test_frozen_refuses_mutation() {
    let mut heap = Heap::new();
    let block = heap.alloc_array(&[Element::integer(1)]);
    heap.freeze(block);
    assert_eq!(heap.array_mut(block).err(), Some(ErrorKind::Frozen));
    assert_eq!(heap.array_cells_mut(block).err(), Some(ErrorKind::Frozen));
}

#[test]
fn test_hold_blocks_length_changes_only() {
    let mut heap = Heap::new();
    let block = heap.alloc_array(&[Element::integer(1)]);
    heap.hold(block);
    heap.hold(block);
    assert_eq!(heap.array_mut(block).err(), Some(ErrorKind::Held));

    heap.array_cells_mut(block).unwrap()[0] = Element::integer(2);
    assert_eq!(heap.array(block), &[Element::integer(2)]);

    heap.release(block);
    assert!(heap.is_held(block));
    heap.release(block);
    heap.array_mut(block).unwrap().push(Element::integer(3));
    assert_eq!(heap.array(block).len(), 2);
}

#[test]
fn test_freeze_deep_reaches_nested_lists() {
    let mut heap = Heap::new();
    let text = heap.alloc_text("x");
    let inner = heap.alloc_array(&[Element::text(text)]);
    let outer = heap.alloc_array(&[Element::list(ListKind::Group, inner)]);
    heap.freeze_deep(outer);
    assert!(heap.is_frozen(outer));
    assert!(heap.is_frozen(inner));
    assert!(heap.is_frozen(text));
}

#[test]
fn test_sweep_keeps_reachable_and_manual() {
    let mut heap = Heap::new();
    let kept_text = heap.alloc_text("kept");
    let inner = heap.alloc_array(&[Element::text(kept_text)]);
    let root = heap.alloc_array(&[Element::list(ListKind::Block, inner)]);
    let garbage = heap.alloc_text("garbage");
    let manual = heap.alloc(Stub::Text("manual".into()));

    heap.mark(root);
    heap.propagate();
    let freed = heap.sweep();

    assert_eq!(freed, 1);
    assert!(heap.is_live(root));
    assert!(heap.is_live(inner));
    assert!(heap.is_live(kept_text));
    assert!(heap.is_live(manual));
    assert!(!heap.is_live(garbage));
    assert_eq!(heap.allocations_since_gc(), 0);
}

#[test]
fn test_decay_pack_takes_first_item() {
    let mut heap = Heap::new();
    let one = Atom::from(Element::integer(1)).lift().unwrap();
    let two = Atom::from(Element::integer(2)).lift().unwrap();
    let pack = heap.alloc_array(&[one, two]);
    assert_eq!(heap.decay(Atom::pack(pack)), Ok(Value::integer(1)));
}

#[test]
fn test_decay_failures() {
    let mut heap = Heap::new();
    let empty = heap.alloc_array(&[]);
    assert!(heap.is_void(&Atom::pack(empty)));
    assert_eq!(
        heap.decay(Atom::pack(empty)).unwrap_err().kind,
        ErrorKind::Void
    );

    let error = heap.alloc_error(Error::new(ErrorKind::User("boom".into())));
    assert_eq!(
        heap.decay(Atom::raised(error)).unwrap_err().kind,
        ErrorKind::User("boom".into())
    );
    assert!(heap.decay(Atom::ghost()).is_err());
}
