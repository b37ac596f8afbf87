use super::*;
use crate::api::ExecutionOptions;
use crate::cell::Kind;
use crate::interpreter::Interpreter;
use pretty_assertions::assert_eq;

fn read_back(source: &str) -> String {
    let mut interp = Interpreter::new(ExecutionOptions::default());
    let loaded = interp.load(source).unwrap();
    interp.mold(&Element::list(ListKind::Block, loaded.block))
}

fn kinds(source: &str) -> Vec<Kind> {
    let mut heap = Heap::new();
    let mut symbols = SymbolTable::new();
    let loaded = read(&mut heap, &mut symbols, source).unwrap();
    heap.array(loaded.block).iter().map(|item| item.kind()).collect()
}

#[test]
fn test_scalars() {
    assert_eq!(read_back("1 -2 3.5 _"), "[1 -2 3.5 _]");
    assert_eq!(read_back("\"a\\\"b\" <local>"), "[\"a\\\"b\" <local>]");
}

#[test]
fn test_word_sigils() {
    assert_eq!(read_back("x: :x ^x @x /x a/b"), "[x: :x ^x @x /x a/b]");
    assert_eq!(
        kinds("x: :x ^x @x /x a/b"),
        vec![
            Kind::SetWord,
            Kind::GetWord,
            Kind::MetaWord,
            Kind::TheWord,
            Kind::Refinement,
            Kind::Path
        ]
    );
}

#[test]
fn test_operator_words() {
    assert_eq!(
        kinds("10 - 2 -x equal? <: < 1"),
        vec![
            Kind::Integer,
            Kind::Word,
            Kind::Integer,
            Kind::Word,
            Kind::Word,
            Kind::SetWord,
            Kind::Word,
            Kind::Integer
        ]
    );
}

#[test]
fn test_quoting_and_quasiforms() {
    assert_eq!(read_back("'x ''[1] ~null~ ~ ~,~"), "['x ''[1] ~null~ ~ ~,~]");
}

#[test]
fn test_nesting_and_commas() {
    assert_eq!(read_back("[a (b [c])] , x"), "[[a (b [c])] , x]");
}

#[test]
fn test_comments_are_skipped() {
    assert_eq!(read_back("1 ; one\n2"), "[1 2]");
}

#[test]
fn test_spans_of_top_level_items() {
    let mut heap = Heap::new();
    let mut symbols = SymbolTable::new();
    let loaded = read(&mut heap, &mut symbols, "abc  [1 2]").unwrap();
    assert_eq!(loaded.spans, vec![Span(0..3), Span(5..10)]);
}

#[test]
fn test_errors() {
    let mut heap = Heap::new();
    let mut symbols = SymbolTable::new();
    assert!(read(&mut heap, &mut symbols, "[1 2").is_err());
    let error = read(&mut heap, &mut symbols, "99999999999999999999").unwrap_err();
    assert_eq!(error.message, "integer out of range");
    assert_eq!(error.span, Span(0..20));
}
