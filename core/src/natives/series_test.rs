use crate::test_utils::eval;
use pretty_assertions::assert_eq;

#[test]
fn test_positions() {
    assert_eq!(eval("first [1 2]"), "1");
    assert_eq!(eval("first []"), "~null~");
    assert_eq!(eval("next [1 2 3]"), "[2 3]");
    assert_eq!(eval("next next next [1]"), "[]");
    assert_eq!(eval("length-of [1 2 3]"), "3");
    assert_eq!(eval("length-of next [1 2 3]"), "2");
    assert_eq!(eval("length-of \"héllo\""), "5");
}

#[test]
fn test_append_splices_blocks() {
    assert_eq!(eval("b: [1] append b 2 append b [3 4] b"), "[1 2 3 4]");
    assert_eq!(eval("append [] null"), "!! antiforms cannot be stored in a series");
}

#[test]
fn test_insert_and_take() {
    assert_eq!(eval("b: [1 4] insert next b [2 3] b"), "[1 2 3 4]");
    assert_eq!(eval("b: [1 2] take b"), "1");
    assert_eq!(eval("b: [1 2] take b b"), "[2]");
    assert_eq!(eval("take []"), "~null~");
}

#[test]
fn test_poke() {
    assert_eq!(eval("b: [1 2 3] poke b 2 20 b"), "[1 20 3]");
    assert_eq!(eval("poke [1] 5 0"), "!! index 5 is out of range");
}

#[test]
fn test_poke_is_allowed_while_held() {
    assert_eq!(eval("b: [1 2] for-each x b [poke b 1 x * 10] b"), "[20 2]");
}

#[test]
fn test_copy_is_independent() {
    assert_eq!(eval("a: [1 2] b: copy a append b 3 a"), "[1 2]");
    assert_eq!(eval("copy next [1 2 3]"), "[2 3]");
    assert_eq!(eval("copy \"abc\""), "\"abc\"");
}

#[test]
fn test_freeze_is_deep() {
    assert_eq!(eval("b: freeze [1 [2]] append b 3"), "!! series is frozen");
    assert_eq!(eval("b: freeze [1 [2]] append first next b 3"), "!! series is frozen");
    assert_eq!(eval("b: freeze [1] poke b 1 5"), "!! series is frozen");
    assert_eq!(eval("frozen? freeze [1]"), "~okay~");
    assert_eq!(eval("frozen? [1]"), "~null~");
}
