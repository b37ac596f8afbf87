use crate::test_utils::eval;
use pretty_assertions::assert_eq;

#[test]
fn test_integer_arithmetic() {
    assert_eq!(eval("add 2 3"), "5");
    assert_eq!(eval("subtract 2 3"), "-1");
    assert_eq!(eval("multiply 4 -3"), "-12");
    assert_eq!(eval("negate 7"), "-7");
}

#[test]
fn test_decimal_contaminates() {
    assert_eq!(eval("add 1 0.5"), "1.5");
    assert_eq!(eval("multiply 2.0 3"), "6.0");
}

#[test]
fn test_overflow_is_an_error() {
    assert_eq!(eval("add 9223372036854775807 1"), "!! integer overflow");
    assert_eq!(eval("negate -9223372036854775808"), "!! integer overflow");
}

#[test]
fn test_infix_is_left_to_right() {
    assert_eq!(eval("1 + 2 * 3"), "9");
    assert_eq!(eval("1 + (2 * 3)"), "7");
    assert_eq!(eval("10 - 2 - 3"), "5");
}

#[test]
fn test_infix_without_left_argument() {
    assert_eq!(eval("+ 1"), "!! + cannot be used as an infix operator here");
}

#[test]
fn test_comparisons() {
    assert_eq!(eval("1 < 2"), "~okay~");
    assert_eq!(eval("2 < 1"), "~null~");
    assert_eq!(eval("3 > 2.5"), "~okay~");
    assert_eq!(eval("\"abc\" < \"abd\""), "~okay~");
    assert_eq!(eval("1 = 1.0"), "~okay~");
}

#[test]
fn test_structural_equality() {
    assert_eq!(eval("equal? [a [1 \"x\"]] [a [1 \"x\"]]"), "~okay~");
    assert_eq!(eval("equal? [a] [b]"), "~null~");
    assert_eq!(eval("equal? 'a 'a"), "~okay~");
}

#[test]
fn test_not() {
    assert_eq!(eval("not null"), "~okay~");
    assert_eq!(eval("not 0"), "~null~");
}

#[test]
fn test_type_errors_name_the_parameter() {
    assert_eq!(
        eval("add 1 \"two\""),
        "!! add does not allow text! for its value2 argument (expected any-number!)"
    );
}
