use crate::test_utils::eval;
use pretty_assertions::assert_eq;

#[test]
fn test_if_and_either() {
    assert_eq!(eval("if 1 < 2 [10]"), "10");
    assert_eq!(eval("if 1 > 2 [10]"), "~null~");
    assert_eq!(eval("either 0 [\"yes\"] [\"no\"]"), "\"yes\"");
    assert_eq!(eval("either null [\"yes\"] [\"no\"]"), "\"no\"");
}

#[test]
fn test_while_gives_last_body_result() {
    assert_eq!(eval("n: 0 while [n < 5] [n: n + 1]"), "5");
    assert_eq!(eval("while [null] [1]"), "~null~");
}

#[test]
fn test_break_and_continue() {
    assert_eq!(eval("n: 0 while [okay] [n: n + 1 if n = 3 [break]] n"), "3");
    assert_eq!(
        eval("total: 0 for-each x [1 2 3 4] [if x = 2 [continue] total: total + x] total"),
        "8"
    );
    assert_eq!(eval("for-each x [1 2 3] [if x = 2 [break] x]"), "~null~");
}

#[test]
fn test_for_each_binds_its_word() {
    assert_eq!(eval("for-each x [1 2 3] [x * 10]"), "30");
    assert_eq!(eval("x: 100 for-each x [1 2] [x] x"), "100");
}

#[test]
fn test_for_each_holds_the_series() {
    assert_eq!(
        eval("data: [1 2] for-each x data [append data 3]"),
        "!! series is held by an enumeration and cannot change length"
    );
    assert_eq!(
        eval("data: [1 2] rescue [for-each x data [append data 3]] append data 3 length-of data"),
        "3"
    );
}

#[test]
fn test_catch_and_throw() {
    assert_eq!(eval("catch [throw 10 20]"), "10");
    assert_eq!(eval("catch [1 + 2]"), "3");
    assert_eq!(eval("catch/name [catch [throw/name 1 'outer] 2] 'outer"), "1");
    assert_eq!(eval("throw 1"), "!! no catch for throw");
}

#[test]
fn test_rescue() {
    assert_eq!(eval("rescue [fail \"boom\"]"), "#[error! \"boom\"]");
    assert_eq!(eval("rescue [raise \"quiet\"]"), "#[error! \"quiet\"]");
    assert_eq!(eval("rescue [1]"), "~null~");
    assert_eq!(eval("rescue [add 1 \"x\"] 5"), "5");
}

#[test]
fn test_rescue_lets_resource_errors_pass() {
    assert_eq!(
        eval("f: func [] [f] rescue [f]"),
        "!! level stack overflow: more than 1024 levels"
    );
}

#[test]
fn test_raised_results() {
    assert_eq!(eval("fail \"boom\""), "!! boom");
    assert_eq!(eval("try raise \"x\""), "~null~");
    assert_eq!(eval("try 5"), "5");
    assert_eq!(eval("raise \"x\" 1"), "!! x");
}

#[test]
fn test_return_needs_a_function() {
    assert_eq!(
        eval("return 1"),
        "!! return is only available inside a function"
    );
    assert_eq!(eval("f: func [] [return] f"), "~");
}
