//! End-to-end scenarios through the public facade.

use indoc::indoc;
use pretty_assertions::assert_eq;
use tumble::{Engine, EngineOptions, Error, ExecutionOptions, StepperPath, Value};

fn engine_with(stepper: StepperPath) -> Engine {
    let options = EngineOptions {
        execution: ExecutionOptions {
            stepper,
            ..ExecutionOptions::default()
        },
        ..EngineOptions::default()
    };
    Engine::new(options, |_| {}).unwrap()
}

fn run(source: &str) -> String {
    let mut results = Vec::new();
    for stepper in [StepperPath::Inline, StepperPath::Sublevel] {
        let mut engine = engine_with(stepper);
        results.push(match engine.eval_str(source) {
            Ok(result) => engine.mold(&result),
            Err(error) => format!("!! {}", error),
        });
    }
    assert_eq!(results[0], results[1], "stepper paths disagree on {}", source);
    results.remove(0)
}

const PIPELINE: &str = indoc! {"
    double: func [x] [x * 2]
    increment: func [x] [x + 1]
    p: cascade [double increment negate]
"};

#[test]
fn test_pipeline() {
    assert_eq!(run(&format!("{} p 5", PIPELINE)), "-11");
}

#[test]
fn test_pipeline_interrupted_and_resumed() {
    let mut engine = engine_with(StepperPath::Auto);
    engine.eval_str(PIPELINE).unwrap();

    let interp = engine.interpreter_mut();
    let loaded = interp.load("p 5").unwrap();
    let feed = tumble_core::feed::Feed::array(loaded.block, 0, Some(interp.user));
    interp
        .begin(tumble_core::level::Level::evaluator(feed))
        .unwrap();
    let mut slices = 0;
    let result = loop {
        slices += 1;
        if let Some(result) = interp.advance(1) {
            break result.unwrap();
        }
    };
    assert!(slices > 3);
    assert_eq!(interp.mold(&result), "-11");
}

#[test]
fn test_hijack_redirects_existing_references() {
    let source = indoc! {"
        a: func [x] [x + 1]
        alias: :a
        saved: copy :a
        hijack :a func [x] [x * 100]
        reduce [a 2 alias 2 saved 2]
    "};
    assert_eq!(run(source), "[200 200 3]");
}

#[test]
fn test_invisible_middle_step() {
    assert_eq!(run("1 comment \"gone\""), "1");
    assert_eq!(run("10 elide 20 + 1"), "10");
    assert_eq!(run("x: 1 comment [x: 2] x"), "1");
    assert_eq!(run("reduce [1 comment 2 3]"), "[1 3]");
}

#[test]
fn test_raised_error_at_end_vs_escalation() {
    let mut engine = engine_with(StepperPath::Auto);
    let last = engine.eval_str("1 raise \"late\"").unwrap();
    assert!(last.is_raised());
    assert_eq!(run("try raise \"late\""), "~null~");

    let escalated = engine.eval_str("raise \"early\" 2");
    assert!(matches!(escalated, Err(Error::Failed(_))));
    assert_eq!(run("rescue [raise \"early\" 2]"), "#[error! \"early\"]");
}

#[test]
fn test_adapt_round_trip() {
    for (a, b) in [(1, 2), (-3, 7), (0, 0)] {
        let direct = run(&format!("add {} {}", a, b));
        let adapted = run(&format!("a: adapt :add [] a {} {}", a, b));
        let rewrites = run(&format!("a: adapt :add [value1: value1] a {} {}", a, b));
        assert_eq!(direct, adapted);
        assert_eq!(direct, rewrites);
    }
}

#[test]
fn test_evaluating_literals_is_idempotent() {
    for literal in ["1", "2.5", "\"text\"", "<tag>", "[a b]", "'x", "_"] {
        let once = run(literal);
        let twice = run(&format!("eval [{}]", literal));
        assert_eq!(once, twice, "{}", literal);
    }
    assert_eq!(run("x: [1 (2)] eval [x]"), "[1 (2)]");
}

#[test]
fn test_definitional_return_and_loops() {
    let source = indoc! {"
        find-first: func [block test] [
            for-each x block [if test x [return x]]
            null
        ]
        big?: func [n] [n > 10]
        reduce [find-first [1 20 3 40] :big? meta find-first [1 2] :big?]
    "};
    assert_eq!(run(source), "[20 ~null~]");
}

#[test]
fn test_host_values_round_trip() {
    let mut engine = Engine::new(EngineOptions::default(), |env| {
        env.register("base", Value::integer(100));
    })
    .unwrap();
    engine.eval_str("offset: func [n] [base + n]").unwrap();
    let result = engine.call("offset", &[Value::integer(5)]).unwrap();
    assert_eq!(engine.mold(&result), "105");
}
