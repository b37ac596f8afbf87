//! The host call surface: engines, handles, host natives and errors.

use pretty_assertions::assert_eq;
use tumble_core::api::{Engine, EngineOptions, Error, ExecutionOptions};
use tumble_core::bounce::Bounce;
use tumble_core::cell::{Atom, ListKind, Value};
use tumble_core::reader::Span;

fn engine() -> Engine {
    Engine::new(EngineOptions::default(), |_| {}).unwrap()
}

fn eval(engine: &mut Engine, source: &str) -> String {
    let result = engine.eval_str(source).unwrap();
    engine.mold(&result)
}

#[test]
fn test_fresh_interpreter_has_every_native() {
    let mut interp = tumble_core::Interpreter::new(ExecutionOptions::default());
    for name in ["add", "for-each", "func", "cascade", "hijack", "return"] {
        let symbol = interp.intern(name);
        let value = interp.get_var(symbol, Some(interp.lib)).unwrap();
        assert!(value.is_action(), "{}", name);
    }
    interp.boot().unwrap();

    let mut engine = engine();
    let result = engine.call("add", &[Value::integer(1), Value::integer(2)]).unwrap();
    assert_eq!(engine.mold(&result), "3");
}

#[test]
fn test_registered_constants_and_functions() {
    let mut engine = Engine::new(EngineOptions::default(), |env| {
        env.register("answer", Value::integer(42));
        env.register_fn("twice", "[n [integer!]]", |_, args| {
            let n = args[0].as_integer().unwrap_or(0);
            Ok(Value::integer(n * 2))
        });
    })
    .unwrap();
    assert_eq!(eval(&mut engine, "twice answer"), "84");
    assert_eq!(eval(&mut engine, "twice twice 1"), "4");
}

#[test]
fn test_host_arguments_are_typechecked() {
    let mut engine = Engine::new(EngineOptions::default(), |env| {
        env.register_fn("twice", "[n [integer!]]", |_, args| Ok(args[0]));
    })
    .unwrap();
    let Err(Error::Failed(error)) = engine.eval_str("twice \"x\"") else {
        panic!("expected a failure");
    };
    assert_eq!(
        error.kind.to_string(),
        "twice does not allow text! for its n argument (expected integer!)"
    );
}

#[test]
fn test_bad_native_spec_is_reported() {
    let result = Engine::new(EngineOptions::default(), |env| {
        env.register_fn("broken", "[n [integer!", |_, args| Ok(args[0]));
    });
    assert!(matches!(result, Err(Error::Api(_))));
}

#[test]
fn test_host_native_reenters_the_trampoline() {
    let mut engine = Engine::new(EngineOptions::default(), |env| {
        env.register_native("run-twice", "[body [block!]]", |interp, id| {
            let body = interp.arg(id, 0);
            let Some((series, index)) = body.as_list(ListKind::Block) else {
                return Ok(Bounce::Out);
            };
            for _ in 0..2 {
                let result = interp
                    .eval_block(series, index, body.binding())
                    .map_err(|thrown| interp.thrown_to_error(&thrown))?;
                interp.level_mut(id).out = result;
            }
            Ok(Bounce::Out)
        });
    })
    .unwrap();
    assert_eq!(eval(&mut engine, "n: 0 run-twice [n: n + 1] n"), "2");
    assert!(engine.interpreter().stats().max_run_depth >= 2);

    let failed = engine.eval_str("run-twice [fail \"inner\"]");
    let Err(Error::Failed(error)) = failed else {
        panic!("expected a failure");
    };
    assert_eq!(error.kind.to_string(), "inner");
}

#[test]
fn test_call_by_name() {
    let mut engine = engine();
    eval(&mut engine, "double: func [x] [x * 2]");
    let result = engine.call("double", &[Value::integer(21)]).unwrap();
    assert_eq!(engine.mold(&result), "42");

    let result = engine.call("add", &[Value::integer(1), Value::decimal(0.5)]).unwrap();
    assert_eq!(engine.mold(&result), "1.5");

    assert!(matches!(engine.call("missing", &[]), Err(Error::Api(_))));
    assert!(matches!(engine.call("double", &[]), Err(Error::Failed(_))));
}

#[test]
fn test_call_passes_antiforms_through() {
    let mut engine = engine();
    eval(&mut engine, "id: func [^x] [unmeta x]");
    let result = engine.call("id", &[Value::null()]).unwrap();
    assert_eq!(engine.mold(&result), "~null~");
}

#[test]
fn test_handle_survives_forced_collection() {
    let mut engine = engine();
    let kept = engine.eval_str("[1 [2] \"three\"]").unwrap();
    let series = kept.atom().series().unwrap();
    for _ in 0..3 {
        eval(&mut engine, "[garbage [more garbage]]");
        engine.collect_garbage();
    }
    assert!(engine.interpreter().heap.is_live(series));
    assert_eq!(engine.mold(&kept), "[1 [2] \"three\"]");

    let copy = kept.clone();
    drop(kept);
    engine.collect_garbage();
    assert!(engine.interpreter().heap.is_live(series));
    assert_eq!(engine.mold(&copy), "[1 [2] \"three\"]");

    drop(copy);
    engine.collect_garbage();
    assert!(!engine.interpreter().heap.is_live(series));
}

#[test]
fn test_loaded_program_can_run_repeatedly() {
    let mut engine = engine();
    eval(&mut engine, "n: 0");
    let program = engine.load("n: n + 1").unwrap();
    engine.collect_garbage();
    for _ in 0..3 {
        engine.eval(&program).unwrap();
    }
    assert_eq!(eval(&mut engine, "n"), "3");

    let not_a_block = engine.retain(Value::integer(1));
    assert!(matches!(engine.eval(&not_a_block), Err(Error::Api(_))));
}

#[test]
fn test_raised_at_end_is_data() {
    let mut engine = engine();
    let result = engine.eval_str("raise \"late\"").unwrap();
    assert!(result.is_raised());
    assert!(result.value().is_none());

    let Err(Error::Failed(error)) = engine.eval_str("raise \"early\" 1") else {
        panic!("expected escalation");
    };
    assert_eq!(error.kind.to_string(), "early");
}

#[test]
fn test_error_classes() {
    let mut engine = engine();
    assert!(matches!(engine.eval_str("[1 2"), Err(Error::Load(_))));
    assert!(matches!(engine.eval_str("throw 1"), Err(Error::Uncaught(_))));
    assert!(matches!(engine.eval_str("break"), Err(Error::Uncaught(_))));
    assert!(matches!(
        engine.eval_str("f: func [] [f] f"),
        Err(Error::ResourceExceeded(_))
    ));
    // The engine is usable after every one of them.
    assert_eq!(eval(&mut engine, "1 + 1"), "2");
}

#[test]
fn test_failure_span_points_into_the_source() {
    let mut engine = engine();
    assert!(engine.eval_str("x: 1\nfail \"boom\"").is_err());
    assert_eq!(engine.failure_span(), Some(Span(10..16)));
}

#[test]
fn test_without_boot_there_are_no_operators() {
    let options = EngineOptions {
        boot: false,
        ..EngineOptions::default()
    };
    let mut engine = Engine::new(options, |_| {}).unwrap();
    assert_eq!(eval(&mut engine, "add 1 2"), "3");
    assert!(engine.eval_str("1 + 2").is_err());
}

#[test]
fn test_custom_depth_limit() {
    let options = EngineOptions {
        execution: ExecutionOptions {
            max_depth: 64,
            ..ExecutionOptions::default()
        },
        ..EngineOptions::default()
    };
    let mut engine = Engine::new(options, |_| {}).unwrap();
    let Err(Error::ResourceExceeded(error)) = engine.eval_str("f: func [] [f] f") else {
        panic!("expected overflow");
    };
    assert_eq!(error.kind.to_string(), "level stack overflow: more than 64 levels");
}

#[test]
fn test_retained_atoms_mold() {
    let engine = engine();
    let handle = engine.retain(Atom::from(Value::okay()));
    assert_eq!(engine.mold(&handle), "~okay~");
}
