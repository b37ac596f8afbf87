//! Properties of the trampoline that hold for any program.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::Ordering;

use once_cell::sync::Lazy;
use pretty_assertions::assert_eq;
use tumble_core::api::{Engine, EngineOptions, Error, ExecutionOptions, StepperPath};
use tumble_core::bounce::BounceKind;
use tumble_core::cell::{Element, ListKind};
use tumble_core::feed::Feed;
use tumble_core::interpreter::Interpreter;
use tumble_core::level::Level;
use tumble_core::trampoline::Event;

static PROGRAMS: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("1 + 2 * 3", "9"),
        ("x: 10 y: x - 4 reduce [x y]", "[10 6]"),
        ("f: func [n] [either n < 2 [1] [n * f n - 1]] f 6", "720"),
        ("n: 0 while [n < 5] [n: n + 1] n", "5"),
        ("sum: 0 for-each x [1 2 3] [sum: sum + x] sum", "6"),
        ("catch [for-each x [1 2 3] [if x = 2 [throw x * 10]]]", "20"),
        ("rescue [add 1 \"a\"]", "#[error! \"add does not allow text! for its value2 argument (expected any-number!)\"]"),
        ("1 comment \"c\"", "1"),
        ("p: cascade [negate negate] p 4", "4"),
        ("m: macro [] [[1 +]] m 2", "3"),
        ("a: adapt :add [value1: value1 * 10] a 1 2", "12"),
        ("(1 (2 (3)))", "3"),
        ("data: [1 2] for-each x data [break] append data 3 length-of data", "3"),
        ("data: [1 2] catch [for-each x data [throw x]] append data 3 length-of data", "3"),
    ]
});

fn options(stepper: StepperPath) -> EngineOptions {
    EngineOptions {
        execution: ExecutionOptions {
            stepper,
            ..ExecutionOptions::default()
        },
        ..EngineOptions::default()
    }
}

fn mold_result(engine: &mut Engine, source: &str) -> String {
    match engine.eval_str(source) {
        Ok(result) => engine.mold(&result),
        Err(error) => format!("!! {}", error),
    }
}

/// Block of `depth` groups nested around `1`, built without the reader.
fn nested_groups(interp: &mut Interpreter, depth: usize) -> Element {
    let mut inner = Element::integer(1);
    for _ in 0..depth {
        let series = interp.heap.alloc_array(&[inner]);
        inner = Element::list(ListKind::Group, series);
    }
    interp.make_block(&[inner])
}

#[test]
fn test_stepper_paths_agree() {
    for (source, expected) in PROGRAMS.iter() {
        for path in [StepperPath::Inline, StepperPath::Sublevel] {
            let mut engine = Engine::new(options(path), |_| {}).unwrap();
            assert_eq!(mold_result(&mut engine, source), *expected, "{:?}: {}", path, source);
        }
    }
}

#[test]
fn test_sublevel_path_uses_more_levels() {
    let mut pushes = Vec::new();
    for path in [StepperPath::Inline, StepperPath::Sublevel] {
        let mut engine = Engine::new(options(path), |_| {}).unwrap();
        let before = engine.interpreter().stats().pushes;
        mold_result(&mut engine, "1 2 3");
        pushes.push(engine.interpreter().stats().pushes - before);
    }
    assert_eq!(pushes, vec![1, 2]);
}

#[test]
fn test_nesting_does_not_grow_host_stack() {
    for path in [StepperPath::Inline, StepperPath::Sublevel] {
        let mut interp = Interpreter::new(ExecutionOptions {
            max_depth: 100_000,
            stepper: path,
            ..ExecutionOptions::default()
        });
        let program = nested_groups(&mut interp, 20_000);
        let (series, _) = program.as_list(ListKind::Block).unwrap();
        let result = interp.eval_block(series, 0, None).unwrap();
        assert_eq!(interp.mold(&result), "1");
        let stats = interp.stats();
        assert_eq!(stats.max_run_depth, 1);
        assert!(stats.max_depth > 20_000, "{:?}", stats);
        assert_eq!(stats.pushes, stats.pops);
    }
}

#[test]
fn test_nesting_past_the_limit_is_a_resource_error() {
    let mut interp = Interpreter::new(ExecutionOptions {
        max_depth: 100,
        ..ExecutionOptions::default()
    });
    let program = nested_groups(&mut interp, 500);
    let (series, _) = program.as_list(ListKind::Block).unwrap();
    let thrown = interp.eval_block(series, 0, None).unwrap_err();
    assert!(interp.thrown_to_error(&thrown).is_resource());
    assert_eq!(interp.depth(), 0);
}

#[test]
fn test_child_runs_right_after_it_is_requested() {
    let events = Rc::new(RefCell::new(Vec::<Event>::new()));
    let mut engine = Engine::new(options(StepperPath::Auto), |_| {}).unwrap();
    let sink = events.clone();
    engine
        .interpreter_mut()
        .set_observer(Some(Box::new(move |event: &Event| sink.borrow_mut().push(event.clone()))));
    for (source, _) in PROGRAMS.iter() {
        mold_result(&mut engine, source);
    }

    let events = events.borrow();
    assert!(events.len() > 100);
    for pair in events.windows(2) {
        let requested = matches!(
            pair[0].bounce,
            BounceKind::Push | BounceKind::Kept | BounceKind::Delegate
        );
        if requested {
            assert_eq!(pair[1].level, pair[0].level + 1, "{:?}", pair);
        }
    }
    for pair in events.windows(2) {
        assert!(pair[1].tick > pair[0].tick);
    }
}

#[test]
fn test_cancel_halts_at_next_cycle() {
    let mut engine = Engine::new(EngineOptions::default(), |_| {}).unwrap();
    let cancel = engine.cancel_handle();
    let seen = Rc::new(RefCell::new(0usize));
    let counter = seen.clone();
    let mut fired = false;
    engine
        .interpreter_mut()
        .set_observer(Some(Box::new(move |event: &Event| {
            *counter.borrow_mut() += 1;
            if !fired && event.depth >= 40 {
                fired = true;
                cancel.cancel();
            }
        })));
    let result = engine.eval_str("f: func [n] [while [okay] [f n + 1]] f 0");
    assert!(matches!(result, Err(Error::Halted)), "{:?}", result);
    assert!(*seen.borrow() < 10_000);
    assert_eq!(engine.interpreter().depth(), 0);

    // The flag is consumed; the next evaluation runs normally.
    engine.interpreter_mut().set_observer(None);
    assert_eq!(mold_result(&mut engine, "1 + 1"), "2");
}

#[test]
fn test_cancel_passes_through_catching_levels() {
    let mut engine = Engine::new(EngineOptions::default(), |_| {}).unwrap();
    let cancel = engine.cancel_handle();
    let mut cycles = 0;
    engine
        .interpreter_mut()
        .set_observer(Some(Box::new(move |_: &Event| {
            cycles += 1;
            if cycles == 500 {
                cancel.cancel();
            }
        })));
    let result = engine.eval_str("catch [rescue [for-each x [1 2] [while [okay] [1]]]]");
    assert!(matches!(result, Err(Error::Halted)), "{:?}", result);
}

#[test]
fn test_begin_and_advance_in_slices() {
    let mut interp = Interpreter::new(ExecutionOptions::default());
    interp.boot().unwrap();
    let loaded = interp
        .load("double: func [x] [x * 2] increment: func [x] [x + 1] p: cascade [double increment negate] p 5")
        .unwrap();
    let feed = Feed::array(loaded.block, 0, Some(interp.user));
    interp.begin(Level::evaluator(feed)).unwrap();
    assert!(interp.begin(Level::evaluator(Feed::array(loaded.block, 0, None))).is_err());

    let mut slices = 0;
    let result = loop {
        slices += 1;
        interp.collect_garbage();
        if let Some(result) = interp.advance(3) {
            break result;
        }
        assert!(interp.is_pending());
    };
    assert!(slices > 5);
    assert_eq!(interp.mold(&result.unwrap()), "-11");
    assert!(!interp.is_pending());
    assert_eq!(interp.depth(), 0);
}

#[test]
fn test_abandon_drops_the_run() {
    let mut interp = Interpreter::new(ExecutionOptions::default());
    interp.boot().unwrap();
    let loaded = interp.load("n: 0 while [okay] [n: n + 1]").unwrap();
    let feed = Feed::array(loaded.block, 0, Some(interp.user));
    interp.begin(Level::evaluator(feed)).unwrap();
    assert!(interp.advance(100).is_none());
    interp.abandon();
    assert!(!interp.is_pending());
    assert_eq!(interp.depth(), 0);
}

#[test]
fn test_cancel_at_any_cycle_releases_loop_holds() {
    for cancel_at in 1..120 {
        let mut engine = Engine::new(EngineOptions::default(), |_| {}).unwrap();
        assert_eq!(mold_result(&mut engine, "data: [1 2 3]"), "[1 2 3]");
        let cancel = engine.cancel_handle();
        let mut cycles = 0;
        engine
            .interpreter_mut()
            .set_observer(Some(Box::new(move |_: &Event| {
                cycles += 1;
                if cycles == cancel_at {
                    cancel.cancel();
                }
            })));
        let result = engine.eval_str("for-each x data [x + 1]");
        assert!(
            matches!(result, Ok(_) | Err(Error::Halted)),
            "cycle {}: {:?}",
            cancel_at,
            result
        );

        engine.interpreter_mut().set_observer(None);
        engine.interpreter().cancel_flag().store(false, Ordering::Relaxed);
        assert_eq!(
            mold_result(&mut engine, "append data 4 length-of data"),
            "4",
            "cycle {}",
            cancel_at
        );
    }
}

#[test]
fn test_abandon_releases_loop_holds() {
    for budget in 1..40 {
        let mut interp = Interpreter::new(ExecutionOptions::default());
        interp.boot().unwrap();
        let setup = interp.load("data: [1 2 3]").unwrap();
        interp.eval_block(setup.block, 0, None).unwrap();

        let looping = interp.load("for-each x data [while [x < 3] [x: x + 1]]").unwrap();
        let feed = Feed::array(looping.block, 0, Some(interp.user));
        interp.begin(Level::evaluator(feed)).unwrap();
        if interp.advance(budget).is_some() {
            continue;
        }
        interp.abandon();
        assert_eq!(interp.depth(), 0);
        assert!(!interp.is_throwing());

        let check = interp.load("append data 4 length-of data").unwrap();
        let result = interp.eval_block(check.block, 0, None).unwrap();
        assert_eq!(interp.mold(&result), "4", "budget {}", budget);
    }
}
