//! Native library.
//!
//! Natives are registered into `lib` at startup. Each one is a plain
//! function plus a spec string in the parameter dialect, parsed by the
//! same code that parses `func` specs:
//!
//! - Math: `add subtract multiply negate equal? lesser? greater? not`
//! - Values: `eval reduce quote meta unmeta the just get set type-of pack
//!   comment elide`
//! - Control: `if either while for-each break continue catch throw rescue
//!   fail raise try return`
//! - Series: `first next length-of append insert take poke copy freeze
//!   frozen?`
//! - Composition: `func adapt cascade hijack macro combinator infix
//!   furthest`
//!
//! Natives that need evaluation done on their behalf record a resumption
//! state in the frame and return a child level, like any executor.

use std::rc::Rc;

use crate::bounce::Bounce;
use crate::cell::{Atom, Element, ListKind, Value};
use crate::error::{Error, ErrorKind, crash};
use crate::interpreter::Interpreter;
use crate::level::LevelId;
use crate::phase::NativeFn;

pub mod compose;
pub mod control;
pub mod math;
pub mod series;
pub mod values;

/// Signature shared by every native in this module.
pub type Native = fn(&mut Interpreter, LevelId) -> Result<Bounce, Error>;

/// Name, spec and implementation of one native.
pub type Entry = (&'static str, &'static str, Native);

/// Infix operators, defined in `lib` after the natives.
pub const PRELUDE: &str = "
    +: infix :add
    -: infix :subtract
    *: infix :multiply
    =: infix :equal?
    <: infix :lesser?
    >: infix :greater?
";

/// Register every native in `lib`.
pub fn register(interp: &mut Interpreter) {
    let tables: [&[Entry]; 5] = [
        math::NATIVES,
        values::NATIVES,
        control::NATIVES,
        series::NATIVES,
        compose::NATIVES,
    ];
    for (name, spec, native) in tables.into_iter().flatten() {
        let dispatcher: NativeFn = Rc::new(*native);
        let action = interp
            .make_native(name, spec, dispatcher)
            .unwrap_or_else(|error| crash(format_args!("native {} does not build: {}", name, error)));
        if *name == "return" {
            interp.return_phase = action.as_action().map(|(phase, _, _)| phase);
        }
        interp.define_lib(name, action);
    }
    interp.define_lib("null", Value::null());
    interp.define_lib("okay", Value::okay());
    tracing::debug!(count = interp.heap.varlist(interp.lib).vars.len(), "natives registered");
}

// ============================================================================
// Helpers
// ============================================================================

/// Finish with `result` in the level's `out`.
pub(crate) fn done(interp: &mut Interpreter, id: LevelId, result: impl Into<Atom>) -> Result<Bounce, Error> {
    interp.levels[id].out = result.into();
    Ok(Bounce::Out)
}

/// Block argument `n`, as series and index.
pub(crate) fn block_arg(interp: &Interpreter, id: LevelId, n: usize) -> (Element, crate::heap::SeriesId, u32) {
    let arg = interp.arg(id, n);
    match arg.as_element().and_then(|e| e.as_list(ListKind::Block).map(|(s, i)| (e, s, i))) {
        Some(found) => found,
        None => crash("block argument was not typechecked"),
    }
}

/// Element argument `n`; antiforms are refused with an error.
pub(crate) fn element_arg(interp: &Interpreter, id: LevelId, n: usize) -> Result<Element, Error> {
    let arg = interp.arg(id, n);
    arg.as_element().ok_or_else(|| {
        Error::new(ErrorKind::invalid("antiforms cannot be stored in a series"))
            .near(interp.mold(&arg))
    })
}

/// Integer argument `n`.
pub(crate) fn integer_arg(interp: &Interpreter, id: LevelId, n: usize) -> i64 {
    interp
        .arg(id, n)
        .as_integer()
        .unwrap_or_else(|| crash("integer argument was not typechecked"))
}

/// Whether refinement `n` was used (flag set or argument given).
pub(crate) fn refined(interp: &Interpreter, id: LevelId, n: usize) -> bool {
    !interp.arg(id, n).is_null()
}
