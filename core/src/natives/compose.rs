//! Natives that build actions out of other actions.

use super::{Entry, block_arg, done, element_arg};
use crate::bounce::Bounce;
use crate::cell::Value;
use crate::compose::{adapt, cascade, combinator, func, hijack, macros};
use crate::error::{Error, crash};
use crate::interpreter::Interpreter;
use crate::level::LevelId;

pub const NATIVES: &[Entry] = &[
    ("func", "[spec [block!] body [block!]]", func),
    ("adapt", "[action [action!] prelude [block!]]", adapt),
    ("cascade", "[stages [block!]]", cascade),
    ("hijack", "[victim [action!] replacement [action!]]", hijack),
    ("macro", "[spec [block!] body [block!]]", macro_),
    ("combinator", "[spec [block!] body [block!]]", combinator),
    ("infix", "[action [action!]]", infix),
    ("furthest", "[input [block!]]", furthest),
];

fn func(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let (spec, body) = (element_arg(interp, id, 0)?, element_arg(interp, id, 1)?);
    let action = func::make(interp, spec, body)?;
    done(interp, id, action)
}

fn adapt(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let adaptee = interp.arg(id, 0);
    let prelude = element_arg(interp, id, 1)?;
    let action = adapt::make(interp, adaptee, prelude)?;
    done(interp, id, action)
}

fn cascade(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let stages = element_arg(interp, id, 0)?;
    let action = cascade::make(interp, stages)?;
    done(interp, id, action)
}

/// Make the victim's identity run the replacement. Gives an action that
/// still behaves as the victim did.
fn hijack(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let (victim, replacement) = (interp.arg(id, 0), interp.arg(id, 1));
    let original = hijack::hijack(interp, victim, replacement)?;
    done(interp, id, original)
}

fn macro_(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let (spec, body) = (element_arg(interp, id, 0)?, element_arg(interp, id, 1)?);
    let action = macros::make(interp, spec, body)?;
    done(interp, id, action)
}

fn combinator(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let (spec, body) = (element_arg(interp, id, 0)?, element_arg(interp, id, 1)?);
    let action = combinator::make(interp, spec, body)?;
    done(interp, id, action)
}

/// Same action, taking its first argument from the left.
fn infix(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let Some((phase, coupling, _)) = interp.arg(id, 0).as_action() else {
        crash("infix argument was not typechecked");
    };
    done(interp, id, Value::action(phase, coupling, true))
}

/// Furthest position any combinator reached in the input, null if none.
fn furthest(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let (_, series, _) = block_arg(interp, id, 0);
    let found = combinator::furthest(interp, series);
    done(interp, id, found.map_or(Value::null(), Value::from))
}
