//! Conditionals, loops and unwinding.
//!
//! Natives that catch (`while`, `for-each`, `catch`, `rescue`) set
//! [`LevelFlags::CATCHES`] before running their first child. While a throw
//! unwinds they are re-invoked with it still in flight, and either take it
//! or hand it back with [`Bounce::Thrown`].

use super::{Entry, block_arg, done, refined};
use crate::bounce::{Bounce, Label, Thrown};
use crate::cell::{Atom, Element, Payload, Value};
use crate::context::Varlist;
use crate::error::{Error, ErrorKind, crash};
use crate::feed::Feed;
use crate::heap::Stub;
use crate::interpreter::Interpreter;
use crate::level::{Level, LevelFlags, LevelId, Slot};

pub const NATIVES: &[Entry] = &[
    ("if", "[condition branch [block!]]", if_),
    ("either", "[condition true-branch [block!] false-branch [block!]]", either),
    ("while", "[condition [block!] body [block!]]", while_),
    (
        "for-each",
        "['word [word!] series [block!] body [block!] <local> bound-body]",
        for_each,
    ),
    ("break", "[]", break_),
    ("continue", "[]", continue_),
    ("catch", "[block [block!] /name [word!]]", catch),
    ("throw", "[^value [any-atom!] /name [word!]]", throw),
    ("rescue", "[block [block!]]", rescue),
    ("fail", "[reason [text! error!]]", fail),
    ("raise", "[reason [text! error!]]", raise),
    ("try", "[^atom]", try_),
    ("return", "[^value [any-atom! <end>]]", return_),
];

/// Evaluate the block argument `n` in this level's place.
fn delegate_branch(interp: &Interpreter, id: LevelId, n: usize) -> Bounce {
    let (block, series, index) = block_arg(interp, id, n);
    Bounce::delegate(Level::evaluator(Feed::array(series, index, block.binding())))
}

/// Child evaluating the block argument `n` into `slot`.
fn branch_level(interp: &Interpreter, id: LevelId, n: usize, slot: Slot) -> Level {
    let (block, series, index) = block_arg(interp, id, n);
    Level::evaluator(Feed::array(series, index, block.binding())).into_slot(slot)
}

fn catching(interp: &mut Interpreter, id: LevelId) {
    interp.levels[id].flags.insert(LevelFlags::CATCHES);
}

// ============================================================================
// Conditionals
// ============================================================================

/// Run the branch when the condition is not null; null otherwise.
fn if_(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    if interp.arg(id, 0).is_truthy() {
        return Ok(delegate_branch(interp, id, 1));
    }
    done(interp, id, Value::null())
}

fn either(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let branch = if interp.arg(id, 0).is_truthy() { 1 } else { 2 };
    Ok(delegate_branch(interp, id, branch))
}

// ============================================================================
// Loops
// ============================================================================

/// What a loop does with a throw that reached it.
enum LoopSignal {
    Break,
    Continue,
    Rethrow(Thrown),
}

fn loop_signal(interp: &mut Interpreter) -> Option<LoopSignal> {
    let label = interp.thrown_label()?;
    let thrown = interp.take_thrown();
    Some(match label {
        Label::Break => LoopSignal::Break,
        Label::Continue => LoopSignal::Continue,
        _ => LoopSignal::Rethrow(thrown),
    })
}

/// Keep the body's result unless it was invisible.
fn keep_body_result(interp: &mut Interpreter, id: LevelId) {
    let level = &mut interp.levels[id];
    if !level.scratch.is_ghost() {
        level.out = level.scratch;
    }
}

const WHILE_CONDITION: u8 = 1;
const WHILE_BODY: u8 = 2;

/// Run the body as long as the condition block gives a truthy value.
/// The result is the body's last visible result, null if it never ran.
fn while_(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let state = interp.frame(id).state;
    match loop_signal(interp) {
        Some(LoopSignal::Break) => return done(interp, id, Value::null()),
        Some(LoopSignal::Continue) => return Ok(while_condition(interp, id)),
        Some(LoopSignal::Rethrow(thrown)) => return Ok(Bounce::Thrown(thrown)),
        None => {}
    }
    match state {
        0 => {
            catching(interp, id);
            interp.levels[id].out = Value::null().into();
            Ok(while_condition(interp, id))
        }
        WHILE_CONDITION => {
            let condition = interp.decay(interp.levels[id].spare)?;
            if !condition.is_truthy() {
                return Ok(Bounce::Out);
            }
            interp.frame_mut(id).state = WHILE_BODY;
            Ok(Bounce::push(branch_level(interp, id, 1, Slot::Scratch)))
        }
        WHILE_BODY => {
            if interp.levels[id].scratch.is_raised() {
                let raised = interp.levels[id].scratch;
                return done(interp, id, raised);
            }
            keep_body_result(interp, id);
            Ok(while_condition(interp, id))
        }
        _ => crash("while in an unknown state"),
    }
}

fn while_condition(interp: &mut Interpreter, id: LevelId) -> Bounce {
    interp.frame_mut(id).state = WHILE_CONDITION;
    Bounce::push(branch_level(interp, id, 0, Slot::Spare))
}

const FOR_EACH_BODY: u8 = 1;
const FOR_EACH_BOUND_BODY: usize = 3;

/// Run the body once per item of the series, with the word bound to the
/// item. The series is held, so the body cannot change its length.
fn for_each(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let (_, series, _) = block_arg(interp, id, 1);
    match loop_signal(interp) {
        Some(LoopSignal::Break) => {
            interp.heap.release(series);
            return done(interp, id, Value::null());
        }
        Some(LoopSignal::Continue) => return Ok(for_each_next(interp, id)),
        Some(LoopSignal::Rethrow(thrown)) => {
            interp.heap.release(series);
            return Ok(Bounce::Thrown(thrown));
        }
        None => {}
    }

    match interp.frame(id).state {
        0 => {
            let Some(symbol) = interp.arg(id, 0).word_symbol() else {
                crash("for-each word was not typechecked");
            };
            let (body, _, _) = block_arg(interp, id, 2);
            let scope = Varlist::scope(&[symbol], body.binding());
            let scope = interp.heap.alloc_managed(Stub::Varlist(scope));
            interp.set_arg(id, FOR_EACH_BOUND_BODY, body.rebound(Some(scope)).into());

            interp.heap.hold(series);
            catching(interp, id);
            interp.levels[id].out = Value::null().into();
            Ok(for_each_next(interp, id))
        }
        FOR_EACH_BODY => {
            if interp.levels[id].scratch.is_raised() {
                interp.heap.release(series);
                let raised = interp.levels[id].scratch;
                return done(interp, id, raised);
            }
            keep_body_result(interp, id);
            Ok(for_each_next(interp, id))
        }
        _ => crash("for-each in an unknown state"),
    }
}

fn for_each_next(interp: &mut Interpreter, id: LevelId) -> Bounce {
    let (cursor, series, index) = block_arg(interp, id, 1);
    let Some(item) = interp.heap.array(series).get(index as usize).copied() else {
        interp.heap.release(series);
        return Bounce::Out;
    };
    interp.set_arg(id, 1, cursor.at_index(index + 1).into());

    let (body, body_series, body_index) = block_arg(interp, id, FOR_EACH_BOUND_BODY);
    let Some(scope) = body.binding() else {
        crash("for-each body lost its scope");
    };
    interp.heap.varlist_mut(scope).vars[0] = item.into();
    interp.frame_mut(id).state = FOR_EACH_BODY;
    Bounce::push(
        Level::evaluator(Feed::array(body_series, body_index, Some(scope))).into_slot(Slot::Scratch),
    )
}

fn break_(_interp: &mut Interpreter, _id: LevelId) -> Result<Bounce, Error> {
    Ok(Bounce::Thrown(Thrown::new(Label::Break, Value::null())))
}

fn continue_(_interp: &mut Interpreter, _id: LevelId) -> Result<Bounce, Error> {
    Ok(Bounce::Thrown(Thrown::new(Label::Continue, Value::trash())))
}

// ============================================================================
// Throw and catch
// ============================================================================

/// Label named by an optional `/name` refinement in slot `n`.
fn throw_label(interp: &Interpreter, id: LevelId, n: usize) -> Label {
    if !refined(interp, id, n) {
        return Label::Plain;
    }
    match interp.arg(id, n).word_symbol() {
        Some(symbol) => Label::Name(symbol),
        None => crash("throw name was not typechecked"),
    }
}

/// Evaluate a block; a matching throw becomes its result.
fn catch(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    if interp.frame(id).state == 0 {
        catching(interp, id);
        interp.frame_mut(id).state = 1;
        return Ok(Bounce::push(branch_level(interp, id, 0, Slot::Out)));
    }
    let Some(label) = interp.thrown_label() else {
        return Ok(Bounce::Out);
    };
    let thrown = interp.take_thrown();
    if label != throw_label(interp, id, 1) {
        return Ok(Bounce::Thrown(thrown));
    }
    done(interp, id, thrown.arg)
}

fn throw(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let label = throw_label(interp, id, 1);
    let value = unlifted_arg(interp, id, 0);
    Ok(Bounce::Thrown(Thrown::new(label, value)))
}

fn unlifted_arg(interp: &Interpreter, id: LevelId, n: usize) -> Atom {
    match interp.arg(id, n).as_element().and_then(Element::unlift) {
        Some(atom) => atom,
        None => crash("meta argument was not lifted"),
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Evaluate a block, giving the error it failed with (or its raised
/// result) as an `error!`, null if there was none. Resource errors pass.
fn rescue(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    if interp.frame(id).state == 0 {
        catching(interp, id);
        interp.frame_mut(id).state = 1;
        return Ok(Bounce::push(branch_level(interp, id, 0, Slot::Out)));
    }
    if interp.is_throwing() {
        let thrown = interp.take_thrown();
        let catchable = interp
            .failure_of(&thrown)
            .is_some_and(|error| !error.is_resource());
        if !catchable {
            return Ok(Bounce::Thrown(thrown));
        }
        return done(interp, id, error_element(&thrown.arg));
    }
    let out = interp.levels[id].out;
    if out.is_raised() {
        return done(interp, id, error_element(&out));
    }
    done(interp, id, Value::null())
}

fn error_element(raised: &Atom) -> Element {
    match raised.payload() {
        Payload::Error(series) => Element::error(series),
        _ => crash("failure without an error"),
    }
}

fn reason(interp: &Interpreter, id: LevelId) -> Error {
    let reason = interp.arg(id, 0);
    match reason.payload() {
        Payload::Text(series) => ErrorKind::User(interp.heap.text(series).into()).into(),
        Payload::Error(series) => interp.heap.error(series).clone(),
        _ => crash("fail reason was not typechecked"),
    }
}

fn fail(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    Err(reason(interp, id))
}

/// Like `fail`, but as a raised result the caller may still intercept.
fn raise(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let mut error = reason(interp, id);
    error.where_ = Some(interp.action_name(id));
    error.tick = interp.tick();
    let raised = interp.raise(error);
    done(interp, id, raised)
}

/// Null for a raised result, anything else passes through.
fn try_(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let atom = unlifted_arg(interp, id, 0);
    if atom.is_raised() {
        return done(interp, id, Value::null());
    }
    done(interp, id, atom)
}

/// Definitional return: unwinds to the function whose frame this
/// `return` was armed with.
fn return_(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let Some(target) = interp.frame(id).coupling else {
        return Err(ErrorKind::invalid("return is only available inside a function").into());
    };
    let arg = interp.arg(id, 0);
    let value = if arg.is_null() {
        Value::trash().into()
    } else {
        unlifted_arg(interp, id, 0)
    };
    Ok(Bounce::Thrown(Thrown::new(Label::Return(target), value)))
}

#[cfg(test)]
#[path = "control_test.rs"]
mod control_test;
