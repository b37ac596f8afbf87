//! Evaluation and value manipulation.

use super::{Entry, block_arg, done, element_arg};
use crate::bounce::{Bounce, Child};
use crate::cell::{Atom, Element, ListKind, Payload, Sigil, TypeSet};
use crate::error::{Error, ErrorKind, crash};
use crate::executors::{Executor, StepperState};
use crate::feed::Feed;
use crate::interpreter::{Interpreter, lift};
use crate::level::{Level, LevelFlags, LevelId, Slot};

pub const NATIVES: &[Entry] = &[
    ("eval", "[source [block! group!]]", eval),
    ("reduce", "[block [block!]]", reduce),
    ("pack", "[block [block!]]", pack),
    ("quote", "[value [any-element!]]", quote),
    ("meta", "[^atom]", meta),
    ("unmeta", "[value [quoted! quasi!]]", unmeta),
    ("the", "[@value]", the),
    ("just", "['value]", just),
    ("get", "[word [any-word!]]", get),
    ("set", "[word [any-word!] value]", set),
    ("type-of", "[^atom]", type_of),
    ("comment", "['discarded]", comment),
    ("elide", "[^discarded]", elide),
];

/// Evaluate a block or group, giving its last visible result.
fn eval(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let source = interp.arg(id, 0);
    let Payload::List { series, index, binding, .. } = source.payload() else {
        crash("eval source was not typechecked");
    };
    Ok(Bounce::delegate(Level::evaluator(Feed::array(series, index, binding))))
}

/// How collected results are stored.
#[derive(Clone, Copy, PartialEq)]
enum Collect {
    /// Decayed; antiforms are an error.
    Reduce,
    /// Lifted, so any atom fits.
    Pack,
}

/// Step a block expression by expression in a kept-alive stepper,
/// accumulating the results in a block held in `scratch`.
fn collect(interp: &mut Interpreter, id: LevelId, mode: Collect) -> Result<Bounce, Error> {
    if interp.frame(id).state == 0 {
        let (block, series, index) = block_arg(interp, id, 0);
        let binding = block.binding();
        let results = interp.heap.alloc_array(&[]);
        interp.levels[id].scratch = Element::list(ListKind::Block, results).into();
        let feed = Feed::array(series, index, binding);
        if feed.borrow().at_end(&interp.heap) {
            return finish_collect(interp, id, mode);
        }
        interp.frame_mut(id).state = 1;
        let child = Level::stepper(feed)
            .into_slot(Slot::Spare)
            .with_flags(LevelFlags::KEEP_ALIVE);
        return Ok(Bounce::push(child));
    }

    let result = interp.levels[id].spare;
    if !result.is_ghost() {
        let item = match mode {
            Collect::Pack => lift(result)?,
            Collect::Reduce => {
                let value = interp.decay(result)?;
                value.as_element().ok_or_else(|| {
                    Error::new(ErrorKind::invalid("reduce cannot store an antiform"))
                        .near(interp.mold(&value))
                })?
            }
        };
        let Some(results) = interp.levels[id].scratch.series() else {
            crash("collect lost its results block");
        };
        interp.heap.array_mut(results)?.push(item);
    }

    let child = &mut interp.levels[id + 1];
    if child.feed.borrow().at_end(&interp.heap) {
        return finish_collect(interp, id, mode);
    }
    child.executor = Executor::Stepper(StepperState::Initial);
    child.out = Atom::ghost();
    Ok(Bounce::Continue(Child::Kept))
}

fn finish_collect(interp: &mut Interpreter, id: LevelId, mode: Collect) -> Result<Bounce, Error> {
    let Some(results) = interp.levels[id].scratch.series() else {
        crash("collect lost its results block");
    };
    let result = match mode {
        Collect::Reduce => Element::list(ListKind::Block, results).into(),
        Collect::Pack => Atom::pack(results),
    };
    done(interp, id, result)
}

/// Evaluate each expression of a block into a new block.
fn reduce(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    collect(interp, id, Collect::Reduce)
}

/// Evaluate each expression of a block into a pack.
fn pack(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    collect(interp, id, Collect::Pack)
}

/// Add one quote level.
fn quote(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let value = element_arg(interp, id, 0)?;
    let quoted = value
        .quote()
        .ok_or_else(|| ErrorKind::invalid("too many quote levels"))?;
    done(interp, id, quoted)
}

/// The lifted form of any result, antiforms included.
fn meta(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let lifted = interp.arg(id, 0);
    done(interp, id, lifted)
}

/// Undo `meta`: quasi becomes antiform, quoted loses a level.
fn unmeta(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let value = element_arg(interp, id, 0)?;
    let atom = value.unlift().ok_or_else(|| {
        Error::new(ErrorKind::invalid("quasiform has no antiform")).near(interp.mold(&value))
    })?;
    done(interp, id, atom)
}

fn the(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let value = interp.arg(id, 0);
    done(interp, id, value)
}

fn just(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let value = interp.arg(id, 0);
    done(interp, id, value)
}

fn get(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let word = interp.arg(id, 0);
    let Some(symbol) = word.word_symbol() else {
        crash("get word was not typechecked");
    };
    let value = interp.get_var(symbol, word.binding())?;
    done(interp, id, value)
}

fn set(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let word = interp.arg(id, 0);
    let value = interp.arg(id, 1);
    let Some(symbol) = word.word_symbol() else {
        crash("set word was not typechecked");
    };
    interp.set_var(symbol, word.binding(), value);
    done(interp, id, value)
}

/// Type of any result as a word, e.g. `integer!`, `null!` or `pack!`.
fn type_of(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let lifted = interp.arg(id, 0);
    let name = match lifted.as_element().and_then(Element::unlift) {
        Some(atom) => TypeSet::name_of(&atom),
        None => crash("meta argument was not lifted"),
    };
    let symbol = interp.intern(name);
    done(interp, id, Element::word_with(symbol, Sigil::Plain))
}

/// Discard the next element unevaluated.
fn comment(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    done(interp, id, Atom::ghost())
}

/// Evaluate the next expression and discard it.
fn elide(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    done(interp, id, Atom::ghost())
}

#[cfg(test)]
#[path = "values_test.rs"]
mod values_test;
