//! The stepper: one expression per run.
//!
//! Consumes the next element of the feed, evaluates it and looks ahead
//! for an infix operator. The result goes to `out` when the stepper owns
//! its level, or to `spare` when the evaluator runs it inline.

use smallvec::SmallVec;

use super::{Executor, StepperState};
use crate::bounce::Bounce;
use crate::cell::{Atom, Element, ListKind, Payload, Sigil, Value};
use crate::error::{Error, ErrorKind};
use crate::feed::Feed;
use crate::interpreter::{Interpreter, lift};
use crate::level::{Level, LevelFlags, LevelId, Slot};
use crate::symbol::Symbol;

/// Outcome of [`step`].
pub(crate) enum Step {
    /// The result is in the slot.
    Done,
    /// Resume in the given state once the bounce is handled.
    Suspend(StepperState, Bounce),
}

pub(crate) fn run(interp: &mut Interpreter, id: LevelId, state: StepperState) -> Result<Bounce, Error> {
    match step(interp, id, state, Slot::Out)? {
        Step::Done => Ok(Bounce::Out),
        Step::Suspend(state, bounce) => {
            interp.levels[id].executor = Executor::Stepper(state);
            Ok(bounce)
        }
    }
}

fn put(interp: &mut Interpreter, id: LevelId, slot: Slot, atom: impl Into<Atom>) {
    *interp.levels[id].slot_mut(slot) = atom.into();
}

/// Evaluate one expression from the feed of level `id` into `slot`.
pub(crate) fn step(
    interp: &mut Interpreter,
    id: LevelId,
    state: StepperState,
    slot: Slot,
) -> Result<Step, Error> {
    match state {
        StepperState::Initial => {}
        StepperState::SetWordRhs => return assign(interp, id, slot),
        StepperState::Evaluated => return lookahead(interp, id, slot),
    }

    let feed = interp.feed(id);
    let (next, binding) = {
        let mut feed = feed.borrow_mut();
        (feed.next(&interp.heap), feed.binding())
    };
    let Some(element) = next else {
        put(interp, id, slot, Atom::ghost());
        return Ok(Step::Done);
    };
    let element = element.bound(binding);

    if !element.is_plain() {
        let atom = element.unlift().ok_or_else(|| {
            Error::new(ErrorKind::invalid("quasiform has no antiform")).near(interp.mold(&element))
        })?;
        put(interp, id, slot, atom);
        return lookahead(interp, id, slot);
    }

    match element.payload() {
        Payload::Comma => {
            put(interp, id, slot, Atom::ghost());
            Ok(Step::Done)
        }
        Payload::Word { symbol, sigil, binding } => match sigil {
            Sigil::Plain => {
                let value = interp.get_var(symbol, binding)?;
                if let Some((_, _, infix)) = value.as_action() {
                    if infix {
                        return Err(ErrorKind::NoLeftArgument(interp.spelling(symbol)).into());
                    }
                    let bounce = push_action(interp, id, slot, value, Some(symbol), &[], None);
                    return Ok(Step::Suspend(StepperState::Evaluated, bounce));
                }
                if value.is_trash() {
                    return Err(ErrorKind::NoValue {
                        word: interp.spelling(symbol),
                    }
                    .into());
                }
                put(interp, id, slot, value);
                lookahead(interp, id, slot)
            }
            Sigil::Get => {
                let value = interp.get_var(symbol, binding)?;
                put(interp, id, slot, value);
                lookahead(interp, id, slot)
            }
            Sigil::Meta => {
                let value = interp.get_var(symbol, binding)?;
                put(interp, id, slot, lift(value.into())?);
                lookahead(interp, id, slot)
            }
            Sigil::The | Sigil::Refine => {
                put(interp, id, slot, element);
                lookahead(interp, id, slot)
            }
            Sigil::Set => {
                let missing = match feed.borrow().peek(&interp.heap) {
                    None => true,
                    Some(next) => next.is_comma(),
                };
                if missing {
                    let name = format!("{}:", interp.spelling(symbol));
                    return Err(ErrorKind::NeedValue(name.into()).into());
                }
                let level = &mut interp.levels[id];
                level.scratch = element.into();
                let child = Level::stepper(feed).into_slot(slot);
                Ok(Step::Suspend(StepperState::SetWordRhs, Bounce::push(child)))
            }
        },
        Payload::List {
            kind: ListKind::Group,
            series,
            index,
            binding,
        } => {
            let child = Level::evaluator(Feed::array(series, index, binding)).into_slot(slot);
            Ok(Step::Suspend(StepperState::Evaluated, Bounce::push(child)))
        }
        Payload::List {
            kind: ListKind::Path,
            series,
            index,
            binding,
        } => {
            let items: SmallVec<[Element; 4]> =
                interp.heap.array(series).iter().skip(index as usize).copied().collect();
            let Some(head) = items.first().and_then(|head| head.as_word(Sigil::Plain)) else {
                return Err(Error::new(ErrorKind::invalid("path must start with a word"))
                    .near(interp.mold(&element)));
            };
            let mut refinements: SmallVec<[Symbol; 2]> = SmallVec::new();
            for item in &items[1..] {
                let Some(refinement) = item.as_word(Sigil::Plain) else {
                    return Err(Error::new(ErrorKind::invalid("path refinements must be words"))
                        .near(interp.mold(&element)));
                };
                refinements.push(refinement);
            }
            let value = interp.get_var(head, binding)?;
            if !value.is_action() {
                return Err(ErrorKind::NotAction(interp.spelling(head)).into());
            }
            let bounce = push_action(interp, id, slot, value, Some(head), &refinements, None);
            Ok(Step::Suspend(StepperState::Evaluated, bounce))
        }
        _ => {
            put(interp, id, slot, element);
            lookahead(interp, id, slot)
        }
    }
}

fn push_action(
    interp: &mut Interpreter,
    id: LevelId,
    slot: Slot,
    action: Value,
    label: Option<Symbol>,
    refinements: &[Symbol],
    left: Option<Value>,
) -> Bounce {
    let Some((phase, coupling, infix)) = action.as_action() else {
        crate::error::crash("push_action on a non-action");
    };
    let feed = interp.feed(id);
    let mut child = interp.action_level(feed, phase, coupling, label).into_slot(slot);
    let frame = child.frame_mut();
    frame.infix = infix;
    frame.left = left;
    frame.refinements.extend_from_slice(refinements);
    Bounce::push(child)
}

/// Finish `name: expr` once the right-hand side is in `slot`.
fn assign(interp: &mut Interpreter, id: LevelId, slot: Slot) -> Result<Step, Error> {
    let level = &interp.levels[id];
    let result = level.slot(slot);
    let target = level.scratch;
    let (Some(symbol), binding) = (target.word_symbol(), target.binding()) else {
        crate::error::crash("set-word missing from scratch");
    };
    if result.is_raised() {
        return Ok(Step::Done);
    }
    if result.is_ghost() {
        let name = format!("{}:", interp.spelling(symbol));
        return Err(ErrorKind::NeedValue(name.into()).into());
    }
    let value = interp.decay(result)?;
    interp.set_var(symbol, binding, value);
    put(interp, id, slot, value);
    Ok(Step::Done)
}

/// After a value: if the next element is a word naming an infix action,
/// call it with the value as its left argument.
fn lookahead(interp: &mut Interpreter, id: LevelId, slot: Slot) -> Result<Step, Error> {
    let level = &interp.levels[id];
    if level.flags.contains(LevelFlags::NO_LOOKAHEAD) {
        return Ok(Step::Done);
    }
    let result = level.slot(slot);
    if result.is_ghost() || result.is_raised() {
        return Ok(Step::Done);
    }
    let feed = interp.feed(id);
    let (next, binding) = {
        let feed = feed.borrow();
        (feed.peek(&interp.heap), feed.binding())
    };
    let Some(word) = next else {
        return Ok(Step::Done);
    };
    let Some(symbol) = word.as_word(Sigil::Plain) else {
        return Ok(Step::Done);
    };
    let Ok(action) = interp.get_var(symbol, word.binding().or(binding)) else {
        return Ok(Step::Done);
    };
    if !matches!(action.as_action(), Some((_, _, true))) {
        return Ok(Step::Done);
    }
    feed.borrow_mut().next(&interp.heap);
    let left = interp.decay(result)?;
    let bounce = push_action(interp, id, slot, action, Some(symbol), &[], Some(left));
    Ok(Step::Suspend(StepperState::Evaluated, bounce))
}
