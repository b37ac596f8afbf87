//! Hijacking: an identity that runs something else.
//!
//! The victim's details are overwritten in place, so every existing
//! reference to the victim now reaches the replacement. What the victim
//! used to be is moved to a fresh identity and handed back.
//!
//! Frames keep being built from the victim's parameters. When the
//! replacement shares them (it was derived from the victim's interface),
//! the frame is simply redone as the replacement. Otherwise the filled
//! arguments are copied by name into a frame for the replacement.

use std::rc::Rc;

use super::aux_action;
use crate::bounce::Bounce;
use crate::cell::Value;
use crate::error::{Error, ErrorKind};
use crate::executors::{ActionState, Executor};
use crate::interpreter::Interpreter;
use crate::level::LevelId;
use crate::phase::{Details, Dispatcher, ParamClass};

/// Make `victim` behave as `replacement`; returns the victim as it was.
pub fn hijack(interp: &mut Interpreter, victim: Value, replacement: Value) -> Result<Value, Error> {
    let (Some((victim_phase, _, infix)), Some((replacement_phase, _, _))) =
        (victim.as_action(), replacement.as_action())
    else {
        return Err(ErrorKind::invalid("hijack needs two actions").into());
    };
    if victim_phase == replacement_phase {
        return Err(ErrorKind::invalid("cannot hijack an action with itself").into());
    }
    let original = interp.details(victim_phase).clone();
    let params = original.params.clone();
    let name = original.name;
    let saved = interp.make_phase(original);

    let mut details = Details::new(params, Dispatcher::Hijacker).with_aux(&[replacement]);
    details.name = name;
    *interp.heap.details_mut(victim_phase) = details;
    tracing::debug!(?victim_phase, ?saved, "hijacked");
    Ok(Value::action(saved, victim.binding(), infix))
}

pub(crate) fn dispatch(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let replacement = aux_action(interp, id, 0);
    let Some((phase, coupling, _)) = replacement.as_action() else {
        crate::error::crash("replacement is not an action");
    };
    let frame = interp.frame(id);
    let ours = interp.details(frame.phase).params.clone();
    let theirs = interp.details(phase).params.clone();

    if Rc::ptr_eq(&ours, &theirs) {
        if coupling.is_some() {
            interp.frame_mut(id).coupling = coupling;
        }
        return Ok(Bounce::Redo {
            checked: false,
            phase: Some(phase),
        });
    }

    let feed = interp.feed(id);
    let label = interp.levels[id].label;
    let mut child = interp.action_level(feed, phase, coupling, label);
    let target = child.frame().varlist;
    for (slot, param) in theirs.params.iter().enumerate() {
        if param.class == ParamClass::Local {
            continue;
        }
        if let Some(from) = ours.index_of(param.symbol) {
            let value = interp.arg(id, from);
            interp.heap.varlist_mut(target).vars[slot] = value;
        }
    }
    child.executor = Executor::Action(ActionState::Typecheck);
    Ok(Bounce::delegate(child))
}
