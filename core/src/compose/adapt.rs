//! Adaptation: a prelude run over an action's arguments.
//!
//! The prelude sees the adaptee's inputs only (locals stay hidden) and may
//! rewrite them. The frame is then redone as the adaptee, typechecking
//! again since the prelude may have stored anything.

use super::aux_action;
use crate::bounce::Bounce;
use crate::cell::{Element, ListKind, Value};
use crate::context::Lens;
use crate::error::{Error, ErrorKind};
use crate::feed::Feed;
use crate::interpreter::Interpreter;
use crate::level::{Level, LevelId, Slot};
use crate::phase::{Details, Dispatcher};

pub fn make(interp: &mut Interpreter, adaptee: Value, prelude: Element) -> Result<Value, Error> {
    let Some((phase, _, _)) = adaptee.as_action() else {
        return Err(ErrorKind::NotAction(interp.mold(&adaptee).into()).into());
    };
    if prelude.as_list(ListKind::Block).is_none() {
        return Err(ErrorKind::invalid("prelude must be a block").into());
    }
    let params = interp.details(phase).params.clone();
    let details = Details::new(params, Dispatcher::Adapter).with_aux(&[prelude.into(), adaptee]);
    let phase = interp.make_phase(details);
    Ok(Value::action(phase, None, false))
}

pub(crate) fn dispatch(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let frame = interp.frame(id);
    let (phase, varlist, state) = (frame.phase, frame.varlist, frame.state);
    match state {
        0 => {
            let prelude = interp.details(phase).aux[0];
            let Some((series, index)) = prelude.as_list(ListKind::Block) else {
                crate::error::crash("prelude is not a block");
            };
            let vars = interp.heap.varlist_mut(varlist);
            vars.lens = Lens::Inputs;
            vars.parent = prelude.binding();
            interp.frame_mut(id).state = 1;
            let child = Level::evaluator(Feed::array(series, index, Some(varlist)))
                .into_slot(Slot::Spare);
            Ok(Bounce::push(child))
        }
        _ => {
            let spare = interp.levels[id].spare;
            if let Some(error) = interp.error_of(&spare) {
                return Err(error);
            }
            let adaptee = aux_action(interp, id, 1);
            let Some((phase, coupling, _)) = adaptee.as_action() else {
                crate::error::crash("adaptee is not an action");
            };
            if coupling.is_some() {
                interp.frame_mut(id).coupling = coupling;
            }
            Ok(Bounce::Redo {
                checked: true,
                phase: Some(phase),
            })
        }
    }
}
