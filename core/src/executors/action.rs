//! The action executor: gather arguments, typecheck, dispatch.
//!
//! ```text
//! Initial ──> Fulfilling <──> ArgEvaluated
//!                 │
//!                 v
//!             Typecheck ──> Dispatch ──> (CheckReturn) ──> done
//! ```
//!
//! Fulfilling walks the frame's `order`: positional parameters first,
//! then arguments of refinements named in the call path, in path order.
//! Evaluated arguments are stepped in a child level sharing this level's
//! feed and land in `spare`.

use smallvec::SmallVec;

use super::{ActionState, Executor};
use crate::bounce::Bounce;
use crate::cell::{ListKind, TypeSet, Value};
use crate::compose;
use crate::error::{Error, ErrorKind};
use crate::feed::Feed;
use crate::interpreter::{Interpreter, lift};
use crate::level::{Level, LevelFlags, LevelId, Slot};
use crate::phase::{Dispatcher, Param, ParamClass};

pub(crate) fn run(interp: &mut Interpreter, id: LevelId, state: ActionState) -> Result<Bounce, Error> {
    match state {
        ActionState::Initial => begin(interp, id),
        ActionState::Fulfilling => fulfill(interp, id),
        ActionState::ArgEvaluated => arg_evaluated(interp, id),
        ActionState::Typecheck => {
            typecheck(interp, id)?;
            dispatch(interp, id)
        }
        ActionState::Dispatch => dispatch(interp, id),
        ActionState::CheckReturn => {
            check_return(interp, id)?;
            Ok(Bounce::Out)
        }
    }
}

fn set_state(interp: &mut Interpreter, id: LevelId, state: ActionState) {
    interp.levels[id].executor = Executor::Action(state);
}

fn param_at(interp: &Interpreter, id: LevelId, slot: usize) -> Param {
    interp.details(interp.frame(id).phase).params.params[slot].clone()
}

fn begin(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let frame = interp.frame(id);
    let params = interp.details(frame.phase).params.clone();
    let mut order: SmallVec<[u16; 8]> = params
        .params
        .iter()
        .enumerate()
        .filter(|(_, param)| param.is_positional())
        .map(|(slot, _)| slot as u16)
        .collect();

    let refinements = frame.refinements.clone();
    for refinement in refinements {
        let slot = params
            .index_of(refinement)
            .filter(|slot| params.params[*slot].refinement)
            .ok_or_else(|| ErrorKind::UnknownRefinement {
                action: interp.action_name(id),
                refinement: interp.spelling(refinement),
            })?;
        if params.params[slot].is_flag() {
            interp.set_arg(id, slot, Value::okay());
        } else {
            order.push(slot as u16);
        }
    }

    let frame = interp.frame_mut(id);
    frame.order = order;
    frame.cursor = 0;
    set_state(interp, id, ActionState::Fulfilling);
    fulfill(interp, id)
}

/// Argument slot under the cursor, or `None` when all are filled.
fn current_slot(interp: &Interpreter, id: LevelId) -> Option<usize> {
    let frame = interp.frame(id);
    frame.order.get(frame.cursor as usize).map(|slot| *slot as usize)
}

fn advance(interp: &mut Interpreter, id: LevelId) {
    interp.frame_mut(id).cursor += 1;
}

fn missing(interp: &mut Interpreter, id: LevelId, slot: usize, param: &Param) -> Result<(), Error> {
    if !param.endable {
        return Err(ErrorKind::MissingArg {
            action: interp.action_name(id),
            param: interp.spelling(param.symbol),
        }
        .into());
    }
    interp.set_arg(id, slot, Value::null());
    advance(interp, id);
    Ok(())
}

fn fulfill(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    loop {
        let Some(slot) = current_slot(interp, id) else {
            typecheck(interp, id)?;
            return dispatch(interp, id);
        };
        let param = param_at(interp, id, slot);

        if let Some(left) = interp.frame_mut(id).left.take() {
            let arg = match param.class {
                ParamClass::Meta => lift(left.into())?.into(),
                _ => left,
            };
            interp.set_arg(id, slot, arg);
            advance(interp, id);
            continue;
        }

        let feed = interp.feed(id);
        let next = feed.borrow().peek(&interp.heap);
        let Some(next) = next.filter(|next| !next.is_comma()) else {
            missing(interp, id, slot, &param)?;
            continue;
        };

        match param.class {
            ParamClass::Just => {
                feed.borrow_mut().next(&interp.heap);
                interp.set_arg(id, slot, next.into());
            }
            ParamClass::The => {
                let bound = feed.borrow_mut().next_bound(&interp.heap);
                interp.set_arg(id, slot, bound.unwrap_or(next).into());
            }
            ParamClass::Soft => {
                let bound = feed.borrow_mut().next_bound(&interp.heap).unwrap_or(next);
                if let Some((series, index)) = bound.as_list(ListKind::Group) {
                    let child = Level::evaluator(Feed::array(series, index, bound.binding()))
                        .into_slot(Slot::Spare);
                    set_state(interp, id, ActionState::ArgEvaluated);
                    return Ok(Bounce::push(child));
                }
                interp.set_arg(id, slot, bound.into());
            }
            ParamClass::Normal | ParamClass::Meta => {
                return Ok(step_argument(interp, id));
            }
            ParamClass::Local => crate::error::crash("local parameter in fulfillment order"),
        }
        advance(interp, id);
    }
}

fn step_argument(interp: &mut Interpreter, id: LevelId) -> Bounce {
    let mut child = Level::stepper(interp.feed(id)).into_slot(Slot::Spare);
    if interp.frame(id).infix {
        child.flags.insert(LevelFlags::NO_LOOKAHEAD);
    }
    set_state(interp, id, ActionState::ArgEvaluated);
    Bounce::push(child)
}

fn arg_evaluated(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let Some(slot) = current_slot(interp, id) else {
        crate::error::crash("argument evaluated past the end of the order");
    };
    let param = param_at(interp, id, slot);
    let result = interp.levels[id].spare;
    let arg = match param.class {
        ParamClass::Meta => lift(result)?.into(),
        ParamClass::Normal if result.is_ghost() => {
            let feed = interp.feed(id);
            let next = feed.borrow().peek(&interp.heap);
            if next.is_some_and(|next| !next.is_comma()) {
                return Ok(step_argument(interp, id));
            }
            set_state(interp, id, ActionState::Fulfilling);
            missing(interp, id, slot, &param)?;
            return fulfill(interp, id);
        }
        _ => interp.decay(result)?,
    };
    interp.set_arg(id, slot, arg);
    advance(interp, id);
    set_state(interp, id, ActionState::Fulfilling);
    fulfill(interp, id)
}

fn typecheck(interp: &mut Interpreter, id: LevelId) -> Result<(), Error> {
    set_state(interp, id, ActionState::Dispatch);
    let frame = interp.frame(id);
    let params = interp.details(frame.phase).params.clone();
    let vars = interp.heap.varlist(frame.varlist).vars.clone();

    for (param, arg) in params.params.iter().zip(vars) {
        if param.class == ParamClass::Local || param.is_flag() {
            continue;
        }
        if arg.is_null() && (param.refinement || param.endable) {
            continue;
        }
        let (types, ok, received) = if param.class == ParamClass::Meta {
            let types = param.types.unwrap_or(TypeSet::ANY_ATOM);
            match arg.as_element().and_then(|element| element.unlift()) {
                Some(atom) => (types, types.accepts(&atom), TypeSet::name_of(&atom)),
                None => (types, false, TypeSet::name_of(&arg)),
            }
        } else {
            let types = param.types.unwrap_or(TypeSet::ANY_VALUE);
            (types, types.accepts(&arg), TypeSet::name_of(&arg))
        };
        if !ok {
            return Err(ErrorKind::ArgType {
                action: interp.action_name(id),
                param: interp.spelling(param.symbol),
                expected: types.describe().into(),
                received: received.into(),
            }
            .into());
        }
    }
    Ok(())
}

fn dispatch(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let phase = interp.frame(id).phase;
    let dispatcher = interp.details(phase).dispatcher.clone();
    let bounce = match dispatcher {
        Dispatcher::Native(native) => native(interp, id)?,
        Dispatcher::Func => compose::func::dispatch(interp, id)?,
        Dispatcher::Adapter => compose::adapt::dispatch(interp, id)?,
        Dispatcher::Cascader => compose::cascade::dispatch(interp, id)?,
        Dispatcher::Hijacker => compose::hijack::dispatch(interp, id)?,
        Dispatcher::Macro => compose::macros::dispatch(interp, id)?,
        Dispatcher::Combinator => compose::combinator::dispatch(interp, id)?,
    };
    match bounce {
        Bounce::Out => {
            check_return(interp, id)?;
            Ok(Bounce::Out)
        }
        Bounce::Delegate(child) if interp.details(phase).params.returns.is_some() => {
            set_state(interp, id, ActionState::CheckReturn);
            Ok(Bounce::Continue(crate::bounce::Child::Push(Box::new(
                child.into_slot(Slot::Out),
            ))))
        }
        other => Ok(other),
    }
}

/// Hold the result in `out` to the phase's return contract. Raised
/// results pass through unchecked.
fn check_return(interp: &mut Interpreter, id: LevelId) -> Result<(), Error> {
    let Some(frame) = interp.levels[id].frame.as_ref() else {
        return Ok(());
    };
    let Some(returns) = interp.details(frame.phase).params.returns else {
        return Ok(());
    };
    let out = interp.levels[id].out;
    if out.is_raised() || returns.accepts(&out) {
        return Ok(());
    }
    Err(ErrorKind::ReturnType {
        action: interp.action_name(id),
        expected: returns.describe().into(),
        received: TypeSet::name_of(&out).into(),
    }
    .into())
}
