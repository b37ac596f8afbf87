//! Composed actions.
//!
//! Each module here is a dispatcher plus the constructor that builds its
//! phase. They run on the frame the action executor already filled and
//! only differ in what happens after binding:
//!
//! - [`func`]: evaluate a body with a definitional `return`.
//! - [`adapt`]: run a prelude over the inputs, then redo as the adaptee.
//! - [`cascade`]: downshift into the first stage, feed each result to the
//!   next.
//! - [`hijack`]: make an existing identity run something else.
//! - [`macros`]: splice the body's result into the caller's feed.
//! - [`combinator`]: a func that records how far into its input it got.

pub mod adapt;
pub mod cascade;
pub mod combinator;
pub mod func;
pub mod hijack;
pub mod macros;

use std::rc::Rc;

use crate::bounce::{Bounce, Label};
use crate::cell::{Element, ListKind, Value};
use crate::error::{Error, ErrorKind};
use crate::feed::Feed;
use crate::interpreter::Interpreter;
use crate::level::{Level, LevelFlags, LevelId};
use crate::phase::spec::parse_spec;
use crate::phase::{Param, ParamClass, ParamList};

/// Parse a spec block and add the definitional `return` local.
pub(crate) fn body_params(
    interp: &mut Interpreter,
    spec: Element,
    leading: Option<Param>,
) -> Result<Rc<ParamList>, Error> {
    let Some((series, index)) = spec.as_list(ListKind::Block) else {
        return Err(ErrorKind::BadSpec("spec must be a block".into()).into());
    };
    let mut params = parse_spec(&interp.heap, &interp.symbols, series, index)?;
    if let Some(leading) = leading {
        if params.index_of(leading.symbol).is_some() {
            let name = interp.spelling(leading.symbol);
            return Err(ErrorKind::BadSpec(format!("{} is implicit", name).into()).into());
        }
        params.params.insert(0, leading);
    }
    let ret = interp.intern("return");
    if params.index_of(ret).is_none() {
        params.params.push(Param::new(ret, ParamClass::Local));
    }
    Ok(Rc::new(params))
}

/// Bind the frame under the body in `aux[0]`, arm `return` and start
/// evaluating the body into `out`.
pub(crate) fn enter_body(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let frame = interp.frame(id);
    let (phase, varlist) = (frame.phase, frame.varlist);
    let details = interp.details(phase);
    let body = details.aux[0];
    let params = details.params.clone();
    let Some((series, index)) = body.as_list(ListKind::Block) else {
        crate::error::crash("body is not a block");
    };

    let frame_vars = interp.heap.varlist_mut(varlist);
    frame_vars.parent = body.binding();

    let ret = interp.intern("return");
    if let (Some(slot), Some(phase)) = (params.index_of(ret), interp.return_phase) {
        if params.params[slot].class == ParamClass::Local {
            interp.set_arg(id, slot, Value::action(phase, Some(varlist), false));
        }
    }

    let level = &mut interp.levels[id];
    level.flags.insert(LevelFlags::CATCHES);
    level.frame_mut().state = 1;
    Ok(Bounce::push(Level::evaluator(Feed::array(
        series,
        index,
        Some(varlist),
    ))))
}

/// On re-entry with a throw in flight: take a return aimed at this frame
/// (its value goes to `out`), or hand back the rethrow.
pub(crate) fn catch_return(interp: &mut Interpreter, id: LevelId) -> Option<Bounce> {
    let label = interp.thrown_label()?;
    let varlist = interp.frame(id).varlist;
    let thrown = interp.take_thrown();
    if label != Label::Return(varlist) {
        return Some(Bounce::Thrown(thrown));
    }
    let level = &mut interp.levels[id];
    level.flags.remove(LevelFlags::CATCHES);
    level.out = thrown.arg;
    None
}

/// The action in a phase's `aux[n]`.
pub(crate) fn aux_action(interp: &Interpreter, id: LevelId, n: usize) -> Value {
    let phase = interp.frame(id).phase;
    let action = interp.details(phase).aux[n];
    if !action.is_action() {
        crate::error::crash("aux cell is not an action");
    }
    action
}
