//! Cascades: actions run in sequence, each result feeding the next.
//!
//! The cascade takes the first stage's parameters. Dispatch downshifts the
//! filled frame into a child running the first stage; this level becomes a
//! pipeline continuation that calls each later stage with the previous
//! result as its only argument.

use crate::bounce::Bounce;
use crate::cell::{Element, ListKind, Sigil, Value};
use crate::error::{Error, ErrorKind};
use crate::executors::{Continuation, Executor};
use crate::feed::Feed;
use crate::heap::SeriesId;
use crate::interpreter::{Interpreter, lift};
use crate::level::LevelId;
use crate::phase::{Details, Dispatcher};

/// Build a cascade from a block of actions, or of words naming actions.
pub fn make(interp: &mut Interpreter, stages: Element) -> Result<Value, Error> {
    let Some((series, index)) = stages.as_list(ListKind::Block) else {
        return Err(ErrorKind::invalid("cascade needs a block of actions").into());
    };
    let items: Vec<Element> = interp
        .heap
        .array(series)
        .get(index as usize..)
        .unwrap_or(&[])
        .to_vec();
    let mut lifted = Vec::with_capacity(items.len());
    for item in items {
        let action = match item.as_word(Sigil::Plain).or_else(|| item.as_word(Sigil::Get)) {
            Some(symbol) => Some(interp.get_var(symbol, item.binding().or(stages.binding()))?),
            None => item.unlift().and_then(|atom| atom.as_value()),
        };
        let Some(action) = action.filter(|action| action.is_action()) else {
            return Err(Error::new(ErrorKind::NotAction(interp.mold(&item).into())));
        };
        lifted.push(lift(action.into())?);
    }
    let Some(first) = lifted.first().and_then(|first| first.unlift()) else {
        return Err(ErrorKind::invalid("cascade needs at least one stage").into());
    };
    let Some((first, _, _)) = first.as_action() else {
        crate::error::crash("stage is not an action");
    };
    let params = interp.details(first).params.clone();
    let stages = interp.heap.alloc_array(&lifted);
    interp.heap.freeze(stages);
    let details = Details::new(params, Dispatcher::Cascader)
        .with_aux(&[Element::list(ListKind::Block, stages).into()]);
    let phase = interp.make_phase(details);
    Ok(Value::action(phase, None, false))
}

fn stage(interp: &Interpreter, stages: SeriesId, n: u32) -> Option<Value> {
    let element = interp.heap.array(stages).get(n as usize)?;
    element.unlift().and_then(|atom| atom.as_value())
}

pub(crate) fn dispatch(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let phase = interp.frame(id).phase;
    let Some((stages, _)) = interp.details(phase).aux[0].as_list(ListKind::Block) else {
        crate::error::crash("cascade without stages");
    };
    let Some((first, coupling, _)) = stage(interp, stages, 0).and_then(|s| s.as_action()) else {
        crate::error::crash("cascade without a first stage");
    };
    interp.frame_mut(id).coupling = coupling;
    Ok(Bounce::Downshift {
        phase: first,
        then: Continuation::Pipeline { stages, next: 1 },
    })
}

/// Pipeline continuation: the previous stage's result is in `out`.
pub(crate) fn resume(
    interp: &mut Interpreter,
    id: LevelId,
    stages: SeriesId,
    next: u32,
) -> Result<Bounce, Error> {
    let out = interp.levels[id].out;
    let Some(action) = stage(interp, stages, next) else {
        return Ok(Bounce::Out);
    };
    if out.is_raised() {
        return Ok(Bounce::Out);
    }
    let Some((phase, coupling, _)) = action.as_action() else {
        crate::error::crash("stage is not an action");
    };
    tracing::trace!(level = id, stage = next, "pipeline stage");
    let feed = Feed::variadic([lift(out)?], Some(interp.user));
    let label = interp.details(phase).name;
    let child = interp.action_level(feed, phase, coupling, label);
    interp.levels[id].executor = Executor::Continuation(Continuation::Pipeline {
        stages,
        next: next + 1,
    });
    Ok(Bounce::push(child))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::eval;
    use pretty_assertions::assert_eq;

    const STAGES: &str = "double: func [x] [x * 2] increment: func [x] [x + 1] ";

    #[test]
    fn test_stages_run_in_order() {
        let source = format!("{}p: cascade [double increment negate] p 5", STAGES);
        assert_eq!(eval(&source), "-11");
    }

    #[test]
    fn test_first_stage_takes_the_arguments() {
        let source = format!("{}p: cascade [:add double] p 3 4", STAGES);
        assert_eq!(eval(&source), "14");
    }

    #[test]
    fn test_single_stage() {
        assert_eq!(eval("p: cascade [negate] p 2"), "-2");
    }

    #[test]
    fn test_rejects_non_actions() {
        assert_eq!(eval("cascade [1]"), "!! 1 is not an action");
    }
}
