//! Combinators: functions over an input series that remember the furthest
//! position any of them reached.
//!
//! A combinator is a func with an implicit leading `input [block!]`
//! parameter. It downshifts into that func and, when the func finishes,
//! inspects the result: a block positioned in the same series (or a pack
//! whose first item is one) counts as the remainder, and its index is
//! recorded against the input series. `furthest` reads the record back.
//! Results pass through untouched.

use super::body_params;
use crate::bounce::Bounce;
use crate::cell::{Element, ListKind, Payload, TypeSet, Value};
use crate::error::{Error, ErrorKind};
use crate::executors::Continuation;
use crate::heap::SeriesId;
use crate::interpreter::Interpreter;
use crate::level::LevelId;
use crate::phase::{Details, Dispatcher, Param, ParamClass};

pub fn make(interp: &mut Interpreter, spec: Element, body: Element) -> Result<Value, Error> {
    if body.as_list(ListKind::Block).is_none() {
        return Err(ErrorKind::invalid("combinator body must be a block").into());
    }
    let mut input = Param::new(interp.intern("input"), ParamClass::Normal);
    input.types = Some(TypeSet::BLOCK);
    let params = body_params(interp, spec, Some(input))?;

    let inner = Details::new(params.clone(), Dispatcher::Func).with_aux(&[body.into()]);
    let inner = interp.make_phase(inner);
    let details = Details::new(params, Dispatcher::Combinator)
        .with_aux(&[Value::action(inner, None, false)]);
    let phase = interp.make_phase(details);
    Ok(Value::action(phase, None, false))
}

pub(crate) fn dispatch(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    let Some((input, _)) = interp.arg(id, 0).as_list(ListKind::Block) else {
        crate::error::crash("combinator input was not typechecked");
    };
    let inner = super::aux_action(interp, id, 0);
    let Some((phase, _, _)) = inner.as_action() else {
        crate::error::crash("combinator without an inner function");
    };
    Ok(Bounce::Downshift {
        phase,
        then: Continuation::Combinator { input },
    })
}

/// The inner function finished; its result is in `out`.
pub(crate) fn resume(interp: &mut Interpreter, id: LevelId, input: SeriesId) -> Result<Bounce, Error> {
    let out = interp.levels[id].out;
    let remainder = match out.payload() {
        Payload::List { series, .. } if out.is_pack() => {
            interp.heap.array(series).first().and_then(|first| first.unlift())
        }
        _ => Some(out),
    };
    if let Some((series, index)) = remainder.and_then(|atom| atom.as_list(ListKind::Block)) {
        if series == input {
            let furthest = interp.furthest.entry(input).or_insert(0);
            *furthest = (*furthest).max(index);
        }
    }
    Ok(Bounce::Out)
}

/// Block at the furthest position recorded for `input`, if any.
pub fn furthest(interp: &Interpreter, input: SeriesId) -> Option<Element> {
    let index = *interp.furthest.get(&input)?;
    Some(Element::list_at(ListKind::Block, input, index))
}

#[cfg(test)]
mod tests {
    use crate::test_utils::eval;
    use pretty_assertions::assert_eq;

    const DIGIT: &str = "digit: combinator [want [integer!]] [
            either equal? first input want [next input] [null]
        ] ";

    #[test]
    fn test_result_passes_through() {
        let source = format!("{}digit [1 2 3] 1", DIGIT);
        assert_eq!(eval(&source), "[2 3]");
    }

    #[test]
    fn test_furthest_tracks_maximum() {
        let source = format!(
            "{}data: [1 2 3] rest: digit data 1 digit rest 2 digit data 1 furthest data",
            DIGIT
        );
        assert_eq!(eval(&source), "[3]");
    }

    #[test]
    fn test_furthest_is_null_without_progress() {
        let source = format!("{}data: [1 2] digit data 5 furthest data", DIGIT);
        assert_eq!(eval(&source), "~null~");
    }
}
