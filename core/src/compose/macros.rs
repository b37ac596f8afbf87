//! Macros: code spliced into the caller's feed.
//!
//! A macro's body runs like a function body, but its result is not the
//! call's value. A block result is spliced as its contents, a quoted
//! result as the one element it quotes, any other element as itself. The
//! call then delegates to a stepper over the caller's feed, so the spliced
//! code is evaluated exactly as if it had been written at the call site.

use super::{body_params, catch_return, enter_body};
use crate::bounce::Bounce;
use crate::cell::{Atom, Element, ListKind, Payload, Value};
use crate::error::{Error, ErrorKind};
use crate::interpreter::Interpreter;
use crate::level::{Level, LevelId};
use crate::phase::{Details, Dispatcher};

pub fn make(interp: &mut Interpreter, spec: Element, body: Element) -> Result<Value, Error> {
    if body.as_list(ListKind::Block).is_none() {
        return Err(ErrorKind::invalid("macro body must be a block").into());
    }
    let params = body_params(interp, spec, None)?;
    let details = Details::new(params, Dispatcher::Macro).with_aux(&[body.into()]);
    let phase = interp.make_phase(details);
    Ok(Value::action(phase, None, false))
}

pub(crate) fn dispatch(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    if interp.frame(id).state == 0 {
        return enter_body(interp, id);
    }
    if let Some(rethrow) = catch_return(interp, id) {
        return Ok(rethrow);
    }

    let result = interp.levels[id].out;
    let items = splice_items(interp, result)?;
    if items.is_empty() {
        interp.levels[id].out = Atom::ghost();
        return Ok(Bounce::Out);
    }
    tracing::trace!(level = id, count = items.len(), "macro splice");
    let feed = interp.feed(id);
    feed.borrow_mut().splice(items);
    Ok(Bounce::delegate(Level::stepper(feed)))
}

fn splice_items(interp: &Interpreter, result: Atom) -> Result<Vec<Element>, Error> {
    if result.is_ghost() || interp.heap.is_void(&result) {
        return Ok(Vec::new());
    }
    if let Some(error) = interp.error_of(&result) {
        return Err(error);
    }
    let Some(element) = result.as_element() else {
        return Err(Error::new(ErrorKind::invalid("macro must produce a block or an element"))
            .near(interp.mold(&result)));
    };
    if let Some(unquoted) = element.unquote() {
        return Ok(vec![unquoted]);
    }
    match element.payload() {
        Payload::List {
            kind: ListKind::Block,
            series,
            index,
            binding,
        } if element.is_plain() => Ok(interp
            .heap
            .array(series)
            .iter()
            .skip(index as usize)
            .map(|item| item.bound(binding))
            .collect()),
        _ => Ok(vec![element]),
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::eval;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_block_result_is_spliced() {
        assert_eq!(eval("m: macro [] [[add 1]] m 2"), "3");
    }

    #[test]
    fn test_spliced_code_takes_lookahead() {
        assert_eq!(eval("m: macro [] [[10]] m + 5"), "15");
    }

    #[test]
    fn test_quoted_result_splices_one_element() {
        assert_eq!(eval("m: macro [] [quote [1 2]] m"), "[1 2]");
    }

    #[test]
    fn test_macro_in_argument_position() {
        assert_eq!(eval("m: macro [] [[1 +]] negate m 4"), "-5");
    }

    #[test]
    fn test_empty_splice_is_invisible() {
        assert_eq!(eval("m: macro [] [[]] 1 m"), "1");
    }
}
