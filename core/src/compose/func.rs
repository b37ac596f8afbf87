//! Functions: a spec and a body.

use super::{body_params, catch_return, enter_body};
use crate::bounce::Bounce;
use crate::cell::{Element, Value};
use crate::error::{Error, ErrorKind};
use crate::interpreter::Interpreter;
use crate::level::LevelId;
use crate::phase::{Details, Dispatcher};

/// Build a function action from a spec block and a body block.
pub fn make(interp: &mut Interpreter, spec: Element, body: Element) -> Result<Value, Error> {
    if !body.is_plain() || body.kind() != crate::cell::Kind::Block {
        return Err(ErrorKind::invalid("function body must be a block").into());
    }
    let params = body_params(interp, spec, None)?;
    let details = Details::new(params, Dispatcher::Func).with_aux(&[body.into()]);
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
    let level = &mut interp.levels[id];
    if level.out.is_ghost() {
        level.out = Value::trash().into();
    }
    Ok(Bounce::Out)
}

#[cfg(test)]
mod tests {
    use crate::test_utils::eval;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_arguments_are_bound_in_body() {
        assert_eq!(eval("f: func [x y] [x - y] f 10 3"), "7");
    }

    #[test]
    fn test_return_leaves_early() {
        assert_eq!(eval("f: func [x] [if x > 1 [return 100] x] f 5"), "100");
        assert_eq!(eval("f: func [x] [if x > 1 [return 100] x] f 0"), "0");
    }

    #[test]
    fn test_return_contract_is_checked() {
        assert_eq!(
            eval("f: func [return: [integer!] x] [x] f \"no\""),
            "!! f returned text! (expected integer!)"
        );
    }

    #[test]
    fn test_invisible_body_gives_trash() {
        assert_eq!(eval("f: func [] [comment \"x\"] f"), "~");
    }

    #[test]
    fn test_recursion_uses_levels() {
        let source = "fact: func [n] [either n < 2 [1] [n * fact n - 1]] fact 10";
        assert_eq!(eval(source), "3628800");
    }
}
