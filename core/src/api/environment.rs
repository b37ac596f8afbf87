//! Environment builder for registering host values and natives.

use std::rc::Rc;

use super::Error;
use crate::bounce::Bounce;
use crate::cell::{Atom, Value};
use crate::error;
use crate::interpreter::Interpreter;
use crate::level::LevelId;
use crate::phase::NativeFn;

/// Builder for the `lib` context an [`Engine`](super::Engine) starts with.
///
/// Registration problems are collected and reported by `Engine::new`.
///
/// # Example
///
/// ```
/// use tumble_core::api::{Engine, EngineOptions};
/// use tumble_core::cell::Value;
///
/// let mut engine = Engine::new(EngineOptions::default(), |env| {
///     env.register("answer", Value::integer(42));
///     env.register_fn("twice", "[n [integer!]]", |_, args| {
///         let n = args[0].as_integer().unwrap_or(0);
///         Ok(Value::integer(n * 2))
///     });
/// })
/// .unwrap();
/// let result = engine.eval_str("twice answer").unwrap();
/// assert_eq!(engine.mold(&result), "84");
/// ```
pub struct EnvironmentBuilder<'a> {
    interp: &'a mut Interpreter,
    errors: Vec<Error>,
}

impl<'a> EnvironmentBuilder<'a> {
    pub(crate) fn new(interp: &'a mut Interpreter) -> Self {
        Self {
            interp,
            errors: Vec::new(),
        }
    }

    /// Register a constant.
    pub fn register(&mut self, name: &str, value: Value) {
        self.interp.define_lib(name, value);
    }

    /// Register a native with the full dispatcher calling convention.
    ///
    /// The native finds its arguments with [`Interpreter::arg`], may
    /// re-enter the trampoline, and finishes by writing its level's `out`.
    pub fn register_native(
        &mut self,
        name: &str,
        spec: &str,
        native: impl Fn(&mut Interpreter, LevelId) -> Result<Bounce, error::Error> + 'static,
    ) {
        let dispatcher: NativeFn = Rc::new(native);
        match self.interp.make_native(name, spec, dispatcher) {
            Ok(action) => self.interp.define_lib(name, action),
            Err(error) => self
                .errors
                .push(Error::Api(format!("native {} does not build: {}", name, error))),
        }
    }

    /// Register a native that maps its arguments to one value.
    pub fn register_fn(
        &mut self,
        name: &str,
        spec: &str,
        function: impl Fn(&mut Interpreter, &[Value]) -> Result<Value, error::Error> + 'static,
    ) {
        self.register_native(name, spec, move |interp, id| {
            let varlist = interp.frame(id).varlist;
            let args = interp.heap.varlist(varlist).vars.clone();
            let result = function(interp, &args)?;
            interp.level_mut(id).out = Atom::from(result);
            Ok(Bounce::Out)
        });
    }

    /// Direct access, for setups the builder does not cover.
    pub fn interpreter(&mut self) -> &mut Interpreter {
        self.interp
    }

    pub(crate) fn finish(self) -> Result<(), Error> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
