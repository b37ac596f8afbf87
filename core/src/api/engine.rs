//! The tumble engine.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{EngineOptions, EnvironmentBuilder, Error, Handle};
use crate::cell::{Atom, Element, ListKind, Value};
use crate::interpreter::Interpreter;
use crate::reader::Span;

/// An interpreter plus the host-facing conveniences around it.
///
/// Results come back as [`Handle`]s, which keep their cell alive across
/// garbage collections until dropped.
///
/// # Example
///
/// ```
/// use tumble_core::api::{Engine, EngineOptions};
///
/// let mut engine = Engine::new(EngineOptions::default(), |_| {}).unwrap();
/// let result = engine.eval_str("x: 20 x + 22").unwrap();
/// assert_eq!(engine.mold(&result), "42");
/// ```
pub struct Engine {
    interp: Interpreter,
    options: EngineOptions,
    /// Spans of the program most recently read by `eval_str`.
    spans: Vec<Span>,
}

impl Engine {
    /// Create an engine, letting `init` add host constants and natives to
    /// `lib`.
    pub fn new(
        options: EngineOptions,
        init: impl FnOnce(&mut EnvironmentBuilder<'_>),
    ) -> Result<Self, Error> {
        let mut interp = Interpreter::new(options.execution.clone());
        if options.boot {
            interp.boot().map_err(Error::Failed)?;
        }
        let mut env = EnvironmentBuilder::new(&mut interp);
        init(&mut env);
        env.finish()?;
        Ok(Self {
            interp,
            options,
            spans: Vec::new(),
        })
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interp
    }

    pub fn interpreter_mut(&mut self) -> &mut Interpreter {
        &mut self.interp
    }

    /// Root `atom` for the host.
    pub fn retain(&self, atom: impl Into<Atom>) -> Handle {
        Handle::new(&self.interp.roots, atom.into())
    }

    /// Read `source` into a block, without evaluating it.
    pub fn load(&mut self, source: &str) -> Result<Handle, Error> {
        let loaded = self.interp.load(source)?;
        self.spans = loaded.spans;
        Ok(self.retain(Element::list(ListKind::Block, loaded.block)))
    }

    /// Evaluate a loaded block. A raised error as the last result comes
    /// back as data in the handle.
    pub fn eval(&mut self, program: &Handle) -> Result<Handle, Error> {
        let Some((series, index)) = program.atom().as_list(ListKind::Block) else {
            return Err(Error::Api(format!(
                "cannot evaluate {}",
                self.interp.mold(&program.atom())
            )));
        };
        self.interp.escape_position = None;
        match self.interp.eval_block(series, index, None) {
            Ok(result) => Ok(self.retain(result)),
            Err(thrown) => Err(Error::from_thrown(&self.interp, &thrown)),
        }
    }

    pub fn eval_str(&mut self, source: &str) -> Result<Handle, Error> {
        let program = self.load(source)?;
        self.eval(&program)
    }

    /// Call the action bound to `name` with host values.
    pub fn call(&mut self, name: &str, args: &[Value]) -> Result<Handle, Error> {
        let symbol = self.interp.intern(name);
        let action = self
            .interp
            .get_var(symbol, Some(self.interp.user))
            .map_err(|error| Error::Api(error.to_string()))?;
        if !action.is_action() {
            return Err(Error::Api(format!("{} is not an action", name)));
        }
        match self.interp.call(action, args) {
            Ok(result) => Ok(self.retain(result)),
            Err(thrown) => Err(Error::from_thrown(&self.interp, &thrown)),
        }
    }

    /// Source span of the top-level item the last failure escaped from.
    pub fn failure_span(&self) -> Option<Span> {
        let position = self.interp.escape_position?;
        self.spans.get(position.checked_sub(1)? as usize).cloned()
    }

    /// Force a collection; returns how many series were freed.
    pub fn collect_garbage(&mut self) -> usize {
        self.interp.collect_garbage()
    }

    /// A handle that can cancel the running evaluation from elsewhere,
    /// including another thread.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            flag: self.interp.cancel_flag(),
        }
    }

    pub fn mold(&self, handle: &Handle) -> String {
        self.interp.mold(&handle.atom())
    }
}

/// Requests a halt; the trampoline notices before its next cycle.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }
}
