//! Interpreter state.
//!
//! Everything an evaluation touches hangs off [`Interpreter`]: the heap,
//! the symbol table, the level stack, the `lib` and `user` contexts, the
//! throw in flight and the cancellation flag. Executors and natives get
//! `&mut Interpreter` plus the id of their level and reach everything from
//! there; nothing is global.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use ecow::EcoString;
use hashbrown::HashMap;

use crate::api::ExecutionOptions;
use crate::api::handle::RootTable;
use crate::bounce::{Label, Thrown};
use crate::cell::{Atom, Binding, ContextId, Element, ListKind, Payload, PhaseId, Value};
use crate::context::{self, Varlist};
use crate::error::{Error, ErrorKind, crash};
use crate::feed::{Feed, FeedRef};
use crate::heap::{Heap, SeriesId, Stub};
use crate::level::{Frame, Level, LevelId, LevelStack};
use crate::natives;
use crate::phase::spec::parse_spec;
use crate::phase::{Details, Dispatcher, NativeFn};
use crate::reader::{self, LoadError, Loaded};
use crate::symbol::{Symbol, SymbolTable};
use crate::trampoline::{Observer, RunState, Stats};

pub struct Interpreter {
    pub heap: Heap,
    pub symbols: SymbolTable,
    pub(crate) levels: LevelStack,
    /// Natives and the prelude.
    pub lib: ContextId,
    /// Top-level code; its parent is `lib`.
    pub user: ContextId,
    pub(crate) thrown: Option<Thrown>,
    pub(crate) options: ExecutionOptions,
    pub(crate) observer: Option<Box<dyn Observer>>,
    pub(crate) stats: Stats,
    pub(crate) tick: u64,
    pub(crate) cancel: Arc<AtomicBool>,
    pub(crate) roots: Rc<RefCell<RootTable>>,
    /// Furthest index a combinator reached, per input series.
    pub(crate) furthest: HashMap<SeriesId, u32>,
    pub(crate) run_depth: usize,
    pub(crate) pending: Option<RunState>,
    /// Phase of the definitional return native.
    pub(crate) return_phase: Option<PhaseId>,
    /// Feed position of the outermost level when the last throw escaped.
    pub(crate) escape_position: Option<u32>,
}

impl Interpreter {
    /// Create an interpreter with the native library registered.
    pub fn new(options: ExecutionOptions) -> Self {
        let mut heap = Heap::new();
        let lib = heap.alloc_managed(Stub::Varlist(Varlist::module(None)));
        let user = heap.alloc_managed(Stub::Varlist(Varlist::module(Some(lib))));
        let mut interp = Self {
            heap,
            symbols: SymbolTable::new(),
            levels: LevelStack::new(options.max_depth),
            lib,
            user,
            thrown: None,
            options,
            observer: None,
            stats: Stats::default(),
            tick: 0,
            cancel: Arc::new(AtomicBool::new(false)),
            roots: Rc::new(RefCell::new(RootTable::default())),
            furthest: HashMap::new(),
            run_depth: 0,
            pending: None,
            return_phase: None,
            escape_position: None,
        };
        natives::register(&mut interp);
        interp
    }

    /// Run the prelude that defines the infix operators.
    pub fn boot(&mut self) -> Result<(), Error> {
        let loaded = self
            .load(natives::PRELUDE)
            .unwrap_or_else(|error| crash(format_args!("prelude does not load: {}", error)));
        self.eval_block(loaded.block, 0, Some(self.lib))
            .map(|_| ())
            .map_err(|thrown| self.thrown_to_error(&thrown))
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ExecutionOptions) {
        self.levels.set_capacity(options.max_depth);
        self.options = options;
    }

    pub fn intern(&mut self, name: &str) -> Symbol {
        self.symbols.intern(name)
    }

    pub fn spelling(&self, symbol: Symbol) -> EcoString {
        self.symbols.spelling(symbol)
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn level(&self, id: LevelId) -> &Level {
        &self.levels[id]
    }

    pub fn level_mut(&mut self, id: LevelId) -> &mut Level {
        &mut self.levels[id]
    }

    pub fn feed(&self, id: LevelId) -> FeedRef {
        self.levels[id].feed.clone()
    }

    /// Whether the level's feed has nothing left.
    pub fn at_end(&self, id: LevelId) -> bool {
        self.levels[id].feed.borrow().at_end(&self.heap)
    }

    pub fn frame(&self, id: LevelId) -> &Frame {
        self.levels[id].frame()
    }

    pub fn frame_mut(&mut self, id: LevelId) -> &mut Frame {
        self.levels[id].frame_mut()
    }

    /// Argument `n` of the action running in level `id`.
    pub fn arg(&self, id: LevelId, n: usize) -> Value {
        self.heap.varlist(self.frame(id).varlist).vars[n]
    }

    pub fn set_arg(&mut self, id: LevelId, n: usize, value: Value) {
        let varlist = self.frame(id).varlist;
        self.heap.varlist_mut(varlist).vars[n] = value;
    }

    pub fn details(&self, phase: PhaseId) -> &Details {
        self.heap.details(phase)
    }

    /// Name to report for the action running in level `id`.
    pub fn action_name(&self, id: LevelId) -> EcoString {
        let level = &self.levels[id];
        let symbol = level
            .label
            .or_else(|| level.frame.as_ref().and_then(|f| self.heap.details(f.phase).name));
        match symbol {
            Some(symbol) => self.spelling(symbol),
            None => "anonymous".into(),
        }
    }

    pub fn decay(&self, atom: Atom) -> Result<Value, Error> {
        self.heap.decay(atom)
    }

    /// Lookup falls back to `user` for unbound words.
    pub fn get_var(&self, symbol: Symbol, binding: Binding) -> Result<Value, Error> {
        match context::lookup(&self.heap, symbol, binding.or(Some(self.user))) {
            Some((context, slot)) => Ok(self.heap.varlist(context).vars[slot]),
            None => Err(ErrorKind::Unbound {
                word: self.spelling(symbol),
            }
            .into()),
        }
    }

    pub fn set_var(&mut self, symbol: Symbol, binding: Binding, value: Value) {
        match context::resolve_for_set(&self.heap, symbol, binding.or(Some(self.user))) {
            Some((context, Some(slot))) => self.heap.varlist_mut(context).vars[slot] = value,
            Some((context, None)) => {
                self.heap.varlist_mut(context).define(symbol, value);
            }
            None => {
                self.heap.varlist_mut(self.user).define(symbol, value);
            }
        }
    }

    pub fn define_lib(&mut self, name: &str, value: Value) {
        let symbol = self.intern(name);
        self.heap.varlist_mut(self.lib).define(symbol, value);
    }

    pub fn make_text(&mut self, text: impl Into<String>) -> Element {
        Element::text(self.heap.alloc_text(text))
    }

    pub fn make_block(&mut self, items: &[Element]) -> Element {
        Element::list(ListKind::Block, self.heap.alloc_array(items))
    }

    pub fn make_pack(&mut self, atoms: &[Atom]) -> Result<Atom, Error> {
        let mut items = Vec::with_capacity(atoms.len());
        for atom in atoms {
            items.push(lift(*atom)?);
        }
        Ok(Atom::pack(self.heap.alloc_array(&items)))
    }

    /// Raised (antiform) form of `error`.
    pub fn raise(&mut self, error: Error) -> Atom {
        Atom::raised(self.heap.alloc_error(error))
    }

    pub fn make_phase(&mut self, details: Details) -> PhaseId {
        self.heap.alloc_managed(Stub::Details(details))
    }

    /// Build a native action from a spec written in the parameter dialect.
    pub fn make_native(
        &mut self,
        name: &str,
        spec: &str,
        dispatcher: NativeFn,
    ) -> Result<Value, Error> {
        let loaded = self.load(spec).map_err(|error| {
            Error::new(ErrorKind::BadSpec(error.message.into())).near(name)
        })?;
        let spec_block = match self.heap.array(loaded.block) {
            [only] => only.as_list(ListKind::Block),
            _ => None,
        };
        let Some((series, index)) = spec_block else {
            return Err(Error::new(ErrorKind::BadSpec("spec must be one block".into())).near(name));
        };
        let params = parse_spec(&self.heap, &self.symbols, series, index)?;
        let mut details = Details::new(Rc::new(params), Dispatcher::Native(dispatcher));
        details.name = Some(self.intern(name));
        let phase = self.make_phase(details);
        Ok(Value::action(phase, None, false))
    }

    /// Level that gathers arguments for `phase` from `feed`.
    pub fn action_level(
        &mut self,
        feed: FeedRef,
        phase: PhaseId,
        coupling: Binding,
        label: Option<Symbol>,
    ) -> Level {
        let params = self.heap.details(phase).params.clone();
        let varlist = self
            .heap
            .alloc_managed(Stub::Varlist(Varlist::frame(params)));
        Level::action(feed, Frame::new(phase, varlist, coupling), label)
    }

    pub fn read(&mut self, source: &str) -> Result<Loaded, LoadError> {
        reader::read(&mut self.heap, &mut self.symbols, source)
    }

    /// Read `source`; the resulting block is managed.
    pub fn load(&mut self, source: &str) -> Result<Loaded, LoadError> {
        self.read(source)
    }

    /// Evaluate a block to its last visible result, re-entering the
    /// trampoline. Safe to call from a running native. Unbound blocks
    /// evaluate in `user`.
    pub fn eval_block(
        &mut self,
        series: SeriesId,
        index: u32,
        binding: Binding,
    ) -> Result<Atom, Thrown> {
        let feed = Feed::array(series, index, binding.or(Some(self.user)));
        self.run(Level::evaluator(feed))
    }

    /// Call `action` with already-evaluated arguments.
    ///
    /// Arguments travel lifted through a variadic feed, so each evaluates
    /// back to exactly the value given.
    pub fn call(&mut self, action: Value, args: &[Value]) -> Result<Atom, Thrown> {
        let Some((phase, coupling, _)) = action.as_action() else {
            let error = ErrorKind::NotAction(self.mold(&action).into());
            return Err(self.fail_thrown(error.into()));
        };
        let mut items = Vec::with_capacity(args.len());
        for arg in args {
            items.push(lift(Atom::from(*arg)).map_err(|e| self.fail_thrown(e))?);
        }
        let feed = Feed::variadic(items, Some(self.user));
        let label = self.heap.details(phase).name;
        let level = self.action_level(feed, phase, coupling, label);
        self.run(level)
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn set_observer(&mut self, observer: Option<Box<dyn Observer>>) {
        self.observer = observer;
    }

    pub fn has_observer(&self) -> bool {
        self.observer.is_some()
    }

    /// Number of levels currently on the stack.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn is_throwing(&self) -> bool {
        self.thrown.is_some()
    }

    pub fn thrown_label(&self) -> Option<Label> {
        self.thrown.map(|thrown| thrown.label)
    }

    /// Take the throw being unwound, for a catching level to consume or
    /// rethrow.
    pub fn take_thrown(&mut self) -> Thrown {
        self.thrown
            .take()
            .unwrap_or_else(|| crash("no throw in flight"))
    }

    /// Turn an error into a failure throw.
    pub fn fail_thrown(&mut self, mut error: Error) -> Thrown {
        if error.tick == 0 {
            error.tick = self.tick;
        }
        tracing::debug!(%error, "failure");
        Thrown::new(Label::Failure, self.raise(error))
    }

    /// The error inside a raised atom.
    pub fn error_of(&self, atom: &Atom) -> Option<Error> {
        match atom.payload() {
            Payload::Error(id) if atom.is_raised() => Some(self.heap.error(id).clone()),
            _ => None,
        }
    }

    /// The error a failure throw carries.
    pub fn failure_of(&self, thrown: &Thrown) -> Option<&Error> {
        match (thrown.label, thrown.arg.payload()) {
            (Label::Failure, Payload::Error(id)) => Some(self.heap.error(id)),
            _ => None,
        }
    }

    /// Describe any throw as an error, for host callers.
    pub fn thrown_to_error(&self, thrown: &Thrown) -> Error {
        if let Some(error) = self.failure_of(thrown) {
            return error.clone();
        }
        let what = match thrown.label {
            Label::Name(symbol) => format!("throw/name {}", self.spelling(symbol)),
            Label::Plain => "throw".to_string(),
            Label::Return(_) => "return".to_string(),
            Label::Break => "break".to_string(),
            Label::Continue => "continue".to_string(),
            Label::Halt => "halt".to_string(),
            Label::Failure => "failure".to_string(),
        };
        ErrorKind::invalid(format!("no catch for {}", what)).into()
    }
}

/// Lift for storage, failing only past the deepest quote level.
pub(crate) fn lift(atom: Atom) -> Result<Element, Error> {
    atom.lift()
        .ok_or_else(|| ErrorKind::invalid("too many quote levels").into())
}
