//! Phases: what an action *is*.
//!
//! A phase is a [`Details`] series: a parameter list, a [`Dispatcher`]
//! saying how to run once the arguments are gathered, and a couple of
//! auxiliary cells whose meaning depends on the dispatcher (a body block,
//! a wrapped action, a stage list). Composition builds new phases that
//! share an existing parameter list through the same `Rc`, which is also
//! how "derived from" is decided.

pub mod spec;

use core::fmt;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::bounce::Bounce;
use crate::cell::{TypeSet, Value};
use crate::error::Error;
use crate::interpreter::Interpreter;
use crate::level::LevelId;
use crate::symbol::Symbol;

/// How an argument is gathered from the feed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamClass {
    /// `name`: evaluate one expression, decayed to a stable value.
    Normal,
    /// `'name`: next element verbatim, binding untouched.
    Just,
    /// `@name`: next element, bound to the call site.
    The,
    /// `:name`: like `@name`, but a group is evaluated.
    Soft,
    /// `^name`: evaluate, keep unstable results, store lifted.
    Meta,
    /// Not passed; starts null.
    Local,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub symbol: Symbol,
    pub class: ParamClass,
    /// Accepted types. `None` accepts any value.
    pub types: Option<TypeSet>,
    pub refinement: bool,
    /// May be missing at the end of input; receives null.
    pub endable: bool,
}

impl Param {
    pub fn new(symbol: Symbol, class: ParamClass) -> Self {
        Self {
            symbol,
            class,
            types: None,
            refinement: false,
            endable: false,
        }
    }

    /// A refinement without a type block is a presence flag.
    pub fn is_flag(&self) -> bool {
        self.refinement && self.types.is_none()
    }

    /// Filled from the feed when the action is called without refinements.
    pub fn is_positional(&self) -> bool {
        !self.refinement && self.class != ParamClass::Local
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamList {
    pub params: Vec<Param>,
    /// Return contract.
    pub returns: Option<TypeSet>,
}

impl ParamList {
    pub fn index_of(&self, symbol: Symbol) -> Option<usize> {
        self.params.iter().position(|param| param.symbol == symbol)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Signature of a native dispatcher.
///
/// Called with the level whose frame holds the gathered arguments. A
/// native writes its result to the level's `out` and returns
/// [`Bounce::Out`], or records a resumption state in the frame and asks
/// for a child level.
pub type NativeFn = Rc<dyn Fn(&mut Interpreter, LevelId) -> Result<Bounce, Error>>;

#[derive(Clone)]
pub enum Dispatcher {
    Native(NativeFn),
    /// Evaluate the body in `aux[0]` with a definitional return.
    Func,
    /// Run the prelude in `aux[0]` then redo as the action in `aux[1]`.
    Adapter,
    /// Run each action in the block `aux[0]`, feeding results forward.
    Cascader,
    /// Run as the action in `aux[0]`.
    Hijacker,
    /// Evaluate the body in `aux[0]` and splice the result into the feed.
    Macro,
    /// Run the inner func in `aux[0]`, recording how far input got.
    Combinator,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dispatcher::Native(_) => "Native",
            Dispatcher::Func => "Func",
            Dispatcher::Adapter => "Adapter",
            Dispatcher::Cascader => "Cascader",
            Dispatcher::Hijacker => "Hijacker",
            Dispatcher::Macro => "Macro",
            Dispatcher::Combinator => "Combinator",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug)]
pub struct Details {
    pub params: Rc<ParamList>,
    pub dispatcher: Dispatcher,
    pub aux: SmallVec<[Value; 2]>,
    pub name: Option<Symbol>,
}

impl Details {
    pub fn new(params: Rc<ParamList>, dispatcher: Dispatcher) -> Self {
        Self {
            params,
            dispatcher,
            aux: SmallVec::new(),
            name: None,
        }
    }

    pub fn with_aux(mut self, aux: &[Value]) -> Self {
        self.aux.extend_from_slice(aux);
        self
    }
}
