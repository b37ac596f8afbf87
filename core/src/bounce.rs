//! What an executor tells the trampoline when it returns.

use crate::cell::{Atom, ContextId, PhaseId};
use crate::executors::Continuation;
use crate::level::Level;
use crate::symbol::Symbol;

/// Outcome of one executor invocation.
#[derive(Debug)]
pub enum Bounce {
    /// Finished; the result is in the level's `out`.
    Out,
    /// Run a child to completion, then resume this level.
    Continue(Child),
    /// The child's result is this level's result. This level is not
    /// resumed.
    Delegate(Box<Level>),
    /// Unwind until a level that catches the label.
    Thrown(Thrown),
    /// Re-run this level's frame as `phase` (or the same phase), from
    /// typechecking if `checked`, otherwise straight into dispatch.
    Redo {
        checked: bool,
        phase: Option<PhaseId>,
    },
    /// Move this level's frame into a new child dispatching `phase`; this
    /// level carries on as the `then` continuation.
    Downshift {
        phase: PhaseId,
        then: Continuation,
    },
}

#[derive(Debug)]
pub enum Child {
    Push(Box<Level>),
    /// Re-run the kept-alive level just above this one.
    Kept,
}

impl Bounce {
    pub fn push(level: Level) -> Bounce {
        Bounce::Continue(Child::Push(Box::new(level)))
    }

    pub fn delegate(level: Level) -> Bounce {
        Bounce::Delegate(Box::new(level))
    }

    pub fn kind(&self) -> BounceKind {
        match self {
            Bounce::Out => BounceKind::Out,
            Bounce::Continue(Child::Push(_)) => BounceKind::Push,
            Bounce::Continue(Child::Kept) => BounceKind::Kept,
            Bounce::Delegate(_) => BounceKind::Delegate,
            Bounce::Thrown(_) => BounceKind::Thrown,
            Bounce::Redo { .. } => BounceKind::Redo,
            Bounce::Downshift { .. } => BounceKind::Downshift,
        }
    }
}

/// Payload-free mirror of [`Bounce`] for observers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BounceKind {
    Out,
    Push,
    Kept,
    Delegate,
    Thrown,
    Redo,
    Downshift,
}

/// Name a throw is caught by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Label {
    /// `throw/name`.
    Name(Symbol),
    /// Plain `throw`.
    Plain,
    /// Definitional return to the frame with this varlist.
    Return(ContextId),
    Break,
    Continue,
    /// An error; the argument is the raised form.
    Failure,
    /// Cancellation.
    Halt,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thrown {
    pub label: Label,
    pub arg: Atom,
}

impl Thrown {
    pub fn new(label: Label, arg: impl Into<Atom>) -> Self {
        Self {
            label,
            arg: arg.into(),
        }
    }
}
