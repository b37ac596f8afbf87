//! Runtime errors.
//!
//! # Error Categories
//!
//! - **Failures**: everything a script can provoke and `rescue` can
//!   intercept (type and arity errors, lookups, frozen or held series,
//!   explicit `fail`). Carried up the level stack as a thrown failure, or
//!   kept as a raised antiform until someone decays it.
//!
//! - **Resource exceeded**: the level stack hit its configured limit.
//!   Travels the same way but `rescue` lets it pass.
//!
//! Internal invariant violations are not errors at all; they go through
//! [`crash`].

use core::fmt;

use ecow::EcoString;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    #[error("{0}")]
    User(EcoString),

    #[error("{word} has no value")]
    NoValue { word: EcoString },

    #[error("{word} is not defined")]
    Unbound { word: EcoString },

    #[error("{action} is missing its {param} argument")]
    MissingArg { action: EcoString, param: EcoString },

    #[error("{action} does not allow {received} for its {param} argument (expected {expected})")]
    ArgType {
        action: EcoString,
        param: EcoString,
        expected: EcoString,
        received: EcoString,
    },

    #[error("{action} returned {received} (expected {expected})")]
    ReturnType {
        action: EcoString,
        expected: EcoString,
        received: EcoString,
    },

    #[error("{action} has no refinement /{refinement}")]
    UnknownRefinement {
        action: EcoString,
        refinement: EcoString,
    },

    #[error("{0} is not an action")]
    NotAction(EcoString),

    #[error("{0} cannot be used as an infix operator here")]
    NoLeftArgument(EcoString),

    #[error("{0} needs a value")]
    NeedValue(EcoString),

    #[error("void cannot be used as a value")]
    Void,

    #[error("series is frozen")]
    Frozen,

    #[error("series is held by an enumeration and cannot change length")]
    Held,

    #[error("integer overflow")]
    Overflow,

    #[error("index {index} is out of range")]
    OutOfRange { index: i64 },

    #[error("bad spec: {0}")]
    BadSpec(EcoString),

    #[error("{0}")]
    Invalid(EcoString),

    #[error("level stack overflow: more than {limit} levels")]
    StackOverflow { limit: usize },
}

impl ErrorKind {
    /// Resource-exceeded errors are not intercepted by `rescue`.
    pub fn is_resource(&self) -> bool {
        matches!(self, ErrorKind::StackOverflow { .. })
    }

    pub fn invalid(message: impl Into<EcoString>) -> Self {
        ErrorKind::Invalid(message.into())
    }
}

/// An [`ErrorKind`] plus where it happened.
#[derive(Clone, Debug, PartialEq)]
pub struct Error {
    pub kind: ErrorKind,
    /// Label of the action that was running, if any.
    pub where_: Option<EcoString>,
    /// Molded rendering of the offending value.
    pub near: Option<EcoString>,
    /// Trampoline tick at which the error was raised.
    pub tick: u64,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            where_: None,
            near: None,
            tick: 0,
        }
    }

    pub fn near(mut self, near: impl Into<EcoString>) -> Self {
        self.near = Some(near.into());
        self
    }

    pub fn is_resource(&self) -> bool {
        self.kind.is_resource()
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(where_) = &self.where_ {
            write!(f, " (in {})", where_)?;
        }
        if let Some(near) = &self.near {
            write!(f, "\n  near: {}", near)?;
        }
        if cfg!(debug_assertions) && self.tick > 0 {
            write!(f, "\n  tick: {}", self.tick)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

/// Abort on a broken internal invariant.
#[cold]
#[track_caller]
pub fn crash(message: impl fmt::Display) -> ! {
    tracing::error!(%message, "internal invariant violated");
    panic!("tumble crashed: {}", message)
}
