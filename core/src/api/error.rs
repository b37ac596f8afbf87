//! Public error types for the host API.
//!
//! Internal errors and escaped throws are converted to [`Error`] at the
//! [`Engine`](super::Engine) boundary.

use core::fmt;

use crate::bounce::{Label, Thrown};
use crate::error;
use crate::interpreter::Interpreter;
use crate::reader::LoadError;

#[derive(Debug)]
pub enum Error {
    /// Invalid API usage (unknown name, wrong kind of handle, bad spec).
    Api(String),

    /// The source could not be read.
    Load(LoadError),

    /// A failure escaped the evaluation.
    Failed(error::Error),

    /// A throw, `break` or `return` escaped with nothing to catch it.
    Uncaught(error::Error),

    /// The evaluation was cancelled.
    Halted,

    /// Resource limits exceeded (level stack overflow).
    ResourceExceeded(error::Error),
}

impl Error {
    /// Classify a throw that reached the top.
    pub fn from_thrown(interp: &Interpreter, thrown: &Thrown) -> Self {
        match thrown.label {
            Label::Halt => Error::Halted,
            Label::Failure => {
                let error = interp.thrown_to_error(thrown);
                if error.is_resource() {
                    Error::ResourceExceeded(error)
                } else {
                    Error::Failed(error)
                }
            }
            _ => Error::Uncaught(interp.thrown_to_error(thrown)),
        }
    }

    /// The runtime error behind this one, if any.
    pub fn runtime(&self) -> Option<&error::Error> {
        match self {
            Error::Failed(error) | Error::Uncaught(error) | Error::ResourceExceeded(error) => {
                Some(error)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Api(msg) => write!(f, "API error: {}", msg),
            Error::Load(error) => write!(f, "Load error: {}", error),
            Error::Failed(error) => write!(f, "Error: {}", error),
            Error::Uncaught(error) => write!(f, "Uncaught: {}", error),
            Error::Halted => write!(f, "Halted"),
            Error::ResourceExceeded(error) => write!(f, "Resource limit exceeded: {}", error),
        }
    }
}

impl std::error::Error for Error {}

impl From<LoadError> for Error {
    fn from(error: LoadError) -> Self {
        Error::Load(error)
    }
}
