//! tumble: a non-recursive evaluator.
//!
//! Evaluation runs on an explicit stack of [`level::Level`]s driven by the
//! [`trampoline`]. Each level's executor is a state machine that returns a
//! [`bounce::Bounce`] telling the trampoline what to do next, so nesting in
//! the evaluated program never becomes nesting on the host stack.
//!
//! Hosts normally go through [`api::Engine`].

pub mod api;
pub mod bounce;
pub mod cell;
pub mod compose;
pub mod context;
pub mod error;
pub mod executors;
pub mod feed;
pub mod heap;
pub mod interpreter;
pub mod level;
pub mod mold;
pub mod natives;
pub mod phase;
pub mod reader;
pub mod symbol;
pub mod trampoline;

pub use api::{Engine, EngineOptions, ExecutionOptions, Handle};
pub use interpreter::Interpreter;
