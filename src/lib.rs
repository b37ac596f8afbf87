//! tumble - an embeddable, non-recursive evaluator
//!
//! # Overview
//!
//! tumble evaluates a small block-structured language without ever
//! recursing on the host stack. Deeply nested code, runaway recursion and
//! cancellation all stay under the host's control:
//!
//! - Nesting depth is bounded by a configurable level limit
//! - Evaluation can be cancelled from another thread
//! - Evaluation can be run a few cycles at a time
//!
//! # Quick Start
//!
//! ```
//! use tumble::{Engine, EngineOptions, Value};
//!
//! let mut engine = Engine::new(EngineOptions::default(), |env| {
//!     env.register("limit", Value::integer(3));
//! })
//! .unwrap();
//!
//! let result = engine
//!     .eval_str("n: 0 while [n < limit] [n: n + 1] n")
//!     .unwrap();
//! assert_eq!(engine.mold(&result), "3");
//! ```
//!
//! # Host natives
//!
//! Natives receive the interpreter and may evaluate code themselves:
//!
//! ```
//! use tumble::{Engine, EngineOptions, Value};
//!
//! let mut engine = Engine::new(EngineOptions::default(), |env| {
//!     env.register_fn("square", "[n [integer!]]", |_, args| {
//!         let n = args[0].as_integer().unwrap_or(0);
//!         Ok(Value::integer(n * n))
//!     });
//! })
//! .unwrap();
//! let result = engine.eval_str("square 7").unwrap();
//! assert_eq!(engine.mold(&result), "49");
//! ```

mod error_renderer;

pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};

// Re-export public API from tumble_core
pub use tumble_core::api::{
    CancelHandle, Engine, EngineOptions, EnvironmentBuilder, Error, ExecutionOptions, Handle,
    StepperPath,
};

// Re-export commonly used types
pub use tumble_core::bounce::Bounce;
pub use tumble_core::cell::{Atom, Element, Value};
pub use tumble_core::interpreter::Interpreter;
pub use tumble_core::level::LevelId;
pub use tumble_core::reader::Span;
