//! Public API for embedding tumble.
//!
//! An [`Engine`] owns one interpreter. Hosts register constants and
//! natives through an [`EnvironmentBuilder`] when creating it, then read
//! and evaluate source, call actions by name, and hold results as
//! [`Handle`]s that survive garbage collection.
//!
//! # Example
//!
//! ```
//! use tumble_core::api::{Engine, EngineOptions, Error};
//!
//! let mut engine = Engine::new(EngineOptions::default(), |_| {}).unwrap();
//! let result = engine.eval_str("f: func [n] [n * 2] f 21").unwrap();
//! assert_eq!(engine.mold(&result), "42");
//!
//! let failed = engine.eval_str("fail \"no\"");
//! assert!(matches!(failed, Err(Error::Failed(_))));
//! ```

pub mod engine;
pub mod environment;
pub mod error;
pub mod handle;
pub mod options;

pub use engine::{CancelHandle, Engine};
pub use environment::EnvironmentBuilder;
pub use error::Error;
pub use handle::Handle;
pub use options::{EngineOptions, ExecutionOptions, StepperPath};
