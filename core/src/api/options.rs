//! Configuration options for the engine.

/// Which road the evaluator takes for each step.
///
/// Both produce the same results. `Inline` runs the stepper's states on the
/// evaluator's own level; `Sublevel` pushes a separate stepper level per
/// step, which an observer can watch. `Auto` picks `Sublevel` only while an
/// observer is attached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StepperPath {
    #[default]
    Auto,
    Inline,
    Sublevel,
}

/// Configuration options for evaluation.
///
/// These options control resource limits and runtime behavior.
///
/// # Example
///
/// ```
/// use tumble_core::api::{ExecutionOptions, StepperPath};
///
/// let options = ExecutionOptions {
///     max_depth: 256,
///     stepper: StepperPath::Sublevel,
///     ..ExecutionOptions::default()
/// };
/// assert_eq!(options.gc_interval, 4096);
/// ```
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Maximum number of levels on the stack.
    ///
    /// Default: 1024
    pub max_depth: usize,

    /// Managed allocations between cooperative garbage collections.
    ///
    /// Default: 4096
    pub gc_interval: usize,

    /// Default: [`StepperPath::Auto`]
    pub stepper: StepperPath,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            max_depth: 1024,
            gc_interval: 4096,
            stepper: StepperPath::Auto,
        }
    }
}

/// Configuration options for an [`Engine`](super::Engine).
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub execution: ExecutionOptions,

    /// Run the prelude that defines the infix operators (`+`, `<`, ...).
    ///
    /// Default: true
    pub boot: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            execution: ExecutionOptions::default(),
            boot: true,
        }
    }
}
