//! Executors: the resumable state machines levels run.
//!
//! Each executor is a function over `(interpreter, level)` that matches on
//! the state stored in the level's [`Executor`] value. Before asking for a
//! child it stores the state it wants to resume in; the trampoline
//! re-invokes it once the child's result has been written back.

pub mod action;
pub mod evaluator;
pub mod stepper;

use crate::bounce::Bounce;
use crate::compose;
use crate::error::Error;
use crate::heap::{Heap, SeriesId};
use crate::interpreter::Interpreter;
use crate::level::LevelId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Executor {
    Evaluator(EvaluatorState),
    Stepper(StepperState),
    Action(ActionState),
    Continuation(Continuation),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvaluatorState {
    Initial,
    /// Stepping in this level's own cells.
    Inline(StepperState),
    /// Stepping in a kept-alive child.
    Sublevel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepperState {
    Initial,
    /// The right-hand side of the set-word in `scratch` is ready.
    SetWordRhs,
    /// A value was produced by a child; look for an infix operator.
    Evaluated,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionState {
    Initial,
    Fulfilling,
    /// The argument stepper for the slot at `cursor` finished.
    ArgEvaluated,
    Typecheck,
    Dispatch,
    /// A delegated result must be checked against the return contract.
    CheckReturn,
}

/// What a level runs after it downshifted its frame into a child.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Continuation {
    /// Run the action at `next` in the block `stages` on the result.
    Pipeline { stages: SeriesId, next: u32 },
    /// Record how far the combinator got into `input`.
    Combinator { input: SeriesId },
}

impl Executor {
    pub fn name(&self) -> &'static str {
        match self {
            Executor::Evaluator(_) => "evaluator",
            Executor::Stepper(_) => "stepper",
            Executor::Action(_) => "action",
            Executor::Continuation(Continuation::Pipeline { .. }) => "pipeline",
            Executor::Continuation(Continuation::Combinator { .. }) => "combinator",
        }
    }

    pub(crate) fn mark(&self, heap: &mut Heap) {
        match self {
            Executor::Continuation(Continuation::Pipeline { stages, .. }) => heap.mark(*stages),
            Executor::Continuation(Continuation::Combinator { input }) => heap.mark(*input),
            _ => {}
        }
    }
}

/// Run one step of the level's executor.
pub(crate) fn invoke(interp: &mut Interpreter, id: LevelId) -> Result<Bounce, Error> {
    match interp.levels[id].executor {
        Executor::Evaluator(state) => evaluator::run(interp, id, state),
        Executor::Stepper(state) => stepper::run(interp, id, state),
        Executor::Action(state) => action::run(interp, id, state),
        Executor::Continuation(Continuation::Pipeline { stages, next }) => {
            compose::cascade::resume(interp, id, stages, next)
        }
        Executor::Continuation(Continuation::Combinator { input }) => {
            compose::combinator::resume(interp, id, input)
        }
    }
}
