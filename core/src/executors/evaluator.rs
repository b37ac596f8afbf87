//! The evaluator: steps a feed to its end.
//!
//! Keeps the last visible result in `out`. Ghost steps leave it alone; a
//! raised result is only allowed as the last step, anywhere else it is
//! escalated to a failure.
//!
//! The stepper either runs inline in this level (results land in `spare`)
//! or in a kept-alive child level that is reset between steps. The second
//! form gives an observer one level per expression; results are identical.

use super::stepper::{self, Step};
use super::{EvaluatorState, Executor, StepperState};
use crate::api::StepperPath;
use crate::bounce::{Bounce, Child};
use crate::cell::Atom;
use crate::error::Error;
use crate::interpreter::Interpreter;
use crate::level::{Level, LevelFlags, LevelId, Slot};

pub(crate) fn run(
    interp: &mut Interpreter,
    id: LevelId,
    state: EvaluatorState,
) -> Result<Bounce, Error> {
    match state {
        EvaluatorState::Initial => {
            interp.levels[id].out = Atom::ghost();
            if interp.at_end(id) {
                return Ok(Bounce::Out);
            }
            if use_sublevel(interp) {
                let child = Level::stepper(interp.feed(id))
                    .into_slot(Slot::Spare)
                    .with_flags(LevelFlags::KEEP_ALIVE);
                interp.levels[id].executor = Executor::Evaluator(EvaluatorState::Sublevel);
                return Ok(Bounce::push(child));
            }
            inline(interp, id, StepperState::Initial)
        }
        EvaluatorState::Inline(state) => inline(interp, id, state),
        EvaluatorState::Sublevel => {
            absorb(interp, id)?;
            if interp.at_end(id) {
                return Ok(Bounce::Out);
            }
            let child = &mut interp.levels[id + 1];
            child.executor = Executor::Stepper(StepperState::Initial);
            child.out = Atom::ghost();
            Ok(Bounce::Continue(Child::Kept))
        }
    }
}

fn use_sublevel(interp: &Interpreter) -> bool {
    match interp.options.stepper {
        StepperPath::Auto => interp.has_observer(),
        StepperPath::Inline => false,
        StepperPath::Sublevel => true,
    }
}

fn inline(interp: &mut Interpreter, id: LevelId, mut state: StepperState) -> Result<Bounce, Error> {
    loop {
        match stepper::step(interp, id, state, Slot::Spare)? {
            Step::Done => {
                absorb(interp, id)?;
                if interp.at_end(id) {
                    return Ok(Bounce::Out);
                }
                state = StepperState::Initial;
            }
            Step::Suspend(next, bounce) => {
                interp.levels[id].executor = Executor::Evaluator(EvaluatorState::Inline(next));
                return Ok(bounce);
            }
        }
    }
}

/// Fold the step result in `spare` into `out`.
fn absorb(interp: &mut Interpreter, id: LevelId) -> Result<(), Error> {
    let result = interp.levels[id].spare;
    if result.is_ghost() {
        return Ok(());
    }
    if !interp.at_end(id) {
        if let Some(error) = interp.error_of(&result) {
            tracing::debug!(level = id, "raised error escalated");
            return Err(error);
        }
    }
    interp.levels[id].out = result;
    Ok(())
}
