//! Activation records.
//!
//! A [`Level`] is one unit of in-progress computation: a feed to read
//! from, three scratch cells, the executor (with its resumption state)
//! that drives it and, for action levels, a [`Frame`] of arguments.
//! Levels live on the [`LevelStack`]; a level's parent is the one below
//! it, so a [`LevelId`] is simply its stack index.

pub mod stack;

use bitflags::bitflags;
use smallvec::SmallVec;

pub use stack::LevelStack;

use crate::cell::{Atom, Binding, ContextId, PhaseId, Value};
use crate::error::crash;
use crate::executors::{ActionState, EvaluatorState, Executor, StepperState};
use crate::feed::FeedRef;
use crate::heap::Heap;
use crate::symbol::Symbol;

/// Index of a level on the stack.
pub type LevelId = usize;

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
    pub struct LevelFlags: u8 {
        /// Stays on the stack after completing, for its parent to re-run.
        const KEEP_ALIVE = 1;
        /// Re-invoked while a throw unwinds past it.
        const CATCHES = 1 << 1;
        /// Completes as soon as its delegated child does.
        const DELEGATED = 1 << 2;
        /// Do not look ahead for an infix operator after a value.
        const NO_LOOKAHEAD = 1 << 3;
    }
}

/// Which of the parent's cells a finished child writes into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Slot {
    #[default]
    Out,
    Spare,
    Scratch,
}

/// Argument-gathering and dispatch state of an action level.
#[derive(Clone, Debug)]
pub struct Frame {
    pub phase: PhaseId,
    pub varlist: ContextId,
    pub coupling: Binding,
    /// Slots to fill from the feed, in order.
    pub order: SmallVec<[u16; 8]>,
    pub cursor: u16,
    /// Dispatcher resumption state; zero on first entry.
    pub state: u8,
    /// Left argument of an infix call.
    pub left: Option<Value>,
    pub infix: bool,
    /// Refinements named in a path call, in path order.
    pub refinements: SmallVec<[Symbol; 2]>,
}

impl Frame {
    pub fn new(phase: PhaseId, varlist: ContextId, coupling: Binding) -> Self {
        Self {
            phase,
            varlist,
            coupling,
            order: SmallVec::new(),
            cursor: 0,
            state: 0,
            left: None,
            infix: false,
            refinements: SmallVec::new(),
        }
    }
}

#[derive(Debug)]
pub struct Level {
    pub feed: FeedRef,
    pub out: Atom,
    pub spare: Atom,
    pub scratch: Atom,
    pub executor: Executor,
    pub frame: Option<Frame>,
    pub flags: LevelFlags,
    /// Name the running action was invoked through.
    pub label: Option<Symbol>,
    /// Where the result goes in the parent.
    pub into: Slot,
}

impl Level {
    pub fn new(feed: FeedRef, executor: Executor) -> Self {
        Self {
            feed,
            out: Atom::ghost(),
            spare: Value::trash().into(),
            scratch: Value::trash().into(),
            executor,
            frame: None,
            flags: LevelFlags::empty(),
            label: None,
            into: Slot::Out,
        }
    }

    /// Evaluates the feed to its end.
    pub fn evaluator(feed: FeedRef) -> Self {
        Self::new(feed, Executor::Evaluator(EvaluatorState::Initial))
    }

    /// Evaluates one expression from the feed.
    pub fn stepper(feed: FeedRef) -> Self {
        Self::new(feed, Executor::Stepper(StepperState::Initial))
    }

    /// Gathers arguments for `frame` from the feed and dispatches.
    pub fn action(feed: FeedRef, frame: Frame, label: Option<Symbol>) -> Self {
        let mut level = Self::new(feed, Executor::Action(ActionState::Initial));
        level.frame = Some(frame);
        level.label = label;
        level
    }

    pub fn into_slot(mut self, slot: Slot) -> Self {
        self.into = slot;
        self
    }

    pub fn with_flags(mut self, flags: LevelFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn slot(&self, slot: Slot) -> Atom {
        match slot {
            Slot::Out => self.out,
            Slot::Spare => self.spare,
            Slot::Scratch => self.scratch,
        }
    }

    pub fn slot_mut(&mut self, slot: Slot) -> &mut Atom {
        match slot {
            Slot::Out => &mut self.out,
            Slot::Spare => &mut self.spare,
            Slot::Scratch => &mut self.scratch,
        }
    }

    pub fn frame(&self) -> &Frame {
        self.frame
            .as_ref()
            .unwrap_or_else(|| crash("level has no frame"))
    }

    pub fn frame_mut(&mut self) -> &mut Frame {
        self.frame
            .as_mut()
            .unwrap_or_else(|| crash("level has no frame"))
    }

    /// Mark everything this level keeps alive.
    pub(crate) fn mark(&self, heap: &mut Heap) {
        heap.mark_cell(&self.out);
        heap.mark_cell(&self.spare);
        heap.mark_cell(&self.scratch);
        self.feed.borrow().mark(heap);
        if let Some(frame) = &self.frame {
            heap.mark(frame.phase);
            heap.mark(frame.varlist);
            if let Some(coupling) = frame.coupling {
                heap.mark(coupling);
            }
            if let Some(left) = &frame.left {
                heap.mark_cell(left);
            }
        }
        self.executor.mark(heap);
    }
}
