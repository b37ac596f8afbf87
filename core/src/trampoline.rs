//! The trampoline: the only loop that runs executors.
//!
//! Evaluation never recurses on the host stack. Each cycle invokes the
//! executor of the current level exactly once and acts on the [`Bounce`]
//! it returns: pushing a child, writing a finished child's result into its
//! parent, or unwinding a throw to the nearest level that catches. Depth
//! of the evaluated program shows up as depth of the [`LevelStack`]
//! (bounded by `max_depth`), never as host recursion.
//!
//! [`LevelStack`]: crate::level::LevelStack

use std::sync::atomic::Ordering;

use ecow::EcoString;

use crate::bounce::{Bounce, BounceKind, Child, Label, Thrown};
use crate::cell::{Atom, Value};
use crate::context::Lens;
use crate::error::{Error, ErrorKind, crash};
use crate::executors::{self, ActionState, Executor};
use crate::interpreter::Interpreter;
use crate::level::{Level, LevelFlags, LevelId, Slot};

/// One trampoline cycle, as reported to an [`Observer`].
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub tick: u64,
    pub level: LevelId,
    /// Stack depth when the executor ran.
    pub depth: usize,
    pub executor: &'static str,
    pub label: Option<EcoString>,
    pub bounce: BounceKind,
}

/// Receives an [`Event`] after every executor invocation.
pub trait Observer {
    fn on_event(&mut self, event: &Event);
}

impl<F: FnMut(&Event)> Observer for F {
    fn on_event(&mut self, event: &Event) {
        self(event)
    }
}

/// Counters kept across runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub pushes: u64,
    pub pops: u64,
    /// Deepest the level stack has been.
    pub max_depth: usize,
    /// Deepest nesting of [`Interpreter::run`] calls.
    pub max_run_depth: usize,
    pub collections: u64,
}

fn halt_signal() -> Thrown {
    Thrown::new(Label::Halt, Value::trash())
}

/// Bottom and top of one run of the trampoline.
#[derive(Clone, Copy, Debug)]
pub struct RunState {
    base: LevelId,
    current: LevelId,
}

enum Drive {
    Done(Result<Atom, Thrown>),
    Suspended,
}

impl Interpreter {
    /// Run `level` to completion on top of whatever is already running.
    ///
    /// Natives may call this; the nested run keeps its levels above the
    /// caller's and removes them before returning.
    pub fn run(&mut self, level: Level) -> Result<Atom, Thrown> {
        let base = match self.levels.push(level) {
            Ok(base) => base,
            Err(kind) => return Err(self.fail_thrown(kind.into())),
        };
        self.note_push();
        self.run_depth += 1;
        self.stats.max_run_depth = self.stats.max_run_depth.max(self.run_depth);
        let mut run = RunState {
            base,
            current: base,
        };
        let result = loop {
            if let Drive::Done(result) = self.drive(&mut run, None) {
                break result;
            }
        };
        self.run_depth -= 1;
        result
    }

    /// Start a run that is driven in slices by [`Interpreter::advance`].
    pub fn begin(&mut self, level: Level) -> Result<(), Error> {
        if self.pending.is_some() || self.run_depth > 0 {
            return Err(ErrorKind::invalid("an evaluation is already in progress").into());
        }
        let base = self.levels.push(level)?;
        self.note_push();
        self.pending = Some(RunState {
            base,
            current: base,
        });
        Ok(())
    }

    /// Run at most `budget` cycles of the run started by `begin`. Returns
    /// `None` while unfinished.
    pub fn advance(&mut self, budget: u64) -> Option<Result<Atom, Thrown>> {
        let mut run = self
            .pending
            .take()
            .unwrap_or_else(|| crash("advance without begin"));
        self.run_depth += 1;
        self.stats.max_run_depth = self.stats.max_run_depth.max(self.run_depth);
        let drive = self.drive(&mut run, Some(budget));
        self.run_depth -= 1;
        match drive {
            Drive::Done(result) => Some(result),
            Drive::Suspended => {
                self.pending = Some(run);
                None
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop a begun run without finishing it. Levels that catch see a
    /// halt on the way out, so loops release the series they hold.
    pub fn abandon(&mut self) {
        let Some(run) = self.pending.take() else {
            return;
        };
        let mut id = self.levels.len();
        while id > run.base {
            id -= 1;
            self.stats.pops += self.levels.truncate(id + 1) as u64;
            if self.levels[id].flags.contains(LevelFlags::CATCHES) {
                self.thrown = Some(halt_signal());
                // Whatever it answers, the run is gone.
                let _ = executors::invoke(self, id);
                self.thrown = None;
            }
        }
        self.stats.pops += self.levels.truncate(run.base) as u64;
    }

    fn invoke(&mut self, id: LevelId) -> Bounce {
        match executors::invoke(self, id) {
            Ok(bounce) => bounce,
            Err(error) => Bounce::Thrown(self.fail_from(id, error)),
        }
    }

    /// Cancellation noticed while `id` is current. A catching level gets
    /// the halt delivered so it can clean up before unwinding further.
    fn halt(&mut self, id: LevelId) -> Bounce {
        if !self.levels[id].flags.contains(LevelFlags::CATCHES) {
            return Bounce::Thrown(halt_signal());
        }
        self.thrown = Some(halt_signal());
        let bounce = self.invoke(id);
        if let Some(thrown) = self.thrown.take() {
            return Bounce::Thrown(thrown);
        }
        bounce
    }

    fn drive(&mut self, run: &mut RunState, budget: Option<u64>) -> Drive {
        let mut cycles = 0u64;
        loop {
            if budget.is_some_and(|budget| cycles >= budget) {
                return Drive::Suspended;
            }
            cycles += 1;

            if self.run_depth == 1
                && self.heap.allocations_since_gc() >= self.options.gc_interval
            {
                self.collect_garbage();
            }

            let id = run.current;
            self.tick += 1;

            let bounce = if self.cancel.swap(false, Ordering::Relaxed) {
                tracing::debug!(tick = self.tick, "halt requested");
                self.halt(id)
            } else {
                self.invoke(id)
            };

            tracing::trace!(
                tick = self.tick,
                level = id,
                executor = self.levels[id].executor.name(),
                bounce = ?bounce.kind(),
                "cycle"
            );
            if self.observer.is_some() {
                self.notify(id, bounce.kind());
            }

            if let Some(result) = self.apply(run, id, bounce) {
                return Drive::Done(result);
            }
        }
    }

    fn notify(&mut self, id: LevelId, bounce: BounceKind) {
        let level = &self.levels[id];
        let event = Event {
            tick: self.tick,
            level: id,
            depth: self.levels.len(),
            executor: level.executor.name(),
            label: level.frame.as_ref().map(|_| self.action_name(id)),
            bounce,
        };
        if let Some(mut observer) = self.observer.take() {
            observer.on_event(&event);
            self.observer = Some(observer);
        }
    }

    fn apply(
        &mut self,
        run: &mut RunState,
        id: LevelId,
        bounce: Bounce,
    ) -> Option<Result<Atom, Thrown>> {
        match bounce {
            Bounce::Out => self.complete(run, id),
            Bounce::Continue(Child::Push(child)) => self.push_child(run, id, *child),
            Bounce::Continue(Child::Kept) => {
                if self.levels.len() <= id + 1 {
                    crash("no kept level to continue");
                }
                run.current = id + 1;
                None
            }
            Bounce::Delegate(child) => {
                self.levels[id].flags.insert(LevelFlags::DELEGATED);
                self.push_child(run, id, child.into_slot(Slot::Out))
            }
            Bounce::Thrown(thrown) => self.unwind(run, id, thrown),
            Bounce::Redo { checked, phase } => {
                self.stats.pops += self.levels.truncate(id + 1) as u64;
                let level = &mut self.levels[id];
                level.flags.remove(LevelFlags::CATCHES | LevelFlags::DELEGATED);
                level.executor = Executor::Action(if checked {
                    ActionState::Typecheck
                } else {
                    ActionState::Dispatch
                });
                let frame = level.frame_mut();
                if let Some(phase) = phase {
                    frame.phase = phase;
                }
                frame.state = 0;
                let varlist = frame.varlist;
                self.heap.varlist_mut(varlist).lens = Lens::All;
                None
            }
            Bounce::Downshift { phase, then } => {
                self.stats.pops += self.levels.truncate(id + 1) as u64;
                let level = &mut self.levels[id];
                let mut frame = level
                    .frame
                    .take()
                    .unwrap_or_else(|| crash("downshift without a frame"));
                frame.phase = phase;
                frame.state = 0;
                let mut child = Level::action(level.feed.clone(), frame, level.label);
                child.executor = Executor::Action(ActionState::Dispatch);
                level.flags.remove(LevelFlags::CATCHES);
                level.executor = Executor::Continuation(then);
                self.push_child(run, id, child)
            }
        }
    }

    fn push_child(
        &mut self,
        run: &mut RunState,
        id: LevelId,
        child: Level,
    ) -> Option<Result<Atom, Thrown>> {
        self.stats.pops += self.levels.truncate(id + 1) as u64;
        match self.levels.push(child) {
            Ok(child) => {
                self.note_push();
                run.current = child;
                None
            }
            Err(kind) => {
                let thrown = self.fail_from(id, kind.into());
                self.unwind(run, id, thrown)
            }
        }
    }

    fn note_push(&mut self) {
        self.stats.pushes += 1;
        self.stats.max_depth = self.stats.max_depth.max(self.levels.len());
    }

    /// Hand the finished level's result to its parent.
    fn complete(&mut self, run: &mut RunState, mut id: LevelId) -> Option<Result<Atom, Thrown>> {
        loop {
            let level = &self.levels[id];
            let out = level.out;
            if id == run.base {
                self.stats.pops += self.levels.truncate(id) as u64;
                return Some(Ok(out));
            }
            let into = level.into;
            let keep = level.flags.contains(LevelFlags::KEEP_ALIVE);
            let dropped = self.levels.truncate(if keep { id + 1 } else { id });
            self.stats.pops += dropped as u64;

            let parent = &mut self.levels[id - 1];
            *parent.slot_mut(into) = out;
            if parent.flags.contains(LevelFlags::DELEGATED) {
                parent.flags.remove(LevelFlags::DELEGATED);
                id -= 1;
                continue;
            }
            run.current = id - 1;
            return None;
        }
    }

    /// Pop levels until one that catches, or the base of the run.
    fn unwind(
        &mut self,
        run: &mut RunState,
        from: LevelId,
        thrown: Thrown,
    ) -> Option<Result<Atom, Thrown>> {
        if thrown.label == Label::Failure && self.thrown.is_none() && self.run_depth == 1 {
            self.escape_position = self.levels[run.base].feed.borrow().position();
        }
        self.thrown = Some(thrown);
        let mut id = from;
        loop {
            if id == run.base {
                self.stats.pops += self.levels.truncate(id) as u64;
                return Some(Err(self.take_thrown()));
            }
            self.stats.pops += self.levels.truncate(id) as u64;
            id -= 1;
            if self.levels[id].flags.contains(LevelFlags::CATCHES) {
                run.current = id;
                return None;
            }
        }
    }

    /// Failure thrown out of level `id`, naming the action that ran there.
    pub(crate) fn fail_from(&mut self, id: LevelId, mut error: Error) -> Thrown {
        if error.where_.is_none() && self.levels[id].frame.is_some() {
            error.where_ = Some(self.action_name(id));
        }
        self.fail_thrown(error)
    }

    /// Mark from every root and free what was not reached.
    pub fn collect_garbage(&mut self) -> usize {
        self.heap.mark(self.lib);
        self.heap.mark(self.user);
        if let Some(phase) = self.return_phase {
            self.heap.mark(phase);
        }
        if let Some(thrown) = &self.thrown {
            self.heap.mark_cell(&thrown.arg);
        }
        for level in self.levels.iter() {
            level.mark(&mut self.heap);
        }
        for cell in self.roots.borrow().iter() {
            self.heap.mark_cell(cell);
        }
        self.heap.propagate();
        let freed = self.heap.sweep();
        let heap = &self.heap;
        self.furthest.retain(|series, _| heap.is_live(*series));
        self.stats.collections += 1;
        tracing::debug!(freed, live = self.heap.live(), "collected garbage");
        freed
    }
}
