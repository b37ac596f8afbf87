//! Mark-and-sweep collection.
//!
//! The interpreter marks its roots with [`Heap::mark`] and
//! [`Heap::mark_cell`], then calls [`Heap::propagate`] and
//! [`Heap::sweep`]. Manual series are always treated as roots since
//! their owner may still reach them from the host stack.
//!
//! Collection only ever happens between trampoline cycles, so no executor
//! is holding a borrow into a series while it runs.

use super::{Heap, SeriesFlags, SeriesId, Stub};
use crate::cell::Cell;

impl Heap {
    pub fn mark(&mut self, id: SeriesId) {
        if let Some(Some(slot)) = self.slots.get_mut(id.index()) {
            if !slot.flags.contains(SeriesFlags::MARKED) {
                slot.flags.insert(SeriesFlags::MARKED);
                self.marking.push(id);
            }
        }
    }

    pub fn mark_cell(&mut self, cell: &Cell) {
        let mut found = [None; 2];
        let mut n = 0;
        cell.each_series(|id| {
            found[n] = Some(id);
            n += 1;
        });
        for id in found.into_iter().flatten() {
            self.mark(id);
        }
    }

    /// Mark everything reachable from what has been marked so far.
    pub fn propagate(&mut self) {
        let manual: Vec<SeriesId> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Some(slot) if !slot.flags.contains(SeriesFlags::MANAGED) => {
                    Some(SeriesId::from_index(index))
                }
                _ => None,
            })
            .collect();
        for id in manual {
            self.mark(id);
        }

        let mut children: Vec<SeriesId> = Vec::new();
        while let Some(id) = self.marking.pop() {
            children.clear();
            let mut visit = |cell: &Cell| cell.each_series(|child| children.push(child));
            match self.stub(id) {
                Stub::Array(buffer) => buffer.as_slice().iter().for_each(|e| visit(&**e)),
                Stub::Varlist(varlist) => {
                    varlist.vars.iter().for_each(|v| visit(&**v));
                    children.extend(varlist.parent);
                }
                Stub::Details(details) => details.aux.iter().for_each(|v| visit(&**v)),
                Stub::Text(_) | Stub::Error(_) => {}
            }
            for child in children.drain(..) {
                self.mark(child);
            }
        }
    }

    /// Free every managed series left unmarked, returning how many.
    pub fn sweep(&mut self) -> usize {
        let mut freed = 0;
        for index in 0..self.slots.len() {
            let Some(slot) = &mut self.slots[index] else {
                continue;
            };
            if slot.flags.contains(SeriesFlags::MARKED) {
                slot.flags.remove(SeriesFlags::MARKED);
            } else if slot.flags.contains(SeriesFlags::MANAGED) {
                self.release_slot(index);
                freed += 1;
            }
        }
        self.pending = 0;
        freed
    }
}
