//! Series storage.
//!
//! Every variable-sized thing a cell refers to lives in a slot of the
//! [`Heap`] and is named by a [`SeriesId`]. Cells never hold references
//! into a series, only its id, so growth and collection can move or drop
//! storage without leaving anything dangling. Accessors hand out borrows
//! scoped to a single operation.
//!
//! A series is either *manual*, owned by whoever allocated it and released
//! with [`Heap::free`], or *managed*, reclaimed by the collector once no
//! root reaches it (see [`gc`]).

pub mod gc;
pub mod series;

use core::num::NonZeroU32;

use bitflags::bitflags;

pub use series::Buffer;

use crate::cell::{Atom, Element, Payload, Value};
use crate::context::Varlist;
use crate::error::{Error, ErrorKind, crash};
use crate::phase::Details;

/// Handle to a slot in the [`Heap`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesId(NonZeroU32);

impl SeriesId {
    pub(crate) fn from_index(index: usize) -> SeriesId {
        match u32::try_from(index + 1).ok().and_then(NonZeroU32::new) {
            Some(id) => SeriesId(id),
            None => crash("series table exhausted"),
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// Contents of a series slot.
#[derive(Debug)]
pub enum Stub {
    Array(Buffer<Element>),
    Text(String),
    Varlist(Varlist),
    Details(Details),
    Error(Box<Error>),
}

impl Stub {
    fn flavor(&self) -> &'static str {
        match self {
            Stub::Array(_) => "array",
            Stub::Text(_) => "text",
            Stub::Varlist(_) => "varlist",
            Stub::Details(_) => "details",
            Stub::Error(_) => "error",
        }
    }
}

#[cold]
fn mismatch(id: SeriesId, found: &Stub, wanted: &str) -> ! {
    crash(format_args!(
        "series {:?} is {}, expected {}",
        id,
        found.flavor(),
        wanted
    ))
}

bitflags! {
    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    pub struct SeriesFlags: u8 {
        /// Owned by the collector.
        const MANAGED = 1;
        /// Permanently immutable.
        const FROZEN = 1 << 1;
        /// Reached during the current mark phase.
        const MARKED = 1 << 2;
    }
}

#[derive(Debug)]
struct Slot {
    stub: Stub,
    flags: SeriesFlags,
    /// Outstanding holds; length changes are refused while nonzero.
    holds: u16,
}

#[derive(Debug, Default)]
pub struct Heap {
    slots: Vec<Option<Slot>>,
    free: Vec<usize>,
    /// Allocations since the last collection.
    pending: usize,
    live: usize,
    marking: Vec<SeriesId>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a manual series. The caller frees or manages it.
    pub fn alloc(&mut self, stub: Stub) -> SeriesId {
        self.alloc_with(stub, SeriesFlags::empty())
    }

    pub fn alloc_managed(&mut self, stub: Stub) -> SeriesId {
        self.alloc_with(stub, SeriesFlags::MANAGED)
    }

    fn alloc_with(&mut self, stub: Stub, flags: SeriesFlags) -> SeriesId {
        let slot = Slot {
            stub,
            flags,
            holds: 0,
        };
        self.pending += 1;
        self.live += 1;
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(slot);
                SeriesId::from_index(index)
            }
            None => {
                self.slots.push(Some(slot));
                SeriesId::from_index(self.slots.len() - 1)
            }
        }
    }

    pub fn alloc_array(&mut self, items: &[Element]) -> SeriesId {
        self.alloc_managed(Stub::Array(Buffer::from_slice(items)))
    }

    pub fn alloc_text(&mut self, text: impl Into<String>) -> SeriesId {
        self.alloc_managed(Stub::Text(text.into()))
    }

    pub fn alloc_error(&mut self, error: Error) -> SeriesId {
        self.alloc_managed(Stub::Error(Box::new(error)))
    }

    /// Hand a manual series over to the collector.
    pub fn manage(&mut self, id: SeriesId) {
        self.slot_mut(id).flags.insert(SeriesFlags::MANAGED);
    }

    /// Release a manual series.
    pub fn free(&mut self, id: SeriesId) {
        if self.slot(id).flags.contains(SeriesFlags::MANAGED) {
            crash(format_args!("freeing managed series {:?}", id));
        }
        self.release_slot(id.index());
    }

    fn release_slot(&mut self, index: usize) {
        self.slots[index] = None;
        self.free.push(index);
        self.live -= 1;
    }

    pub fn is_live(&self, id: SeriesId) -> bool {
        matches!(self.slots.get(id.index()), Some(Some(_)))
    }

    pub fn is_managed(&self, id: SeriesId) -> bool {
        self.slot(id).flags.contains(SeriesFlags::MANAGED)
    }

    /// Number of live series.
    pub fn live(&self) -> usize {
        self.live
    }

    pub fn allocations_since_gc(&self) -> usize {
        self.pending
    }

    fn slot(&self, id: SeriesId) -> &Slot {
        match self.slots.get(id.index()) {
            Some(Some(slot)) => slot,
            _ => crash(format_args!("access to dead series {:?}", id)),
        }
    }

    fn slot_mut(&mut self, id: SeriesId) -> &mut Slot {
        match self.slots.get_mut(id.index()) {
            Some(Some(slot)) => slot,
            _ => crash(format_args!("access to dead series {:?}", id)),
        }
    }

    pub fn stub(&self, id: SeriesId) -> &Stub {
        &self.slot(id).stub
    }

    pub fn array(&self, id: SeriesId) -> &[Element] {
        match self.stub(id) {
            Stub::Array(buffer) => buffer.as_slice(),
            other => mismatch(id, other, "array"),
        }
    }

    /// Mutable access for operations that may change the length.
    pub fn array_mut(&mut self, id: SeriesId) -> Result<&mut Buffer<Element>, ErrorKind> {
        self.check_mutable(id, true)?;
        match &mut self.slot_mut(id).stub {
            Stub::Array(buffer) => Ok(buffer),
            other => mismatch(id, other, "array"),
        }
    }

    /// Mutable access for in-place updates, allowed while held.
    pub fn array_cells_mut(&mut self, id: SeriesId) -> Result<&mut [Element], ErrorKind> {
        self.check_mutable(id, false)?;
        match &mut self.slot_mut(id).stub {
            Stub::Array(buffer) => Ok(buffer.as_mut_slice()),
            other => mismatch(id, other, "array"),
        }
    }

    pub fn text(&self, id: SeriesId) -> &str {
        match self.stub(id) {
            Stub::Text(text) => text,
            other => mismatch(id, other, "text"),
        }
    }

    pub fn text_mut(&mut self, id: SeriesId) -> Result<&mut String, ErrorKind> {
        self.check_mutable(id, true)?;
        match &mut self.slot_mut(id).stub {
            Stub::Text(text) => Ok(text),
            other => mismatch(id, other, "text"),
        }
    }

    pub fn varlist(&self, id: SeriesId) -> &Varlist {
        match self.stub(id) {
            Stub::Varlist(varlist) => varlist,
            other => mismatch(id, other, "varlist"),
        }
    }

    pub fn varlist_mut(&mut self, id: SeriesId) -> &mut Varlist {
        match &mut self.slot_mut(id).stub {
            Stub::Varlist(varlist) => varlist,
            other => mismatch(id, other, "varlist"),
        }
    }

    pub fn details(&self, id: SeriesId) -> &Details {
        match self.stub(id) {
            Stub::Details(details) => details,
            other => mismatch(id, other, "details"),
        }
    }

    pub fn details_mut(&mut self, id: SeriesId) -> &mut Details {
        match &mut self.slot_mut(id).stub {
            Stub::Details(details) => details,
            other => mismatch(id, other, "details"),
        }
    }

    pub fn error(&self, id: SeriesId) -> &Error {
        match self.stub(id) {
            Stub::Error(error) => error,
            other => mismatch(id, other, "error"),
        }
    }

    fn check_mutable(&self, id: SeriesId, changes_length: bool) -> Result<(), ErrorKind> {
        let slot = self.slot(id);
        if slot.flags.contains(SeriesFlags::FROZEN) {
            return Err(ErrorKind::Frozen);
        }
        if changes_length && slot.holds > 0 {
            return Err(ErrorKind::Held);
        }
        Ok(())
    }

    pub fn freeze(&mut self, id: SeriesId) {
        self.slot_mut(id).flags.insert(SeriesFlags::FROZEN);
    }

    /// Freeze an array and every list or text reachable from it.
    pub fn freeze_deep(&mut self, id: SeriesId) {
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            if self.is_frozen(id) {
                continue;
            }
            self.freeze(id);
            if let Stub::Array(buffer) = self.stub(id) {
                for element in buffer.as_slice() {
                    if let Payload::List { series, .. } | Payload::Text(series) = element.payload() {
                        pending.push(series);
                    }
                }
            }
        }
    }

    pub fn is_frozen(&self, id: SeriesId) -> bool {
        self.slot(id).flags.contains(SeriesFlags::FROZEN)
    }

    /// Block length changes until the matching [`Heap::release`].
    pub fn hold(&mut self, id: SeriesId) {
        let slot = self.slot_mut(id);
        slot.holds = slot
            .holds
            .checked_add(1)
            .unwrap_or_else(|| crash("series hold count overflow"));
    }

    pub fn release(&mut self, id: SeriesId) {
        let slot = self.slot_mut(id);
        if slot.holds == 0 {
            crash(format_args!("release of unheld series {:?}", id));
        }
        slot.holds -= 1;
    }

    pub fn is_held(&self, id: SeriesId) -> bool {
        self.slot(id).holds > 0
    }

    /// Collapse an atom to a stable value.
    ///
    /// A pack yields its first item, a raised error becomes `Err`, void
    /// and ghost have no value to give.
    pub fn decay(&self, atom: Atom) -> Result<Value, Error> {
        let mut atom = atom;
        loop {
            if let Some(value) = atom.as_value() {
                return Ok(value);
            }
            match atom.payload() {
                Payload::Error(id) => return Err(self.error(id).clone()),
                Payload::Comma => return Err(ErrorKind::NeedValue("invisible result".into()).into()),
                Payload::List { series, .. } => {
                    let Some(first) = self.array(series).first() else {
                        return Err(ErrorKind::Void.into());
                    };
                    atom = first
                        .unlift()
                        .ok_or_else(|| ErrorKind::invalid("pack items must be lifted"))?;
                }
                _ => crash("unexpected unstable antiform"),
            }
        }
    }

    /// Whether `atom` is the empty pack.
    pub fn is_void(&self, atom: &Atom) -> bool {
        match atom.payload() {
            Payload::List { series, .. } if atom.is_pack() => self.array(series).is_empty(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod heap_test;
