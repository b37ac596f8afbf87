//! Host handles.
//!
//! A [`Handle`] keeps one cell alive across garbage collections for as
//! long as the host holds it. Handles share a [`RootTable`] with their
//! interpreter; cloning a handle bumps the slot's count and dropping the
//! last clone frees the slot.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::cell::{Atom, Cell, Value};

#[derive(Debug, Default)]
pub struct RootTable {
    slots: Vec<Option<Root>>,
    free: Vec<usize>,
}

#[derive(Debug)]
struct Root {
    atom: Atom,
    count: usize,
}

impl RootTable {
    fn insert(&mut self, atom: Atom) -> usize {
        let root = Some(Root { atom, count: 1 });
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = root;
                slot
            }
            None => {
                self.slots.push(root);
                self.slots.len() - 1
            }
        }
    }

    fn retain(&mut self, slot: usize) {
        if let Some(root) = &mut self.slots[slot] {
            root.count += 1;
        }
    }

    fn release(&mut self, slot: usize) {
        let Some(root) = &mut self.slots[slot] else {
            return;
        };
        root.count -= 1;
        if root.count == 0 {
            self.slots[slot] = None;
            self.free.push(slot);
        }
    }

    fn get(&self, slot: usize) -> Option<Atom> {
        self.slots[slot].as_ref().map(|root| root.atom)
    }

    /// Cells currently rooted.
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.slots.iter().flatten().map(|root| &*root.atom)
    }

    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A rooted cell owned by the host.
pub struct Handle {
    roots: Rc<RefCell<RootTable>>,
    slot: usize,
    atom: Atom,
}

impl Handle {
    pub(crate) fn new(roots: &Rc<RefCell<RootTable>>, atom: Atom) -> Self {
        let slot = roots.borrow_mut().insert(atom);
        Self {
            roots: roots.clone(),
            slot,
            atom,
        }
    }

    pub fn atom(&self) -> Atom {
        self.atom
    }

    /// The value, if it is stable.
    pub fn value(&self) -> Option<Value> {
        self.atom.as_value()
    }

    pub fn is_raised(&self) -> bool {
        self.atom.is_raised()
    }

    /// Whether this handle is still registered in its table.
    pub fn is_rooted(&self) -> bool {
        self.roots.borrow().get(self.slot).is_some()
    }
}

impl Clone for Handle {
    fn clone(&self) -> Self {
        self.roots.borrow_mut().retain(self.slot);
        Self {
            roots: self.roots.clone(),
            slot: self.slot,
            atom: self.atom,
        }
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if let Ok(mut roots) = self.roots.try_borrow_mut() {
            roots.release(self.slot);
        }
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("slot", &self.slot)
            .field("atom", &self.atom)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Value;

    #[test]
    fn test_clones_share_a_slot() {
        let roots = Rc::new(RefCell::new(RootTable::default()));
        let first = Handle::new(&roots, Value::integer(1).into());
        let second = first.clone();
        assert_eq!(roots.borrow().len(), 1);
        drop(first);
        assert_eq!(roots.borrow().len(), 1);
        assert!(second.is_rooted());
        drop(second);
        assert!(roots.borrow().is_empty());
    }

    #[test]
    fn test_freed_slots_are_reused() {
        let roots = Rc::new(RefCell::new(RootTable::default()));
        let first = Handle::new(&roots, Value::integer(1).into());
        drop(first);
        let second = Handle::new(&roots, Value::integer(2).into());
        assert_eq!(second.slot, 0);
        assert_eq!(roots.borrow().iter().count(), 1);
    }
}
