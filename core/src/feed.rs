//! Input cursors.
//!
//! A [`Feed`] hands out elements one at a time, either from a position in
//! an array series or from a queue of host-supplied elements. Splices
//! pushed on top are drained before the underlying source resumes; that
//! is how a macro's output is read as though it had been written at the
//! call site.
//!
//! Feeds are shared (`Rc<RefCell<..>>`) between a level and the argument
//! steppers it spawns, which consume from the same position. Borrows are
//! kept to single calls.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::cell::{Binding, Element};
use crate::heap::{Heap, SeriesId};

pub type FeedRef = Rc<RefCell<Feed>>;

#[derive(Debug)]
enum Source {
    Array { series: SeriesId, index: u32 },
    Variadic(VecDeque<Element>),
}

#[derive(Debug)]
pub struct Feed {
    source: Source,
    binding: Binding,
    splices: Vec<VecDeque<Element>>,
}

impl Feed {
    pub fn array(series: SeriesId, index: u32, binding: Binding) -> FeedRef {
        Rc::new(RefCell::new(Feed {
            source: Source::Array { series, index },
            binding,
            splices: Vec::new(),
        }))
    }

    /// Feed over host-supplied elements, as used by API calls.
    pub fn variadic(items: impl IntoIterator<Item = Element>, binding: Binding) -> FeedRef {
        Rc::new(RefCell::new(Feed {
            source: Source::Variadic(items.into_iter().collect()),
            binding,
            splices: Vec::new(),
        }))
    }

    /// Feed with nothing in it.
    pub fn empty() -> FeedRef {
        Self::variadic([], None)
    }

    pub fn binding(&self) -> Binding {
        self.binding
    }

    fn drop_drained_splices(&mut self) {
        while self.splices.last().is_some_and(VecDeque::is_empty) {
            self.splices.pop();
        }
    }

    /// Next element as written, without binding it.
    pub fn peek(&self, heap: &Heap) -> Option<Element> {
        if let Some(item) = self.splices.iter().rev().find_map(|s| s.front()) {
            return Some(*item);
        }
        match &self.source {
            Source::Array { series, index } => heap.array(*series).get(*index as usize).copied(),
            Source::Variadic(items) => items.front().copied(),
        }
    }

    pub fn at_end(&self, heap: &Heap) -> bool {
        self.peek(heap).is_none()
    }

    /// Consume the next element as written.
    pub fn next(&mut self, heap: &Heap) -> Option<Element> {
        self.drop_drained_splices();
        if let Some(splice) = self.splices.last_mut() {
            return splice.pop_front();
        }
        match &mut self.source {
            Source::Array { series, index } => {
                let item = heap.array(*series).get(*index as usize).copied()?;
                *index += 1;
                Some(item)
            }
            Source::Variadic(items) => items.pop_front(),
        }
    }

    /// Consume the next element, binding it to the feed if unbound.
    pub fn next_bound(&mut self, heap: &Heap) -> Option<Element> {
        let binding = self.binding;
        self.next(heap).map(|item| item.bound(binding))
    }

    /// Make `items` the next elements to be consumed.
    pub fn splice(&mut self, items: impl IntoIterator<Item = Element>) {
        let items: VecDeque<Element> = items.into_iter().collect();
        if !items.is_empty() {
            self.splices.push(items);
        }
    }

    /// Index into the source array, or `None` for variadic feeds.
    pub fn position(&self) -> Option<u32> {
        match &self.source {
            Source::Array { index, .. } => Some(*index),
            Source::Variadic(_) => None,
        }
    }

    /// Series and pending elements this feed keeps alive.
    pub(crate) fn mark(&self, heap: &mut Heap) {
        if let Source::Array { series, .. } = &self.source {
            heap.mark(*series);
        }
        if let Some(binding) = self.binding {
            heap.mark(binding);
        }
        let pending = self.splices.iter().flatten();
        let pending: Box<dyn Iterator<Item = &Element>> = match &self.source {
            Source::Variadic(items) => Box::new(pending.chain(items.iter())),
            Source::Array { .. } => Box::new(pending),
        };
        for item in pending {
            heap.mark_cell(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::Stub;
    use crate::symbol::Symbol;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_splice_drains_before_source() {
        let mut heap = Heap::new();
        let block = heap.alloc_array(&[Element::integer(1), Element::integer(2)]);
        let feed = Feed::array(block, 0, None);
        let mut feed = feed.borrow_mut();

        assert_eq!(feed.next(&heap), Some(Element::integer(1)));
        feed.splice([Element::integer(10), Element::integer(11)]);
        assert_eq!(feed.peek(&heap), Some(Element::integer(10)));
        assert_eq!(feed.next(&heap), Some(Element::integer(10)));
        assert_eq!(feed.next(&heap), Some(Element::integer(11)));
        assert_eq!(feed.next(&heap), Some(Element::integer(2)));
        assert!(feed.at_end(&heap));
        assert_eq!(feed.position(), Some(2));
    }

    #[test]
    fn test_next_bound_binds_words() {
        let mut heap = Heap::new();
        let context = heap.alloc_managed(Stub::Text(String::new()));
        let feed = Feed::variadic([Element::word(Symbol::NULL), Element::integer(3)], Some(context));
        let mut feed = feed.borrow_mut();
        assert_eq!(feed.next_bound(&heap).unwrap().binding(), Some(context));
        assert_eq!(feed.next_bound(&heap), Some(Element::integer(3)));
        assert_eq!(feed.position(), None);
    }
}
