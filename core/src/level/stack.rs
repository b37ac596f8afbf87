use core::ops::{Index, IndexMut};

use super::{Level, LevelId};
use crate::error::ErrorKind;

/// The level stack, with a depth limit enforced on every push.
///
/// Nested evaluation grows this stack rather than the host's, so the limit
/// here is what bounds recursion depth. Overflow is reported as a
/// resource-exceeded error rather than a crash, letting the trampoline
/// unwind normally.
///
/// # Examples
///
/// ```
/// use tumble_core::error::ErrorKind;
/// use tumble_core::feed::Feed;
/// use tumble_core::level::{Level, LevelStack};
///
/// let feed = Feed::empty();
/// let mut stack = LevelStack::new(2);
/// assert_eq!(stack.push(Level::evaluator(feed.clone())).ok(), Some(0));
/// assert_eq!(stack.push(Level::stepper(feed.clone())).ok(), Some(1));
/// assert!(matches!(
///     stack.push(Level::stepper(feed)),
///     Err(ErrorKind::StackOverflow { limit: 2 })
/// ));
/// ```
#[derive(Debug)]
pub struct LevelStack {
    /// The underlying storage; index 0 is the bottom.
    items: Vec<Level>,
    /// Maximum number of levels.
    max_size: usize,
}

impl LevelStack {
    /// Creates an empty stack holding at most `max_size` levels.
    ///
    /// Pre-allocates `min(max_size, 64)` slots, enough for typical
    /// evaluation depths without reallocating.
    pub fn new(max_size: usize) -> Self {
        Self {
            items: Vec::with_capacity(max_size.min(64)),
            max_size,
        }
    }

    /// Pushes a level, returning its id.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::StackOverflow`] if the stack is already full.
    #[inline]
    pub fn push(&mut self, level: Level) -> Result<LevelId, ErrorKind> {
        if self.items.len() >= self.max_size {
            return Err(ErrorKind::StackOverflow {
                limit: self.max_size,
            });
        }
        self.items.push(level);
        Ok(self.items.len() - 1)
    }

    #[inline]
    pub fn pop(&mut self) -> Option<Level> {
        self.items.pop()
    }

    /// Drops every level at or above `len`, returning how many were dropped.
    pub fn truncate(&mut self, len: usize) -> usize {
        let dropped = self.items.len().saturating_sub(len);
        self.items.truncate(len);
        dropped
    }

    /// Returns the current number of levels.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if no level is running.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Id of the topmost level.
    #[inline]
    pub fn top(&self) -> Option<LevelId> {
        self.items.len().checked_sub(1)
    }

    /// Returns the depth limit.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_size
    }

    pub fn set_capacity(&mut self, max_size: usize) {
        self.max_size = max_size;
    }

    pub fn iter(&self) -> impl Iterator<Item = &Level> {
        self.items.iter()
    }
}

impl Index<LevelId> for LevelStack {
    type Output = Level;

    #[inline]
    fn index(&self, id: LevelId) -> &Level {
        &self.items[id]
    }
}

impl IndexMut<LevelId> for LevelStack {
    #[inline]
    fn index_mut(&mut self, id: LevelId) -> &mut Level {
        &mut self.items[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Feed;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_push_respects_limit() {
        let feed = Feed::empty();
        let mut stack = LevelStack::new(2);
        assert_eq!(stack.push(Level::evaluator(feed.clone())), Ok(0));
        assert_eq!(stack.push(Level::stepper(feed.clone())), Ok(1));
        assert_eq!(
            stack.push(Level::stepper(feed)),
            Err(ErrorKind::StackOverflow { limit: 2 })
        );
        assert_eq!(stack.top(), Some(1));
    }

    #[test]
    fn test_truncate_reports_dropped() {
        let feed = Feed::empty();
        let mut stack = LevelStack::new(8);
        for _ in 0..3 {
            stack.push(Level::stepper(feed.clone())).unwrap();
        }
        assert_eq!(stack.truncate(1), 2);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.truncate(4), 0);
    }
}
