//! Growable buffer with spare capacity at both ends.

/// Contiguous storage whose live region starts `bias` slots into `data`.
///
/// Removing from the head bumps the bias instead of shifting, and
/// inserting at the head reuses that room before reallocating. Slots
/// outside the live region hold stale copies and are never read.
#[derive(Clone, Debug, Default)]
pub struct Buffer<T: Copy> {
    data: Vec<T>,
    bias: usize,
}

impl<T: Copy> Buffer<T> {
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            bias: 0,
        }
    }

    pub fn from_slice(items: &[T]) -> Self {
        Self {
            data: items.to_vec(),
            bias: 0,
        }
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data[self.bias..]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data[self.bias..]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() - self.bias
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unused slots before the head.
    #[inline]
    pub fn head_capacity(&self) -> usize {
        self.bias
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.as_slice().get(index).copied()
    }

    pub fn push(&mut self, item: T) {
        self.data.push(item);
    }

    pub fn extend_from_slice(&mut self, items: &[T]) {
        self.data.extend_from_slice(items);
    }

    pub fn insert(&mut self, index: usize, item: T) {
        if index == 0 {
            self.unshift(item);
        } else {
            self.data.insert(self.bias + index, item);
        }
    }

    /// Insert at the head, growing the head region if it is exhausted.
    pub fn unshift(&mut self, item: T) {
        if self.bias == 0 {
            let extra = (self.len() / 2).max(4);
            let mut grown = Vec::with_capacity(extra + self.data.len());
            grown.resize(extra, item);
            grown.extend_from_slice(&self.data);
            self.data = grown;
            self.bias = extra;
        }
        self.bias -= 1;
        self.data[self.bias] = item;
    }

    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.len() {
            return None;
        }
        if index == 0 {
            let item = self.data[self.bias];
            self.bias += 1;
            return Some(item);
        }
        Some(self.data.remove(self.bias + index))
    }

    pub fn truncate(&mut self, len: usize) {
        self.data.truncate(self.bias + len);
    }
}
