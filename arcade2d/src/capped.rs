use std::ops::Deref;

/// Fixed-capacity list whose inserts saturate instead of growing.
///
/// Backing storage is reserved once; `clear` keeps it. Pushes beyond the
/// capacity are dropped and counted in [`CappedVec::dropped`].
#[derive(Clone, Debug)]
pub struct CappedVec<T> {
    items: Vec<T>,
    capacity: usize,
    dropped: u64,
}

impl<T> CappedVec<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Append `value`. Returns `false` and counts the drop when full.
    pub fn push(&mut self, value: T) -> bool {
        if self.items.len() < self.capacity {
            self.items.push(value);
            true
        } else {
            self.dropped += 1;
            false
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total pushes rejected since construction.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn retain(&mut self, f: impl FnMut(&T) -> bool) {
        self.items.retain(f);
    }
}

impl<T> Deref for CappedVec<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}
