//! Stack-disciplined pool of pre-allocated temporaries.
//!
//! Per-tick math grabs vectors from here instead of building fresh ones.
//! Callers bracket their use with [`ScratchPool::begin`] / [`ScratchPool::done`];
//! brackets nest, and `done` rewinds the cursor to where the matching `begin`
//! found it.

use std::ops::{Index, IndexMut};

use crate::math::Vec2;

/// Index of an item handed out by [`ScratchPool::get`].
///
/// Only meaningful until the enclosing bracket is closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScratchRef(usize);

#[derive(Debug)]
pub struct ScratchPool<T> {
    items: Vec<T>,
    index: usize,
    marks: Vec<usize>,
    overflows: u64,
    overflow_reported: bool,
}

impl<T> ScratchPool<T> {
    /// Build `size` items up front using `factory`.
    pub fn new(size: usize, mut factory: impl FnMut() -> T) -> Self {
        Self {
            items: (0..size).map(|_| factory()).collect(),
            index: 0,
            marks: Vec::with_capacity(8),
            overflows: 0,
            overflow_reported: false,
        }
    }

    /// Remember the current cursor so `done` can rewind to it.
    pub fn begin(&mut self) {
        self.marks.push(self.index);
    }

    /// Take the next free item. Items keep whatever state they were last left
    /// in, so reset them before use.
    ///
    /// Returns `None` when the pool is exhausted. That means a bracket was
    /// left open somewhere.
    pub fn get(&mut self) -> Option<ScratchRef> {
        if self.index < self.items.len() {
            let r = ScratchRef(self.index);
            self.index += 1;
            Some(r)
        } else {
            self.overflows += 1;
            if !self.overflow_reported {
                log::warn!(
                    "scratch pool exhausted ({} items); a begin()/done() bracket is unbalanced",
                    self.items.len()
                );
                self.overflow_reported = true;
            }
            None
        }
    }

    /// Rewind to the most recent `begin`. Without a matching `begin` this does nothing.
    pub fn done(&mut self) {
        if let Some(mark) = self.marks.pop() {
            self.index = mark;
            self.overflow_reported = false;
        }
    }

    /// Drop every open bracket and rewind to the start of the pool.
    pub fn reset(&mut self) {
        self.marks.clear();
        self.index = 0;
        self.overflow_reported = false;
    }

    /// Run `f` inside a `begin`/`done` bracket.
    pub fn scope<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.begin();
        let result = f(self);
        self.done();
        result
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn depth(&self) -> usize {
        self.marks.len()
    }

    pub fn capacity(&self) -> usize {
        self.items.len()
    }

    /// Number of `get` calls that found the pool empty.
    pub fn overflows(&self) -> u64 {
        self.overflows
    }
}

impl ScratchPool<Vec2> {
    /// Vector pool with every entry starting at zero.
    pub fn vectors(size: usize) -> Self {
        Self::new(size, Vec2::default)
    }
}

impl<T> Index<ScratchRef> for ScratchPool<T> {
    type Output = T;

    fn index(&self, r: ScratchRef) -> &T {
        &self.items[r.0]
    }
}

impl<T> IndexMut<ScratchRef> for ScratchPool<T> {
    fn index_mut(&mut self, r: ScratchRef) -> &mut T {
        &mut self.items[r.0]
    }
}
