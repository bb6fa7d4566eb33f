use std::iter::Chain;
use std::slice::Iter;

/// Bounded FIFO ring. Once full, each push overwrites the oldest element.
#[derive(Debug, Clone)]
pub struct Window<T> {
    buffer: Vec<T>,
    capacity: usize,
    position: usize,
}

impl<T> Window<T> {
    pub fn new(capacity: usize) -> Self {
        Self { buffer: Vec::with_capacity(capacity), capacity, position: 0 }
    }

    /// Appends `item`, returning the evicted element if the window was full.
    /// A zero-capacity window drops everything it is given.
    pub fn push(&mut self, item: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(item);
        }
        let evicted = if self.buffer.len() < self.capacity {
            self.buffer.push(item);
            None
        } else {
            Some(std::mem::replace(&mut self.buffer[self.position], item))
        };
        self.position = (self.position + 1) % self.capacity;
        evicted
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Element at logical index `idx`, where 0 is the oldest.
    pub fn get(&self, idx: usize) -> Option<&T> {
        if idx >= self.buffer.len() {
            return None;
        }
        // `position` only points at the oldest slot once the ring has wrapped.
        let start = if self.buffer.len() < self.capacity { 0 } else { self.position };
        self.buffer.get((start + idx) % self.buffer.len())
    }

    /// Oldest to newest.
    pub fn iter(&self) -> Chain<Iter<'_, T>, Iter<'_, T>> {
        let split = if self.buffer.len() < self.capacity { 0 } else { self.position };
        let (newer, older) = self.buffer.split_at(split);
        older.iter().chain(newer.iter())
    }
}

impl<'a, T> IntoIterator for &'a Window<T> {
    type Item = &'a T;
    type IntoIter = Chain<Iter<'a, T>, Iter<'a, T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
