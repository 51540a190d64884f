//! Single-producer, single-consumer output buffer with atomic drain

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Mutex-guarded buffer a worker appends to and the scheduler drains
///
/// The container itself is never exposed; `drain` swaps it out under the lock
/// so nothing pushed concurrently can be lost or returned twice.
#[derive(Debug)]
pub struct OutputBuffer<T> {
    items: Mutex<Vec<T>>,
}

impl<T> OutputBuffer<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }

    fn items(&self) -> MutexGuard<'_, Vec<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, item: T) {
        self.items().push(item);
    }

    /// Take everything buffered so far and leave the buffer empty
    pub fn drain(&self) -> Vec<T> {
        std::mem::take(&mut *self.items())
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for OutputBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}
