//! Round-robin cursor.
//!
//! Walks the feasible-node list using an atomic counter. Lock-free and
//! safe for concurrent access.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Selects indices into the feasible set, one step per call.
///
/// The counter is shared across calls and wraps modulo whatever set size
/// the caller passes, so a shrinking or growing feasible set is fine.
#[derive(Debug, Default)]
pub struct RoundRobinCursor {
    counter: AtomicUsize,
}

impl RoundRobinCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance once and return the index, or `None` for an empty set.
    pub fn next(&self, count: usize) -> Option<usize> {
        if count == 0 {
            return None;
        }
        let idx = self.counter.fetch_add(1, Ordering::Relaxed);
        Some(idx % count)
    }

    pub fn reset(&self) {
        self.counter.store(0, Ordering::Relaxed);
    }

    /// Number of selections made so far.
    pub fn current(&self) -> usize {
        self.counter.load(Ordering::Relaxed)
    }
}
