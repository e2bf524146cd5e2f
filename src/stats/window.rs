//! Fixed-capacity FIFO window used for label history and frame timestamps.
//!
//! When the window is full, a push **evicts the oldest entry** so that the
//! most-recent `capacity` values are always available in insertion order.
//!
//! # Example
//!
//! ```rust
//! use teachable_machine::stats::SlidingWindow;
//!
//! let mut window = SlidingWindow::new(4);
//! for v in [1, 2, 3, 4, 5] {
//!     window.push(v); // 5 items → capacity 4 → oldest dropped
//! }
//! assert_eq!(window.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4, 5]);
//! ```

use std::collections::VecDeque;

// ---------------------------------------------------------------------------
// SlidingWindow
// ---------------------------------------------------------------------------

/// A bounded, insertion-ordered sequence.
///
/// Capacity is fixed at construction and the window never grows beyond it.
#[derive(Debug, Clone)]
pub struct SlidingWindow<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> SlidingWindow<T> {
    /// Create an empty window holding at most `capacity` values.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "SlidingWindow capacity must be > 0");
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `value`, evicting the oldest entry if the window is full.
    ///
    /// Returns the evicted value, if any.
    pub fn push(&mut self, value: T) -> Option<T> {
        let evicted = if self.items.len() == self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(value);
        evicted
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter()
    }

    pub fn oldest(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn newest(&self) -> Option<&T> {
        self.items.back()
    }

    /// Number of values currently stored.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` when the window holds no values.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
