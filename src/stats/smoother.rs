//! Label smoother: majority vote over the last N per-frame classifications.
//!
//! Single-frame misclassifications make the LEDs flicker; voting over a short
//! history suppresses that.  Ties resolve to the label that appears first
//! when scanning the window from oldest to newest (see [`most_common`]).

use super::vote::most_common;
use super::window::SlidingWindow;

/// Default number of frames voted over.
pub const DEFAULT_BUFFER_LENGTH: usize = 4;

/// Bounded history of raw labels plus the vote over it.
///
/// `L` is usually `Option<usize>` where `None` means "no example yet"; that
/// value takes part in voting like any other.
///
/// # Example
///
/// ```rust
/// use teachable_machine::stats::LabelSmoother;
///
/// let mut smoother = LabelSmoother::new(4);
/// for label in ['B', 'A', 'A', 'B'] {
///     smoother.push(label);
/// }
/// assert_eq!(smoother.current_label(), Some('B'));
/// ```
#[derive(Debug, Clone)]
pub struct LabelSmoother<L> {
    history: SlidingWindow<L>,
}

impl<L: Clone + PartialEq> LabelSmoother<L> {
    /// Create a smoother that votes over the last `buffer_length` labels.
    ///
    /// # Panics
    ///
    /// Panics if `buffer_length == 0`.
    pub fn new(buffer_length: usize) -> Self {
        Self {
            history: SlidingWindow::new(buffer_length),
        }
    }

    /// Record one frame's raw label, evicting the oldest when full.
    pub fn push(&mut self, label: L) {
        self.history.push(label);
    }

    /// The winning label of the current window, `None` before the first push.
    pub fn current_label(&self) -> Option<L> {
        most_common(self.history.iter().cloned())
    }

    /// Push `label` and return the smoothed result in one step.
    pub fn smooth(&mut self, label: L) -> L {
        self.push(label.clone());
        // The window cannot be empty right after a push.
        self.current_label().unwrap_or(label)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

impl<L: Clone + PartialEq> Default for LabelSmoother<L> {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_LENGTH)
    }
}
