//! Rolling frames-per-second estimate.

use std::time::Instant;

use super::window::SlidingWindow;

/// Default number of frame timestamps kept.
pub const DEFAULT_FPS_WINDOW: usize = 40;

/// Added to the span so the first sample never divides by zero.
const SPAN_EPSILON_SECS: f64 = 0.001;

/// Frame-rate tracker over a bounded history of timestamps.
///
/// Rate = `samples / (newest - oldest + 0.001 s)`.  Timestamps are expected to
/// be monotonic; `Instant` guarantees that for real clocks.
#[derive(Debug, Clone)]
pub struct FrameRateTracker {
    frame_times: SlidingWindow<Instant>,
}

impl FrameRateTracker {
    pub fn new(window: usize) -> Self {
        Self {
            frame_times: SlidingWindow::new(window),
        }
    }

    /// Record that a frame finished processing at `now`.
    pub fn record(&mut self, now: Instant) {
        self.frame_times.push(now);
    }

    /// Current estimate in frames per second, `0.0` before any frame.
    pub fn current_rate(&self) -> f64 {
        let (Some(oldest), Some(newest)) = (self.frame_times.oldest(), self.frame_times.newest())
        else {
            return 0.0;
        };
        let span = newest.saturating_duration_since(*oldest).as_secs_f64();
        self.frame_times.len() as f64 / (span + SPAN_EPSILON_SECS)
    }

    pub fn samples(&self) -> usize {
        self.frame_times.len()
    }
}

impl Default for FrameRateTracker {
    fn default() -> Self {
        Self::new(DEFAULT_FPS_WINDOW)
    }
}
