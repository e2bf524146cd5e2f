//! Streaming statistics for the frame loop.
//!
//! ```text
//! per-frame kNN label ──▶ LabelSmoother (SlidingWindow + most_common) ──▶ smoothed label
//! frame timestamp     ──▶ FrameRateTracker (SlidingWindow<Instant>)   ──▶ fps
//! ```

pub mod fps;
pub mod smoother;
pub mod vote;
pub mod window;

pub use fps::{FrameRateTracker, DEFAULT_FPS_WINDOW};
pub use smoother::{LabelSmoother, DEFAULT_BUFFER_LENGTH};
pub use vote::most_common;
pub use window::SlidingWindow;
