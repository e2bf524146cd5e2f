//! External interrupt (Ctrl-C) shared with the blocking loops.
//!
//! `main` triggers the [`Interrupt`] from a tokio signal task.  The media
//! pipeline and the UI test loop poll it and wind down on their own thread,
//! so hardware cleanup still runs through the normal `Drop` path.  An
//! interrupt is never a clean shutdown: the process exits non-zero.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Cheap-to-clone flag; every clone observes the same trigger.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    triggered: Arc<AtomicBool>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the running loop stop.
    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::Relaxed);
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::Relaxed)
    }
}
