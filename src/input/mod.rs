//! Button input processing.
//!
//! The hardware adapter ([`crate::ui::HardwareUi`]) only exposes raw,
//! possibly chattering levels.  [`ButtonDebouncer`] turns one poll of those
//! levels into per-channel press events for the frame loop.

pub mod debounce;

pub use debounce::{ButtonChannel, ButtonDebouncer, DEFAULT_DEBOUNCE_INTERVAL};

/// Channel reserved for the reset control.
pub const RESET_BUTTON: usize = 0;

/// Channels that each teach one class.
pub const CLASS_BUTTONS: std::ops::RangeInclusive<usize> = 1..=4;

/// Total number of button (and LED) channels on a board.
pub const CHANNEL_COUNT: usize = 5;
