//! Hardware UI: five buttons and five LEDs.
//!
//! # Architecture
//!
//! ```text
//!   BoardKind (config) ──resolve_board()──▶ Board
//!                                            │
//!          GpioSession (owned by main) ──────┤
//!                                            ▼
//!                                   RaspberryUi: HardwareUi
//!                                            │
//!        read_raw_button / set_led / set_only_led / wiggle
//!                                            │
//!                                            ▼
//!                                   TeachableMachine (frame loop)
//! ```
//!
//! The frame loop is generic over [`HardwareUi`], so the concrete board is
//! fixed once at startup from configuration and never dispatched at runtime.
//! Channel 0 is the reset button/LED; channels 1–4 are the class controls.

pub mod platform;
#[cfg(feature = "raspberry")]
pub mod raspberry;

#[cfg(test)]
pub mod mock;

use std::time::Duration;

use thiserror::Error;

use crate::interrupt::Interrupt;

pub use platform::{detect_platform, detect_platform_from, resolve_board, Board, Platform};
#[cfg(feature = "raspberry")]
pub use raspberry::{GpioSession, RaspberryUi};

#[cfg(test)]
pub use mock::MockUi;

/// How long each LED stays lit during [`HardwareUi::wiggle`].
const WIGGLE_STEP: Duration = Duration::from_millis(50);

/// Poll period of [`HardwareUi::test_buttons`].
const TEST_POLL: Duration = Duration::from_millis(10);

// ---------------------------------------------------------------------------
// UiError
// ---------------------------------------------------------------------------

/// Errors raised while bringing up the hardware UI.  All of them are fatal
/// at startup; nothing in the frame loop can fail at the GPIO level.
#[derive(Debug, Error)]
pub enum UiError {
    #[error("Unsupported platform: {0}. This demo is for Raspberry Pi.")]
    UnsupportedPlatform(String),

    #[error("{board} support is not compiled in (enable the `{feature}` feature)")]
    NotCompiled {
        board: &'static str,
        feature: &'static str,
    },

    #[error("expected {expected} {what} pins, got {actual}")]
    PinCount {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[cfg(feature = "raspberry")]
    #[error("GPIO error: {0}")]
    Gpio(#[from] rppal::gpio::Error),
}

// ---------------------------------------------------------------------------
// HardwareUi trait
// ---------------------------------------------------------------------------

/// Buttons and LEDs of one board.
///
/// Implementors supply the four primitives; the convenience operations are
/// provided on top of them.  Indices out of range are programming errors and
/// may panic.
pub trait HardwareUi {
    fn button_count(&self) -> usize;

    fn led_count(&self) -> usize;

    /// Current (undebounced) level of button `index`; `true` = pressed.
    fn read_raw_button(&self, index: usize) -> bool;

    /// Light (`true`) or darken LED `index`.
    fn set_led(&mut self, index: usize, on: bool);

    /// Turn every LED off, then light `index` if given.
    fn set_only_led(&mut self, index: Option<usize>) {
        for i in 0..self.led_count() {
            self.set_led(i, false);
        }
        if let Some(i) = index.filter(|&i| i < self.led_count()) {
            self.set_led(i, true);
        }
    }

    /// Raw levels of every button, in channel order.
    fn raw_buttons(&self) -> Vec<bool> {
        (0..self.button_count())
            .map(|i| self.read_raw_button(i))
            .collect()
    }

    /// Start-up / shut-down self test: run a light along the LEDs `reps`
    /// times.
    fn wiggle(&mut self, reps: usize) {
        for _ in 0..reps {
            for i in 0..self.led_count() {
                self.set_led(i, true);
                std::thread::sleep(WIGGLE_STEP);
                self.set_led(i, false);
            }
        }
    }

    /// Mirror every button onto its LED and log pressed buttons until
    /// `interrupt` fires.
    fn test_buttons(&mut self, interrupt: &Interrupt) {
        let channels = self.button_count().min(self.led_count());
        while !interrupt.is_triggered() {
            let levels = self.raw_buttons();
            for (i, &pressed) in levels.iter().enumerate().take(channels) {
                self.set_led(i, pressed);
            }
            let pressed: Vec<String> = levels
                .iter()
                .enumerate()
                .filter(|(_, &p)| p)
                .map(|(i, _)| i.to_string())
                .collect();
            log::info!("Buttons: {}", pressed.join(" "));
            std::thread::sleep(TEST_POLL);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
