//! Raspberry Pi board via `rppal`.
//!
//! Wiring (BCM numbering, configurable through [`BoardConfig`]):
//!
//! | Channel | Button | LED |
//! |---------|--------|-----|
//! | 0 reset | 5      | 25  |
//! | 1       | 6      | 12  |
//! | 2       | 13     | 16  |
//! | 3       | 19     | 20  |
//! | 4       | 26     | 21  |
//!
//! Buttons pull the input high when pressed (internal pull-down enabled).

use rppal::gpio::{Gpio, InputPin, Level, OutputPin};

use crate::config::BoardConfig;
use crate::input::CHANNEL_COUNT;

use super::{HardwareUi, UiError};

// ---------------------------------------------------------------------------
// GpioSession
// ---------------------------------------------------------------------------

/// Owned handle to the GPIO peripheral.
///
/// Created once in `main` and handed to the adapter at construction.  Pins
/// taken from it are reset by `rppal` when dropped, so cleanup happens on
/// every exit path that unwinds normally.
pub struct GpioSession {
    gpio: Gpio,
}

impl GpioSession {
    pub fn open() -> Result<Self, UiError> {
        Ok(Self { gpio: Gpio::new()? })
    }
}

// ---------------------------------------------------------------------------
// RaspberryUi
// ---------------------------------------------------------------------------

pub struct RaspberryUi {
    buttons: Vec<InputPin>,
    leds: Vec<OutputPin>,
    led_active_low: bool,
}

impl RaspberryUi {
    /// Claim the configured pins and switch every LED off.
    ///
    /// # Errors
    ///
    /// - [`UiError::PinCount`]: the config does not list five pins each.
    /// - [`UiError::Gpio`]: a pin is busy or the peripheral is absent.
    pub fn new(session: &GpioSession, config: &BoardConfig) -> Result<Self, UiError> {
        check_pin_count("button", &config.button_pins)?;
        check_pin_count("LED", &config.led_pins)?;

        let buttons = config
            .button_pins
            .iter()
            .map(|&pin| Ok(session.gpio.get(pin)?.into_input_pulldown()))
            .collect::<Result<Vec<_>, UiError>>()?;

        let leds = config
            .led_pins
            .iter()
            .map(|&pin| {
                let pin = session.gpio.get(pin)?;
                // Start dark.
                Ok(if config.led_active_low {
                    pin.into_output_high()
                } else {
                    pin.into_output_low()
                })
            })
            .collect::<Result<Vec<_>, UiError>>()?;

        log::debug!(
            "ui: buttons on {:?}, LEDs on {:?}",
            config.button_pins,
            config.led_pins
        );

        Ok(Self {
            buttons,
            leds,
            led_active_low: config.led_active_low,
        })
    }
}

fn check_pin_count(what: &'static str, pins: &[u8]) -> Result<(), UiError> {
    if pins.len() != CHANNEL_COUNT {
        return Err(UiError::PinCount {
            what,
            expected: CHANNEL_COUNT,
            actual: pins.len(),
        });
    }
    Ok(())
}

impl HardwareUi for RaspberryUi {
    fn button_count(&self) -> usize {
        self.buttons.len()
    }

    fn led_count(&self) -> usize {
        self.leds.len()
    }

    fn read_raw_button(&self, index: usize) -> bool {
        self.buttons[index].is_high()
    }

    fn set_led(&mut self, index: usize, on: bool) {
        let level = if on != self.led_active_low {
            Level::High
        } else {
            Level::Low
        };
        self.leds[index].write(level);
    }
}

impl Drop for RaspberryUi {
    fn drop(&mut self) {
        self.set_only_led(None);
    }
}
