//! In-memory [`HardwareUi`] used by unit tests.

use super::HardwareUi;

/// Buttons are set by the test; LED writes are recorded.
#[derive(Debug, Clone)]
pub struct MockUi {
    buttons: Vec<bool>,
    leds: Vec<bool>,
    writes: Vec<(usize, bool)>,
}

impl MockUi {
    /// A board with `channels` buttons and as many LEDs.
    pub fn new(channels: usize) -> Self {
        Self {
            buttons: vec![false; channels],
            leds: vec![false; channels],
            writes: Vec::new(),
        }
    }

    pub fn press(&mut self, index: usize) {
        self.buttons[index] = true;
    }

    pub fn set_buttons(&mut self, levels: &[bool]) {
        self.buttons.copy_from_slice(levels);
    }

    pub fn leds(&self) -> &[bool] {
        &self.leds
    }

    /// The single lit LED, `None` when all are dark or several are lit.
    pub fn lit_led(&self) -> Option<usize> {
        let mut lit = self.leds.iter().enumerate().filter(|(_, &on)| on);
        match (lit.next(), lit.next()) {
            (Some((i, _)), None) => Some(i),
            _ => None,
        }
    }

    pub fn led_writes(&self) -> &[(usize, bool)] {
        &self.writes
    }
}

impl HardwareUi for MockUi {
    fn button_count(&self) -> usize {
        self.buttons.len()
    }

    fn led_count(&self) -> usize {
        self.leds.len()
    }

    fn read_raw_button(&self, index: usize) -> bool {
        self.buttons[index]
    }

    fn set_led(&mut self, index: usize, on: bool) {
        self.leds[index] = on;
        self.writes.push((index, on));
    }
}
