//! Edge-triggered button debouncing.
//!
//! Each [`ButtonChannel`] reports `true` exactly once per physical press:
//!
//! * raw `false` → report `false`; the timestamp is **not** touched.
//! * raw `true`  → report `true` only if the previous report was `false`
//!   **and** more than `interval` has passed since this channel was last
//!   seen pressed.  The timestamp is refreshed on every pressed poll.
//!
//! Because releases leave the timestamp alone, a release followed by a
//! re-press inside `interval` is reported as `false`: contact chatter never
//! produces a second event.  Holding a button yields one `true` pulse and
//! then `false` for as long as it stays down.

use std::time::{Duration, Instant};

/// Default minimum spacing between two presses of the same button.
pub const DEFAULT_DEBOUNCE_INTERVAL: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// ButtonChannel
// ---------------------------------------------------------------------------

/// Debounce state of one physical button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonChannel {
    /// Value reported on the previous poll.
    reported: bool,
    /// Last poll at which the raw input was high.
    last_pressed_at: Instant,
}

impl ButtonChannel {
    fn new(now: Instant) -> Self {
        Self {
            reported: false,
            last_pressed_at: now,
        }
    }

    fn update(&mut self, raw: bool, now: Instant, interval: Duration) -> bool {
        if !raw {
            self.reported = false;
            return false;
        }

        let quiet_for = now.saturating_duration_since(self.last_pressed_at);
        let pressed = quiet_for > interval && !self.reported;
        if !pressed && !self.reported {
            log::trace!("debounce: press {quiet_for:?} after the last one ignored");
        }
        self.reported = pressed;
        self.last_pressed_at = now;
        pressed
    }

    /// Value reported on the most recent poll.
    pub fn reported(&self) -> bool {
        self.reported
    }
}

// ---------------------------------------------------------------------------
// ButtonDebouncer
// ---------------------------------------------------------------------------

/// Debounces a fixed set of button channels.
///
/// # Example
///
/// ```rust
/// use std::time::{Duration, Instant};
/// use teachable_machine::input::ButtonDebouncer;
///
/// let start = Instant::now();
/// let mut debouncer = ButtonDebouncer::new(2, Duration::from_millis(100), start);
///
/// let t = start + Duration::from_secs(1);
/// assert_eq!(debouncer.update(&[true, false], t), vec![true, false]);
/// // Still held: no second event.
/// assert_eq!(debouncer.update(&[true, false], t + Duration::from_millis(200)), vec![false, false]);
/// ```
#[derive(Debug, Clone)]
pub struct ButtonDebouncer {
    channels: Vec<ButtonChannel>,
    interval: Duration,
}

impl ButtonDebouncer {
    /// Create `count` channels whose last-pressed timestamps start at `now`.
    ///
    /// Presses within `interval` of construction are therefore suppressed.
    pub fn new(count: usize, interval: Duration, now: Instant) -> Self {
        Self {
            channels: vec![ButtonChannel::new(now); count],
            interval,
        }
    }

    /// Feed one poll of raw levels and return the press events.
    ///
    /// # Panics
    ///
    /// Panics if `raw.len()` differs from the channel count; that is a wiring
    /// bug, not a runtime condition.
    pub fn update(&mut self, raw: &[bool], now: Instant) -> Vec<bool> {
        assert_eq!(
            raw.len(),
            self.channels.len(),
            "raw button count does not match debouncer channel count"
        );

        let interval = self.interval;
        self.channels
            .iter_mut()
            .zip(raw)
            .map(|(channel, &level)| channel.update(level, now, interval))
            .collect()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channel(&self, index: usize) -> Option<&ButtonChannel> {
        self.channels.get(index)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(50);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// Debouncer with one channel whose last press was long enough ago.
    fn single() -> (ButtonDebouncer, Instant) {
        let start = Instant::now();
        let debouncer = ButtonDebouncer::new(1, DEFAULT_DEBOUNCE_INTERVAL, start);
        (debouncer, start + Duration::from_secs(1))
    }

    // ---- Edge triggering ---------------------------------------------------

    #[test]
    fn holding_reports_exactly_one_press() {
        let (mut debouncer, t0) = single();

        let events: Vec<bool> = (0..10)
            .map(|i| debouncer.update(&[true], t0 + TICK * i)[0])
            .collect();

        assert!(events[0]);
        assert!(events[1..].iter().all(|&e| !e));
    }

    #[test]
    fn release_reports_false_immediately() {
        let (mut debouncer, t0) = single();
        assert_eq!(debouncer.update(&[true], t0), vec![true]);
        assert_eq!(debouncer.update(&[false], t0 + ms(10)), vec![false]);
        assert!(!debouncer.channel(0).unwrap().reported());
    }

    #[test]
    fn slow_second_press_is_reported() {
        let (mut debouncer, t0) = single();
        assert_eq!(debouncer.update(&[true], t0), vec![true]);
        assert_eq!(debouncer.update(&[false], t0 + ms(50)), vec![false]);
        assert_eq!(debouncer.update(&[true], t0 + ms(300)), vec![true]);
    }

    // ---- Chatter suppression -----------------------------------------------

    #[test]
    fn quick_repress_after_release_is_suppressed() {
        let (mut debouncer, t0) = single();
        assert_eq!(debouncer.update(&[true], t0), vec![true]);
        assert_eq!(debouncer.update(&[false], t0 + ms(20)), vec![false]);
        // 60 ms after the last pressed observation: inside the interval.
        assert_eq!(debouncer.update(&[true], t0 + ms(60)), vec![false]);
    }

    #[test]
    fn suppressed_repress_refreshes_the_timestamp() {
        let (mut debouncer, t0) = single();
        debouncer.update(&[true], t0);
        debouncer.update(&[false], t0 + ms(20));
        assert_eq!(debouncer.update(&[true], t0 + ms(80)), vec![false]);
        debouncer.update(&[false], t0 + ms(100));
        // 150 ms after the first press but only 70 ms after the suppressed one.
        assert_eq!(debouncer.update(&[true], t0 + ms(150)), vec![false]);
    }

    #[test]
    fn press_right_after_construction_is_suppressed() {
        let start = Instant::now();
        let mut debouncer = ButtonDebouncer::new(1, DEFAULT_DEBOUNCE_INTERVAL, start);
        assert_eq!(debouncer.update(&[true], start + ms(50)), vec![false]);
    }

    #[test]
    fn press_exactly_at_interval_is_suppressed() {
        // The elapsed time must be strictly greater than the interval.
        let start = Instant::now();
        let mut debouncer = ButtonDebouncer::new(1, DEFAULT_DEBOUNCE_INTERVAL, start);
        assert_eq!(debouncer.update(&[true], start + ms(100)), vec![false]);
    }

    #[test]
    fn chatter_burst_yields_one_press() {
        let (mut debouncer, t0) = single();
        let levels = [true, false, true, false, true, true, false, true];
        let events: Vec<bool> = levels
            .iter()
            .enumerate()
            .map(|(i, &level)| debouncer.update(&[level], t0 + ms(15) * i as u32)[0])
            .collect();

        assert_eq!(events.iter().filter(|&&e| e).count(), 1);
        assert!(events[0]);
    }

    // ---- Channels are independent ------------------------------------------

    #[test]
    fn channels_are_debounced_independently() {
        let start = Instant::now();
        let mut debouncer = ButtonDebouncer::new(3, DEFAULT_DEBOUNCE_INTERVAL, start);
        let t0 = start + Duration::from_secs(1);

        assert_eq!(debouncer.update(&[true, false, true], t0), vec![true, false, true]);
        assert_eq!(
            debouncer.update(&[true, true, false], t0 + ms(10)),
            vec![false, true, false]
        );
        assert_eq!(debouncer.channel_count(), 3);
    }

    // ---- Fail fast ---------------------------------------------------------

    #[test]
    #[should_panic(expected = "raw button count does not match")]
    fn mismatched_channel_count_panics() {
        let (mut debouncer, t0) = single();
        debouncer.update(&[true, false], t0);
    }
}
