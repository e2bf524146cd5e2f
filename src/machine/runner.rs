//! The classification loop.
//!
//! [`TeachableMachine`] is the [`FrameHandler`] the media pipeline drives.
//! Every frame runs the same fixed sequence:
//!
//! ```text
//! embed ─▶ kNN label ─▶ smoother ─▶ classification
//!      ─▶ read buttons ─▶ debounce ─▶ reset / add examples
//!      ─▶ shutdown chord? ──yes──▶ stop
//!                       └─no──▶ fps ─▶ LED + status (+ overlay) ─▶ continue
//! ```
//!
//! Buttons are read after classification, so examples taught on a frame
//! only affect the next one.  The machine is the only writer of its state
//! and is never re-entered.

use std::time::Instant;

use crate::camera::{Frame, FrameHandler, OverlaySink};
use crate::config::MachineConfig;
use crate::engine::{EmbeddingEngine, EngineError};
use crate::input::{ButtonDebouncer, CLASS_BUTTONS, RESET_BUTTON};
use crate::stats::{FrameRateTracker, LabelSmoother};
use crate::ui::HardwareUi;

use super::state::{ShutdownFlag, Status};

/// Class buttons 1-4 all pressed in one frame while reset is not.
///
/// ```
/// use teachable_machine::machine::shutdown_requested;
///
/// assert!(shutdown_requested(&[false, true, true, true, true]));
/// assert!(!shutdown_requested(&[true, true, true, true, true]));
/// assert!(!shutdown_requested(&[false, true, true, true, false]));
/// ```
pub fn shutdown_requested(pressed: &[bool]) -> bool {
    let is_pressed = |i: usize| pressed.get(i).copied().unwrap_or(false);
    !is_pressed(RESET_BUTTON) && CLASS_BUTTONS.all(is_pressed)
}

// ---------------------------------------------------------------------------
// TeachableMachine
// ---------------------------------------------------------------------------

pub struct TeachableMachine<E, U> {
    engine: E,
    ui: U,
    smoother: LabelSmoother<Option<usize>>,
    debouncer: ButtonDebouncer,
    fps: FrameRateTracker,
    class_names: Vec<String>,
    shutdown: ShutdownFlag,
    last_status: Option<Status>,
}

impl<E: EmbeddingEngine, U: HardwareUi> TeachableMachine<E, U> {
    /// Debounce timing starts now.
    pub fn new(engine: E, ui: U, config: &MachineConfig) -> Self {
        Self::with_start(engine, ui, config, Instant::now())
    }

    /// As [`new`](Self::new) with an explicit start time.
    pub fn with_start(engine: E, ui: U, config: &MachineConfig, start: Instant) -> Self {
        let debouncer = ButtonDebouncer::new(ui.button_count(), config.debounce_interval(), start);
        Self {
            engine,
            ui,
            smoother: LabelSmoother::new(config.buffer_length),
            debouncer,
            fps: FrameRateTracker::new(config.fps_window),
            class_names: config.class_names.clone(),
            shutdown: ShutdownFlag::default(),
            last_status: None,
        }
    }

    /// Run one frame of the loop at time `now`.  Returns `true` when the
    /// shutdown chord was pressed.
    ///
    /// # Errors
    ///
    /// Embedding failures are returned as-is; nothing has been mutated
    /// when that happens.
    pub fn process_frame(
        &mut self,
        frame: &Frame,
        overlay: Option<&mut dyn OverlaySink>,
        now: Instant,
    ) -> Result<bool, EngineError> {
        let embedding = self.engine.embed(frame)?;
        let classification = self.smoother.smooth(self.engine.knn_label(&embedding));

        let pressed = self.debouncer.update(&self.ui.raw_buttons(), now);
        for (channel, _) in pressed.iter().enumerate().filter(|(_, &p)| p) {
            if channel == RESET_BUTTON {
                self.engine.clear();
                log::info!("machine: examples cleared");
            } else {
                self.engine.add_example(embedding.clone(), channel);
                log::info!(
                    "machine: example added to class {channel} ({} total)",
                    self.engine.example_count()
                );
            }
        }

        if shutdown_requested(&pressed) {
            self.shutdown.set();
            log::info!("machine: shutdown requested");
            return Ok(true);
        }

        self.fps.record(now);

        self.ui.set_only_led(classification);
        let status = Status {
            fps: self.fps.current_rate(),
            example_count: self.engine.example_count(),
            class_name: self.class_name(classification).to_string(),
        };
        log::info!("{status}");
        if let Some(sink) = overlay {
            sink.set_overlay(&status.to_svg());
        }
        self.last_status = Some(status);

        Ok(false)
    }

    fn class_name(&self, classification: Option<usize>) -> &str {
        self.class_names
            .get(classification.unwrap_or(0))
            .map(String::as_str)
            .unwrap_or("?")
    }

    /// `true` once the shutdown chord has ended the loop.
    pub fn clean_shutdown(&self) -> bool {
        self.shutdown.is_set()
    }

    /// Status rendered for the most recent completed frame.
    pub fn last_status(&self) -> Option<&Status> {
        self.last_status.as_ref()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }

    /// Give the hardware back, e.g. for the closing LED sequence.
    pub fn into_ui(self) -> U {
        self.ui
    }
}

impl<E: EmbeddingEngine, U: HardwareUi> FrameHandler for TeachableMachine<E, U> {
    fn on_frame(
        &mut self,
        frame: &Frame,
        overlay: Option<&mut dyn OverlaySink>,
    ) -> Result<bool, EngineError> {
        self.process_frame(frame, overlay, Instant::now())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::camera::{solid_frame, FrameSource, RecordingOverlay, ScriptedSource, StopReason};
    use crate::engine::{KnnEmbeddingEngine, MockEmbedder, DEFAULT_K};
    use crate::interrupt::Interrupt;
    use crate::ui::MockUi;

    type Machine = TeachableMachine<KnnEmbeddingEngine<MockEmbedder>, MockUi>;

    const RED: [u8; 3] = [240, 20, 20];
    const BLUE: [u8; 3] = [20, 20, 240];

    /// Machine created at `start`; frames are fed at `start + 1s + n * 200ms`
    /// so every fresh press clears the debounce interval.
    struct Harness {
        machine: Machine,
        start: Instant,
        frames: u32,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_embedder(MockEmbedder::new())
        }

        fn with_embedder(embedder: MockEmbedder) -> Self {
            let start = Instant::now();
            let engine = KnnEmbeddingEngine::new(embedder, DEFAULT_K);
            let machine = TeachableMachine::with_start(
                engine,
                MockUi::new(5),
                &MachineConfig::default(),
                start,
            );
            Self {
                machine,
                start,
                frames: 0,
            }
        }

        fn now(&self) -> Instant {
            self.start + Duration::from_secs(1) + Duration::from_millis(200) * self.frames
        }

        /// Set the raw buttons, process one frame, release everything.
        fn frame(&mut self, rgb: [u8; 3], buttons: &[bool]) -> bool {
            self.machine.ui_mut().set_buttons(buttons);
            let now = self.now();
            self.frames += 1;
            let stop = self
                .machine
                .process_frame(&solid_frame(rgb), None, now)
                .expect("frame");
            self.machine.ui_mut().set_buttons(&[false; 5]);
            stop
        }

        fn examples(&self) -> usize {
            self.machine.engine().example_count()
        }

        fn lit_led(&mut self) -> Option<usize> {
            self.machine.ui_mut().lit_led()
        }
    }

    fn press(channels: &[usize]) -> [bool; 5] {
        let mut levels = [false; 5];
        for &c in channels {
            levels[c] = true;
        }
        levels
    }

    // ---- shutdown_requested ---

    #[test]
    fn shutdown_needs_all_four_class_buttons_and_no_reset() {
        assert!(shutdown_requested(&press(&[1, 2, 3, 4])));
        assert!(!shutdown_requested(&press(&[0, 1, 2, 3, 4])));
        assert!(!shutdown_requested(&press(&[1, 2, 3])));
        assert!(!shutdown_requested(&press(&[])));
    }

    // ---- teaching ---

    #[test]
    fn no_examples_leaves_every_led_dark() {
        let mut h = Harness::new();
        assert!(!h.frame(RED, &press(&[])));
        assert_eq!(h.lit_led(), None);
        let status = h.machine.last_status().unwrap();
        assert_eq!(status.example_count, 0);
        assert_eq!(status.class_name, "--");
    }

    #[test]
    fn class_button_adds_current_embedding() {
        let mut h = Harness::new();
        h.frame(RED, &press(&[2]));
        assert_eq!(h.examples(), 1);

        // Window [None, 2] ties and the older label wins.
        h.frame(RED, &press(&[]));
        assert_eq!(h.lit_led(), None);

        h.frame(RED, &press(&[]));
        assert_eq!(h.lit_led(), Some(2));
        assert_eq!(h.machine.last_status().unwrap().class_name, "Orange");
    }

    #[test]
    fn classification_uses_examples_before_this_frames_presses() {
        let mut h = Harness::new();
        h.frame(RED, &press(&[3]));
        assert_eq!(h.examples(), 1);
        assert_eq!(h.lit_led(), None);
    }

    #[test]
    fn reset_clears_examples_without_adding_one() {
        let mut h = Harness::new();
        h.frame(RED, &press(&[1]));
        h.frame(BLUE, &press(&[4]));
        assert_eq!(h.examples(), 2);

        h.frame(RED, &press(&[0]));
        assert_eq!(h.examples(), 0);
    }

    #[test]
    fn reset_with_class_buttons_applies_in_channel_order() {
        let mut h = Harness::new();
        h.frame(RED, &press(&[1]));
        h.frame(RED, &press(&[0, 2]));
        // Cleared first, then channel 2 added.
        assert_eq!(h.examples(), 1);
    }

    #[test]
    fn held_button_teaches_once() {
        // 30 fps: each poll lands well inside the debounce interval.
        let mut h = Harness::new();
        let first = h.now();
        h.machine.ui_mut().press(1);
        for n in 0..5 {
            let now = first + Duration::from_millis(33) * n;
            h.machine
                .process_frame(&solid_frame(RED), None, now)
                .unwrap();
        }
        assert_eq!(h.examples(), 1);
    }

    #[test]
    fn smoothed_led_follows_the_majority() {
        let mut h = Harness::new();
        h.frame(RED, &press(&[1]));
        h.frame(BLUE, &press(&[4]));

        for _ in 0..4 {
            h.frame(BLUE, &press(&[]));
        }
        assert_eq!(h.lit_led(), Some(4));

        // One red frame does not flip a window of blues.
        h.frame(RED, &press(&[]));
        assert_eq!(h.lit_led(), Some(4));
    }

    // ---- shutdown ---

    #[test]
    fn shutdown_chord_stops_and_sets_flag() {
        let mut h = Harness::new();
        assert!(h.frame(RED, &press(&[1, 2, 3, 4])));
        assert!(h.machine.clean_shutdown());
        // The class presses of the chord frame were still applied.
        assert_eq!(h.examples(), 4);
    }

    #[test]
    fn shutdown_frame_skips_status() {
        let mut h = Harness::new();
        h.frame(RED, &press(&[1, 2, 3, 4]));
        assert!(h.machine.last_status().is_none());
        assert!(h.machine.ui_mut().led_writes().is_empty());
    }

    #[test]
    fn reset_held_blocks_shutdown() {
        let mut h = Harness::new();
        assert!(!h.frame(RED, &press(&[0, 1, 2, 3, 4])));
        assert!(!h.machine.clean_shutdown());
    }

    #[test]
    fn three_class_buttons_do_not_shut_down() {
        let mut h = Harness::new();
        assert!(!h.frame(RED, &press(&[1, 2, 3])));
        assert!(!h.machine.clean_shutdown());
    }

    // ---- status / overlay ---

    #[test]
    fn overlay_receives_status_svg() {
        let mut h = Harness::new();
        let mut overlay = RecordingOverlay::default();
        let now = h.now();
        h.machine
            .process_frame(&solid_frame(RED), Some(&mut overlay), now)
            .unwrap();

        assert_eq!(overlay.documents.len(), 1);
        assert!(overlay.documents[0].contains("#examples: 0; Class      --"));
    }

    #[test]
    fn fps_reflects_frame_spacing() {
        let mut h = Harness::new();
        h.frame(RED, &press(&[]));
        h.frame(RED, &press(&[]));
        // two frames 200 ms apart: 2 / 0.201
        let fps = h.machine.last_status().unwrap().fps;
        assert!((fps - 2.0 / 0.201).abs() < 1e-6, "fps = {fps}");
    }

    // ---- errors ---

    #[test]
    fn embedding_failure_is_returned_without_side_effects() {
        let mut h = Harness::with_embedder(MockEmbedder::failing(EngineError::Inference(
            "tensor".into(),
        )));
        h.machine.ui_mut().press(1);
        let now = h.now();
        let err = h
            .machine
            .process_frame(&solid_frame(RED), None, now)
            .unwrap_err();
        assert!(matches!(err, EngineError::Inference(_)));
        assert!(h.machine.ui_mut().led_writes().is_empty());
    }

    // ---- driven by a frame source ---

    #[test]
    fn scripted_source_runs_until_end_of_stream() {
        let engine = KnnEmbeddingEngine::new(MockEmbedder::new(), DEFAULT_K);
        let mut machine = TeachableMachine::new(engine, MockUi::new(5), &MachineConfig::default());
        let mut source = ScriptedSource::new(vec![solid_frame(RED); 3]);

        let reason = source.run(&mut machine, &Interrupt::new()).unwrap();

        assert_eq!(reason, StopReason::EndOfStream);
        assert_eq!(source.overlay.documents.len(), 3);
        assert!(!machine.clean_shutdown());
    }

    #[test]
    fn scripted_source_stops_on_interrupt() {
        let engine = KnnEmbeddingEngine::new(MockEmbedder::new(), DEFAULT_K);
        let mut machine = TeachableMachine::new(engine, MockUi::new(5), &MachineConfig::default());
        let mut source = ScriptedSource::new(vec![solid_frame(RED); 3]);
        let interrupt = Interrupt::new();
        interrupt.trigger();

        let reason = source.run(&mut machine, &interrupt).unwrap();

        assert_eq!(reason, StopReason::Interrupted);
        assert!(source.overlay.documents.is_empty());
    }
}
