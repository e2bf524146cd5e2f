//! Classification orchestrator.
//!
//! # Architecture
//!
//! ```text
//! FrameSource (camera)
//!        │ frame
//!        ▼
//! TeachableMachine::on_frame()
//!        ├─ EmbeddingEngine::embed / knn_label ─▶ LabelSmoother
//!        ├─ HardwareUi::raw_buttons ─▶ ButtonDebouncer
//!        ├─ reset / add_example
//!        ├─ shutdown chord ─▶ ShutdownFlag, stop
//!        └─ FrameRateTracker ─▶ Status ─▶ LED, log, overlay
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use teachable_machine::camera::{self, FrameSource};
//! use teachable_machine::config::AppConfig;
//! use teachable_machine::engine::{KnnEmbeddingEngine, TractEmbedder};
//! use teachable_machine::interrupt::Interrupt;
//! use teachable_machine::machine::TeachableMachine;
//! use teachable_machine::ui::HardwareUi;
//!
//! fn teach<U: HardwareUi>(ui: U) -> bool {
//!     let config = AppConfig::default();
//!     let embedder = TractEmbedder::load("models/mobilenet_v2.onnx", &config.model).unwrap();
//!     let engine = KnnEmbeddingEngine::new(embedder, config.model.k);
//!     let mut machine = TeachableMachine::new(engine, ui, &config.machine);
//!
//!     let mut source = camera::open(&config.camera).unwrap();
//!     source.run(&mut machine, &Interrupt::new()).unwrap();
//!     machine.clean_shutdown()
//! }
//! ```

pub mod runner;
pub mod state;

pub use runner::{shutdown_requested, TeachableMachine};
pub use state::{ShutdownFlag, Status};
