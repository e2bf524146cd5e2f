//! Configuration module.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for the model,
//! frame loop, board wiring and camera, `AppPaths` for platform directories,
//! and TOML persistence via `AppConfig::load` / `AppConfig::save`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, BoardConfig, BoardKind, CameraConfig, InputLayout, MachineConfig, ModelConfig,
    Normalization,
};
