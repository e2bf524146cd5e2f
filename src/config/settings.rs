//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and moved onto the frame
//! thread.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// InputLayout / Normalization
// ---------------------------------------------------------------------------

/// Memory layout of the embedding model's image input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputLayout {
    /// `[1, height, width, 3]`: TFLite-style exports.
    Nhwc,
    /// `[1, 3, height, width]`: PyTorch-style exports.
    Nchw,
}

impl Default for InputLayout {
    fn default() -> Self {
        Self::Nhwc
    }
}

/// How 8-bit pixel values are mapped to model input floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    /// `[0, 255]` → `[0.0, 1.0]`.
    Unit,
    /// `[0, 255]` → `[-1.0, 1.0]` (MobileNet convention).
    Symmetric,
}

impl Default for Normalization {
    fn default() -> Self {
        Self::Unit
    }
}

// ---------------------------------------------------------------------------
// ModelConfig
// ---------------------------------------------------------------------------

/// Settings for the embedding model and kNN classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// ONNX model file.  Required at startup; `--model` overrides it.
    pub path: Option<PathBuf>,
    /// Number of nearest neighbours that vote on a label.
    pub k: usize,
    /// Width the frame is resized to before inference.
    pub input_width: u32,
    /// Height the frame is resized to before inference.
    pub input_height: u32,
    pub layout: InputLayout,
    pub normalization: Normalization,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: None,
            k: 3,
            input_width: 224,
            input_height: 224,
            layout: InputLayout::default(),
            normalization: Normalization::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// MachineConfig
// ---------------------------------------------------------------------------

/// Settings for the classification loop itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Number of per-frame labels the smoother votes over.
    pub buffer_length: usize,
    /// Number of frame timestamps used for the FPS estimate.
    pub fps_window: usize,
    /// Minimum spacing between two presses of the same button, in ms.
    pub debounce_ms: u64,
    /// Display names indexed by class; index 0 is shown when no example
    /// has been taught yet.
    pub class_names: Vec<String>,
}

impl MachineConfig {
    pub fn debounce_interval(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            buffer_length: 4,
            fps_window: 40,
            debounce_ms: 100,
            class_names: ["--", "Red", "Orange", "Green", "Blue"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// BoardConfig
// ---------------------------------------------------------------------------

/// Which hardware adapter to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardKind {
    /// Detect the board from the device tree at startup.
    Auto,
    Raspberry,
}

impl Default for BoardKind {
    fn default() -> Self {
        Self::Auto
    }
}

/// GPIO wiring of the five buttons and five LEDs.
///
/// Index 0 of each list is the reset channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub kind: BoardKind,
    /// BCM pin numbers of the buttons (inputs, pulled down).
    pub button_pins: Vec<u8>,
    /// BCM pin numbers of the LEDs (outputs).
    pub led_pins: Vec<u8>,
    /// LEDs light when their pin is driven low.
    pub led_active_low: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            kind: BoardKind::default(),
            button_pins: vec![5, 6, 13, 19, 26],
            led_pins: vec![25, 12, 16, 20, 21],
            led_active_low: true,
        }
    }
}

// ---------------------------------------------------------------------------
// CameraConfig
// ---------------------------------------------------------------------------

/// Media pipeline geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// GStreamer source element, e.g. `v4l2src` or `libcamerasrc`.
    pub source_element: String,
    pub source_width: u32,
    pub source_height: u32,
    /// Frame rate as a GStreamer fraction string.
    pub source_rate: String,
    /// Geometry of the frames handed to the classifier.
    pub sink_width: u32,
    pub sink_height: u32,
    /// Add an on-screen preview with the status overlay.
    pub display: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            source_element: "v4l2src".into(),
            source_width: 640,
            source_height: 480,
            source_rate: "30/1".into(),
            sink_width: 320,
            sink_height: 180,
            display: false,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use teachable_machine::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub machine: MachineConfig,
    pub board: BoardConfig,
    pub camera: CameraConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
