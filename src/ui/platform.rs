//! Board detection and selection.

use std::path::Path;

use crate::config::BoardKind;

use super::UiError;

/// Device-tree node naming the board on ARM Linux.
pub const DEVICE_TREE_MODEL: &str = "/sys/firmware/devicetree/base/model";

/// What the running machine claims to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    Raspberry { model: String },
    /// `model` is `None` when the device tree could not be read at all.
    Unknown { model: Option<String> },
}

/// A concrete board with a hardware adapter in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Board {
    Raspberry,
}

/// Read the platform from [`DEVICE_TREE_MODEL`].
pub fn detect_platform() -> Platform {
    detect_platform_from(Path::new(DEVICE_TREE_MODEL))
}

/// Read the platform from an explicit model file.
pub fn detect_platform_from(path: &Path) -> Platform {
    match std::fs::read_to_string(path) {
        Ok(raw) => {
            // Device-tree strings are NUL-terminated.
            let model = raw.trim_end_matches('\0').trim().to_string();
            if model.contains("Raspberry Pi") {
                log::info!("Detected Raspberry Pi ({model})");
                Platform::Raspberry { model }
            } else {
                Platform::Unknown { model: Some(model) }
            }
        }
        Err(e) => {
            log::warn!("Could not detect environment ({}): {e}", path.display());
            Platform::Unknown { model: None }
        }
    }
}

/// Turn the configured board kind into a concrete board.
///
/// `Auto` consults the device tree once; an unknown platform is fatal.
pub fn resolve_board(kind: BoardKind) -> Result<Board, UiError> {
    resolve_board_with(kind, detect_platform)
}

fn resolve_board_with(kind: BoardKind, detect: impl FnOnce() -> Platform) -> Result<Board, UiError> {
    match kind {
        BoardKind::Raspberry => Ok(Board::Raspberry),
        BoardKind::Auto => match detect() {
            Platform::Raspberry { .. } => Ok(Board::Raspberry),
            Platform::Unknown { model } => Err(UiError::UnsupportedPlatform(
                model.unwrap_or_else(|| "unknown".into()),
            )),
        },
    }
}
