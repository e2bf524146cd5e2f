//! Platform directories, resolved with `dirs`.
//!
//! On a Raspberry Pi (Linux) that is `~/.config/teachable-machine/` for
//! `settings.toml` and `~/.local/share/teachable-machine/models/` for model
//! files.

use std::path::{Path, PathBuf};

const APP_NAME: &str = "teachable-machine";

#[derive(Debug, Clone)]
pub struct AppPaths {
    /// `<config dir>/teachable-machine/settings.toml`.
    pub settings_file: PathBuf,
    /// Searched for model files given by bare name.
    pub models_dir: PathBuf,
}

impl AppPaths {
    /// Falls back to the working directory when the platform has no
    /// standard location (no `$HOME` on a headless board).
    pub fn new() -> Self {
        let fallback = || PathBuf::from(".");
        Self::under(
            dirs::config_dir().unwrap_or_else(fallback),
            dirs::data_local_dir().unwrap_or_else(fallback),
        )
    }

    fn under(config_root: PathBuf, data_root: PathBuf) -> Self {
        Self {
            settings_file: config_root.join(APP_NAME).join("settings.toml"),
            models_dir: data_root.join(APP_NAME).join("models"),
        }
    }

    /// Where to load the model named by `path` from.
    ///
    /// An existing or absolute path is used as given.  A relative path that
    /// does not exist is looked up in [`models_dir`](Self::models_dir); if it
    /// is not there either the original path is returned so the error names
    /// what the user typed.
    pub fn resolve_model(&self, path: &Path) -> PathBuf {
        if path.is_absolute() || path.exists() {
            return path.to_path_buf();
        }
        let candidate = self.models_dir.join(path);
        if candidate.is_file() {
            log::debug!("config: model found in {}", self.models_dir.display());
            candidate
        } else {
            path.to_path_buf()
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
