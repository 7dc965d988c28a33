//! Path management for haat configuration and log files.
//!
//! ```text
//! ~/.config/haat/              # Config directory
//! ├── config.toml              # Application configuration
//! └── navigation.toml          # Optional page navigation table
//!
//! ~/.local/share/haat/         # Data directory
//! └── logs/
//!     └── haat.log.YYYY-MM-DD
//! ```

use std::path::PathBuf;

use haat_core::error::{HaatError, Result};

const APP_DIR: &str = "haat";

/// Resolves haat's platform directories.
///
/// An explicit base directory replaces both the config and data roots; tests
/// and the CLI's `--config-dir` flag use it.
#[derive(Debug, Clone, Default)]
pub struct HaatPaths {
    base: Option<PathBuf>,
}

impl HaatPaths {
    pub fn new(base: Option<PathBuf>) -> Self {
        Self { base }
    }

    pub fn config_dir(&self) -> Result<PathBuf> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or_else(|| HaatError::config("Cannot find config directory")),
        }
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::data_local_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or_else(|| HaatError::config("Cannot find data directory")),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Default location of the navigation table when the config names none.
    pub fn navigation_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("navigation.toml"))
    }

    pub fn log_dir(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("logs"))
    }
}
