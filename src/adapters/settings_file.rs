//! TOML settings file adapter.
//!
//! Implements [`ConfigPort`] over a single file on disk.
//!
//! - Missing file: [`Settings::default()`] is returned; nothing is written
//!   until the first save.
//! - Validation: every field is checked before persistence.
//! - Atomic writes: the new contents go to a sibling temp file which is
//!   then renamed over the original, so a crash never leaves half a file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::{validate_settings, Settings};

pub struct SettingsFile {
    path: PathBuf,
}

impl SettingsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ConfigPort for SettingsFile {
    fn load(&self) -> Result<Settings, ConfigError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("SettingsFile: {} not found, using defaults", self.path.display());
                return Ok(Settings::default());
            }
            Err(e) => return Err(ConfigError::IoError(e.to_string())),
        };
        let settings: Settings =
            toml::from_str(&text).map_err(|e| ConfigError::Corrupted(e.message().to_string()))?;
        if let Err(e) = validate_settings(&settings) {
            warn!("SettingsFile: stored settings invalid ({})", e);
            return Err(e);
        }
        info!("SettingsFile: loaded {}", self.path.display());
        Ok(settings)
    }

    fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        validate_settings(settings)?;

        let text = toml::to_string(settings).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let tmp = self.temp_path();
        fs::write(&tmp, text).map_err(|e| ConfigError::IoError(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        info!("SettingsFile: saved {}", self.path.display());
        Ok(())
    }
}
