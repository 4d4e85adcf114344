//! Threshold profile directory adapter.
//!
//! Implements [`ProfileStore`] over a directory holding one `<name>.toml`
//! document per profile.  Names are restricted to a single path
//! component so a remote `set profile,` command cannot reach outside the
//! directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::app::ports::ProfileStore;
use crate::profile::{ProfileError, ThresholdProfile};

const EXTENSION: &str = "toml";

pub struct ProfileDirectory {
    dir: PathBuf,
}

impl ProfileDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `profile` as `<name>.toml`, replacing any existing document.
    pub fn save(&self, profile: &ThresholdProfile) -> Result<(), ProfileError> {
        let path = self.path_for(&profile.name)?;
        let text = profile.to_toml()?;
        fs::create_dir_all(&self.dir).map_err(|e| ProfileError::Io(e.to_string()))?;
        fs::write(&path, text).map_err(|e| ProfileError::Io(e.to_string()))?;
        info!("ProfileDirectory: wrote {}", path.display());
        Ok(())
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, ProfileError> {
        if !is_valid_name(name) {
            return Err(ProfileError::InvalidName(name.to_string()));
        }
        Ok(self.dir.join(format!("{name}.{EXTENSION}")))
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

impl ProfileStore for ProfileDirectory {
    fn load(&self, name: &str) -> Result<ThresholdProfile, ProfileError> {
        let path = self.path_for(name)?;
        let text = match fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ProfileError::NotFound(name.to_string()));
            }
            Err(e) => return Err(ProfileError::Io(e.to_string())),
        };
        debug!("ProfileDirectory: read {}", path.display());
        ThresholdProfile::from_toml(name, &text)
    }

    fn list(&self) -> Result<Vec<String>, ProfileError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| ProfileError::Io(e.to_string()))?;
        let mut names = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| ProfileError::Io(e.to_string()))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
