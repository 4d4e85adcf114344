//! Persisted monitor settings.
//!
//! The settings file carries the active threshold profile name, the
//! sampling interval and the alarm recipient list.  It is rewritten on
//! every change so a restart resumes with the same state.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Default sampling interval in minutes.
pub const DEFAULT_LOG_INTERVAL_MIN: u32 = 10;

/// Persisted settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Name of the threshold profile to load on startup.
    pub threshold_profile: String,
    /// Sampling interval in minutes (> 0).  Applied after restart.
    pub log_interval: u32,
    /// Alarm recipients, in insertion order, without duplicates.
    #[serde(default)]
    pub numbers: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            threshold_profile: "default".to_string(),
            log_interval: DEFAULT_LOG_INTERVAL_MIN,
            numbers: Vec::new(),
        }
    }
}

impl Settings {
    /// Append `number` to the recipient list.
    /// Returns `false` if it was already present.
    pub fn add_number(&mut self, number: &str) -> bool {
        if self.numbers.iter().any(|n| n == number) {
            return false;
        }
        self.numbers.push(number.to_string());
        true
    }

    /// Remove `number` from the recipient list.
    /// Returns `false` if it was not present.
    pub fn remove_number(&mut self, number: &str) -> bool {
        match self.numbers.iter().position(|n| n == number) {
            Some(idx) => {
                self.numbers.remove(idx);
                true
            }
            None => false,
        }
    }
}

/// Range-check settings before they are persisted.
pub fn validate_settings(settings: &Settings) -> Result<(), ConfigError> {
    if settings.threshold_profile.trim().is_empty() {
        return Err(ConfigError::ValidationFailed(
            "threshold_profile must not be empty",
        ));
    }
    if settings.log_interval == 0 {
        return Err(ConfigError::ValidationFailed("log_interval must be > 0"));
    }
    for (i, n) in settings.numbers.iter().enumerate() {
        if n.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("numbers must not be empty"));
        }
        if settings.numbers[..i].contains(n) {
            return Err(ConfigError::ValidationFailed("numbers must be unique"));
        }
    }
    Ok(())
}
