//! Threshold profiles.
//!
//! A profile is a named pair of `(min, max, hysteresis)` triples, one per
//! monitored variable.  On disk it is a small TOML document:
//!
//! ```text
//! [TEMPERATURE]
//! min = 2
//! max = 6
//! hysteresis = 1
//!
//! [HUMIDITY]
//! min = 30
//! max = 80
//! hysteresis = 5
//! ```

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::alarm::Variable;

/// `(min, max, hysteresis)` for one variable.  All integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub min: i32,
    pub max: i32,
    pub hysteresis: i32,
}

impl Thresholds {
    pub const fn new(min: i32, max: i32, hysteresis: i32) -> Self {
        Self {
            min,
            max,
            hysteresis,
        }
    }

    /// `min < max` and `hysteresis >= 0`.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.min >= self.max {
            return Err("min must be below max");
        }
        if self.hysteresis < 0 {
            return Err("hysteresis must not be negative");
        }
        Ok(())
    }
}

/// On-disk section layout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct ProfileFile {
    #[serde(rename = "TEMPERATURE")]
    temperature: Thresholds,
    #[serde(rename = "HUMIDITY")]
    humidity: Thresholds,
}

/// A named threshold profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdProfile {
    pub name: String,
    pub temperature: Thresholds,
    pub humidity: Thresholds,
}

impl ThresholdProfile {
    /// Build a profile, rejecting pathological thresholds.
    pub fn new(
        name: impl Into<String>,
        temperature: Thresholds,
        humidity: Thresholds,
    ) -> Result<Self, ProfileError> {
        let name = name.into();
        for t in [&temperature, &humidity] {
            t.validate().map_err(|reason| ProfileError::Invalid {
                name: name.clone(),
                reason,
            })?;
        }
        Ok(Self {
            name,
            temperature,
            humidity,
        })
    }

    /// Thresholds for one variable.
    pub fn thresholds(&self, variable: Variable) -> &Thresholds {
        match variable {
            Variable::Temperature => &self.temperature,
            Variable::Humidity => &self.humidity,
        }
    }

    /// Parse a profile document.
    pub fn from_toml(name: &str, text: &str) -> Result<Self, ProfileError> {
        let file: ProfileFile = toml::from_str(text).map_err(|e| ProfileError::Malformed {
            name: name.to_string(),
            reason: e.message().to_string(),
        })?;
        Self::new(name, file.temperature, file.humidity)
    }

    /// Render the profile document (name is carried by the file name).
    pub fn to_toml(&self) -> Result<String, ProfileError> {
        let file = ProfileFile {
            temperature: self.temperature,
            humidity: self.humidity,
        };
        toml::to_string(&file).map_err(|e| ProfileError::Malformed {
            name: self.name.clone(),
            reason: e.to_string(),
        })
    }
}

/// Errors from loading or storing a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// No profile with this name exists.
    NotFound(String),
    /// The profile name cannot be used as a file name.
    InvalidName(String),
    /// The document could not be parsed.
    Malformed { name: String, reason: String },
    /// The document parsed but violates `min < max` / `hysteresis >= 0`.
    Invalid { name: String, reason: &'static str },
    /// Storage backend failure.
    Io(String),
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(name) => write!(f, "profile '{name}' not found"),
            Self::InvalidName(name) => write!(f, "invalid profile name '{name}'"),
            Self::Malformed { name, reason } => write!(f, "profile '{name}' malformed: {reason}"),
            Self::Invalid { name, reason } => write!(f, "profile '{name}' invalid: {reason}"),
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}
