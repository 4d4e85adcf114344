//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Monitor (domain)
//! ```
//!
//! Driven adapters (sensor, SMS modem, profile directory, settings file,
//! event sinks) implement these traits.  The [`Monitor`](super::service::Monitor)
//! consumes them via generics, so the domain core never touches the
//! serial port, the I2C bus or the filesystem layout directly.
//!
//! All port errors are typed: callers must handle every variant explicitly.

use core::fmt;

use crate::config::Settings;
use crate::error::SensorError;
use crate::profile::{ProfileError, ThresholdProfile};
use crate::reading_log::Sample;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per sampling tick.
pub trait SensorPort {
    fn read(&mut self) -> Result<Sample, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Messaging port (driven adapter: domain ↔ SMS transport)
// ───────────────────────────────────────────────────────────────

/// A text message received from a phone-number-like identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub number: String,
    pub body: String,
}

impl InboundMessage {
    pub fn new(number: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            body: body.into(),
        }
    }
}

/// Short text message transport.
///
/// Both calls are synchronous; timeouts are the adapter's business.
pub trait MessagingPort {
    /// Send `text` to `number`.
    fn send(&mut self, number: &str, text: &str) -> Result<(), TransportError>;

    /// Fetch every message received since the last poll.  Messages
    /// returned here are consumed; they will not be returned again.
    fn poll_inbound(&mut self) -> Result<Vec<InboundMessage>, TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Profile store (driven adapter: domain ← profile files)
// ───────────────────────────────────────────────────────────────

/// Named threshold profiles.
pub trait ProfileStore {
    /// Load and validate the profile called `name`.
    fn load(&self, name: &str) -> Result<ThresholdProfile, ProfileError>;

    /// Names of every stored profile, sorted.
    fn list(&self) -> Result<Vec<String>, ProfileError>;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ settings file)
// ───────────────────────────────────────────────────────────────

/// Loads and persists [`Settings`].
///
/// Implementations MUST validate before persisting (see
/// [`validate_settings`](crate::config::validate_settings)) and reject
/// invalid values with [`ConfigError::ValidationFailed`].
pub trait ConfigPort {
    /// Load settings.  Returns [`Settings::default()`] if none are stored.
    fn load(&self) -> Result<Settings, ConfigError>;

    /// Validate and persist settings.
    fn save(&self, settings: &Settings) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from the monitor)
// ───────────────────────────────────────────────────────────────

/// Callback trait that the scheduler invokes when a schedule fires.
pub trait SchedulerDelegate {
    /// * `label`: the human-readable label of the schedule that fired.
    /// * `job`  : what the schedule asks for.
    fn on_schedule_fired(&mut self, label: &str, job: ScheduledJob);
}

/// Jobs the scheduler can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledJob {
    /// Read the sensor and record a reading.
    Sample,
    /// Start a new log segment (calendar day boundary).
    RotateLog,
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored settings could not be parsed.
    Corrupted(String),
    /// A field failed validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrupted(msg) => write!(f, "settings corrupted: {}", msg),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

/// Errors from [`MessagingPort`] operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The modem did not answer or the serial link failed.
    Io(String),
    /// The modem rejected a command.
    Rejected(String),
    /// An inbound listing could not be parsed.
    Malformed(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
            Self::Rejected(msg) => write!(f, "modem rejected command: {}", msg),
            Self::Malformed(msg) => write!(f, "malformed message listing: {}", msg),
        }
    }
}
