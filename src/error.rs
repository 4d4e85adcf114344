//! Unified error types for the monitor.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! dispatcher's per-task error handling uniform.  Port-level errors
//! (`ConfigError`, `TransportError`, ...) live next to their traits in
//! [`crate::app::ports`]; this module holds the sensor and log errors
//! and the top-level wrapper.

use core::fmt;
use std::io;

use crate::app::ports::{ConfigError, TransportError};
use crate::profile::ProfileError;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible monitor operation funnels into this type.
#[derive(Debug)]
pub enum Error {
    /// The sensor could not be read.
    Sensor(SensorError),
    /// The message transport failed.
    Transport(TransportError),
    /// A threshold profile is unknown or malformed.
    Profile(ProfileError),
    /// Settings could not be loaded or persisted.
    Config(ConfigError),
    /// The reading log could not be written.
    Log(LogError),
    /// A request was rejected at the boundary.
    Validation(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Profile(e) => write!(f, "profile: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Log(e) => write!(f, "log: {e}"),
            Self::Validation(msg) => write!(f, "validation: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl From<ProfileError> for Error {
    fn from(e: ProfileError) -> Self {
        Self::Profile(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// I2C transaction failed or was not acknowledged.
    Bus,
    /// Reading is outside the physically plausible range.
    OutOfRange,
    /// No sensor is attached.
    Unavailable,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => write!(f, "I2C bus error"),
            Self::OutOfRange => write!(f, "reading out of range"),
            Self::Unavailable => write!(f, "sensor unavailable"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Reading log errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum LogError {
    /// No segment is open (the directory could not be created at startup).
    NoSegment,
    /// Writing or creating a segment failed.
    Io(io::Error),
}

impl fmt::Display for LogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSegment => write!(f, "no open log segment"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl From<io::Error> for LogError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<LogError> for Error {
    fn from(e: LogError) -> Self {
        Self::Log(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
