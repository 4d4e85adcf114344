//! Durable reading log with lifetime extrema.
//!
//! Readings are appended to the active segment, a tab-separated text
//! file named after the moment it was opened:
//!
//! ```text
//! log_data/
//!     20221030_121212.txt
//!     20221031_000000.txt
//! ```
//!
//! Rotation only switches the write target.  The extrema cover every
//! reading since startup, across all segments.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use log::{debug, info};

use crate::alarm::Variable;
use crate::error::LogError;

/// First line of every segment.
pub const SEGMENT_HEADER: &str = "time\ttemperature\thumidity";

/// `strftime` layout used for row timestamps and segment names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Raw sensor output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub temperature: f32,
    pub humidity: f32,
}

/// A timestamped sample.  Immutable once recorded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub temperature: f32,
    pub humidity: f32,
    pub timestamp: NaiveDateTime,
}

impl Reading {
    pub fn new(sample: Sample, timestamp: NaiveDateTime) -> Self {
        Self {
            temperature: sample.temperature,
            humidity: sample.humidity,
            timestamp,
        }
    }

    pub fn value(&self, variable: Variable) -> f32 {
        match variable {
            Variable::Temperature => self.temperature,
            Variable::Humidity => self.humidity,
        }
    }

    /// One log row, without the trailing newline.
    pub fn to_row(&self) -> String {
        format!(
            "{}\t{:.2}\t{:.2}",
            format_timestamp(&self.timestamp),
            self.temperature,
            self.humidity
        )
    }
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Running min/max of one variable.  Starts "unset" (`+inf`/`-inf`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Default for Range {
    fn default() -> Self {
        Self {
            min: f32::INFINITY,
            max: f32::NEG_INFINITY,
        }
    }
}

impl Range {
    pub fn update(&mut self, value: f32) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// True once at least one value has been seen.
    pub fn is_set(&self) -> bool {
        self.min <= self.max
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Extrema {
    pub temperature: Range,
    pub humidity: Range,
}

impl Extrema {
    pub fn get(&self, variable: Variable) -> &Range {
        match variable {
            Variable::Temperature => &self.temperature,
            Variable::Humidity => &self.humidity,
        }
    }

    pub fn update(&mut self, reading: &Reading) {
        self.temperature.update(reading.temperature);
        self.humidity.update(reading.humidity);
    }
}

/// Append-only segment writer plus extrema tracker.
pub struct ReadingLog {
    dir: PathBuf,
    active: Option<PathBuf>,
    extrema: Extrema,
    latest: Option<Reading>,
}

impl ReadingLog {
    /// Create the log directory if needed and open the first segment.
    pub fn open(dir: impl Into<PathBuf>, now: NaiveDateTime) -> Result<Self, LogError> {
        let mut log = Self::detached(dir);
        fs::create_dir_all(&log.dir)?;
        log.rotate(now)?;
        Ok(log)
    }

    /// A log with no open segment.  Readings still update the extrema;
    /// appends fail with [`LogError::NoSegment`] until [`rotate`] succeeds.
    ///
    /// [`rotate`]: Self::rotate
    pub fn detached(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            active: None,
            extrema: Extrema::default(),
            latest: None,
        }
    }

    /// Start a new segment.  Returns its timestamp label.
    pub fn rotate(&mut self, now: NaiveDateTime) -> Result<String, LogError> {
        let stamp = format_timestamp(&now);
        let path = self.dir.join(format!("{stamp}.txt"));
        let mut file = File::create(&path)?;
        writeln!(file, "{SEGMENT_HEADER}")?;
        info!("ReadingLog: new segment {}", path.display());
        self.active = Some(path);
        Ok(stamp)
    }

    /// Record a reading: update latest + extrema, then append the row.
    ///
    /// The in-memory state is updated even if the append fails.
    pub fn record(&mut self, reading: &Reading) -> Result<(), LogError> {
        self.latest = Some(*reading);
        self.extrema.update(reading);

        let path = self.active.as_ref().ok_or(LogError::NoSegment)?;
        let mut file = OpenOptions::new().append(true).open(path)?;
        writeln!(file, "{}", reading.to_row())?;
        debug!("ReadingLog: {}", reading.to_row());
        Ok(())
    }

    pub fn extrema(&self) -> &Extrema {
        &self.extrema
    }

    pub fn latest(&self) -> Option<&Reading> {
        self.latest.as_ref()
    }

    pub fn active_segment(&self) -> Option<&Path> {
        self.active.as_deref()
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
