//! Wall-clock time adapter.
//!
//! Readings are stamped and log segments named in local time, so the
//! clock hands out [`NaiveDateTime`] in the host's zone.

use chrono::{Local, NaiveDateTime};

/// Local wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }

    /// Current local date and time.
    pub fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
