//! Wall-clock job scheduler.
//!
//! Drives the two recurring jobs of the monitor: sampling every
//! `log_interval` minutes and starting a new log segment at midnight.
//! The scheduler notifies a [`SchedulerDelegate`] when a schedule fires;
//! the monitor implements the delegate to run the sample or enqueue the
//! rotation task.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Schedules                                │
//! │                                                              │
//! │   ┌──────────────────┐            ┌──────────────────┐       │
//! │   │ Every N minutes  │            │ Daily at 00:00   │       │
//! │   │ (Sample)         │            │ (RotateLog)      │       │
//! │   └────────┬─────────┘            └────────┬─────────┘       │
//! │            ▼                               ▼                 │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │              SchedulerDelegate                         │  │
//! │  └───────────────────────┬────────────────────────────────┘  │
//! │                          ▼                                   │
//! │                 Monitor::run_cycle()                         │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use log::{debug, info};

use crate::app::ports::{ScheduledJob, SchedulerDelegate};

// ═══════════════════════════════════════════════════════════════
//  Schedule types
// ═══════════════════════════════════════════════════════════════

/// A single schedule entry.
#[derive(Debug, Clone)]
pub struct Schedule {
    /// Human-readable label (e.g., "sample").
    pub label: &'static str,
    /// Job handed to the delegate when the schedule fires.
    pub job: ScheduledJob,
    /// When the schedule fires.
    pub kind: ScheduleKind,
}

/// The type of schedule determines when it fires.
#[derive(Debug, Clone, Copy)]
pub enum ScheduleKind {
    /// Every `minutes` minutes, on whole-minute boundaries.
    Every { minutes: u32 },
    /// Once a day at `time`.
    DailyAt { time: NaiveTime },
}

impl ScheduleKind {
    /// First deadline for a schedule added at `now`.
    fn first_due(&self, now: NaiveDateTime) -> NaiveDateTime {
        match *self {
            Self::Every { minutes } => truncate_to_minute(now) + every(minutes),
            Self::DailyAt { time } => {
                let today = now.date().and_time(time);
                if today > now {
                    today
                } else {
                    today + Duration::days(1)
                }
            }
        }
    }

    /// Next deadline strictly after `now`, continuing from `due`.
    /// Missed periods collapse into the single fire that just happened.
    fn advance(&self, mut due: NaiveDateTime, now: NaiveDateTime) -> NaiveDateTime {
        let step = match *self {
            Self::Every { minutes } => every(minutes),
            Self::DailyAt { .. } => Duration::days(1),
        };
        while due <= now {
            due += step;
        }
        due
    }
}

fn every(minutes: u32) -> Duration {
    Duration::minutes(i64::from(minutes.max(1)))
}

fn truncate_to_minute(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// Maximum number of concurrent schedules.
const MAX_SCHEDULES: usize = 4;

/// The scheduler engine.
///
/// Decoupled from the task queue: when a schedule fires it invokes the
/// [`SchedulerDelegate`] callback.
pub struct Scheduler {
    schedules: [Option<ScheduleEntry>; MAX_SCHEDULES],
}

/// Internal bookkeeping for a live schedule.
#[derive(Debug, Clone)]
struct ScheduleEntry {
    schedule: Schedule,
    next_due: NaiveDateTime,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            schedules: [None, None, None, None],
        }
    }

    /// The monitor's standard schedule: sampling every
    /// `log_interval_min` minutes plus the midnight rotation.
    pub fn for_monitor(log_interval_min: u32, now: NaiveDateTime) -> Self {
        let mut sched = Self::new();
        sched.add(
            Schedule {
                label: "sample",
                job: ScheduledJob::Sample,
                kind: ScheduleKind::Every {
                    minutes: log_interval_min,
                },
            },
            now,
        );
        sched.add(
            Schedule {
                label: "day-rollover",
                job: ScheduledJob::RotateLog,
                kind: ScheduleKind::DailyAt {
                    time: NaiveTime::MIN,
                },
            },
            now,
        );
        sched
    }

    /// Add a schedule.  Returns the slot index, or `None` if full.
    pub fn add(&mut self, schedule: Schedule, now: NaiveDateTime) -> Option<usize> {
        for (i, slot) in self.schedules.iter_mut().enumerate() {
            if slot.is_none() {
                let next_due = schedule.kind.first_due(now);
                info!(
                    "Scheduler: added '{}' at slot {} (first due {})",
                    schedule.label, i, next_due
                );
                *slot = Some(ScheduleEntry { schedule, next_due });
                return Some(i);
            }
        }
        None
    }

    /// Fire every schedule whose deadline is at or before `now`.
    ///
    /// Each due schedule fires once per call, in slot order.
    pub fn tick(&mut self, now: NaiveDateTime, delegate: &mut dyn SchedulerDelegate) {
        for entry in self.schedules.iter_mut().flatten() {
            if now >= entry.next_due {
                debug!(
                    "Scheduler: '{}' due {} fired at {}",
                    entry.schedule.label, entry.next_due, now
                );
                delegate.on_schedule_fired(entry.schedule.label, entry.schedule.job);
                entry.next_due = entry.schedule.kind.advance(entry.next_due, now);
            }
        }
    }

    /// Earliest pending deadline, for sleeping between cycles.
    pub fn next_due(&self) -> Option<NaiveDateTime> {
        self.schedules
            .iter()
            .flatten()
            .map(|e| e.next_due)
            .min()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
