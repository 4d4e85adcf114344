//! Outbound application events.
//!
//! The [`Monitor`](super::service::Monitor) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  They are observability
//! only; user-facing notifications travel as tasks.

use crate::alarm::AlarmEvent;
use crate::reading_log::Reading;
use crate::tasks::TaskKind;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The monitor has started (carries the active profile, if any).
    Started { profile: Option<String> },

    /// A reading was recorded.
    Sampled(Reading),

    /// The sensor could not be read this tick.
    SampleFailed(String),

    /// An alarm transition was detected.
    Alarm(AlarmEvent),

    /// An inbound message was turned into a task.
    CommandReceived { number: String, task: TaskKind },

    /// An inbound batch was discarded.
    InboundDropped(String),

    /// A task completed.
    TaskExecuted(TaskKind),

    /// A task failed; the rest of the batch continues.
    TaskFailed { task: TaskKind, error: String },

    /// The active threshold profile changed.
    ProfileChanged(String),

    /// A new log segment was opened.
    LogRotated(String),

    /// A restart was requested; `abandoned` tasks were not executed.
    RestartRequested { abandoned: usize },
}
