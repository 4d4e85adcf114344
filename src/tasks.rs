//! Deferred work queue.
//!
//! Tasks are produced by:
//! - the alarm evaluator (threshold crossings)
//! - the command parser (inbound text messages)
//! - the scheduler (day rollover)
//!
//! and consumed by the dispatcher, which drains the whole queue once per
//! cycle and executes the batch in FIFO order.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Evaluator   │────▶│              │     │              │
//! │ Parser      │────▶│  Task Queue  │────▶│  Dispatcher  │
//! │ Scheduler   │────▶│   (FIFO)     │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use crate::alarm::AlarmEvent;

/// A unit of deferred work.  Each variant carries its own payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    /// Reply with the latest reading and extrema.
    SendSensorData { number: String },
    /// Reply with the active alarms.
    SendAlarmState { number: String },
    /// Reply with profile, interval and recipients.
    SendLoggerState { number: String },
    /// Reply with the names of the stored profiles.
    SendProfiles { number: String },
    /// Switch threshold profile.
    SetProfile { number: String, profile: String },
    /// Change the sampling interval.  `interval` is unvalidated text.
    SetLoggingInterval { number: String, interval: String },
    /// Start a new log segment.  `None` when the day rollover asked.
    NewLogFile { reply_to: Option<String> },
    /// Add the sender to the alarm recipients.
    SetNumber { number: String },
    /// Remove the sender from the alarm recipients.
    RemoveNumber { number: String },
    /// Reply with the command reference.
    Help { number: String },
    /// Terminate and relaunch the process.
    Restart,
    /// Broadcast an alarm transition.
    SendAlarm { numbers: Vec<String>, event: AlarmEvent },
    /// Tell the sender the command was not understood.
    UnknownCommand { number: String },
}

/// Payload-free discriminant, for logging and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    SendSensorData,
    SendAlarmState,
    SendLoggerState,
    SendProfiles,
    SetProfile,
    SetLoggingInterval,
    NewLogFile,
    SetNumber,
    RemoveNumber,
    Help,
    Restart,
    SendAlarm,
    UnknownCommand,
}

impl Task {
    pub fn kind(&self) -> TaskKind {
        match self {
            Self::SendSensorData { .. } => TaskKind::SendSensorData,
            Self::SendAlarmState { .. } => TaskKind::SendAlarmState,
            Self::SendLoggerState { .. } => TaskKind::SendLoggerState,
            Self::SendProfiles { .. } => TaskKind::SendProfiles,
            Self::SetProfile { .. } => TaskKind::SetProfile,
            Self::SetLoggingInterval { .. } => TaskKind::SetLoggingInterval,
            Self::NewLogFile { .. } => TaskKind::NewLogFile,
            Self::SetNumber { .. } => TaskKind::SetNumber,
            Self::RemoveNumber { .. } => TaskKind::RemoveNumber,
            Self::Help { .. } => TaskKind::Help,
            Self::Restart => TaskKind::Restart,
            Self::SendAlarm { .. } => TaskKind::SendAlarm,
            Self::UnknownCommand { .. } => TaskKind::UnknownCommand,
        }
    }
}

/// Append/drain buffer.  Single consumer.
#[derive(Debug, Default)]
pub struct TaskQueue {
    pending: Vec<Task>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task.  No deduplication.
    pub fn enqueue(&mut self, task: Task) {
        self.pending.push(task);
    }

    /// Take every pending task, in enqueue order, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<Task> {
        core::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
