//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the process logger (stderr through `env_logger` in production).
//! Every line starts with a fixed tag so the output stays greppable.

use log::{info, warn};

use crate::alarm::AlarmKind;
use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
pub struct LogEventSink;

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { profile } => {
                info!("START | profile={}", profile.as_deref().unwrap_or("<none>"));
            }
            AppEvent::Sampled(r) => {
                info!(
                    "SAMPLE | T={:.2}\u{00b0}C | RH={:.2}% | at={}",
                    r.temperature, r.humidity, r.timestamp
                );
            }
            AppEvent::SampleFailed(e) => warn!("SAMPLE | failed: {}", e),
            AppEvent::Alarm(a) => match a.kind {
                AlarmKind::Normal => info!("ALARM | {} normal", a.variable),
                kind => warn!("ALARM | {} {:?}", a.variable, kind),
            },
            AppEvent::CommandReceived { number, task } => {
                info!("CMD | from={} | task={:?}", number, task);
            }
            AppEvent::InboundDropped(e) => warn!("CMD | inbound batch dropped: {}", e),
            AppEvent::TaskExecuted(task) => info!("TASK | {:?} done", task),
            AppEvent::TaskFailed { task, error } => warn!("TASK | {:?} failed: {}", task, error),
            AppEvent::ProfileChanged(name) => info!("PROFILE | now '{}'", name),
            AppEvent::LogRotated(stamp) => info!("LOG | new segment {}", stamp),
            AppEvent::RestartRequested { abandoned } => {
                info!("RESTART | requested, abandoned={}", abandoned);
            }
        }
    }
}
