//! Monitor service: the hexagonal core.
//!
//! [`Monitor`] owns every piece of mutable state: settings, the active
//! threshold profile, alarm flags, the reading log and the task queue.
//! It is driven from a single control loop through `&mut self`, so no
//! locking is needed.  All I/O flows through port traits injected at
//! call sites (sensor, messenger, event sink) or owned by the service
//! (settings store, profile store).
//!
//! ```text
//!   SensorPort ──▶ ┌─────────────────────────────┐ ──▶ EventSink
//!                  │           Monitor            │
//! MessagingPort ◀─▶│ Log · Alarms · Queue · Tasks │◀──▶ ConfigPort
//!                  └─────────────────────────────┘ ◀── ProfileStore
//! ```
//!
//! One cycle ([`Monitor::run_cycle`]):
//!
//! 1. scheduler jobs: sample (record + evaluate alarms) / enqueue rotation
//! 2. inbound poll: parse every message into a task
//! 3. dispatch: drain the queue and execute each task once

use chrono::NaiveDateTime;
use log::{debug, info, warn};

use crate::alarm::{AlarmEvaluator, AlarmEvent, AlarmStates};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::profile::ThresholdProfile;
use crate::reading_log::{Extrema, Reading, ReadingLog};
use crate::scheduler::Scheduler;
use crate::tasks::{Task, TaskQueue};

use super::commands::parse_command;
use super::events::AppEvent;
use super::messages;
use super::ports::{
    ConfigError, ConfigPort, EventSink, InboundMessage, MessagingPort, ProfileStore,
    ScheduledJob, SchedulerDelegate, SensorPort,
};

/// Result of draining one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Every task ran; `failed` of them returned an error.
    Completed { executed: usize, failed: usize },
    /// A restart was requested.  `abandoned` tasks queued after it were
    /// dropped; the process driver must terminate and relaunch.
    RestartRequested { abandoned: usize },
}

/// What the dispatcher does after a task.
enum Flow {
    Continue,
    Restart,
}

/// Collects scheduler fires for the current cycle.
#[derive(Default)]
struct FiredJobs(Vec<ScheduledJob>);

impl SchedulerDelegate for FiredJobs {
    fn on_schedule_fired(&mut self, label: &str, job: ScheduledJob) {
        debug!("Schedule fired: '{}' ({:?})", label, job);
        self.0.push(job);
    }
}

// ───────────────────────────────────────────────────────────────
// Monitor
// ───────────────────────────────────────────────────────────────

/// The monitor service orchestrates all domain logic.
pub struct Monitor<C: ConfigPort, P: ProfileStore> {
    settings: Settings,
    settings_store: C,
    profiles: P,
    profile: Option<ThresholdProfile>,
    alarms: AlarmEvaluator,
    log: ReadingLog,
    queue: TaskQueue,
}

impl<C: ConfigPort, P: ProfileStore> Monitor<C, P> {
    /// Construct the service.  Alarm flags start inactive.
    ///
    /// Does **not** load the profile: call [`start`](Self::start) next.
    pub fn new(settings: Settings, settings_store: C, profiles: P, log: ReadingLog) -> Self {
        Self {
            settings,
            settings_store,
            profiles,
            profile: None,
            alarms: AlarmEvaluator::new(),
            log,
            queue: TaskQueue::new(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Load the profile named in the settings.  A missing or malformed
    /// profile is logged and the monitor runs without thresholds.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        let name = self.settings.threshold_profile.clone();
        match self.profiles.load(&name) {
            Ok(profile) => {
                info!("Monitor: threshold profile '{}' loaded", name);
                self.profile = Some(profile);
            }
            Err(e) => warn!("Monitor: {}: alarms disabled until a profile is set", e),
        }
        sink.emit(&AppEvent::Started {
            profile: self.profile.as_ref().map(|p| p.name.clone()),
        });
        info!(
            "Monitor started\n{}",
            messages::logger_state(
                self.profile.as_ref(),
                self.settings.log_interval,
                &self.settings.numbers
            )
        );
    }

    /// Run one full cycle: scheduled jobs → inbound poll → dispatch.
    pub fn run_cycle(
        &mut self,
        now: NaiveDateTime,
        scheduler: &mut Scheduler,
        sensor: &mut impl SensorPort,
        messenger: &mut impl MessagingPort,
        sink: &mut impl EventSink,
    ) -> DispatchOutcome {
        let mut fired = FiredJobs::default();
        scheduler.tick(now, &mut fired);
        for job in fired.0 {
            match job {
                ScheduledJob::Sample => {
                    // Failures are logged and emitted inside `sample`.
                    let _ = self.sample(sensor, now, sink);
                }
                ScheduledJob::RotateLog => self.enqueue(Task::NewLogFile { reply_to: None }),
            }
        }

        self.poll_inbound(messenger, sink);
        self.dispatch(now, messenger, sink)
    }

    // ── Sensing ───────────────────────────────────────────────

    /// Read the sensor, record the reading and evaluate alarms.
    ///
    /// A failed log append does not stop alarm evaluation.
    pub fn sample(
        &mut self,
        sensor: &mut impl SensorPort,
        now: NaiveDateTime,
        sink: &mut impl EventSink,
    ) -> Result<Reading> {
        let sample = match sensor.read() {
            Ok(s) => s,
            Err(e) => {
                warn!("Monitor: sensor read failed: {}", e);
                sink.emit(&AppEvent::SampleFailed(e.to_string()));
                return Err(e.into());
            }
        };
        let reading = Reading::new(sample, now);
        if let Err(e) = self.log.record(&reading) {
            warn!("Monitor: reading not written to log: {}", e);
        }
        sink.emit(&AppEvent::Sampled(reading));

        let events = self.alarms.evaluate(&reading, self.profile.as_ref());
        self.raise(&events, sink);
        Ok(reading)
    }

    /// Clear alarms the latest reading no longer justifies, ignoring the
    /// hysteresis band.  Explicitly mutating; [`alarm_states`] is the
    /// pure read.
    ///
    /// [`alarm_states`]: Self::alarm_states
    pub fn recheck_alarms(&mut self, sink: &mut impl EventSink) -> Vec<AlarmEvent> {
        let events = self.alarms.recheck(self.log.latest(), self.profile.as_ref());
        self.raise(&events, sink);
        events
    }

    /// Queue one broadcast task per alarm event.
    fn raise(&mut self, events: &[AlarmEvent], sink: &mut impl EventSink) {
        for event in events {
            sink.emit(&AppEvent::Alarm(*event));
            self.queue.enqueue(Task::SendAlarm {
                numbers: self.settings.numbers.clone(),
                event: *event,
            });
        }
    }

    // ── Inbound commands ──────────────────────────────────────

    /// Fetch new messages and queue a task for each.  A failed poll
    /// discards the batch; the loop carries on.
    pub fn poll_inbound(&mut self, messenger: &mut impl MessagingPort, sink: &mut impl EventSink) {
        match messenger.poll_inbound() {
            Ok(messages) => self.handle_inbound(messages, sink),
            Err(e) => {
                warn!("Monitor: inbound batch discarded: {}", e);
                sink.emit(&AppEvent::InboundDropped(e.to_string()));
            }
        }
    }

    /// Parse already-received messages into tasks, in arrival order.
    pub fn handle_inbound(&mut self, messages: Vec<InboundMessage>, sink: &mut impl EventSink) {
        if !messages.is_empty() {
            info!("Monitor: {} inbound message(s)", messages.len());
        }
        for msg in messages {
            let task = parse_command(&msg.number, &msg.body);
            info!("Monitor: {} -> {:?}", msg.number, task.kind());
            sink.emit(&AppEvent::CommandReceived {
                number: msg.number,
                task: task.kind(),
            });
            self.queue.enqueue(task);
        }
    }

    /// Append a task to the queue.
    pub fn enqueue(&mut self, task: Task) {
        self.queue.enqueue(task);
    }

    // ── Dispatch ──────────────────────────────────────────────

    /// Drain the queue and execute every task in FIFO order.
    ///
    /// A failing task is logged and skipped; the rest of the batch still
    /// runs.  `Restart` ends the batch.  Tasks queued while dispatching
    /// (e.g. alarms cleared by a profile switch) run next cycle.
    pub fn dispatch(
        &mut self,
        now: NaiveDateTime,
        messenger: &mut impl MessagingPort,
        sink: &mut impl EventSink,
    ) -> DispatchOutcome {
        let mut batch = self.queue.drain().into_iter();
        let mut executed = 0;
        let mut failed = 0;

        while let Some(task) = batch.next() {
            let kind = task.kind();
            match self.execute(task, now, messenger, sink) {
                Ok(Flow::Continue) => {
                    executed += 1;
                    sink.emit(&AppEvent::TaskExecuted(kind));
                }
                Ok(Flow::Restart) => {
                    let abandoned = batch.len();
                    if abandoned > 0 {
                        warn!("Monitor: restart requested, {} queued task(s) abandoned", abandoned);
                    } else {
                        info!("Monitor: restart requested");
                    }
                    sink.emit(&AppEvent::RestartRequested { abandoned });
                    return DispatchOutcome::RestartRequested { abandoned };
                }
                Err(e) => {
                    failed += 1;
                    warn!("Monitor: task {:?} failed: {}", kind, e);
                    sink.emit(&AppEvent::TaskFailed {
                        task: kind,
                        error: e.to_string(),
                    });
                }
            }
        }

        DispatchOutcome::Completed { executed, failed }
    }

    fn execute(
        &mut self,
        task: Task,
        now: NaiveDateTime,
        messenger: &mut impl MessagingPort,
        sink: &mut impl EventSink,
    ) -> Result<Flow> {
        match task {
            Task::SendSensorData { number } => {
                let text = messages::sensor_data(self.log.latest(), self.log.extrema());
                messenger.send(&number, &text)?;
            }
            Task::SendAlarmState { number } => {
                messenger.send(&number, &messages::alarm_state(self.alarms.states()))?;
            }
            Task::SendLoggerState { number } => {
                let text = messages::logger_state(
                    self.profile.as_ref(),
                    self.settings.log_interval,
                    &self.settings.numbers,
                );
                messenger.send(&number, &text)?;
            }
            Task::SendProfiles { number } => {
                let names = self.profiles.list()?;
                messenger.send(&number, &messages::profile_list(&names))?;
            }
            Task::SetProfile { number, profile } => {
                let reply = match self.use_threshold_profile(&profile) {
                    Ok(()) => {
                        sink.emit(&AppEvent::ProfileChanged(profile.clone()));
                        self.recheck_alarms(sink);
                        messages::profile_changed(&profile)
                    }
                    Err(e) => {
                        warn!("Monitor: profile switch to '{}' failed: {}", profile, e);
                        messages::PROFILE_CHANGE_FAILED.to_string()
                    }
                };
                messenger.send(&number, &reply)?;
            }
            Task::SetLoggingInterval { number, interval } => {
                let reply = match self.set_log_interval(&interval) {
                    Ok(minutes) => messages::interval_changed(minutes),
                    Err(e) => {
                        warn!("Monitor: interval '{}' rejected: {}", interval, e);
                        messages::INTERVAL_CHANGE_FAILED.to_string()
                    }
                };
                messenger.send(&number, &reply)?;
            }
            Task::NewLogFile { reply_to } => match self.log.rotate(now) {
                Ok(stamp) => {
                    sink.emit(&AppEvent::LogRotated(stamp.clone()));
                    if let Some(number) = reply_to {
                        messenger.send(&number, &messages::log_rotated(&stamp))?;
                    }
                }
                Err(e) => {
                    if let Some(number) = reply_to {
                        messenger.send(&number, messages::LOG_ROTATE_FAILED)?;
                    }
                    return Err(e.into());
                }
            },
            Task::SetNumber { number } => {
                let reply = match self.add_number(&number) {
                    Ok(true) => messages::number_added(&number),
                    Ok(false) => messages::number_already_listed(&number),
                    Err(e) => {
                        warn!("Monitor: adding {} failed: {}", number, e);
                        messages::NUMBER_LIST_UPDATE_FAILED.to_string()
                    }
                };
                messenger.send(&number, &reply)?;
            }
            Task::RemoveNumber { number } => {
                let reply = match self.remove_number(&number) {
                    Ok(true) => messages::number_removed(&number),
                    Ok(false) => messages::number_not_found(&number),
                    Err(e) => {
                        warn!("Monitor: removing {} failed: {}", number, e);
                        messages::NUMBER_LIST_UPDATE_FAILED.to_string()
                    }
                };
                messenger.send(&number, &reply)?;
            }
            Task::Help { number } => messenger.send(&number, messages::HELP_TEXT)?,
            Task::Restart => return Ok(Flow::Restart),
            Task::SendAlarm { numbers, event } => {
                let text = messages::alarm(&event);
                let mut last_err = None;
                for number in &numbers {
                    if let Err(e) = messenger.send(number, &text) {
                        warn!("Monitor: alarm to {} not delivered: {}", number, e);
                        last_err = Some(e);
                    }
                }
                if let Some(e) = last_err {
                    return Err(e.into());
                }
            }
            Task::UnknownCommand { number } => messenger.send(&number, messages::UNKNOWN_COMMAND)?,
        }
        Ok(Flow::Continue)
    }

    // ── Settings operations ───────────────────────────────────

    /// Switch to the profile called `name` and persist the choice.
    ///
    /// On any failure the active profile and settings are unchanged.
    pub fn use_threshold_profile(&mut self, name: &str) -> Result<()> {
        let profile = self.profiles.load(name)?;
        self.update_settings(|s| s.threshold_profile = name.to_string())?;
        info!("Monitor: threshold profile changed to '{}'", name);
        self.profile = Some(profile);
        Ok(())
    }

    /// Parse, validate and persist a new sampling interval (minutes).
    /// Takes effect after restart.
    pub fn set_log_interval(&mut self, raw: &str) -> Result<u32> {
        let minutes: u32 = raw
            .trim()
            .parse()
            .map_err(|_| Error::Validation("log interval must be a positive integer"))?;
        if minutes == 0 {
            return Err(Error::Validation("log interval must be a positive integer"));
        }
        self.update_settings(|s| s.log_interval = minutes)?;
        info!("Monitor: log interval set to {} min (applies after restart)", minutes);
        Ok(minutes)
    }

    /// Add an alarm recipient.  `Ok(false)` if already listed.
    pub fn add_number(&mut self, number: &str) -> Result<bool> {
        if self.settings.numbers.iter().any(|n| n == number) {
            return Ok(false);
        }
        self.update_settings(|s| {
            s.add_number(number);
        })?;
        info!("Monitor: {} added to alarm numbers", number);
        Ok(true)
    }

    /// Remove an alarm recipient.  `Ok(false)` if not listed.
    pub fn remove_number(&mut self, number: &str) -> Result<bool> {
        if !self.settings.numbers.iter().any(|n| n == number) {
            return Ok(false);
        }
        self.update_settings(|s| {
            s.remove_number(number);
        })?;
        info!("Monitor: {} removed from alarm numbers", number);
        Ok(true)
    }

    /// Apply `change` to a copy, persist it, then commit.
    fn update_settings(
        &mut self,
        change: impl FnOnce(&mut Settings),
    ) -> core::result::Result<(), ConfigError> {
        let mut next = self.settings.clone();
        change(&mut next);
        self.settings_store.save(&next)?;
        self.settings = next;
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn profile(&self) -> Option<&ThresholdProfile> {
        self.profile.as_ref()
    }

    /// Current alarm flags.  Never mutates.
    pub fn alarm_states(&self) -> &AlarmStates {
        self.alarms.states()
    }

    pub fn extrema(&self) -> &Extrema {
        self.log.extrema()
    }

    pub fn latest(&self) -> Option<&Reading> {
        self.log.latest()
    }

    pub fn reading_log(&self) -> &ReadingLog {
        &self.log
    }

    pub fn pending_tasks(&self) -> usize {
        self.queue.len()
    }

    pub fn settings_store(&self) -> &C {
        &self.settings_store
    }
}
