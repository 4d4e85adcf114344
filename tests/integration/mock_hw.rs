//! Mock adapters for integration tests.
//!
//! Every port the [`Monitor`] touches has an in-memory stand-in that
//! records what it was asked to do, so tests can assert on the full
//! message history without a modem, an I2C bus or a settings file.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};

use chrono::{NaiveDate, NaiveDateTime};
use climon::app::events::AppEvent;
use climon::app::ports::{
    ConfigError, ConfigPort, EventSink, InboundMessage, MessagingPort, ProfileStore,
    SensorPort, TransportError,
};
use climon::app::service::Monitor;
use climon::config::{validate_settings, Settings};
use climon::error::SensorError;
use climon::profile::{ProfileError, ThresholdProfile, Thresholds};
use climon::reading_log::{ReadingLog, Sample};

// ── Sensor ────────────────────────────────────────────────────

/// Returns queued samples in order; `Unavailable` once drained.
#[derive(Default)]
pub struct MockSensor {
    pub queued: VecDeque<Result<Sample, SensorError>>,
}

#[allow(dead_code)]
impl MockSensor {
    pub fn with(values: &[(f32, f32)]) -> Self {
        let mut s = Self::default();
        for &(t, h) in values {
            s.push(t, h);
        }
        s
    }

    pub fn push(&mut self, temperature: f32, humidity: f32) {
        self.queued.push_back(Ok(Sample {
            temperature,
            humidity,
        }));
    }

    pub fn push_err(&mut self, e: SensorError) {
        self.queued.push_back(Err(e));
    }
}

impl SensorPort for MockSensor {
    fn read(&mut self) -> Result<Sample, SensorError> {
        self.queued.pop_front().unwrap_or(Err(SensorError::Unavailable))
    }
}

// ── Messenger ─────────────────────────────────────────────────

#[derive(Default)]
pub struct MockMessenger {
    /// `(number, text)` for every successful send.
    pub sent: Vec<(String, String)>,
    /// Results handed out by successive polls; empty batch once drained.
    pub inbox: VecDeque<Result<Vec<InboundMessage>, TransportError>>,
    /// Sends to these numbers fail.
    pub unreachable: Vec<String>,
}

#[allow(dead_code)]
impl MockMessenger {
    pub fn receive(&mut self, number: &str, body: &str) {
        self.inbox
            .push_back(Ok(vec![InboundMessage::new(number, body)]));
    }

    pub fn receive_batch(&mut self, messages: &[(&str, &str)]) {
        self.inbox.push_back(Ok(messages
            .iter()
            .map(|(n, b)| InboundMessage::new(*n, *b))
            .collect()));
    }

    pub fn texts_to(&self, number: &str) -> Vec<&str> {
        self.sent
            .iter()
            .filter(|(n, _)| n == number)
            .map(|(_, t)| t.as_str())
            .collect()
    }

    pub fn last_text_to(&self, number: &str) -> Option<&str> {
        self.texts_to(number).last().copied()
    }
}

impl MessagingPort for MockMessenger {
    fn send(&mut self, number: &str, text: &str) -> Result<(), TransportError> {
        if self.unreachable.iter().any(|n| n == number) {
            return Err(TransportError::Io(format!("{number} unreachable")));
        }
        self.sent.push((number.to_string(), text.to_string()));
        Ok(())
    }

    fn poll_inbound(&mut self) -> Result<Vec<InboundMessage>, TransportError> {
        self.inbox.pop_front().unwrap_or(Ok(Vec::new()))
    }
}

// ── Settings store ────────────────────────────────────────────

/// Keeps every saved snapshot; validates like the file adapter.
#[derive(Default)]
pub struct MockSettings {
    pub saved: RefCell<Vec<Settings>>,
    pub fail_saves: Cell<bool>,
}

#[allow(dead_code)]
impl MockSettings {
    pub fn last_saved(&self) -> Option<Settings> {
        self.saved.borrow().last().cloned()
    }

    pub fn save_count(&self) -> usize {
        self.saved.borrow().len()
    }
}

impl ConfigPort for MockSettings {
    fn load(&self) -> Result<Settings, ConfigError> {
        Ok(self.last_saved().unwrap_or_default())
    }

    fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        validate_settings(settings)?;
        if self.fail_saves.get() {
            return Err(ConfigError::IoError("disk full".into()));
        }
        self.saved.borrow_mut().push(settings.clone());
        Ok(())
    }
}

// ── Profile store ─────────────────────────────────────────────

#[derive(Default)]
pub struct MockProfiles {
    pub profiles: BTreeMap<String, ThresholdProfile>,
}

#[allow(dead_code)]
impl MockProfiles {
    pub fn with(profiles: &[ThresholdProfile]) -> Self {
        Self {
            profiles: profiles.iter().map(|p| (p.name.clone(), p.clone())).collect(),
        }
    }
}

impl ProfileStore for MockProfiles {
    fn load(&self, name: &str) -> Result<ThresholdProfile, ProfileError> {
        self.profiles
            .get(name)
            .cloned()
            .ok_or_else(|| ProfileError::NotFound(name.to_string()))
    }

    fn list(&self) -> Result<Vec<String>, ProfileError> {
        Ok(self.profiles.keys().cloned().collect())
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Fixtures ──────────────────────────────────────────────────

pub const OPERATOR: &str = "+358401111111";
#[allow(dead_code)]
pub const OTHER: &str = "+358402222222";

/// 2024-05-01 10:00 plus `minutes`.
pub fn at(minutes: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
        + chrono::Duration::minutes(minutes)
}

/// Temperature 2..6 (hysteresis 1), humidity 30..80 (hysteresis 5).
pub fn milk() -> ThresholdProfile {
    ThresholdProfile::new("milk", Thresholds::new(2, 6, 1), Thresholds::new(30, 80, 5)).unwrap()
}

/// Temperature 10..20 (hysteresis 2), humidity 40..70 (hysteresis 5).
#[allow(dead_code)]
pub fn fruit() -> ThresholdProfile {
    ThresholdProfile::new("fruit", Thresholds::new(10, 20, 2), Thresholds::new(40, 70, 5)).unwrap()
}

pub type TestMonitor = Monitor<MockSettings, MockProfiles>;

/// A started monitor on profile `milk` with [`OPERATOR`] as recipient,
/// logging into a fresh temp dir.
pub fn started_monitor() -> (TestMonitor, RecordingSink, tempfile::TempDir) {
    let settings = Settings {
        threshold_profile: "milk".into(),
        log_interval: 10,
        numbers: vec![OPERATOR.into()],
    };
    monitor_with(settings, MockProfiles::with(&[milk(), fruit()]))
}

pub fn monitor_with(
    settings: Settings,
    profiles: MockProfiles,
) -> (TestMonitor, RecordingSink, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let log = ReadingLog::open(dir.path(), at(0)).unwrap();
    let mut monitor = Monitor::new(settings, MockSettings::default(), profiles, log);
    let mut sink = RecordingSink::default();
    monitor.start(&mut sink);
    (monitor, sink, dir)
}
