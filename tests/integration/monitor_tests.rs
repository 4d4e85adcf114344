//! Integration tests for the sample → alarm → broadcast pipeline.
//!
//! Drives a real `Monitor` (with a real `ReadingLog` in a temp dir)
//! through mock sensor and messenger adapters.

use std::fs;

use climon::alarm::{AlarmEvent, AlarmKind, Variable};
use climon::app::events::AppEvent;
use climon::app::service::DispatchOutcome;
use climon::config::Settings;
use climon::error::{Error, SensorError};
use climon::reading_log::SEGMENT_HEADER;
use climon::scheduler::Scheduler;
use climon::tasks::{Task, TaskKind};

use crate::mock_hw::*;

fn alarm_events(sink: &RecordingSink) -> Vec<AlarmEvent> {
    sink.events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Alarm(a) => Some(*a),
            _ => None,
        })
        .collect()
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn start_loads_configured_profile() {
    let (monitor, sink, _dir) = started_monitor();
    assert_eq!(monitor.profile().map(|p| p.name.as_str()), Some("milk"));
    assert!(matches!(
        &sink.events[0],
        AppEvent::Started { profile: Some(name) } if name == "milk"
    ));
}

#[test]
fn missing_profile_runs_without_alarms() {
    let settings = Settings {
        threshold_profile: "ghost".into(),
        ..Settings::default()
    };
    let (mut monitor, mut sink, _dir) = monitor_with(settings, MockProfiles::with(&[milk()]));
    assert!(monitor.profile().is_none());
    assert!(matches!(sink.events[0], AppEvent::Started { profile: None }));

    let mut sensor = MockSensor::with(&[(-20.0, 99.0)]);
    monitor.sample(&mut sensor, at(1), &mut sink).unwrap();
    assert!(alarm_events(&sink).is_empty());
    assert_eq!(monitor.pending_tasks(), 0);
    // The reading is still recorded.
    assert!(monitor.latest().is_some());
}

// ── Alarms ────────────────────────────────────────────────────

#[test]
fn low_alarm_is_broadcast_to_every_recipient() {
    let (mut monitor, mut sink, _dir) = started_monitor();
    assert!(monitor.add_number(OTHER).unwrap());

    let mut sensor = MockSensor::with(&[(1.0, 50.0)]);
    monitor.sample(&mut sensor, at(1), &mut sink).unwrap();
    assert_eq!(monitor.pending_tasks(), 1);

    let mut modem = MockMessenger::default();
    let outcome = monitor.dispatch(at(1), &mut modem, &mut sink);
    assert_eq!(outcome, DispatchOutcome::Completed { executed: 1, failed: 0 });
    for number in [OPERATOR, OTHER] {
        assert_eq!(modem.last_text_to(number), Some("ALARM!:\nLow temperature"));
    }
    assert!(monitor.alarm_states().temperature.low_active);
}

#[test]
fn hysteresis_band_suppresses_flapping() {
    let (mut monitor, mut sink, _dir) = started_monitor();
    // milk temperature: min 2, hysteresis 1 → clears above 3.
    let mut sensor = MockSensor::with(&[(1.0, 50.0), (2.5, 50.0), (1.5, 50.0), (3.5, 50.0)]);
    for minute in 1..=4 {
        monitor.sample(&mut sensor, at(minute), &mut sink).unwrap();
    }
    assert_eq!(
        alarm_events(&sink),
        vec![
            AlarmEvent {
                variable: Variable::Temperature,
                kind: AlarmKind::Low
            },
            AlarmEvent {
                variable: Variable::Temperature,
                kind: AlarmKind::Normal
            },
        ]
    );
    assert!(!monitor.alarm_states().temperature.is_active());
}

#[test]
fn both_variables_alarm_independently() {
    let (mut monitor, mut sink, _dir) = started_monitor();
    let mut sensor = MockSensor::with(&[(7.0, 90.0)]);
    monitor.sample(&mut sensor, at(1), &mut sink).unwrap();
    let kinds: Vec<_> = alarm_events(&sink).iter().map(|a| (a.variable, a.kind)).collect();
    assert_eq!(
        kinds,
        vec![
            (Variable::Temperature, AlarmKind::High),
            (Variable::Humidity, AlarmKind::High)
        ]
    );
    assert_eq!(monitor.pending_tasks(), 2);
}

#[test]
fn alarm_recipients_are_fixed_when_queued() {
    let (mut monitor, mut sink, _dir) = started_monitor();
    let mut sensor = MockSensor::with(&[(1.0, 50.0)]);
    monitor.sample(&mut sensor, at(1), &mut sink).unwrap();

    // Recipient leaves between detection and dispatch.
    assert!(monitor.remove_number(OPERATOR).unwrap());

    let mut modem = MockMessenger::default();
    monitor.dispatch(at(1), &mut modem, &mut sink);
    assert_eq!(modem.texts_to(OPERATOR), vec!["ALARM!:\nLow temperature"]);
}

#[test]
fn unreachable_recipient_does_not_block_others() {
    let (mut monitor, mut sink, _dir) = started_monitor();
    monitor.add_number(OTHER).unwrap();
    let mut sensor = MockSensor::with(&[(1.0, 50.0)]);
    monitor.sample(&mut sensor, at(1), &mut sink).unwrap();

    let mut modem = MockMessenger {
        unreachable: vec![OPERATOR.into()],
        ..MockMessenger::default()
    };
    let outcome = monitor.dispatch(at(1), &mut modem, &mut sink);
    assert_eq!(outcome, DispatchOutcome::Completed { executed: 0, failed: 1 });
    assert_eq!(modem.texts_to(OTHER).len(), 1);
    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::TaskFailed { task: TaskKind::SendAlarm, .. }
    )));
}

// ── Sampling & log ────────────────────────────────────────────

#[test]
fn sensor_failure_records_nothing() {
    let (mut monitor, mut sink, _dir) = started_monitor();
    let mut sensor = MockSensor::default();
    sensor.push_err(SensorError::Bus);

    let result = monitor.sample(&mut sensor, at(1), &mut sink);
    assert!(matches!(result, Err(Error::Sensor(SensorError::Bus))));
    assert!(monitor.latest().is_none());
    assert!(sink.events.iter().any(|e| matches!(e, AppEvent::SampleFailed(_))));
}

#[test]
fn readings_are_appended_to_the_active_segment() {
    let (mut monitor, mut sink, _dir) = started_monitor();
    let mut sensor = MockSensor::with(&[(4.0, 50.0), (3.25, 61.5)]);
    monitor.sample(&mut sensor, at(1), &mut sink).unwrap();
    monitor.sample(&mut sensor, at(2), &mut sink).unwrap();

    let path = monitor.reading_log().active_segment().unwrap().to_path_buf();
    assert!(path.ends_with("20240501_100000.txt"));
    let text = fs::read_to_string(path).unwrap();
    assert_eq!(
        text,
        format!("{SEGMENT_HEADER}\n20240501_100100\t4.00\t50.00\n20240501_100200\t3.25\t61.50\n")
    );

    let t = monitor.extrema().temperature;
    assert_eq!((t.min, t.max), (3.25, 4.0));
}

#[test]
fn log_write_failure_still_evaluates_alarms() {
    let (mut monitor, mut sink, dir) = started_monitor();
    // Pull the directory out from under the open segment.
    fs::remove_dir_all(dir.path()).unwrap();

    let mut sensor = MockSensor::with(&[(1.0, 50.0)]);
    monitor.sample(&mut sensor, at(1), &mut sink).unwrap();
    assert_eq!(alarm_events(&sink).len(), 1);
    assert!(monitor.latest().is_some());
}

// ── Full cycle ────────────────────────────────────────────────

#[test]
fn run_cycle_samples_when_due_and_rotates_at_midnight() {
    let (mut monitor, mut sink, _dir) = started_monitor();
    let mut scheduler = Scheduler::for_monitor(10, at(0));
    let mut sensor = MockSensor::with(&[(4.0, 50.0), (4.0, 50.0)]);
    let mut modem = MockMessenger::default();

    // Not yet due.
    monitor.run_cycle(at(5), &mut scheduler, &mut sensor, &mut modem, &mut sink);
    assert!(monitor.latest().is_none());

    monitor.run_cycle(at(10), &mut scheduler, &mut sensor, &mut modem, &mut sink);
    assert!(monitor.latest().is_some());

    // 14:00 → midnight is 840 minutes later.
    let midnight = at(14 * 60);
    let outcome = monitor.run_cycle(midnight, &mut scheduler, &mut sensor, &mut modem, &mut sink);
    assert_eq!(outcome, DispatchOutcome::Completed { executed: 1, failed: 0 });
    assert!(monitor
        .reading_log()
        .active_segment()
        .unwrap()
        .ends_with("20240502_000000.txt"));
    // Scheduled rotation has nobody to reply to.
    assert!(modem.sent.is_empty());
}

#[test]
fn failed_poll_drops_batch_and_continues() {
    let (mut monitor, mut sink, _dir) = started_monitor();
    let mut modem = MockMessenger::default();
    modem
        .inbox
        .push_back(Err(climon::app::ports::TransportError::Malformed("junk".into())));
    modem.receive(OPERATOR, "help");

    let mut scheduler = Scheduler::new();
    let mut sensor = MockSensor::default();
    let first = monitor.run_cycle(at(1), &mut scheduler, &mut sensor, &mut modem, &mut sink);
    assert_eq!(first, DispatchOutcome::Completed { executed: 0, failed: 0 });
    assert!(sink.events.iter().any(|e| matches!(e, AppEvent::InboundDropped(_))));

    monitor.run_cycle(at(2), &mut scheduler, &mut sensor, &mut modem, &mut sink);
    assert_eq!(modem.texts_to(OPERATOR).len(), 1);
}

#[test]
fn enqueued_tasks_run_in_fifo_order() {
    let (mut monitor, mut sink, _dir) = started_monitor();
    monitor.enqueue(Task::Help {
        number: OTHER.into(),
    });
    monitor.enqueue(Task::UnknownCommand {
        number: OPERATOR.into(),
    });
    let mut modem = MockMessenger::default();
    monitor.dispatch(at(1), &mut modem, &mut sink);
    let order: Vec<&str> = modem.sent.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(order, vec![OTHER, OPERATOR]);
    assert_eq!(monitor.pending_tasks(), 0);
}
