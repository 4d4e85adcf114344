//! Integration tests for inbound text commands.
//!
//! Each test feeds messages through `handle_inbound` → `dispatch` and
//! checks the reply text and the resulting monitor state.

use climon::app::messages;
use climon::app::ports::InboundMessage;
use climon::app::service::DispatchOutcome;

use crate::mock_hw::*;

/// Deliver one message and dispatch; returns the messenger holding replies.
fn send(
    monitor: &mut TestMonitor,
    sink: &mut RecordingSink,
    number: &str,
    body: &str,
) -> MockMessenger {
    let mut modem = MockMessenger::default();
    monitor.handle_inbound(vec![InboundMessage::new(number, body)], sink);
    monitor.dispatch(at(5), &mut modem, sink);
    modem
}

fn reply(monitor: &mut TestMonitor, sink: &mut RecordingSink, body: &str) -> String {
    let modem = send(monitor, sink, OPERATOR, body);
    modem
        .last_text_to(OPERATOR)
        .unwrap_or_else(|| panic!("no reply to {body:?}"))
        .to_string()
}

// ── Queries ───────────────────────────────────────────────────

#[test]
fn sensor_reports_latest_and_extrema() {
    let (mut monitor, mut sink, _dir) = started_monitor();
    assert!(reply(&mut monitor, &mut sink, "sensor").contains("no readings yet"));

    let mut sensor = MockSensor::with(&[(4.0, 50.0), (5.5, 40.0)]);
    monitor.sample(&mut sensor, at(1), &mut sink).unwrap();
    monitor.sample(&mut sensor, at(2), &mut sink).unwrap();

    let text = reply(&mut monitor, &mut sink, "Sensor");
    assert!(text.contains("Temp: 5.50 C"), "{text}");
    assert!(text.contains("temp: 4.00 - 5.50"), "{text}");
    assert!(text.contains("hum: 40.00 - 50.00"), "{text}");
}

#[test]
fn get_alarms_is_a_pure_read() {
    let (mut monitor, mut sink, _dir) = started_monitor();
    let mut sensor = MockSensor::with(&[(1.0, 50.0)]);
    monitor.sample(&mut sensor, at(1), &mut sink).unwrap();
    let mut modem = MockMessenger::default();
    monitor.dispatch(at(1), &mut modem, &mut sink);

    let before = *monitor.alarm_states();
    let text = reply(&mut monitor, &mut sink, "get alarms");
    assert!(text.contains("Low temperature"), "{text}");
    assert_eq!(*monitor.alarm_states(), before);
    assert_eq!(monitor.pending_tasks(), 0);
}

#[test]
fn state_lists_profile_interval_and_numbers() {
    let (mut monitor, mut sink, _dir) = started_monitor();
    let text = reply(&mut monitor, &mut sink, "state");
    for needle in ["milk", "Temp range: 2 - 6", "10 min", OPERATOR] {
        assert!(text.contains(needle), "missing {needle:?} in {text}");
    }
}

#[test]
fn get_profiles_lists_sorted_names() {
    let (mut monitor, mut sink, _dir) = started_monitor();
    let text = reply(&mut monitor, &mut sink, "get profiles");
    assert!(text.ends_with("fruit\nmilk\n"), "{text}");
}

// ── Profile switching ─────────────────────────────────────────

#[test]
fn set_profile_switches_and_persists() {
    let (mut monitor, mut sink, _dir) = started_monitor();
    let text = reply(&mut monitor, &mut sink, "set profile,fruit");
    assert_eq!(text, messages::profile_changed("fruit"));
    assert_eq!(monitor.profile().map(|p| p.name.as_str()), Some("fruit"));
    assert_eq!(monitor.settings().threshold_profile, "fruit");
    assert_eq!(
        monitor.settings_store().last_saved().map(|s| s.threshold_profile),
        Some("fruit".to_string())
    );
}

#[test]
fn unknown_profile_leaves_state_untouched() {
    let (mut monitor, mut sink, _dir) = started_monitor();
    let text = reply(&mut monitor, &mut sink, "set profile,ghost");
    assert_eq!(text, messages::PROFILE_CHANGE_FAILED);
    assert_eq!(monitor.profile().map(|p| p.name.as_str()), Some("milk"));
    assert_eq!(monitor.settings_store().save_count(), 0);
}

#[test]
fn profile_switch_clears_stale_alarms() {
    let (mut monitor, mut sink, _dir) = started_monitor();
    // 7 °C is high for milk (max 6) but under fruit's max of 20.
    let mut sensor = MockSensor::with(&[(7.0, 50.0)]);
    monitor.sample(&mut sensor, at(1), &mut sink).unwrap();
    let mut modem = MockMessenger::default();
    monitor.dispatch(at(1), &mut modem, &mut sink);
    assert!(monitor.alarm_states().temperature.high_active);

    reply(&mut monitor, &mut sink, "set profile,fruit");
    assert!(!monitor.alarm_states().temperature.is_active());

    // The NORMAL notice was queued during dispatch and goes out next cycle.
    assert_eq!(monitor.pending_tasks(), 1);
    let mut modem = MockMessenger::default();
    monitor.dispatch(at(6), &mut modem, &mut sink);
    assert_eq!(
        modem.last_text_to(OPERATOR),
        Some("temperature back in the normal range")
    );
}

// ── Settings commands ─────────────────────────────────────────

#[test]
fn interval_is_validated_and_persisted() {
    let (mut monitor, mut sink, _dir) = started_monitor();
    assert_eq!(reply(&mut monitor, &mut sink, "interval,15"), messages::interval_changed(15));
    assert_eq!(monitor.settings().log_interval, 15);
    assert_eq!(monitor.settings_store().last_saved().map(|s| s.log_interval), Some(15));

    for bad in ["interval,abc", "interval,0", "interval,-5"] {
        assert_eq!(reply(&mut monitor, &mut sink, bad), messages::INTERVAL_CHANGE_FAILED, "{bad}");
    }
    assert_eq!(monitor.settings().log_interval, 15);
    assert_eq!(monitor.settings_store().save_count(), 1);
}

#[test]
fn new_logfile_rotates_and_replies_with_stamp() {
    let (mut monitor, mut sink, _dir) = started_monitor();
    let text = reply(&mut monitor, &mut sink, "new logfile");
    assert_eq!(text, messages::log_rotated("20240501_100500"));
    assert!(monitor
        .reading_log()
        .active_segment()
        .unwrap()
        .ends_with("20240501_100500.txt"));
}

#[test]
fn receive_and_mute_manage_recipients() {
    let (mut monitor, mut sink, _dir) = started_monitor();

    let modem = send(&mut monitor, &mut sink, OTHER, "alarms,receive");
    assert_eq!(modem.last_text_to(OTHER), Some(messages::number_added(OTHER).as_str()));
    let modem = send(&mut monitor, &mut sink, OTHER, "alarms,receive");
    assert_eq!(
        modem.last_text_to(OTHER),
        Some(messages::number_already_listed(OTHER).as_str())
    );
    assert_eq!(monitor.settings().numbers, vec![OPERATOR.to_string(), OTHER.to_string()]);

    let modem = send(&mut monitor, &mut sink, OTHER, "alarms,mute");
    assert_eq!(modem.last_text_to(OTHER), Some(messages::number_removed(OTHER).as_str()));
    let modem = send(&mut monitor, &mut sink, OTHER, "alarms,mute");
    assert_eq!(modem.last_text_to(OTHER), Some(messages::number_not_found(OTHER).as_str()));

    assert_eq!(monitor.settings().numbers, vec![OPERATOR.to_string()]);
    assert_eq!(monitor.settings_store().save_count(), 2);
}

#[test]
fn failed_save_keeps_old_recipients() {
    let (mut monitor, mut sink, _dir) = started_monitor();
    monitor.settings_store().fail_saves.set(true);

    let modem = send(&mut monitor, &mut sink, OTHER, "alarms,receive");
    assert_eq!(modem.last_text_to(OTHER), Some(messages::NUMBER_LIST_UPDATE_FAILED));
    assert_eq!(monitor.settings().numbers, vec![OPERATOR.to_string()]);
}

// ── Misc ──────────────────────────────────────────────────────

#[test]
fn help_and_unknown_reply_to_sender() {
    let (mut monitor, mut sink, _dir) = started_monitor();
    assert_eq!(reply(&mut monitor, &mut sink, "help"), messages::HELP_TEXT);
    assert_eq!(reply(&mut monitor, &mut sink, "make coffee"), messages::UNKNOWN_COMMAND);
    assert_eq!(reply(&mut monitor, &mut sink, "set profile,"), messages::UNKNOWN_COMMAND);
}

#[test]
fn restart_abandons_the_rest_of_the_batch() {
    let (mut monitor, mut sink, _dir) = started_monitor();
    monitor.handle_inbound(
        vec![
            InboundMessage::new(OPERATOR, "help"),
            InboundMessage::new(OPERATOR, "restart"),
            InboundMessage::new(OTHER, "sensor"),
        ],
        &mut sink,
    );

    let mut modem = MockMessenger::default();
    let outcome = monitor.dispatch(at(5), &mut modem, &mut sink);
    assert_eq!(outcome, DispatchOutcome::RestartRequested { abandoned: 1 });
    assert_eq!(modem.texts_to(OPERATOR), vec![messages::HELP_TEXT]);
    assert!(modem.texts_to(OTHER).is_empty());
    assert_eq!(monitor.pending_tasks(), 0);
}

#[test]
fn batch_of_messages_is_handled_in_arrival_order() {
    let (mut monitor, mut sink, _dir) = started_monitor();
    let mut modem = MockMessenger::default();
    modem.receive_batch(&[(OTHER, "alarms,receive"), (OPERATOR, "state")]);
    monitor.poll_inbound(&mut modem, &mut sink);
    monitor.dispatch(at(5), &mut modem, &mut sink);

    // `state` runs after the add, so it already lists OTHER.
    let state = modem.last_text_to(OPERATOR).unwrap();
    assert!(state.contains(OTHER), "{state}");
}
