//! Outbound message texts.
//!
//! Wording is free to change; the fields each text carries are not.

use core::fmt::Write as _;

use crate::alarm::{AlarmEvent, AlarmKind, AlarmStates, Variable};
use crate::profile::ThresholdProfile;
use crate::reading_log::{Extrema, Range, Reading};

pub const UNKNOWN_COMMAND: &str = "Unknown command";

pub const HELP_TEXT: &str = "Commands:\n\
sensor - latest values and extremes\n\
get alarms - active alarms\n\
state - profile, interval and alarm receivers\n\
get profiles - list threshold profiles\n\
set profile,<name> - use threshold profile\n\
interval,<minutes> - set logging interval\n\
new logfile - start a new log file\n\
alarms,receive - receive alarms\n\
alarms,mute - stop receiving alarms\n\
help - this text\n\
restart - restart the logger";

fn range(r: &Range) -> String {
    if r.is_set() {
        format!("{:.2} - {:.2}", r.min, r.max)
    } else {
        "n/a".to_string()
    }
}

pub fn sensor_data(latest: Option<&Reading>, extrema: &Extrema) -> String {
    let mut msg = String::from("Latest:\n");
    match latest {
        Some(r) => {
            let _ = writeln!(msg, "Temp: {:.2} C", r.temperature);
            let _ = writeln!(msg, "Hum: {:.2} RH", r.humidity);
        }
        None => msg.push_str("no readings yet\n"),
    }
    msg.push_str("\nExtreme:\n");
    let _ = writeln!(msg, "temp: {}", range(&extrema.temperature));
    let _ = writeln!(msg, "hum: {}", range(&extrema.humidity));
    msg
}

pub fn alarm_state(states: &AlarmStates) -> String {
    let mut msg = String::from("Alarms:\n");
    let mut any = false;
    for variable in Variable::ALL {
        let s = states.get(variable);
        if s.low_active {
            let _ = writeln!(msg, "Low {variable}");
            any = true;
        } else if s.high_active {
            let _ = writeln!(msg, "High {variable}");
            any = true;
        }
    }
    if !any {
        msg.push_str("none\n");
    }
    msg
}

pub fn logger_state(
    profile: Option<&ThresholdProfile>,
    log_interval: u32,
    numbers: &[String],
) -> String {
    let mut msg = String::from("Profile:\n");
    match profile {
        Some(p) => {
            let _ = writeln!(msg, "{}", p.name);
            let _ = writeln!(msg, "Temp range: {} - {}", p.temperature.min, p.temperature.max);
            let _ = writeln!(msg, "Hum range: {} - {}", p.humidity.min, p.humidity.max);
        }
        None => msg.push_str("none loaded\n"),
    }
    let _ = write!(msg, "\nlog interval: {log_interval} min\n\nAlarm receivers:\n");
    for n in numbers {
        let _ = writeln!(msg, "{n}");
    }
    msg
}

pub fn profile_list(names: &[String]) -> String {
    let mut msg = String::from("Existing threshold profiles:\n");
    for name in names {
        let _ = writeln!(msg, "{name}");
    }
    msg
}

pub fn profile_changed(name: &str) -> String {
    format!("Used profile changed to {name}")
}

pub const PROFILE_CHANGE_FAILED: &str = "Changing profile failed";

pub fn interval_changed(minutes: u32) -> String {
    format!("Logging interval changed to {minutes}.\nNew interval will be applied after restart")
}

pub const INTERVAL_CHANGE_FAILED: &str = "Changing logging interval failed";

pub fn log_rotated(stamp: &str) -> String {
    format!("Created new log file with timestamp {stamp}")
}

pub const LOG_ROTATE_FAILED: &str = "Creating new log file failed";

pub fn number_added(number: &str) -> String {
    format!("Number {number} is added to alarm number list")
}

pub fn number_already_listed(number: &str) -> String {
    format!("Number {number} is already in the alarm number list")
}

pub fn number_removed(number: &str) -> String {
    format!("Number {number} is removed from alarm number list")
}

pub fn number_not_found(number: &str) -> String {
    format!("Number {number} was not found in the alarm number list")
}

pub const NUMBER_LIST_UPDATE_FAILED: &str = "Updating alarm number list failed";

pub fn alarm(event: &AlarmEvent) -> String {
    match event.kind {
        AlarmKind::Low => format!("ALARM!:\nLow {}", event.variable),
        AlarmKind::High => format!("ALARM!:\nHigh {}", event.variable),
        AlarmKind::Normal => format!("{} back in the normal range", event.variable),
    }
}
