//! Fuzz target: `parse_command`
//!
//! Feeds arbitrary text as a message body and asserts the parser never
//! panics (multi-byte text around prefix boundaries included) and never
//! yields a task that cannot come from a sender.
//!
//! cargo fuzz run fuzz_command_parser

#![no_main]

use climon::app::commands::parse_command;
use climon::tasks::TaskKind;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let body = String::from_utf8_lossy(data);
    let task = parse_command("+10000000", &body);
    assert_ne!(task.kind(), TaskKind::SendAlarm, "parser must not produce alarms");
});
