//! Fuzz target: `parse_cmgl`
//!
//! Drives arbitrary modem output into the message-listing parser.  It
//! must either return an error or messages with a non-empty,
//! unquoted sender.
//!
//! cargo fuzz run fuzz_cmgl_parser

#![no_main]

use climon::adapters::sim800::parse_cmgl;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let listing = String::from_utf8_lossy(data);
    if let Ok(messages) = parse_cmgl(&listing) {
        for entry in messages {
            assert!(!entry.message.number.is_empty(), "sender must not be empty");
            assert!(!entry.message.number.contains('"'), "sender must not carry quotes");
        }
    }
});
