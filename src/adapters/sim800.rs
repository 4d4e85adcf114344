//! SIM800 GSM modem adapter.
//!
//! Implements [`MessagingPort`] with text-mode AT commands over any
//! byte stream (a `serialport` device in production, a scripted buffer
//! in tests).
//!
//! ```text
//! send:  AT+CMGF=1 → OK
//!        AT+CMGS="<number>" → "> "
//!        <part><Ctrl-Z> → +CMGS: <ref> OK      (once per 153-char part)
//!
//! poll:  AT+CMGF=1 → OK
//!        AT+CMGL="ALL" → +CMGL: <idx>,"<stat>","<sender>",...\r\n<body>\r\n ... OK
//!        AT+CMGD=<idx> → OK                    (once per parsed message)
//! ```
//!
//! A response ends only at its last line, so SMS bodies reading `OK` or
//! `ERROR` are never taken for the modem's own status.  Read timeouts
//! come from the underlying port and surface as [`TransportError::Io`].

use std::io::{ErrorKind, Read, Write};
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::app::ports::{InboundMessage, MessagingPort, TransportError};

/// Longest body sent as a single message part.
pub const MAX_PART_CHARS: usize = 153;

const CTRL_Z: u8 = 0x1a;
const PROMPT: &str = "> ";
const LISTING_HEADER: &str = "+CMGL: ";

/// What ends a modem response.
#[derive(Debug, Clone, Copy)]
enum Terminator {
    /// Final `OK` line.
    FinalOk,
    /// The `"> "` body prompt after `AT+CMGS`.
    Prompt,
}

impl Terminator {
    fn label(self) -> &'static str {
        match self {
            Self::FinalOk => "OK",
            Self::Prompt => ">",
        }
    }

    fn matches(self, text: &str) -> bool {
        match self {
            Self::FinalOk => last_line(text) == Some("OK"),
            Self::Prompt => text.ends_with(PROMPT),
        }
    }
}

/// Last complete line of `text`, or `None` while a line is still arriving.
fn last_line(text: &str) -> Option<&str> {
    let done = text.strip_suffix('\n')?;
    let done = done.strip_suffix('\r').unwrap_or(done);
    Some(done.rsplit('\n').next().unwrap_or(done).trim())
}

/// One entry of an `AT+CMGL` listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedMessage {
    /// Storage index, used to delete the message once read.
    pub index: u32,
    pub message: InboundMessage,
}

pub struct Sim800<T> {
    port: T,
    pause: Duration,
}

impl<T: Read + Write> Sim800<T> {
    /// `pause` is slept after every write; the modem drops input that
    /// arrives while it is still busy with the previous command.
    pub fn new(port: T, pause: Duration) -> Self {
        Self { port, pause }
    }

    pub fn into_inner(self) -> T {
        self.port
    }

    fn write_raw(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.port
            .write_all(bytes)
            .and_then(|()| self.port.flush())
            .map_err(|e| TransportError::Io(e.to_string()))?;
        if !self.pause.is_zero() {
            thread::sleep(self.pause);
        }
        Ok(())
    }

    /// Send one command line and wait for the final `OK`.
    fn command(&mut self, cmd: &str) -> Result<String, TransportError> {
        debug!("Sim800: > {}", cmd);
        self.write_raw(format!("{cmd}\r\n").as_bytes())?;
        self.read_until(Terminator::FinalOk)
    }

    /// Read until `terminator` ends the response or the modem reports an
    /// error on its last line.
    fn read_until(&mut self, terminator: Terminator) -> Result<String, TransportError> {
        let mut raw = Vec::new();
        let mut buf = [0u8; 256];
        loop {
            match self.port.read(&mut buf) {
                Ok(0) => {
                    return Err(TransportError::Io(format!(
                        "no '{}' from modem (got {:?})",
                        terminator.label(),
                        String::from_utf8_lossy(&raw)
                    )));
                }
                Ok(n) => raw.extend_from_slice(&buf[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == ErrorKind::TimedOut => {
                    return Err(TransportError::Io(format!(
                        "timed out waiting for '{}' (got {:?})",
                        terminator.label(),
                        String::from_utf8_lossy(&raw)
                    )));
                }
                Err(e) => return Err(TransportError::Io(e.to_string())),
            }

            let text = String::from_utf8_lossy(&raw);
            if terminator.matches(&text) {
                return Ok(text.into_owned());
            }
            if let Some(err) = last_line(&text).filter(|l| is_error_line(l)) {
                return Err(TransportError::Rejected(err.to_string()));
            }
        }
    }

    fn send_part(&mut self, number: &str, part: &str) -> Result<(), TransportError> {
        debug!("Sim800: > AT+CMGS=\"{}\"", number);
        self.write_raw(format!("AT+CMGS=\"{number}\"\r\n").as_bytes())?;
        self.read_until(Terminator::Prompt)?;

        let mut body = part.as_bytes().to_vec();
        body.push(CTRL_Z);
        self.write_raw(&body)?;
        self.read_until(Terminator::FinalOk)?;
        Ok(())
    }
}

impl<T: Read + Write> MessagingPort for Sim800<T> {
    fn send(&mut self, number: &str, text: &str) -> Result<(), TransportError> {
        if number.is_empty() || number.chars().any(|c| c == '"' || c.is_control()) {
            return Err(TransportError::Rejected(format!("invalid number {number:?}")));
        }
        self.command("AT+CMGF=1")?;
        let parts = split_body(text);
        for part in &parts {
            self.send_part(number, part)?;
        }
        info!("Sim800: sent {} part(s) to {}", parts.len(), number);
        Ok(())
    }

    fn poll_inbound(&mut self) -> Result<Vec<InboundMessage>, TransportError> {
        self.command("AT+CMGF=1")?;
        let listing = self.command("AT+CMGL=\"ALL\"")?;
        let listed = parse_cmgl(&listing)?;
        // Only what was parsed is deleted; anything else stays stored.
        for entry in &listed {
            if let Err(e) = self.command(&format!("AT+CMGD={}", entry.index)) {
                warn!("Sim800: could not delete message {}: {}", entry.index, e);
            }
        }
        Ok(listed.into_iter().map(|entry| entry.message).collect())
    }
}

/// `ERROR` / `+CMS ERROR` / `+CME ERROR` status lines.
fn is_error_line(line: &str) -> bool {
    line == "ERROR" || line.starts_with("+CMS ERROR") || line.starts_with("+CME ERROR")
}

/// Split `text` into parts of at most [`MAX_PART_CHARS`] characters.
/// An empty body is still one (empty) part.
pub fn split_body(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![String::new()];
    }
    chars.chunks(MAX_PART_CHARS).map(|c| c.iter().collect()).collect()
}

/// Text between each pair of double quotes.
fn quoted_fields(s: &str) -> Vec<&str> {
    s.split('"').skip(1).step_by(2).collect()
}

/// `(index, sender)` of a well-formed listing header: a numeric index
/// followed by the quoted status and sender fields.
fn parse_header(line: &str) -> Option<(u32, &str)> {
    let (idx, rest) = line.strip_prefix(LISTING_HEADER)?.split_once(',')?;
    let index = idx.trim().parse::<u32>().ok()?;
    if !rest.trim_start().starts_with('"') {
        return None;
    }
    let fields = quoted_fields(rest);
    let sender = *fields.get(1)?;
    if sender.is_empty() {
        return None;
    }
    Some((index, sender))
}

/// Parse an `AT+CMGL` response into messages, in listing order.
///
/// The response must end with an `OK` line.  Lines before the first
/// header (the command echo) are skipped.  A line is a header only when
/// it has the full header shape; anything else, `OK` included, is body
/// text.  Body lines up to the next header are joined with `\n`.
pub fn parse_cmgl(listing: &str) -> Result<Vec<ListedMessage>, TransportError> {
    let mut lines: Vec<&str> = listing.lines().map(|l| l.trim_end_matches('\r')).collect();
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    if lines.pop().map(str::trim) != Some("OK") {
        return Err(TransportError::Malformed("listing not terminated by OK".into()));
    }

    let mut messages: Vec<ListedMessage> = Vec::new();
    let mut body: Vec<&str> = Vec::new();

    fn flush(messages: &mut [ListedMessage], body: &mut Vec<&str>) {
        if let Some(last) = messages.last_mut() {
            last.message.body = body.join("\n").trim_end().to_string();
        }
        body.clear();
    }

    for line in lines {
        if let Some((index, sender)) = parse_header(line) {
            flush(&mut messages, &mut body);
            messages.push(ListedMessage {
                index,
                message: InboundMessage::new(sender, ""),
            });
        } else if !messages.is_empty() {
            body.push(line);
        }
    }
    flush(&mut messages, &mut body);
    Ok(messages)
}
