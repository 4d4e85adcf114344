//! Inbound text commands.
//!
//! Every received message maps to exactly one [`Task`].  The mapping is
//! an ordered table of `(prefix, extractor)` rules; the first rule whose
//! prefix starts the message wins, so a rule must never be shadowed by
//! an earlier, shorter prefix.  Text that matches nothing, or whose
//! argument cannot be extracted, becomes an "unknown command" reply to
//! the sender.
//!
//! | Prefix            | Task                  |
//! |-------------------|-----------------------|
//! | `sensor`          | `SendSensorData`      |
//! | `get alarms`      | `SendAlarmState`      |
//! | `state`           | `SendLoggerState`     |
//! | `get profiles`    | `SendProfiles`        |
//! | `set profile,<n>` | `SetProfile`          |
//! | `interval,<m>`    | `SetLoggingInterval`  |
//! | `new logfile`     | `NewLogFile`          |
//! | `alarms,receive`  | `SetNumber`           |
//! | `alarms,mute`     | `RemoveNumber`        |
//! | `help`            | `Help`                |
//! | `restart`         | `Restart`             |

use core::fmt;

use log::debug;

use crate::tasks::Task;

/// Why an argument could not be extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// The command needs an argument after the prefix.
    MissingArgument(&'static str),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingArgument(cmd) => write!(f, "'{cmd}' needs an argument"),
        }
    }
}

/// Builds a task from the sender and the text following the prefix.
type Extractor = fn(&str, &str) -> Result<Task, ParseError>;

struct CommandRule {
    prefix: &'static str,
    extract: Extractor,
}

/// Rules in match order.
const COMMAND_TABLE: [CommandRule; 11] = [
    CommandRule {
        prefix: "sensor",
        extract: |n, _| Ok(Task::SendSensorData { number: n.into() }),
    },
    CommandRule {
        prefix: "get alarms",
        extract: |n, _| Ok(Task::SendAlarmState { number: n.into() }),
    },
    CommandRule {
        prefix: "state",
        extract: |n, _| Ok(Task::SendLoggerState { number: n.into() }),
    },
    CommandRule {
        prefix: "get profiles",
        extract: |n, _| Ok(Task::SendProfiles { number: n.into() }),
    },
    CommandRule {
        prefix: "set profile,",
        extract: |n, rest| {
            Ok(Task::SetProfile {
                number: n.into(),
                profile: argument("set profile", rest)?,
            })
        },
    },
    CommandRule {
        prefix: "interval,",
        extract: |n, rest| {
            Ok(Task::SetLoggingInterval {
                number: n.into(),
                interval: argument("interval", rest)?,
            })
        },
    },
    CommandRule {
        prefix: "new logfile",
        extract: |n, _| Ok(Task::NewLogFile { reply_to: Some(n.into()) }),
    },
    CommandRule {
        prefix: "alarms,receive",
        extract: |n, _| Ok(Task::SetNumber { number: n.into() }),
    },
    CommandRule {
        prefix: "alarms,mute",
        extract: |n, _| Ok(Task::RemoveNumber { number: n.into() }),
    },
    CommandRule {
        prefix: "help",
        extract: |n, _| Ok(Task::Help { number: n.into() }),
    },
    CommandRule {
        prefix: "restart",
        extract: |_, _| Ok(Task::Restart),
    },
];

/// Trimmed, non-empty argument text.
fn argument(command: &'static str, rest: &str) -> Result<String, ParseError> {
    let arg = rest.trim();
    if arg.is_empty() {
        return Err(ParseError::MissingArgument(command));
    }
    Ok(arg.to_string())
}

/// `text` without `prefix`, if it starts with it (ASCII case-insensitive).
fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

/// Map one inbound message to a task.  Never fails: unknown text yields
/// [`Task::UnknownCommand`] addressed to `number`.
///
/// Prefixes in the command table match ignoring ASCII case, so `Sensor`
/// and `SET PROFILE,milk` are accepted.
pub fn parse_command(number: &str, body: &str) -> Task {
    let text = body.trim_start();
    for rule in &COMMAND_TABLE {
        if let Some(rest) = strip_prefix_ignore_case(text, rule.prefix) {
            return match (rule.extract)(number, rest) {
                Ok(task) => {
                    debug!("Command '{}' from {}", rule.prefix, number);
                    task
                }
                Err(e) => {
                    debug!("Command '{}' from {} rejected: {}", rule.prefix, number, e);
                    Task::UnknownCommand {
                        number: number.into(),
                    }
                }
            };
        }
    }
    debug!("Unknown command from {}", number);
    Task::UnknownCommand {
        number: number.into(),
    }
}
