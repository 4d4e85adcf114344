//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements    | Connects to                   |
//! |----------------|---------------|-------------------------------|
//! | `log_sink`     | EventSink     | `log` facade (env_logger)     |
//! | `profile_dir`  | ProfileStore  | directory of `<name>.toml`    |
//! | `settings_file`| ConfigPort    | TOML settings file            |
//! | `sim800`       | MessagingPort | SIM800 modem over serial      |
//! | `time`         |:             | local wall clock              |

pub mod log_sink;
pub mod profile_dir;
pub mod settings_file;
pub mod sim800;
pub mod time;
