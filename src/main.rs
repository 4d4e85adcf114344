//! climon: main entry point.
//!
//! Hexagonal architecture with a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  Si7021 / Simulated   Sim800        LogEventSink   SystemClock │
//! │  (SensorPort)         (Messaging)   (EventSink)                │
//! │  SettingsFile         ProfileDirectory                         │
//! │  (ConfigPort)         (ProfileStore)                           │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │                 Monitor (pure logic)                   │    │
//! │  │  Alarms · ReadingLog · TaskQueue · Dispatch            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Scheduler (delegate-driven: sample + day rollover)            │
//! └────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::Parser;
use log::{debug, info, warn};

use climon::adapters::log_sink::LogEventSink;
use climon::adapters::profile_dir::ProfileDirectory;
use climon::adapters::settings_file::SettingsFile;
use climon::adapters::sim800::Sim800;
use climon::adapters::time::SystemClock;
use climon::app::ports::{ConfigPort, SensorPort};
use climon::app::service::{DispatchOutcome, Monitor};
use climon::config::Settings;
use climon::error::SensorError;
use climon::reading_log::{ReadingLog, Sample};
use climon::scheduler::Scheduler;
use climon::sensors::SimulatedSensor;

/// Unattended temperature/humidity monitor with SMS alarms and commands.
#[derive(Parser, Debug)]
#[command(name = "climon", version, long_about = None)]
struct Args {
    /// Settings file (TOML); created on first change
    #[arg(long, default_value = "settings.toml")]
    settings: PathBuf,

    /// Directory of threshold profiles (<name>.toml)
    #[arg(long, default_value = "profiles")]
    profiles: PathBuf,

    /// Directory for reading log segments
    #[arg(long, default_value = "logs")]
    log_dir: PathBuf,

    /// Serial device of the SIM800 modem
    #[arg(long, default_value = "/dev/ttyS0")]
    modem: String,

    /// Modem baud rate
    #[arg(long, default_value_t = 115_200)]
    modem_baud: u32,

    /// Give up on a modem response after this many milliseconds
    #[arg(long, default_value_t = 5000)]
    modem_timeout_ms: u64,

    /// Pause after every modem write, in milliseconds
    #[arg(long, default_value_t = 1000)]
    modem_pause_ms: u64,

    /// Inbound message poll interval in seconds
    #[arg(long, default_value_t = 30)]
    poll_secs: u64,

    /// Use the simulated sensor instead of the Si7021
    #[arg(long, default_value_t = false)]
    simulate_sensor: bool,

    /// I2C bus of the Si7021
    #[cfg(feature = "linux-i2c")]
    #[arg(long, default_value = "/dev/i2c-1")]
    i2c_bus: PathBuf,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

// ── Sensor selection ──────────────────────────────────────────

enum Sensor {
    Simulated(SimulatedSensor),
    #[cfg(feature = "linux-i2c")]
    Si7021(climon::sensors::Si7021<linux_embedded_hal::I2cdev>),
}

impl SensorPort for Sensor {
    fn read(&mut self) -> Result<Sample, SensorError> {
        match self {
            Self::Simulated(s) => s.read(),
            #[cfg(feature = "linux-i2c")]
            Self::Si7021(s) => s.read(),
        }
    }
}

fn open_sensor(args: &Args) -> Result<Sensor> {
    if args.simulate_sensor {
        info!("Sensor: simulated");
        return Ok(Sensor::Simulated(SimulatedSensor::default()));
    }

    #[cfg(feature = "linux-i2c")]
    {
        let bus = linux_embedded_hal::I2cdev::new(&args.i2c_bus)
            .with_context(|| format!("opening I2C bus {}", args.i2c_bus.display()))?;
        info!("Sensor: Si7021 on {}", args.i2c_bus.display());
        Ok(Sensor::Si7021(climon::sensors::Si7021::new(bus)))
    }

    #[cfg(not(feature = "linux-i2c"))]
    {
        warn!("Sensor: built without `linux-i2c`, falling back to simulated sensor");
        Ok(Sensor::Simulated(SimulatedSensor::default()))
    }
}

// ── Restart ───────────────────────────────────────────────────

/// Replace this process with a fresh copy of itself.  Only returns on
/// failure.
#[cfg(unix)]
fn restart() -> anyhow::Error {
    use std::os::unix::process::CommandExt;

    let exe = match std::env::current_exe() {
        Ok(p) => p,
        Err(e) => return anyhow::Error::new(e).context("locating own executable"),
    };
    let err = std::process::Command::new(&exe)
        .args(std::env::args_os().skip(1))
        .exec();
    anyhow::Error::new(err).context(format!("re-executing {}", exe.display()))
}

#[cfg(not(unix))]
fn restart() -> anyhow::Error {
    anyhow::anyhow!("restart is only supported on unix hosts")
}

/// How long to sleep: until the next scheduled job, capped by the poll
/// interval.  An overdue job means no sleep at all.
fn next_wait(now: NaiveDateTime, next_due: Option<NaiveDateTime>, poll: Duration) -> Duration {
    next_due
        .map(|due| (due - now).to_std().unwrap_or(Duration::ZERO))
        .map_or(poll, |until_due| until_due.min(poll))
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    info!("╔══════════════════════════════════════╗");
    info!("║  climon v{:<28}║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let clock = SystemClock::new();
    let now = clock.now();

    // ── 1. Settings ───────────────────────────────────────────
    let settings_store = SettingsFile::new(&args.settings);
    let settings = match settings_store.load() {
        Ok(s) => s,
        Err(e) => {
            warn!("Settings load failed ({}), using defaults", e);
            Settings::default()
        }
    };

    // ── 2. Reading log ────────────────────────────────────────
    let log = match ReadingLog::open(&args.log_dir, now) {
        Ok(l) => l,
        Err(e) => {
            warn!(
                "Reading log unavailable in {} ({}), readings kept in memory only",
                args.log_dir.display(),
                e
            );
            ReadingLog::detached(&args.log_dir)
        }
    };

    // ── 3. Adapters ───────────────────────────────────────────
    let mut sensor = open_sensor(&args)?;
    let serial = serialport::new(&args.modem, args.modem_baud)
        .timeout(Duration::from_millis(args.modem_timeout_ms.max(1)))
        .flow_control(serialport::FlowControl::None)
        .open()
        .with_context(|| format!("opening modem {}", args.modem))?;
    info!("Modem: {} at {} baud", args.modem, args.modem_baud);
    let mut modem = Sim800::new(serial, Duration::from_millis(args.modem_pause_ms));
    let mut sink = LogEventSink::new();

    // ── 4. Monitor + scheduler ────────────────────────────────
    let profiles = ProfileDirectory::new(&args.profiles);
    let mut monitor = Monitor::new(settings, settings_store, profiles, log);
    monitor.start(&mut sink);
    let mut scheduler = Scheduler::for_monitor(monitor.settings().log_interval, now);

    let poll = Duration::from_secs(args.poll_secs.max(1));
    info!("System ready. Entering control loop.");

    // ── 5. Control loop ───────────────────────────────────────
    loop {
        let now = clock.now();
        match monitor.run_cycle(now, &mut scheduler, &mut sensor, &mut modem, &mut sink) {
            DispatchOutcome::RestartRequested { .. } => return Err(restart()),
            DispatchOutcome::Completed { executed, failed } => {
                if executed + failed > 0 {
                    debug!("Cycle: {} task(s) executed, {} failed", executed, failed);
                }
            }
        }
        thread::sleep(next_wait(clock.now(), scheduler.next_due(), poll));
    }
}
