//! Si7021 humidity/temperature sensor on I2C.
//!
//! One measurement cycle is two transactions:
//!
//! 1. `0xE5`: measure relative humidity (hold master), 2 bytes back.
//! 2. `0xE0`: read the temperature taken during step 1, 2 bytes back.
//!
//! Conversions (datasheet §5.1.1 / §5.1.2):
//!
//! ```text
//! RH = 125 · code / 65536 − 6      (clamped to 0..=100)
//! T  = 175.72 · code / 65536 − 46.85
//! ```
//!
//! Generic over [`embedded_hal::i2c::I2c`], so the same driver runs on
//! `linux-embedded-hal` and on the mock bus in tests.

use embedded_hal::i2c::I2c;
use log::warn;

use crate::app::ports::SensorPort;
use crate::error::SensorError;
use crate::reading_log::Sample;

pub const DEFAULT_ADDRESS: u8 = 0x40;

const CMD_MEASURE_RH_HOLD: u8 = 0xE5;
const CMD_READ_PREV_TEMP: u8 = 0xE0;

/// Plausible temperature window of the part (°C).
const T_MIN: f32 = -40.0;
const T_MAX: f32 = 125.0;

pub struct Si7021<I> {
    i2c: I,
    address: u8,
}

impl<I: I2c> Si7021<I> {
    pub fn new(i2c: I) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    pub fn with_address(i2c: I, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn release(self) -> I {
        self.i2c
    }

    fn read_code(&mut self, cmd: u8) -> Result<u16, SensorError> {
        let mut buf = [0u8; 2];
        self.i2c.write_read(self.address, &[cmd], &mut buf).map_err(|e| {
            warn!("Si7021: command 0x{:02X} failed: {:?}", cmd, e);
            SensorError::Bus
        })?;
        // Low two bits are status, not data.
        Ok(u16::from_be_bytes(buf) & !0x0003)
    }
}

pub fn humidity_from_code(code: u16) -> f32 {
    (125.0 * f32::from(code) / 65536.0 - 6.0).clamp(0.0, 100.0)
}

pub fn temperature_from_code(code: u16) -> f32 {
    175.72 * f32::from(code) / 65536.0 - 46.85
}

impl<I: I2c> SensorPort for Si7021<I> {
    fn read(&mut self) -> Result<Sample, SensorError> {
        let humidity = humidity_from_code(self.read_code(CMD_MEASURE_RH_HOLD)?);
        let temperature = temperature_from_code(self.read_code(CMD_READ_PREV_TEMP)?);
        if !(T_MIN..=T_MAX).contains(&temperature) {
            return Err(SensorError::OutOfRange);
        }
        Ok(Sample {
            temperature,
            humidity,
        })
    }
}
