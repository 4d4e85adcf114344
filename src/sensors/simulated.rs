//! Deterministic stand-in sensor for host runs without hardware.
//!
//! Each read advances one step along a slow sine around a base point, so
//! a long run sweeps through both alarm bands of a typical profile.

use core::f32::consts::TAU;

use crate::app::ports::SensorPort;
use crate::error::SensorError;
use crate::reading_log::Sample;

/// Reads per full sine period.
const PERIOD_STEPS: u32 = 48;

pub struct SimulatedSensor {
    base: Sample,
    amplitude: Sample,
    step: u32,
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new(
            Sample {
                temperature: 5.0,
                humidity: 55.0,
            },
            Sample {
                temperature: 4.0,
                humidity: 30.0,
            },
        )
    }
}

impl SimulatedSensor {
    pub fn new(base: Sample, amplitude: Sample) -> Self {
        Self {
            base,
            amplitude,
            step: 0,
        }
    }
}

impl SensorPort for SimulatedSensor {
    fn read(&mut self) -> Result<Sample, SensorError> {
        let phase = TAU * (self.step % PERIOD_STEPS) as f32 / PERIOD_STEPS as f32;
        self.step = self.step.wrapping_add(1);
        Ok(Sample {
            temperature: self.base.temperature + self.amplitude.temperature * phase.sin(),
            // Humidity lags a quarter period behind temperature.
            humidity: (self.base.humidity + self.amplitude.humidity * phase.cos())
                .clamp(0.0, 100.0),
        })
    }
}
