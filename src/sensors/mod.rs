//! Sensor drivers implementing [`SensorPort`](crate::app::ports::SensorPort).
//!
//! | Driver            | Source                                   |
//! |-------------------|------------------------------------------|
//! | `Si7021`          | Si7021 on any `embedded-hal` I2C bus     |
//! | `SimulatedSensor` | deterministic sine drift (no hardware)   |

pub mod si7021;
pub mod simulated;

pub use si7021::Si7021;
pub use simulated::SimulatedSensor;
