//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules of the monitor: command
//! parsing, reply texts, task dispatch and the sampling cycle.  All
//! interaction with the sensor, the modem and the filesystem happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod commands;
pub mod events;
pub mod messages;
pub mod ports;
pub mod service;
