//! Unattended temperature/humidity monitor.
//!
//! Exposes the pure-logic modules and the adapters for integration
//! testing.  The binary in `main.rs` wires them to real hardware.

#![deny(unused_must_use)]

pub mod adapters;
pub mod alarm;
pub mod app;
pub mod config;
pub mod error;
pub mod profile;
pub mod reading_log;
pub mod scheduler;
pub mod sensors;
pub mod tasks;
