//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises a slice of the monitor
//! against the mock adapters in `mock_hw`.  Everything runs on the host
//! with no modem or sensor attached.

mod command_flow_tests;
mod mock_hw;
mod monitor_tests;
