//! Application core: the robot program, zero I/O.
//!
//! This module holds the robot-specific rules: the shared context every
//! command works on, the operator-control map, program wiring and the
//! per-tick service.  All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod context;
pub mod controls;
pub mod events;
pub mod ports;
pub mod service;
pub mod wiring;
