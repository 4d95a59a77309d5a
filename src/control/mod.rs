//! Closed-loop control primitives.

pub mod pid;

pub use pid::{PidController, PidGains, clamp_power, is_within};
