//! Actuator and sensor drivers over `embedded-hal` traits.

pub mod limit_switch;
pub mod motor;
