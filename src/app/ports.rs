//! Port traits forming the hexagonal boundary between the robot program and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ RobotService (domain)
//! ```
//!
//! Driven adapters (operator interface, sensors, actuators, event sinks)
//! implement these traits.  The [`RobotService`](super::service::RobotService)
//! consumes them via generics, so the control core never touches hardware
//! directly.  Every call is a non-blocking sample or set.

use crate::io::{IndicatorId, InputSnapshot};
use crate::sensors::SensorFrame;

// ───────────────────────────────────────────────────────────────
// Actuator channel identity
// ───────────────────────────────────────────────────────────────

/// Motor channels driven by the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    LeftDrive,
    RightDrive,
    IntakePivot,
    IntakeRoller,
    Conveyor,
    LeftClimber,
    RightClimber,
}

impl Channel {
    pub const COUNT: usize = 7;

    pub const ALL: [Self; Self::COUNT] = [
        Self::LeftDrive,
        Self::RightDrive,
        Self::IntakePivot,
        Self::IntakeRoller,
        Self::Conveyor,
        Self::LeftClimber,
        Self::RightClimber,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Pneumatic outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Solenoid {
    /// Extended = low gear.
    Shifter,
    ClimbExtend,
    BuddyClimb,
    /// Extended = lock closed.
    IntakeLock,
}

impl Solenoid {
    pub const COUNT: usize = 4;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Shifter,
        Self::ClimbExtend,
        Self::BuddyClimb,
        Self::IntakeLock,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

// ───────────────────────────────────────────────────────────────
// Single-actuator interface (implemented by drivers)
// ───────────────────────────────────────────────────────────────

/// A motor controller as seen by the program.
pub trait Actuator {
    type Error;

    /// Drive at `power` in [-1, 1].  Out-of-range values are clamped.
    fn set_power(&mut self, power: f32) -> Result<(), Self::Error>;

    fn stop(&mut self) -> Result<(), Self::Error>;

    /// Current position in rotations.
    fn position(&self) -> f32;

    /// Hold a position using the controller's own loop.
    fn set_position_target(&mut self, target: f32) -> Result<(), Self::Error>;
}

// ───────────────────────────────────────────────────────────────
// Input port (driven adapter: operator interface → domain)
// ───────────────────────────────────────────────────────────────

pub trait InputPort {
    /// Sample every button and axis once.
    fn read_inputs(&mut self) -> InputSnapshot;
}

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

pub trait SensorPort {
    /// Sample whatever sensors are available this tick.
    fn read_sensors(&mut self) -> SensorFrame;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command actuators.
pub trait ActuatorPort {
    /// Drive a channel at `power` in [-1, 1].
    fn set_power(&mut self, channel: Channel, power: f32);

    /// Closed-loop position hold on a channel.
    fn set_position_target(&mut self, channel: Channel, position: f32);

    fn stop(&mut self, channel: Channel);

    fn set_solenoid(&mut self, solenoid: Solenoid, extended: bool);

    fn set_indicator(&mut self, indicator: IndicatorId, on: bool);

    /// Stop every motor channel for a safe shutdown.  Solenoids keep their
    /// position.
    fn all_off(&mut self) {
        for channel in Channel::ALL {
            self.stop(channel);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`RobotEvent`](super::events::RobotEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::RobotEvent);
}
