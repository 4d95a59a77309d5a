//! Outbound robot events.
//!
//! The [`RobotService`](super::service::RobotService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to the console, forward to a
//! dashboard, record them in a test.

use crate::app::context::IntakeState;

/// Robot operating mode, chosen by the field or the operator console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Disabled,
    Autonomous,
    Teleop,
}

/// Structured events emitted by the robot core.
#[derive(Debug, Clone, PartialEq)]
pub enum RobotEvent {
    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),

    /// The service switched operating mode.
    ModeChanged { from: Mode, to: Mode },

    /// A command ran its `initialize`.
    CommandStarted(&'static str),

    /// A command ran its `end`.
    CommandEnded { name: &'static str, interrupted: bool },

    /// A schedule request lost to a non-interruptible owner.
    CommandRejected { name: &'static str, blocker: &'static str },

    /// A schedule request refused because a required subsystem depends on
    /// a faulted sensor.
    CommandBlocked(&'static str),

    /// New sensor faults were raised (carries the full active mask).
    FaultDetected(u8),

    /// All sensor faults have been cleared.
    FaultCleared,
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryData {
    pub tick: u64,
    pub mode: Mode,
    pub running_commands: usize,
    pub heading_deg: f32,
    pub left_drive_pos: f32,
    pub right_drive_pos: f32,
    pub left_climber_pos: f32,
    pub right_climber_pos: f32,
    pub intake_state: IntakeState,
    pub fault_flags: u8,
}
