//! Shared mutable context threaded through every command.
//!
//! `RobotContext` is the single struct commands read from and write to.  It
//! holds this tick's operator input and sensor snapshot, the actuator
//! outputs commands request, timing, configuration, the intake arm's
//! logical state and the active fault mask.  The service applies
//! `outputs` to the hardware after the scheduler has run.

use crate::config::RobotConfig;
use crate::control::pid::clamp_power;
use crate::error::SensorFault;
use crate::io::{AxisId, ButtonId, IndicatorId, IndicatorOutput, InputSnapshot, OperatorInput};
use crate::sensors::SensorSnapshot;

use super::ports::{Channel, Solenoid};

/// Number of indicator lamps the context tracks.
pub const MAX_INDICATORS: usize = 16;

// ---------------------------------------------------------------------------
// Actuator outputs (written by commands; consumed by the service)
// ---------------------------------------------------------------------------

/// Requested state of one motor channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotorOutput {
    Stopped,
    /// Open-loop power in [-1, 1].
    Power(f32),
    /// Closed-loop hold at an encoder position.
    Position(f32),
}

/// Outputs persist across ticks until a command writes them again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuatorCommands {
    motors: [MotorOutput; Channel::COUNT],
    solenoids: [bool; Solenoid::COUNT],
    indicators: [bool; MAX_INDICATORS],
}

impl Default for ActuatorCommands {
    fn default() -> Self {
        Self {
            motors: [MotorOutput::Stopped; Channel::COUNT],
            solenoids: [false; Solenoid::COUNT],
            indicators: [false; MAX_INDICATORS],
        }
    }
}

impl ActuatorCommands {
    /// Request open-loop power; clamped to [-1, 1], NaN stops the channel.
    pub fn set_power(&mut self, channel: Channel, power: f32) {
        self.motors[channel.index()] = MotorOutput::Power(clamp_power(power));
    }

    pub fn stop(&mut self, channel: Channel) {
        self.motors[channel.index()] = MotorOutput::Stopped;
    }

    pub fn hold_position(&mut self, channel: Channel, position: f32) {
        self.motors[channel.index()] = if position.is_finite() {
            MotorOutput::Position(position)
        } else {
            MotorOutput::Stopped
        };
    }

    pub fn motor(&self, channel: Channel) -> MotorOutput {
        self.motors[channel.index()]
    }

    /// Open-loop power of a channel (0 when stopped or holding).
    pub fn power(&self, channel: Channel) -> f32 {
        match self.motor(channel) {
            MotorOutput::Power(p) => p,
            _ => 0.0,
        }
    }

    pub fn set_solenoid(&mut self, solenoid: Solenoid, extended: bool) {
        self.solenoids[solenoid.index()] = extended;
    }

    pub fn solenoid(&self, solenoid: Solenoid) -> bool {
        self.solenoids[solenoid.index()]
    }

    pub fn set_indicator(&mut self, id: IndicatorId, on: bool) {
        if let Some(slot) = self.indicators.get_mut(id.0 as usize) {
            *slot = on;
        }
    }

    pub fn indicator(&self, id: IndicatorId) -> bool {
        self.indicators.get(id.0 as usize).copied().unwrap_or(false)
    }

    pub fn indicators(&self) -> impl Iterator<Item = (IndicatorId, bool)> + '_ {
        self.indicators
            .iter()
            .enumerate()
            .map(|(i, on)| (IndicatorId(i as u8), *on))
    }

    /// Every motor stopped.  Solenoids and lamps are left as they are.
    pub fn stop_all_motors(&mut self) {
        self.motors = [MotorOutput::Stopped; Channel::COUNT];
    }
}

// ---------------------------------------------------------------------------
// Intake arm logical state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntakeState {
    #[default]
    Up,
    Down,
    Loading,
}

// ---------------------------------------------------------------------------
// RobotContext
// ---------------------------------------------------------------------------

/// The shared context passed to every command.
#[derive(Debug, Clone)]
pub struct RobotContext {
    // -- Timing --
    /// Monotonic tick count, advanced by the service at the start of a tick.
    pub tick: u64,
    /// Duration of one tick in seconds.
    pub tick_period_secs: f32,

    // -- Inputs --
    pub inputs: InputSnapshot,
    pub sensors: SensorSnapshot,

    // -- Outputs --
    pub outputs: ActuatorCommands,

    // -- Mechanism state --
    pub intake_state: IntakeState,

    // -- Configuration --
    pub config: RobotConfig,

    // -- Safety --
    /// Active sensor fault bitmask (see `SensorFault::mask()`).
    pub fault_flags: u8,
}

impl RobotContext {
    pub fn new(config: RobotConfig) -> Self {
        Self {
            tick: 0,
            tick_period_secs: config.tick_secs(),
            inputs: InputSnapshot::default(),
            sensors: SensorSnapshot::default(),
            outputs: ActuatorCommands::default(),
            intake_state: IntakeState::Up,
            config,
            fault_flags: 0,
        }
    }

    /// Seconds elapsed since tick `since`.
    pub fn secs_since(&self, since: u64) -> f32 {
        self.tick.saturating_sub(since) as f32 * self.tick_period_secs
    }

    pub fn has_fault(&self, fault: SensorFault) -> bool {
        self.fault_flags & fault.mask() != 0
    }
}

impl OperatorInput for RobotContext {
    fn button(&self, id: ButtonId) -> bool {
        self.inputs.button(id)
    }

    fn axis(&self, id: AxisId) -> f32 {
        self.inputs.axis(id)
    }
}

impl IndicatorOutput for RobotContext {
    fn set_indicator(&mut self, id: IndicatorId, on: bool) {
        self.outputs.set_indicator(id, on);
    }
}
