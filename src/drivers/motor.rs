//! H-bridge motor driver (DRV8871-style: one PWM input plus a direction pin).
//!
//! Signed power in [-1, 1] maps to a PWM duty of `|power|` and a direction
//! level.  Position holding runs a software P(ID) loop against the last
//! encoder reading fed in with [`HBridgeMotor::record_position`]; the
//! service re-issues the target every tick, so the loop advances once per
//! control cycle.
//!
//! The driver is generic over `embedded-hal` 1.0 traits, so the same code
//! runs on real PWM peripherals, in the simulator and against test mocks.

use core::fmt;

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::app::ports::Actuator;
use crate::control::pid::{PidController, clamp_power};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverError {
    Pwm,
    Pin,
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pwm => write!(f, "PWM write failed"),
            Self::Pin => write!(f, "direction pin write failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotorState {
    Stopped,
    Running { power: f32 },
    Holding { target: f32 },
}

pub struct HBridgeMotor<P, D> {
    pwm: P,
    dir: D,
    /// Flip the direction level for motors mounted mirrored.
    inverted: bool,
    state: MotorState,
    /// Signed power last written to the bridge.
    applied: f32,
    position: f32,
    hold_loop: PidController,
}

impl<P: SetDutyCycle, D: OutputPin> HBridgeMotor<P, D> {
    /// `hold_loop` is used by [`Actuator::set_position_target`].
    pub fn new(pwm: P, dir: D, hold_loop: PidController) -> Self {
        Self {
            pwm,
            dir,
            inverted: false,
            state: MotorState::Stopped,
            applied: 0.0,
            position: 0.0,
            hold_loop,
        }
    }

    #[must_use]
    pub fn inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    /// Feed the latest encoder reading (rotations).
    pub fn record_position(&mut self, position: f32) {
        if position.is_finite() {
            self.position = position;
        }
    }

    pub fn state(&self) -> MotorState {
        self.state
    }

    /// Signed power currently applied to the bridge.
    pub fn applied_power(&self) -> f32 {
        self.applied
    }

    fn write(&mut self, power: f32) -> Result<(), DriverError> {
        let power = clamp_power(power);
        let forward = (power >= 0.0) != self.inverted;
        if forward {
            self.dir.set_high().map_err(|_| DriverError::Pin)?;
        } else {
            self.dir.set_low().map_err(|_| DriverError::Pin)?;
        }
        let max = u32::from(self.pwm.max_duty_cycle());
        let duty = (power.abs() * max as f32).round() as u32;
        self.pwm
            .set_duty_cycle(duty.min(max) as u16)
            .map_err(|_| DriverError::Pwm)?;
        self.applied = power;
        Ok(())
    }
}

impl<P: SetDutyCycle, D: OutputPin> Actuator for HBridgeMotor<P, D> {
    type Error = DriverError;

    fn set_power(&mut self, power: f32) -> Result<(), DriverError> {
        if matches!(self.state, MotorState::Holding { .. }) {
            self.hold_loop.reset();
        }
        self.write(power)?;
        self.state = if self.applied == 0.0 {
            MotorState::Stopped
        } else {
            MotorState::Running { power: self.applied }
        };
        Ok(())
    }

    fn stop(&mut self) -> Result<(), DriverError> {
        self.hold_loop.reset();
        self.write(0.0)?;
        self.state = MotorState::Stopped;
        Ok(())
    }

    fn position(&self) -> f32 {
        self.position
    }

    fn set_position_target(&mut self, target: f32) -> Result<(), DriverError> {
        match self.state {
            MotorState::Holding { target: current } if current == target => {}
            _ => {
                self.hold_loop.reset();
                self.hold_loop.set_setpoint(target);
            }
        }
        let power = self.hold_loop.calculate(self.position);
        self.write(power)?;
        self.state = MotorState::Holding { target };
        Ok(())
    }
}
