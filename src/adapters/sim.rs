//! Simulated robot hardware for the host binary and scenario tests.
//!
//! [`SimHardware`] implements every hardware port.  Motors are real
//! [`HBridgeMotor`] drivers writing to in-memory PWM and direction pins,
//! and the intake limit switch is a real [`LimitSwitch`] reading an
//! in-memory pin, so the driver layer runs unchanged against the model.
//!
//! The plant is a first-order kinematic model advanced once per
//! [`SensorPort::read_sensors`] call, using the power applied during the
//! previous tick:
//!
//! - drive encoders integrate side power
//! - heading integrates the power difference (counter-clockwise positive)
//! - climber winches integrate power within their travel
//! - the intake pivot integrates power; the up limit is pressed at zero

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType as PinErrorType, InputPin, OutputPin};
use embedded_hal::pwm::{ErrorType as PwmErrorType, SetDutyCycle};
use log::warn;

use crate::app::context::MAX_INDICATORS;
use crate::app::ports::{Actuator, ActuatorPort, Channel, InputPort, SensorPort, Solenoid};
use crate::control::pid::{PidController, PidGains};
use crate::drivers::limit_switch::LimitSwitch;
use crate::drivers::motor::{DriverError, HBridgeMotor};
use crate::io::{AxisId, ButtonId, IndicatorId, InputSnapshot};
use crate::sensors::SensorFrame;

/// Drive wheel speed at full power (rotations per second).
const DRIVE_RATE: f32 = 20.0;
/// Turn rate at full differential power (degrees per second).
const TURN_RATE_DEG: f32 = 180.0;
/// Winch speed at full power (rotations per second).
const CLIMBER_RATE: f32 = 60.0;
const CLIMBER_TRAVEL: f32 = 130.0;
/// Pivot speed at full power (rotations per second); positive is down.
const PIVOT_RATE: f32 = 2.0;
const PIVOT_TRAVEL: f32 = 1.0;
const PIVOT_LIMIT_BAND: f32 = 0.01;
/// Proportional gain of the motor controllers' position hold loop.
const HOLD_KP: f32 = 0.1;
const HOLD_LIMIT: f32 = 0.5;

// ── Simulated pins ───────────────────────────────────────────

/// PWM channel that remembers its duty cycle.
#[derive(Debug, Default)]
pub struct SimPwm {
    duty: u16,
}

impl SimPwm {
    const MAX_DUTY: u16 = 1000;
}

impl PwmErrorType for SimPwm {
    type Error = Infallible;
}

impl SetDutyCycle for SimPwm {
    fn max_duty_cycle(&self) -> u16 {
        Self::MAX_DUTY
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Infallible> {
        self.duty = duty;
        Ok(())
    }
}

/// Digital pin usable as either an output or an input.
#[derive(Debug, Default)]
pub struct SimPin {
    high: bool,
}

impl PinErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.high = true;
        Ok(())
    }
}

impl InputPin for SimPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.high)
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.high)
    }
}

type SimMotor = HBridgeMotor<SimPwm, SimPin>;

// ── Sensor dropout ───────────────────────────────────────────

/// A sensor channel whose samples can be withheld.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimSensor {
    Gyro,
    DriveEncoders,
    LeftClimber,
    RightClimber,
    IntakeLimit,
}

impl SimSensor {
    const COUNT: usize = 5;

    const fn index(self) -> usize {
        self as usize
    }
}

// ── SimHardware ──────────────────────────────────────────────

pub struct SimHardware {
    dt: f32,
    inputs: InputSnapshot,
    motors: [SimMotor; Channel::COUNT],
    /// Plant position per channel (rotations).
    positions: [f32; Channel::COUNT],
    heading_deg: f32,
    intake_limit: LimitSwitch<SimPin>,
    solenoids: [bool; Solenoid::COUNT],
    indicators: [bool; MAX_INDICATORS],
    dropped: [bool; SimSensor::COUNT],
}

impl SimHardware {
    /// A robot at rest with the intake seated on its up limit.
    pub fn new(tick_secs: f32) -> Self {
        let hold = PidController::new(PidGains::p(HOLD_KP), tick_secs).with_output_limit(HOLD_LIMIT);
        let motors = core::array::from_fn(|i| {
            let motor = HBridgeMotor::new(SimPwm::default(), SimPin::default(), hold.clone());
            // Right side of the drivetrain is mounted mirrored.
            motor.inverted(i == Channel::RightDrive.index())
        });
        Self {
            dt: tick_secs,
            inputs: InputSnapshot::default(),
            motors,
            positions: [0.0; Channel::COUNT],
            heading_deg: 0.0,
            intake_limit: LimitSwitch::new(SimPin { high: false }),
            solenoids: [false; Solenoid::COUNT],
            indicators: [false; MAX_INDICATORS],
            dropped: [false; SimSensor::COUNT],
        }
    }

    // ── Operator input ────────────────────────────────────────

    pub fn set_button(&mut self, id: ButtonId, pressed: bool) {
        self.inputs.set_button(id, pressed);
    }

    pub fn set_axis(&mut self, id: AxisId, value: f32) {
        self.inputs.set_axis(id, value);
    }

    /// Release every button and center every axis.
    pub fn release_all(&mut self) {
        self.inputs = InputSnapshot::default();
    }

    // ── Fault injection ───────────────────────────────────────

    /// Withhold (or restore) a sensor's samples.
    pub fn set_dropout(&mut self, sensor: SimSensor, dropped: bool) {
        self.dropped[sensor.index()] = dropped;
    }

    /// Move a mechanism directly, e.g. to model an external push.
    pub fn set_position(&mut self, channel: Channel, position: f32) {
        self.positions[channel.index()] = position;
        self.motors[channel.index()].record_position(position);
    }

    // ── Observation ───────────────────────────────────────────

    pub fn position(&self, channel: Channel) -> f32 {
        self.positions[channel.index()]
    }

    /// Signed power the motor driver is applying.
    pub fn applied_power(&self, channel: Channel) -> f32 {
        self.motors[channel.index()].applied_power()
    }

    pub fn heading_deg(&self) -> f32 {
        self.heading_deg
    }

    pub fn solenoid(&self, solenoid: Solenoid) -> bool {
        self.solenoids[solenoid.index()]
    }

    pub fn indicator(&self, id: IndicatorId) -> bool {
        self.indicators.get(id.0 as usize).copied().unwrap_or(false)
    }

    // ── Plant model ───────────────────────────────────────────

    fn integrate(&mut self) {
        let dt = self.dt;
        let left = self.applied_power(Channel::LeftDrive);
        let right = self.applied_power(Channel::RightDrive);
        self.heading_deg += (right - left) / 2.0 * TURN_RATE_DEG * dt;

        for channel in Channel::ALL {
            let i = channel.index();
            let power = self.motors[i].applied_power();
            let next = match channel {
                Channel::LeftDrive | Channel::RightDrive => self.positions[i] + power * DRIVE_RATE * dt,
                Channel::LeftClimber | Channel::RightClimber => {
                    (self.positions[i] + power * CLIMBER_RATE * dt).clamp(0.0, CLIMBER_TRAVEL)
                }
                Channel::IntakePivot => (self.positions[i] + power * PIVOT_RATE * dt).clamp(0.0, PIVOT_TRAVEL),
                Channel::IntakeRoller | Channel::Conveyor => self.positions[i] + power * dt,
            };
            self.positions[i] = next;
            self.motors[i].record_position(next);
        }

        // Active-low: the pin reads low while the arm is seated.
        let seated = self.positions[Channel::IntakePivot.index()] <= PIVOT_LIMIT_BAND;
        self.intake_limit.pin_mut().high = !seated;
    }

    fn sample(&self, sensor: SimSensor, value: f32) -> Option<f32> {
        (!self.dropped[sensor.index()]).then_some(value)
    }

    fn drive(&mut self, channel: Channel, f: impl FnOnce(&mut SimMotor) -> Result<(), DriverError>) {
        if let Err(e) = f(&mut self.motors[channel.index()]) {
            warn!("SimHardware: {:?} write failed: {}", channel, e);
        }
    }
}

impl InputPort for SimHardware {
    fn read_inputs(&mut self) -> InputSnapshot {
        self.inputs
    }
}

impl SensorPort for SimHardware {
    fn read_sensors(&mut self) -> SensorFrame {
        self.integrate();
        let limit = if self.dropped[SimSensor::IntakeLimit.index()] {
            None
        } else {
            self.intake_limit.sample()
        };
        SensorFrame {
            heading_deg: self.sample(SimSensor::Gyro, self.heading_deg),
            left_drive_pos: self.sample(SimSensor::DriveEncoders, self.position(Channel::LeftDrive)),
            right_drive_pos: self.sample(SimSensor::DriveEncoders, self.position(Channel::RightDrive)),
            left_climber_pos: self.sample(SimSensor::LeftClimber, self.position(Channel::LeftClimber)),
            right_climber_pos: self.sample(SimSensor::RightClimber, self.position(Channel::RightClimber)),
            intake_up_limit: limit,
        }
    }
}

impl ActuatorPort for SimHardware {
    fn set_power(&mut self, channel: Channel, power: f32) {
        self.drive(channel, |m| m.set_power(power));
    }

    fn set_position_target(&mut self, channel: Channel, position: f32) {
        self.drive(channel, |m| m.set_position_target(position));
    }

    fn stop(&mut self, channel: Channel) {
        self.drive(channel, |m| m.stop());
    }

    fn set_solenoid(&mut self, solenoid: Solenoid, extended: bool) {
        self.solenoids[solenoid.index()] = extended;
    }

    fn set_indicator(&mut self, indicator: IndicatorId, on: bool) {
        if let Some(slot) = self.indicators.get_mut(indicator.0 as usize) {
            *slot = on;
        }
    }
}
