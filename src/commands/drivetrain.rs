//! Drivetrain behaviors: stick driving, heading turns, distance drives and
//! gear shifting.

use crate::app::context::RobotContext;
use crate::app::controls::{controller, launchpad};
use crate::app::ports::{Channel, Solenoid};
use crate::command::{Command, InstantCommand, StartEndCommand};
use crate::config::{DriveConfig, EncoderDriveConfig, LoopConfig};
use crate::control::pid::{PidController, clamp_power, is_within};
use crate::subsystem::SubsystemSet;

fn stop_drive(ctx: &mut RobotContext) {
    ctx.outputs.stop(Channel::LeftDrive);
    ctx.outputs.stop(Channel::RightDrive);
}

fn deadband(value: f32, band: f32) -> f32 {
    if value.abs() < band { 0.0 } else { value }
}

// ---------------------------------------------------------------------------
// ArcadeDrive
// ---------------------------------------------------------------------------

/// Default drivetrain command: throttle from the triggers, turn from the
/// left stick.
pub struct ArcadeDrive {
    requirements: SubsystemSet,
    config: DriveConfig,
}

impl ArcadeDrive {
    pub fn new(requirements: SubsystemSet, config: DriveConfig) -> Self {
        Self {
            requirements,
            config,
        }
    }

    /// Mix throttle and turn into (left, right) side powers.
    pub fn mix(&self, forward: f32, reverse: f32, turn: f32) -> (f32, f32) {
        let throttle = forward - reverse;
        let turn = deadband(turn, self.config.deadband) * self.config.turn_scale;
        (clamp_power(throttle + turn), clamp_power(throttle - turn))
    }
}

impl Command<RobotContext> for ArcadeDrive {
    fn name(&self) -> &'static str {
        "ArcadeDrive"
    }

    fn requirements(&self) -> SubsystemSet {
        self.requirements
    }

    fn execute(&mut self, ctx: &mut RobotContext) {
        let (left, right) = self.mix(
            ctx.inputs.axis(controller::RIGHT_TRIGGER),
            ctx.inputs.axis(controller::LEFT_TRIGGER),
            ctx.inputs.axis(controller::LEFT_X),
        );
        ctx.outputs.set_power(Channel::LeftDrive, left);
        ctx.outputs.set_power(Channel::RightDrive, right);
    }

    fn end(&mut self, ctx: &mut RobotContext, _interrupted: bool) {
        stop_drive(ctx);
    }
}

// ---------------------------------------------------------------------------
// GyroTurn
// ---------------------------------------------------------------------------

/// Turn in place by `angle` degrees relative to the heading at start.
///
/// Positive angles turn counter-clockwise: left side backwards, right side
/// forwards.
pub struct GyroTurn {
    requirements: SubsystemSet,
    angle: f32,
    pid: PidController,
}

impl GyroTurn {
    pub fn new(requirements: SubsystemSet, angle: f32, control: &LoopConfig, period_secs: f32) -> Self {
        Self {
            requirements,
            angle,
            pid: control.controller(period_secs),
        }
    }

    pub fn setpoint(&self) -> f32 {
        self.pid.setpoint()
    }
}

impl Command<RobotContext> for GyroTurn {
    fn name(&self) -> &'static str {
        "GyroTurn"
    }

    fn requirements(&self) -> SubsystemSet {
        self.requirements
    }

    fn initialize(&mut self, ctx: &mut RobotContext) {
        self.pid.reset();
        self.pid.set_setpoint(ctx.sensors.heading_deg + self.angle);
    }

    fn execute(&mut self, ctx: &mut RobotContext) {
        let power = self.pid.calculate(ctx.sensors.heading_deg);
        ctx.outputs.set_power(Channel::LeftDrive, -power);
        ctx.outputs.set_power(Channel::RightDrive, power);
    }

    fn end(&mut self, ctx: &mut RobotContext, _interrupted: bool) {
        stop_drive(ctx);
    }

    fn is_finished(&mut self, _ctx: &RobotContext) -> bool {
        self.pid.at_setpoint()
    }
}

// ---------------------------------------------------------------------------
// EncoderDrive
// ---------------------------------------------------------------------------

/// Drive straight for `distance` rotations measured on the drive encoders.
pub struct EncoderDrive {
    requirements: SubsystemSet,
    distance: f32,
    window: f32,
    pid: PidController,
    start: (f32, f32),
}

impl EncoderDrive {
    pub fn new(requirements: SubsystemSet, distance: f32, config: &EncoderDriveConfig, period_secs: f32) -> Self {
        Self {
            requirements,
            distance,
            window: config.control.tolerance,
            pid: config.control.controller(period_secs),
            start: (0.0, 0.0),
        }
    }

    fn travelled(&self, ctx: &RobotContext) -> (f32, f32) {
        (
            ctx.sensors.left_drive_pos - self.start.0,
            ctx.sensors.right_drive_pos - self.start.1,
        )
    }
}

impl Command<RobotContext> for EncoderDrive {
    fn name(&self) -> &'static str {
        "EncoderDrive"
    }

    fn requirements(&self) -> SubsystemSet {
        self.requirements
    }

    fn initialize(&mut self, ctx: &mut RobotContext) {
        self.start = (ctx.sensors.left_drive_pos, ctx.sensors.right_drive_pos);
        self.pid.reset();
        self.pid.set_setpoint(self.distance);
    }

    fn execute(&mut self, ctx: &mut RobotContext) {
        let (left, right) = self.travelled(ctx);
        let power = self.pid.calculate((left + right) / 2.0);
        ctx.outputs.set_power(Channel::LeftDrive, power);
        ctx.outputs.set_power(Channel::RightDrive, power);
    }

    fn end(&mut self, ctx: &mut RobotContext, _interrupted: bool) {
        stop_drive(ctx);
    }

    fn is_finished(&mut self, ctx: &RobotContext) -> bool {
        let (left, right) = self.travelled(ctx);
        is_within(left, self.distance, self.window) && is_within(right, self.distance, self.window)
    }
}

// ---------------------------------------------------------------------------
// Shifting
// ---------------------------------------------------------------------------

fn low_gear(ctx: &mut RobotContext) {
    ctx.outputs.set_solenoid(Solenoid::Shifter, true);
}

fn high_gear(ctx: &mut RobotContext) {
    ctx.outputs.set_solenoid(Solenoid::Shifter, false);
}

/// Shift to low gear (no requirements, usable inside mode-entry groups).
pub fn shift_low() -> InstantCommand<RobotContext> {
    InstantCommand::new("ShiftLow", SubsystemSet::EMPTY, low_gear)
}

pub fn shift_high() -> InstantCommand<RobotContext> {
    InstantCommand::new("ShiftHigh", SubsystemSet::EMPTY, high_gear)
}

fn low_gear_lamps(ctx: &mut RobotContext) {
    low_gear(ctx);
    ctx.outputs.set_indicator(launchpad::BIG_LED_RED, true);
    ctx.outputs.set_indicator(launchpad::BIG_LED_GREEN, false);
}

fn high_gear_lamps(ctx: &mut RobotContext) {
    high_gear(ctx);
    ctx.outputs.set_indicator(launchpad::BIG_LED_RED, false);
    ctx.outputs.set_indicator(launchpad::BIG_LED_GREEN, true);
}

/// Toggle target: low gear while latched, high gear when released.
pub fn shift_toggle(shifter: SubsystemSet) -> StartEndCommand<RobotContext> {
    StartEndCommand::new("ShiftToggle", shifter, low_gear_lamps, high_gear_lamps)
}
