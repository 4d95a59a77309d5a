//! Intake arm behaviors.
//!
//! The arm has three logical positions tracked in
//! [`RobotContext::intake_state`]: `Up` (seated on the up limit switch),
//! `Down` (on the floor, rollers spinning) and `Loading` (partway, for
//! feeding the conveyor).  Only `Up` has a sensor; the others are reached
//! by timed pivot moves.

use log::debug;

use crate::app::context::{IntakeState, RobotContext};
use crate::app::ports::{Channel, Solenoid};
use crate::command::{Command, StartEndCommand};
use crate::error::SensorFault;
use crate::io::{AxisId, ButtonId, OperatorInput};
use crate::subsystem::SubsystemSet;

fn stop_pivot(ctx: &mut RobotContext) {
    ctx.outputs.stop(Channel::IntakePivot);
}

// ---------------------------------------------------------------------------
// Default
// ---------------------------------------------------------------------------

/// Default intake-arm command: keeps a nominally-up arm seated.
///
/// While the arm is `Up` but off the limit switch it pulls back up; once on
/// the switch it applies the small hold power.  With the limit switch
/// faulted, or in any other state, the pivot is left stopped.
pub struct IntakeArmDefault {
    requirements: SubsystemSet,
}

impl IntakeArmDefault {
    pub fn new(requirements: SubsystemSet) -> Self {
        Self { requirements }
    }
}

impl Command<RobotContext> for IntakeArmDefault {
    fn name(&self) -> &'static str {
        "IntakeArmDefault"
    }

    fn requirements(&self) -> SubsystemSet {
        self.requirements
    }

    fn execute(&mut self, ctx: &mut RobotContext) {
        if ctx.intake_state != IntakeState::Up || ctx.has_fault(SensorFault::IntakeLimitStale) {
            stop_pivot(ctx);
        } else if ctx.sensors.intake_up_limit {
            let hold = ctx.config.intake.hold_power;
            ctx.outputs.set_power(Channel::IntakePivot, hold);
        } else {
            let up = ctx.config.intake.pivot_up_power;
            ctx.outputs.set_power(Channel::IntakePivot, up);
        }
    }

    fn end(&mut self, ctx: &mut RobotContext, _interrupted: bool) {
        stop_pivot(ctx);
    }
}

// ---------------------------------------------------------------------------
// Positioning moves
// ---------------------------------------------------------------------------

/// Lower the arm to the floor and start the rollers.
///
/// Timed: the pivot runs for `set_down_secs`.  If the arm was not `Up` it is
/// already low, so the command only switches the rollers on and finishes
/// on its first tick.
pub struct SetDown {
    requirements: SubsystemSet,
    started: u64,
    early: bool,
}

impl SetDown {
    pub fn new(requirements: SubsystemSet) -> Self {
        Self {
            requirements,
            started: 0,
            early: false,
        }
    }
}

impl Command<RobotContext> for SetDown {
    fn name(&self) -> &'static str {
        "SetDown"
    }

    fn requirements(&self) -> SubsystemSet {
        self.requirements
    }

    fn initialize(&mut self, ctx: &mut RobotContext) {
        self.started = ctx.tick;
        let cfg = ctx.config.intake;
        ctx.outputs.set_solenoid(Solenoid::IntakeLock, false);
        self.early = ctx.intake_state != IntakeState::Up;
        if !self.early {
            ctx.outputs.set_power(Channel::IntakePivot, cfg.pivot_down_power);
        }
        ctx.outputs.set_power(Channel::IntakeRoller, cfg.roller_power);
        ctx.intake_state = IntakeState::Down;
    }

    fn end(&mut self, ctx: &mut RobotContext, _interrupted: bool) {
        stop_pivot(ctx);
    }

    fn is_finished(&mut self, ctx: &RobotContext) -> bool {
        self.early || ctx.secs_since(self.started) >= ctx.config.intake.set_down_secs
    }
}

/// Raise the arm until it seats on the up limit switch, or give up after
/// `set_up_timeout_secs`.  Rollers stop immediately.
pub struct SetUp {
    requirements: SubsystemSet,
    started: u64,
}

impl SetUp {
    pub fn new(requirements: SubsystemSet) -> Self {
        Self {
            requirements,
            started: 0,
        }
    }
}

impl Command<RobotContext> for SetUp {
    fn name(&self) -> &'static str {
        "SetUp"
    }

    fn requirements(&self) -> SubsystemSet {
        self.requirements
    }

    fn initialize(&mut self, ctx: &mut RobotContext) {
        self.started = ctx.tick;
        ctx.outputs.stop(Channel::IntakeRoller);
        let up = ctx.config.intake.pivot_up_power;
        ctx.outputs.set_power(Channel::IntakePivot, up);
        ctx.intake_state = IntakeState::Up;
    }

    fn end(&mut self, ctx: &mut RobotContext, interrupted: bool) {
        if !interrupted && !ctx.sensors.intake_up_limit {
            debug!("SetUp: timed out before reaching the up limit");
        }
        stop_pivot(ctx);
    }

    fn is_finished(&mut self, ctx: &RobotContext) -> bool {
        ctx.sensors.intake_up_limit || ctx.secs_since(self.started) >= ctx.config.intake.set_up_timeout_secs
    }
}

/// Move the arm to the loading position: down from `Up`, up from `Down`.
/// Already loading finishes at once.
pub struct SetLoad {
    requirements: SubsystemSet,
    started: u64,
    early: bool,
}

impl SetLoad {
    pub fn new(requirements: SubsystemSet) -> Self {
        Self {
            requirements,
            started: 0,
            early: false,
        }
    }
}

impl Command<RobotContext> for SetLoad {
    fn name(&self) -> &'static str {
        "SetLoad"
    }

    fn requirements(&self) -> SubsystemSet {
        self.requirements
    }

    fn initialize(&mut self, ctx: &mut RobotContext) {
        self.started = ctx.tick;
        let cfg = ctx.config.intake;
        self.early = false;
        match ctx.intake_state {
            IntakeState::Up => ctx.outputs.set_power(Channel::IntakePivot, cfg.pivot_down_power),
            IntakeState::Down => ctx.outputs.set_power(Channel::IntakePivot, cfg.pivot_up_power),
            IntakeState::Loading => self.early = true,
        }
        ctx.intake_state = IntakeState::Loading;
    }

    fn end(&mut self, ctx: &mut RobotContext, _interrupted: bool) {
        stop_pivot(ctx);
    }

    fn is_finished(&mut self, ctx: &RobotContext) -> bool {
        self.early || ctx.secs_since(self.started) >= ctx.config.intake.set_load_secs
    }
}

// ---------------------------------------------------------------------------
// Manual override
// ---------------------------------------------------------------------------

/// Operator override of the whole intake.
///
/// Each tick the gating buttons pick what the axis drives:
/// * `direct` held: the axis drives the rollers, pivot stopped.
/// * otherwise: the axis drives the pivot and the rollers run at the
///   configured power while `roller` is held.
pub struct IntakeOverride {
    requirements: SubsystemSet,
    axis: AxisId,
    roller: ButtonId,
    direct: ButtonId,
}

impl IntakeOverride {
    pub fn new(requirements: SubsystemSet, axis: AxisId, roller: ButtonId, direct: ButtonId) -> Self {
        Self {
            requirements,
            axis,
            roller,
            direct,
        }
    }
}

impl Command<RobotContext> for IntakeOverride {
    fn name(&self) -> &'static str {
        "IntakeOverride"
    }

    fn requirements(&self) -> SubsystemSet {
        self.requirements
    }

    fn initialize(&mut self, ctx: &mut RobotContext) {
        stop_pivot(ctx);
        ctx.outputs.stop(Channel::IntakeRoller);
    }

    fn execute(&mut self, ctx: &mut RobotContext) {
        let value = ctx.axis(self.axis);
        if ctx.button(self.direct) {
            ctx.outputs.set_power(Channel::IntakeRoller, value);
            stop_pivot(ctx);
        } else {
            let roller = if ctx.button(self.roller) {
                ctx.config.intake.roller_power
            } else {
                0.0
            };
            ctx.outputs.set_power(Channel::IntakeRoller, roller);
            ctx.outputs.set_power(Channel::IntakePivot, value);
        }
    }

    fn end(&mut self, ctx: &mut RobotContext, _interrupted: bool) {
        stop_pivot(ctx);
        ctx.outputs.stop(Channel::IntakeRoller);
    }
}

// ---------------------------------------------------------------------------
// Lock
// ---------------------------------------------------------------------------

fn close_lock(ctx: &mut RobotContext) {
    ctx.outputs.set_solenoid(Solenoid::IntakeLock, true);
}

fn open_lock(ctx: &mut RobotContext) {
    ctx.outputs.set_solenoid(Solenoid::IntakeLock, false);
}

/// Toggle target: lock closed while latched, open when released.
pub fn lock_toggle(intake_arm: SubsystemSet) -> StartEndCommand<RobotContext> {
    StartEndCommand::new("IntakeLock", intake_arm, close_lock, open_lock)
}
