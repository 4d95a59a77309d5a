//! Climber behaviors.
//!
//! The two-phase climb is the interesting one.  Each winch runs its own
//! [`Fsm`] through `Idle → Raising → Extended → Retracting → Locked`; the
//! [`ClimbSequence`] command owns both and layers a joint phase on top:
//!
//! ```text
//!   Reaching ──both Extended──▶ AwaitConfirm ──confirm edge──▶ Pulling ──both Locked──▶ Done
//!      │    ◀──either not Extended──┘                                    (settled)
//!      └──raise timeout──▶ Aborted
//! ```
//!
//! The joint conditions are re-evaluated every tick from the arms' current
//! states, never latched: an arm that sags out of `Extended` while the
//! sequence waits for confirmation sends it back to `Reaching`.

use log::{info, warn};

use crate::app::context::RobotContext;
use crate::app::ports::Solenoid;
use crate::command::{Command, InstantCommand};
use crate::config::{ClimberConfig, LoopConfig};
use crate::control::pid::PidController;
use crate::fsm::{Fsm, StateClock, StateDescriptor, StateSet};
use crate::io::{AxisId, ButtonId, OperatorInput};
use crate::subsystem::SubsystemSet;

use super::ArmSide;

// ---------------------------------------------------------------------------
// Per-arm state machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmPhase {
    Idle,
    Raising,
    Extended,
    Retracting,
    Locked,
}

impl StateSet for ArmPhase {
    const COUNT: usize = 5;

    fn index(self) -> usize {
        self as usize
    }
}

/// What the joint sequence currently wants from an arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArmRequest {
    Hold,
    Raise,
    Retract,
}

/// Context one arm machine runs against.
struct ArmCtx {
    position: f32,
    request: ArmRequest,
    ticks_in_state: u64,
    raise_timeout_ticks: u64,
    cfg: ClimberConfig,
    /// Open-loop power, used when `hold` is `None`.
    power: f32,
    hold: Option<f32>,
    timed_out: bool,
}

impl ArmCtx {
    fn new(cfg: ClimberConfig, raise_timeout_ticks: u64) -> Self {
        Self {
            position: 0.0,
            request: ArmRequest::Hold,
            ticks_in_state: 0,
            raise_timeout_ticks,
            cfg,
            power: 0.0,
            hold: None,
            timed_out: false,
        }
    }

    fn drive(&mut self, power: f32) {
        self.power = power;
        self.hold = None;
    }

    fn hold_here(&mut self) {
        self.power = 0.0;
        self.hold = Some(self.position);
    }
}

impl StateClock for ArmCtx {
    fn set_ticks_in_state(&mut self, ticks: u64) {
        self.ticks_in_state = ticks;
    }
}

fn idle_enter(a: &mut ArmCtx) {
    a.drive(0.0);
}

fn idle_update(a: &mut ArmCtx) -> Option<ArmPhase> {
    (a.request == ArmRequest::Raise && !a.timed_out).then_some(ArmPhase::Raising)
}

fn raising_enter(a: &mut ArmCtx) {
    a.drive(a.cfg.raise_power);
}

fn raising_update(a: &mut ArmCtx) -> Option<ArmPhase> {
    if a.position >= a.cfg.extended_position {
        Some(ArmPhase::Extended)
    } else if a.ticks_in_state >= a.raise_timeout_ticks {
        a.timed_out = true;
        Some(ArmPhase::Idle)
    } else {
        None
    }
}

fn extended_enter(a: &mut ArmCtx) {
    a.hold_here();
}

fn extended_update(a: &mut ArmCtx) -> Option<ArmPhase> {
    if a.request == ArmRequest::Retract {
        Some(ArmPhase::Retracting)
    } else if a.position < a.cfg.extended_position - a.cfg.hysteresis {
        Some(ArmPhase::Raising)
    } else {
        None
    }
}

fn retracting_enter(a: &mut ArmCtx) {
    a.drive(-a.cfg.retract_power);
}

fn retracting_update(a: &mut ArmCtx) -> Option<ArmPhase> {
    (a.position <= a.cfg.locked_position).then_some(ArmPhase::Locked)
}

fn locked_enter(a: &mut ArmCtx) {
    a.hold_here();
}

fn locked_update(_a: &mut ArmCtx) -> Option<ArmPhase> {
    None
}

fn arm_table() -> [StateDescriptor<ArmPhase, ArmCtx>; 5] {
    [
        StateDescriptor {
            id: ArmPhase::Idle,
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        StateDescriptor {
            id: ArmPhase::Raising,
            name: "Raising",
            on_enter: Some(raising_enter),
            on_exit: None,
            on_update: raising_update,
        },
        StateDescriptor {
            id: ArmPhase::Extended,
            name: "Extended",
            on_enter: Some(extended_enter),
            on_exit: None,
            on_update: extended_update,
        },
        StateDescriptor {
            id: ArmPhase::Retracting,
            name: "Retracting",
            on_enter: Some(retracting_enter),
            on_exit: None,
            on_update: retracting_update,
        },
        StateDescriptor {
            id: ArmPhase::Locked,
            name: "Locked",
            on_enter: Some(locked_enter),
            on_exit: None,
            on_update: locked_update,
        },
    ]
}

struct Arm {
    side: ArmSide,
    fsm: Fsm<ArmPhase, ArmCtx, 5>,
    ctx: ArmCtx,
}

impl Arm {
    fn new(side: ArmSide, cfg: ClimberConfig) -> Self {
        let label = match side {
            ArmSide::Left => "left_climber",
            ArmSide::Right => "right_climber",
        };
        Self {
            side,
            fsm: Fsm::new(label, arm_table(), ArmPhase::Idle),
            ctx: ArmCtx::new(cfg, 0),
        }
    }

    fn phase(&self) -> ArmPhase {
        self.fsm.current_state()
    }

    fn write_output(&self, ctx: &mut RobotContext) {
        let channel = self.side.channel();
        match self.ctx.hold {
            Some(position) => ctx.outputs.hold_position(channel, position),
            None => ctx.outputs.set_power(channel, self.ctx.power),
        }
    }
}

// ---------------------------------------------------------------------------
// ClimbSequence
// ---------------------------------------------------------------------------

/// Joint phase of the two-arm climb.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClimbPhase {
    Reaching,
    AwaitConfirm,
    Pulling,
    Done,
    Aborted,
}

/// Raise both arms to the bar, wait for the operator to confirm, then pull
/// the robot up and lock.
pub struct ClimbSequence {
    requirements: SubsystemSet,
    confirm: ButtonId,
    confirm_prev: bool,
    phase: ClimbPhase,
    settle_ticks: u64,
    arms: [Arm; 2],
}

impl ClimbSequence {
    /// `requirements` should cover both winches and the climb pneumatics.
    /// A rising edge of `confirm` starts the pull.
    pub fn new(requirements: SubsystemSet, confirm: ButtonId, cfg: ClimberConfig) -> Self {
        Self {
            requirements,
            confirm,
            confirm_prev: false,
            phase: ClimbPhase::Reaching,
            settle_ticks: 0,
            arms: [Arm::new(ArmSide::Left, cfg), Arm::new(ArmSide::Right, cfg)],
        }
    }

    pub fn phase(&self) -> ClimbPhase {
        self.phase
    }

    pub fn arm_phase(&self, side: ArmSide) -> ArmPhase {
        match side {
            ArmSide::Left => self.arms[0].phase(),
            ArmSide::Right => self.arms[1].phase(),
        }
    }

    fn all(&self, phase: ArmPhase) -> bool {
        self.arms.iter().all(|a| a.phase() == phase)
    }

    fn next_phase(&self, confirm_rose: bool) -> ClimbPhase {
        match self.phase {
            ClimbPhase::Reaching if self.arms.iter().any(|a| a.ctx.timed_out) => ClimbPhase::Aborted,
            ClimbPhase::Reaching if self.all(ArmPhase::Extended) => ClimbPhase::AwaitConfirm,
            ClimbPhase::AwaitConfirm if !self.all(ArmPhase::Extended) => ClimbPhase::Reaching,
            ClimbPhase::AwaitConfirm if confirm_rose => ClimbPhase::Pulling,
            ClimbPhase::Pulling
                if self
                    .arms
                    .iter()
                    .all(|a| a.phase() == ArmPhase::Locked && a.fsm.ticks_in_current_state() >= self.settle_ticks) =>
            {
                ClimbPhase::Done
            }
            phase => phase,
        }
    }
}

impl Command<RobotContext> for ClimbSequence {
    fn name(&self) -> &'static str {
        "ClimbSequence"
    }

    fn requirements(&self) -> SubsystemSet {
        self.requirements
    }

    fn initialize(&mut self, ctx: &mut RobotContext) {
        let cfg = ctx.config.climber;
        let raise_timeout = ctx.config.ticks_for(cfg.raise_timeout_secs);
        self.settle_ticks = ctx.config.ticks_for(cfg.lock_settle_secs);
        self.phase = ClimbPhase::Reaching;
        // A held confirm button (often the one that started the climb) is
        // not a confirmation.
        self.confirm_prev = ctx.button(self.confirm);
        for arm in &mut self.arms {
            arm.ctx = ArmCtx::new(cfg, raise_timeout);
            arm.ctx.position = arm.side.position(&ctx.sensors);
            arm.fsm.start(ArmPhase::Idle, &mut arm.ctx);
        }
        ctx.outputs.set_solenoid(Solenoid::ClimbExtend, true);
    }

    fn execute(&mut self, ctx: &mut RobotContext) {
        let request = match self.phase {
            ClimbPhase::Reaching | ClimbPhase::AwaitConfirm => ArmRequest::Raise,
            ClimbPhase::Pulling => ArmRequest::Retract,
            ClimbPhase::Done | ClimbPhase::Aborted => ArmRequest::Hold,
        };
        for arm in &mut self.arms {
            arm.ctx.position = arm.side.position(&ctx.sensors);
            arm.ctx.request = request;
            arm.fsm.tick(&mut arm.ctx);
        }

        let pressed = ctx.button(self.confirm);
        let confirm_rose = pressed && !self.confirm_prev;
        self.confirm_prev = pressed;

        let next = self.next_phase(confirm_rose);
        if next != self.phase {
            match next {
                ClimbPhase::Aborted => warn!("ClimbSequence: arm raise timed out, aborting"),
                _ => info!("ClimbSequence: {:?} -> {:?}", self.phase, next),
            }
            self.phase = next;
        }

        for arm in &self.arms {
            arm.write_output(ctx);
        }
    }

    fn end(&mut self, ctx: &mut RobotContext, interrupted: bool) {
        if self.phase == ClimbPhase::Done && !interrupted {
            // Locked arms keep holding after the command releases them.
            for arm in &self.arms {
                arm.write_output(ctx);
            }
        } else {
            for arm in &self.arms {
                ctx.outputs.stop(arm.side.channel());
            }
        }
    }

    fn is_finished(&mut self, _ctx: &RobotContext) -> bool {
        matches!(self.phase, ClimbPhase::Done | ClimbPhase::Aborted)
    }
}

// ---------------------------------------------------------------------------
// Single-arm moves
// ---------------------------------------------------------------------------

/// Raise one arm by `distance` rotations under PID control, then hold.
pub struct RaiseArm {
    requirements: SubsystemSet,
    side: ArmSide,
    distance: f32,
    pid: PidController,
}

impl RaiseArm {
    pub fn new(requirements: SubsystemSet, side: ArmSide, distance: f32, control: &LoopConfig, period_secs: f32) -> Self {
        Self {
            requirements,
            side,
            distance,
            pid: control.controller(period_secs),
        }
    }
}

impl Command<RobotContext> for RaiseArm {
    fn name(&self) -> &'static str {
        "RaiseArm"
    }

    fn requirements(&self) -> SubsystemSet {
        self.requirements
    }

    fn initialize(&mut self, ctx: &mut RobotContext) {
        self.pid.reset();
        self.pid.set_setpoint(self.side.position(&ctx.sensors) + self.distance);
    }

    fn execute(&mut self, ctx: &mut RobotContext) {
        let power = self.pid.calculate(self.side.position(&ctx.sensors));
        ctx.outputs.set_power(self.side.channel(), power);
    }

    fn end(&mut self, ctx: &mut RobotContext, interrupted: bool) {
        if interrupted {
            ctx.outputs.stop(self.side.channel());
        } else {
            ctx.outputs.hold_position(self.side.channel(), self.pid.setpoint());
        }
    }

    fn is_finished(&mut self, _ctx: &RobotContext) -> bool {
        self.pid.at_setpoint()
    }
}

/// Lower one arm at full power until it has travelled `distance` rotations.
pub struct LowerArm {
    requirements: SubsystemSet,
    side: ArmSide,
    distance: f32,
    target: f32,
}

impl LowerArm {
    pub fn new(requirements: SubsystemSet, side: ArmSide, distance: f32) -> Self {
        Self {
            requirements,
            side,
            distance,
            target: 0.0,
        }
    }
}

impl Command<RobotContext> for LowerArm {
    fn name(&self) -> &'static str {
        "LowerArm"
    }

    fn requirements(&self) -> SubsystemSet {
        self.requirements
    }

    fn initialize(&mut self, ctx: &mut RobotContext) {
        self.target = self.side.position(&ctx.sensors) - self.distance;
    }

    fn execute(&mut self, ctx: &mut RobotContext) {
        ctx.outputs.set_power(self.side.channel(), -1.0);
    }

    fn end(&mut self, ctx: &mut RobotContext, _interrupted: bool) {
        ctx.outputs.stop(self.side.channel());
    }

    fn is_finished(&mut self, ctx: &RobotContext) -> bool {
        self.side.position(&ctx.sensors) <= self.target
    }
}

/// Winch power follows an axis until interrupted.
pub struct ClimberArmOverride {
    requirements: SubsystemSet,
    side: ArmSide,
    axis: AxisId,
}

impl ClimberArmOverride {
    pub fn new(requirements: SubsystemSet, side: ArmSide, axis: AxisId) -> Self {
        Self {
            requirements,
            side,
            axis,
        }
    }
}

impl Command<RobotContext> for ClimberArmOverride {
    fn name(&self) -> &'static str {
        "ClimberArmOverride"
    }

    fn requirements(&self) -> SubsystemSet {
        self.requirements
    }

    fn execute(&mut self, ctx: &mut RobotContext) {
        let power = ctx.axis(self.axis);
        ctx.outputs.set_power(self.side.channel(), power);
    }

    fn end(&mut self, ctx: &mut RobotContext, _interrupted: bool) {
        ctx.outputs.stop(self.side.channel());
    }
}

// ---------------------------------------------------------------------------
// Pneumatics
// ---------------------------------------------------------------------------

fn extend_climb_effect(ctx: &mut RobotContext) {
    ctx.outputs.set_solenoid(Solenoid::ClimbExtend, true);
}

fn retract_climb_effect(ctx: &mut RobotContext) {
    ctx.outputs.set_solenoid(Solenoid::ClimbExtend, false);
}

fn toggle_climb_effect(ctx: &mut RobotContext) {
    let extended = ctx.outputs.solenoid(Solenoid::ClimbExtend);
    ctx.outputs.set_solenoid(Solenoid::ClimbExtend, !extended);
}

fn extend_buddy_effect(ctx: &mut RobotContext) {
    ctx.outputs.set_solenoid(Solenoid::BuddyClimb, true);
}

fn retract_buddy_effect(ctx: &mut RobotContext) {
    ctx.outputs.set_solenoid(Solenoid::BuddyClimb, false);
}

pub fn extend_climb(requirements: SubsystemSet) -> InstantCommand<RobotContext> {
    InstantCommand::new("ExtendClimb", requirements, extend_climb_effect)
}

pub fn retract_climb(requirements: SubsystemSet) -> InstantCommand<RobotContext> {
    InstantCommand::new("RetractClimb", requirements, retract_climb_effect)
}

pub fn toggle_climb(requirements: SubsystemSet) -> InstantCommand<RobotContext> {
    InstantCommand::new("ToggleClimb", requirements, toggle_climb_effect)
}

pub fn extend_buddy_climb(requirements: SubsystemSet) -> InstantCommand<RobotContext> {
    InstantCommand::new("ExtendBuddyClimb", requirements, extend_buddy_effect)
}

pub fn retract_buddy_climb(requirements: SubsystemSet) -> InstantCommand<RobotContext> {
    InstantCommand::new("RetractBuddyClimb", requirements, retract_buddy_effect)
}
