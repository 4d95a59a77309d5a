//! Robot program assembly.
//!
//! [`RobotProgram::build`] registers every subsystem and command, installs
//! the default commands, and wires the operator controls to commands and
//! button lamps.  Everything is allocated here, once, at startup; the
//! per-tick path never registers anything.

use log::info;

use crate::binding::{BindingTable, IndicatorSource};
use crate::command::{Command, CommandId, ParallelGroup, ParallelPolicy, SequentialGroup};
use crate::commands::climb::{
    ClimbSequence, ClimberArmOverride, LowerArm, RaiseArm, extend_buddy_climb, extend_climb, retract_buddy_climb,
    toggle_climb,
};
use crate::commands::conveyor::{conveyor_feed, conveyor_override};
use crate::commands::drivetrain::{ArcadeDrive, EncoderDrive, GyroTurn, shift_high, shift_low, shift_toggle};
use crate::commands::intake::{IntakeArmDefault, IntakeOverride, SetDown, SetLoad, SetUp, lock_toggle};
use crate::commands::{ArmSide, RobotSubsystems};
use crate::config::RobotConfig;
use crate::error::Result;
use crate::scheduler::Scheduler;
use crate::subsystem::SubsystemSet;

use super::context::{IntakeState, RobotContext};
use super::controls::{controller, joystick, launchpad};
use super::ports::Solenoid;

/// Angle of the quick-turn on the right bumper (degrees).
pub const QUICK_TURN_DEG: f32 = 180.0;

/// Ids of the commands the service and tests need to reach directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobotCommands {
    pub arcade_drive: CommandId,
    pub intake_default: CommandId,
    pub autonomous: CommandId,
    pub teleop_init: CommandId,
    pub climb: CommandId,
    pub set_up: CommandId,
    pub set_down: CommandId,
    pub set_load: CommandId,
    pub shift_toggle: CommandId,
    pub lock_toggle: CommandId,
    pub intake_override: CommandId,
    pub conveyor_override: CommandId,
    pub conveyor_feed: CommandId,
    pub quick_turn: CommandId,
    pub raise_arms: CommandId,
    pub lower_arms: CommandId,
    pub left_arm_override: CommandId,
    pub right_arm_override: CommandId,
    pub toggle_climb: CommandId,
    pub buddy_climb: CommandId,
}

/// Scheduler, bindings and ids of one fully wired robot.
pub struct RobotProgram {
    pub scheduler: Scheduler<RobotContext>,
    pub bindings: BindingTable<RobotContext>,
    pub subsystems: RobotSubsystems,
    pub commands: RobotCommands,
}

// ── Lamp predicates ───────────────────────────────────────────

fn intake_is_up(ctx: &RobotContext) -> bool {
    ctx.intake_state == IntakeState::Up
}

fn intake_is_down(ctx: &RobotContext) -> bool {
    ctx.intake_state == IntakeState::Down
}

fn intake_is_loading(ctx: &RobotContext) -> bool {
    ctx.intake_state == IntakeState::Loading
}

fn climb_extended(ctx: &RobotContext) -> bool {
    ctx.outputs.solenoid(Solenoid::ClimbExtend)
}

fn boxed(cmd: impl Command<RobotContext> + 'static) -> Box<dyn Command<RobotContext>> {
    Box::new(cmd)
}

impl RobotProgram {
    pub fn build(config: &RobotConfig) -> Result<Self> {
        let mut scheduler = Scheduler::new();
        let subs = RobotSubsystems::register(&mut scheduler)?;
        let commands = register_commands(&mut scheduler, &subs, config)?;

        scheduler.set_default_command(subs.drivetrain, commands.arcade_drive)?;
        scheduler.set_default_command(subs.intake_arm, commands.intake_default)?;

        let mut bindings = BindingTable::new();
        bind_controls(&mut bindings, &commands)?;

        info!(
            "RobotProgram: {} subsystems, {} commands, {} bindings",
            scheduler.subsystem_count(),
            scheduler.command_count(),
            bindings.len()
        );
        Ok(Self {
            scheduler,
            bindings,
            subsystems: subs,
            commands,
        })
    }
}

fn register_commands(
    s: &mut Scheduler<RobotContext>,
    subs: &RobotSubsystems,
    config: &RobotConfig,
) -> Result<RobotCommands> {
    let period = config.tick_secs();
    let drivetrain = SubsystemSet::of(subs.drivetrain);
    let intake_arm = SubsystemSet::of(subs.intake_arm);
    let conveyor = SubsystemSet::of(subs.conveyor);
    let pneumatics = SubsystemSet::of(subs.climber_pneumatics);
    let left = SubsystemSet::of(subs.arm(ArmSide::Left));
    let right = SubsystemSet::of(subs.arm(ArmSide::Right));
    let climber = &config.climber;

    // Mode-entry groups use requirement-free pneumatics instants so the
    // parallel children stay disjoint.
    let auto_setup = ParallelGroup::new(
        "AutoSetup",
        ParallelPolicy::All,
        vec![
            boxed(extend_climb(SubsystemSet::EMPTY)),
            boxed(retract_buddy_climb(SubsystemSet::EMPTY)),
            boxed(shift_low()),
        ],
    )?;
    let autonomous = SequentialGroup::new(
        "Autonomous",
        vec![
            boxed(auto_setup),
            boxed(EncoderDrive::new(
                drivetrain,
                config.encoder_drive.auto_distance,
                &config.encoder_drive,
                period,
            )),
        ],
    );
    let teleop_init = ParallelGroup::new(
        "TeleopInit",
        ParallelPolicy::All,
        vec![
            boxed(extend_climb(SubsystemSet::EMPTY)),
            boxed(retract_buddy_climb(SubsystemSet::EMPTY)),
            boxed(shift_high()),
        ],
    )?;

    let raise_distance = climber.extended_position - climber.locked_position;
    let raise_arms = ParallelGroup::new(
        "RaiseArms",
        ParallelPolicy::All,
        vec![
            boxed(RaiseArm::new(left, ArmSide::Left, raise_distance, &climber.arm, period)),
            boxed(RaiseArm::new(right, ArmSide::Right, raise_distance, &climber.arm, period)),
        ],
    )?;
    let lower_arms = ParallelGroup::new(
        "LowerArms",
        ParallelPolicy::All,
        vec![
            boxed(LowerArm::new(left, ArmSide::Left, climber.lower_distance)),
            boxed(LowerArm::new(right, ArmSide::Right, climber.lower_distance)),
        ],
    )?;

    Ok(RobotCommands {
        arcade_drive: s.register(ArcadeDrive::new(drivetrain, config.drive), true)?,
        intake_default: s.register(IntakeArmDefault::new(intake_arm), true)?,
        autonomous: s.register(autonomous, true)?,
        teleop_init: s.register(teleop_init, true)?,
        climb: s.register(
            ClimbSequence::new(left.union(right).union(pneumatics), launchpad::MISSILE_A, *climber),
            true,
        )?,
        set_up: s.register(SetUp::new(intake_arm), false)?,
        set_down: s.register(SetDown::new(intake_arm), false)?,
        set_load: s.register(SetLoad::new(intake_arm), false)?,
        shift_toggle: s.register(shift_toggle(SubsystemSet::of(subs.shifter)), true)?,
        lock_toggle: s.register(lock_toggle(intake_arm), true)?,
        intake_override: s.register(
            IntakeOverride::new(intake_arm, joystick::AXIS_Y, joystick::TRIGGER, joystick::BUTTON_3),
            false,
        )?,
        conveyor_override: s.register(conveyor_override(conveyor), false)?,
        conveyor_feed: s.register(conveyor_feed(conveyor), true)?,
        quick_turn: s.register(
            GyroTurn::new(drivetrain, QUICK_TURN_DEG, &config.gyro_turn, period),
            true,
        )?,
        raise_arms: s.register(raise_arms, true)?,
        lower_arms: s.register(lower_arms, true)?,
        left_arm_override: s.register(ClimberArmOverride::new(left, ArmSide::Left, joystick::AXIS_Y), false)?,
        right_arm_override: s.register(ClimberArmOverride::new(right, ArmSide::Right, joystick::AXIS_Y), false)?,
        toggle_climb: s.register(toggle_climb(pneumatics), true)?,
        buddy_climb: s.register(extend_buddy_climb(SubsystemSet::EMPTY), true)?,
    })
}

fn bind_controls(b: &mut BindingTable<RobotContext>, c: &RobotCommands) -> Result<()> {
    let t = b.triggers_mut();
    let missile_a = t.button(launchpad::MISSILE_A)?;
    let missile_b = t.button(launchpad::MISSILE_B)?;
    let pad_a = t.button(launchpad::BUTTON_A)?;
    let pad_b = t.button(launchpad::BUTTON_B)?;
    let pad_c = t.button(launchpad::BUTTON_C)?;
    let pad_d = t.button(launchpad::BUTTON_D)?;
    let pad_e = t.button(launchpad::BUTTON_E)?;
    let pad_f = t.button(launchpad::BUTTON_F)?;
    let pad_g = t.button(launchpad::BUTTON_G)?;
    let pad_h = t.button(launchpad::BUTTON_H)?;
    let pad_i = t.button(launchpad::BUTTON_I)?;
    let ctl_a = t.button(controller::A)?;
    let ctl_b = t.button(controller::B)?;
    let ctl_x = t.button(controller::X)?;
    let ctl_y = t.button(controller::Y)?;
    let ctl_lb = t.button(controller::LEFT_BUMPER)?;
    let ctl_rb = t.button(controller::RIGHT_BUMPER)?;
    let stick_trigger = t.button(joystick::TRIGGER)?;
    // Feeding only makes sense while the intake override is driving.
    let feed = t.gated(c.intake_override, stick_trigger)?;

    // Climber
    b.on_rising(missile_a, c.climb)?;
    b.on_rising(missile_b, c.buddy_climb)?;
    b.on_rising(pad_a, c.toggle_climb)?;
    b.bind_indicator(launchpad::LED_A, IndicatorSource::Predicate(climb_extended))?;
    let lock = b.toggle(pad_a, c.lock_toggle)?;
    b.while_true(pad_b, c.right_arm_override)?;
    b.bind_indicator(launchpad::LED_B, IndicatorSource::Trigger(pad_b))?;
    b.while_true(pad_c, c.left_arm_override)?;
    b.bind_indicator(launchpad::LED_C, IndicatorSource::Trigger(pad_c))?;
    b.on_rising(pad_d, c.lower_arms)?;
    b.bind_indicator(launchpad::LED_D, IndicatorSource::Trigger(pad_d))?;
    b.on_rising(ctl_y, c.raise_arms)?;

    // Overrides
    b.while_true(pad_e, c.conveyor_override)?;
    b.bind_indicator(launchpad::LED_E, IndicatorSource::Trigger(pad_e))?;
    b.while_true(pad_f, c.intake_override)?;
    b.bind_indicator(launchpad::LED_F, IndicatorSource::Trigger(pad_f))?;
    b.while_true(feed, c.conveyor_feed)?;

    // Intake positions
    b.on_rising(pad_g, c.set_load)?;
    b.bind_indicator(launchpad::LED_G, IndicatorSource::Predicate(intake_is_loading))?;
    b.on_rising(pad_h, c.set_down)?;
    b.bind_indicator(launchpad::LED_H, IndicatorSource::Predicate(intake_is_down))?;
    b.on_rising(pad_i, c.set_up)?;
    b.bind_indicator(launchpad::LED_I, IndicatorSource::Predicate(intake_is_up))?;
    b.on_rising(ctl_x, c.set_up)?;
    b.on_rising(ctl_a, c.set_down)?;
    b.on_rising(ctl_b, c.set_load)?;

    // Drive
    b.toggle(ctl_lb, c.shift_toggle)?;
    b.on_rising(ctl_rb, c.quick_turn)?;

    // Registered last so the lock latch owns LED A.
    b.bind_indicator(launchpad::LED_A, IndicatorSource::Latch(lock))?;
    Ok(())
}
