//! Robot service: mode hooks, bindings, outputs, fail-stop and full
//! scenarios against the simulated plant.

use commandbot::adapters::sim::{SimHardware, SimSensor};
use commandbot::app::context::IntakeState;
use commandbot::app::controls::{controller, joystick, launchpad};
use commandbot::app::events::{Mode, RobotEvent};
use commandbot::app::ports::{Channel, Solenoid};
use commandbot::app::service::RobotService;
use commandbot::config::RobotConfig;
use commandbot::error::SensorFault;

use crate::mock_hw::{MockHardware, RecordingSink};

fn service() -> RobotService {
    RobotService::new(RobotConfig::default()).unwrap()
}

fn run(service: &mut RobotService, hw: &mut MockHardware, sink: &mut RecordingSink, ticks: usize) {
    for _ in 0..ticks {
        service.tick(hw, sink);
    }
}

fn run_sim(service: &mut RobotService, hw: &mut SimHardware, sink: &mut RecordingSink, secs: f32) {
    let ticks = service.context().config.ticks_for(secs);
    for _ in 0..ticks {
        service.tick(hw, sink);
    }
}

// ── Modes ─────────────────────────────────────────────────────

#[test]
fn disabled_runs_nothing_and_keeps_motors_off() {
    let mut svc = service();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();

    hw.press(controller::A, true);
    hw.set_axis(controller::RIGHT_TRIGGER, 1.0);
    run(&mut svc, &mut hw, &mut sink, 5);

    assert!(svc.scheduler().running().is_empty());
    assert!(hw.all_stopped());
    assert_eq!(sink.started("SetDown"), 0);
}

#[test]
fn telemetry_is_emitted_on_the_configured_interval() {
    let mut svc = service();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();

    run(&mut svc, &mut hw, &mut sink, 120);

    assert_eq!(sink.telemetry_count(), 2);
    let last = sink.events.iter().rev().find_map(|e| match e {
        RobotEvent::Telemetry(t) => Some(*t),
        _ => None,
    });
    assert_eq!(last.map(|t| t.tick), Some(100));
}

#[test]
fn reentering_the_current_mode_is_a_noop() {
    let mut svc = service();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();

    svc.set_mode(Mode::Disabled, &mut hw, &mut sink);
    assert!(sink.events.is_empty());

    svc.set_mode(Mode::Teleop, &mut hw, &mut sink);
    svc.set_mode(Mode::Teleop, &mut hw, &mut sink);
    let changes = sink
        .events
        .iter()
        .filter(|e| matches!(e, RobotEvent::ModeChanged { .. }))
        .count();
    assert_eq!(changes, 1);
    assert_eq!(sink.started("TeleopInit"), 1);
}

#[test]
fn teleop_entry_sets_pneumatics_and_installs_defaults() {
    let mut svc = service();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();

    svc.set_mode(Mode::Teleop, &mut hw, &mut sink);
    run(&mut svc, &mut hw, &mut sink, 1);

    assert_eq!(hw.solenoid(Solenoid::ClimbExtend), Some(true));
    assert_eq!(hw.solenoid(Solenoid::BuddyClimb), Some(false));
    assert_eq!(hw.solenoid(Solenoid::Shifter), Some(false));
    assert_eq!(sink.ended("TeleopInit", false), 1);

    let cmds = *svc.commands();
    assert!(svc.is_scheduled(cmds.arcade_drive));
    assert!(svc.is_scheduled(cmds.intake_default));
}

#[test]
fn autonomous_shifts_low_and_drives_forward() {
    let mut svc = service();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();

    svc.set_mode(Mode::Autonomous, &mut hw, &mut sink);
    run(&mut svc, &mut hw, &mut sink, 3);

    assert_eq!(hw.solenoid(Solenoid::Shifter), Some(true));
    assert_eq!(sink.started("Autonomous"), 1);
    assert_eq!(hw.last_power(Channel::LeftDrive), Some(0.25));
    assert_eq!(hw.last_power(Channel::RightDrive), Some(0.25));
}

#[test]
fn bindings_are_ignored_outside_teleop() {
    let mut svc = service();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();

    svc.set_mode(Mode::Autonomous, &mut hw, &mut sink);
    run(&mut svc, &mut hw, &mut sink, 1);
    hw.press(controller::A, true);
    run(&mut svc, &mut hw, &mut sink, 2);

    assert_eq!(sink.started("SetDown"), 0);
}

#[test]
fn teleop_entry_cancels_autonomous() {
    let mut svc = service();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();

    svc.set_mode(Mode::Autonomous, &mut hw, &mut sink);
    run(&mut svc, &mut hw, &mut sink, 5);
    svc.set_mode(Mode::Teleop, &mut hw, &mut sink);

    assert_eq!(sink.ended("Autonomous", true), 1);
    assert!(!svc.is_scheduled(svc.commands().autonomous));
}

#[test]
fn disabling_cancels_everything_and_stops_motors() {
    let mut svc = service();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();

    svc.set_mode(Mode::Teleop, &mut hw, &mut sink);
    hw.set_axis(controller::RIGHT_TRIGGER, 0.8);
    run(&mut svc, &mut hw, &mut sink, 3);
    assert_eq!(hw.last_power(Channel::LeftDrive), Some(0.8));

    svc.set_mode(Mode::Disabled, &mut hw, &mut sink);
    assert!(svc.scheduler().running().is_empty());
    assert!(hw.all_stopped());

    run(&mut svc, &mut hw, &mut sink, 2);
    assert!(hw.all_stopped());
}

#[test]
fn mode_change_ends_a_held_override() {
    let mut svc = service();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    let right_override = svc.commands().right_arm_override;

    svc.set_mode(Mode::Teleop, &mut hw, &mut sink);
    run(&mut svc, &mut hw, &mut sink, 1);
    hw.press(launchpad::BUTTON_B, true);
    hw.set_axis(joystick::AXIS_Y, 0.9);
    run(&mut svc, &mut hw, &mut sink, 2);
    assert!(svc.is_scheduled(right_override));
    assert_eq!(hw.last_power(Channel::RightClimber), Some(0.9));

    svc.set_mode(Mode::Autonomous, &mut hw, &mut sink);
    assert!(!svc.is_scheduled(right_override));
    assert_eq!(sink.ended("ClimberArmOverride", true), 1);
    hw.press(launchpad::BUTTON_B, false);
    run(&mut svc, &mut hw, &mut sink, 5);
    assert_eq!(hw.last_power(Channel::RightClimber), Some(0.0));

    svc.set_mode(Mode::Teleop, &mut hw, &mut sink);
    run(&mut svc, &mut hw, &mut sink, 50);
    assert!(!svc.is_scheduled(right_override));
    assert_eq!(hw.last_power(Channel::RightClimber), Some(0.0));
}

// ── Teleop controls ───────────────────────────────────────────

#[test]
fn button_held_across_mode_entry_is_not_an_edge() {
    let mut svc = service();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();

    hw.press(controller::A, true);
    svc.set_mode(Mode::Teleop, &mut hw, &mut sink);
    run(&mut svc, &mut hw, &mut sink, 3);
    assert_eq!(sink.started("SetDown"), 0);

    hw.press(controller::A, false);
    run(&mut svc, &mut hw, &mut sink, 1);
    hw.press(controller::A, true);
    run(&mut svc, &mut hw, &mut sink, 1);
    assert_eq!(sink.started("SetDown"), 1);
}

#[test]
fn set_down_opens_the_lock_and_lowers_the_arm() {
    let mut svc = service();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();

    svc.set_mode(Mode::Teleop, &mut hw, &mut sink);
    run(&mut svc, &mut hw, &mut sink, 1);
    hw.press(controller::A, true);
    run(&mut svc, &mut hw, &mut sink, 1);

    assert_eq!(svc.context().intake_state, IntakeState::Down);
    assert_eq!(hw.solenoid(Solenoid::IntakeLock), Some(false));
    assert_eq!(hw.last_power(Channel::IntakePivot), Some(0.2));
    assert_eq!(hw.last_power(Channel::IntakeRoller), Some(0.7));
    assert!(hw.indicator(launchpad::LED_H));
}

#[test]
fn non_interruptible_intake_move_rejects_the_override() {
    let mut svc = service();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();

    svc.set_mode(Mode::Teleop, &mut hw, &mut sink);
    run(&mut svc, &mut hw, &mut sink, 1);
    hw.press(controller::A, true);
    run(&mut svc, &mut hw, &mut sink, 1);
    hw.press(launchpad::BUTTON_F, true);
    run(&mut svc, &mut hw, &mut sink, 1);

    assert!(sink.events.contains(&RobotEvent::CommandRejected {
        name: "IntakeOverride",
        blocker: "SetDown",
    }));
}

#[test]
fn shift_toggle_latches_low_gear_and_lamps() {
    let mut svc = service();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();

    svc.set_mode(Mode::Teleop, &mut hw, &mut sink);
    run(&mut svc, &mut hw, &mut sink, 1);

    hw.press(controller::LEFT_BUMPER, true);
    run(&mut svc, &mut hw, &mut sink, 1);
    assert_eq!(hw.solenoid(Solenoid::Shifter), Some(true));
    assert!(hw.indicator(launchpad::BIG_LED_RED));

    hw.press(controller::LEFT_BUMPER, false);
    run(&mut svc, &mut hw, &mut sink, 1);
    hw.press(controller::LEFT_BUMPER, true);
    run(&mut svc, &mut hw, &mut sink, 1);
    assert_eq!(hw.solenoid(Solenoid::Shifter), Some(false));
    assert!(hw.indicator(launchpad::BIG_LED_GREEN));
}

// ── Fail-stop ─────────────────────────────────────────────────

#[test]
fn stale_gyro_fail_stops_the_turn_and_recovers() {
    let mut svc = service();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    let stale = RobotConfig::default().sensor_stale_ticks as usize;

    svc.set_mode(Mode::Teleop, &mut hw, &mut sink);
    run(&mut svc, &mut hw, &mut sink, 1);
    hw.press(controller::RIGHT_BUMPER, true);
    run(&mut svc, &mut hw, &mut sink, 1);
    let turn = svc.commands().quick_turn;
    assert!(svc.is_scheduled(turn));

    hw.frame.heading_deg = None;
    run(&mut svc, &mut hw, &mut sink, stale);
    assert!(svc.is_scheduled(turn), "held value is trusted until stale");

    run(&mut svc, &mut hw, &mut sink, 1);
    assert_eq!(svc.fault_flags(), SensorFault::GyroStale.mask());
    assert!(sink.events.contains(&RobotEvent::FaultDetected(SensorFault::GyroStale.mask())));
    assert_eq!(sink.ended("GyroTurn", true), 1);
    assert!(svc.is_scheduled(svc.commands().arcade_drive));

    hw.frame.heading_deg = Some(0.0);
    run(&mut svc, &mut hw, &mut sink, 1);
    assert_eq!(svc.fault_flags(), 0);
    assert!(sink.events.contains(&RobotEvent::FaultCleared));
}

#[test]
fn stale_limit_switch_idles_the_intake_default() {
    let mut svc = service();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();

    svc.set_mode(Mode::Teleop, &mut hw, &mut sink);
    run(&mut svc, &mut hw, &mut sink, 2);
    assert_eq!(hw.last_power(Channel::IntakePivot), Some(-0.1));

    hw.frame.intake_up_limit = None;
    run(&mut svc, &mut hw, &mut sink, 30);

    assert!(svc.context().has_fault(SensorFault::IntakeLimitStale));
    assert!(svc.is_scheduled(svc.commands().intake_default));
    assert_eq!(hw.last_power(Channel::IntakePivot), Some(0.0));
}

#[test]
fn intake_move_is_refused_while_the_limit_is_stale() {
    let mut svc = service();
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();

    svc.set_mode(Mode::Teleop, &mut hw, &mut sink);
    run(&mut svc, &mut hw, &mut sink, 2);
    hw.frame.intake_up_limit = None;
    run(&mut svc, &mut hw, &mut sink, 30);
    assert!(svc.context().has_fault(SensorFault::IntakeLimitStale));

    hw.press(controller::A, true);
    run(&mut svc, &mut hw, &mut sink, 1);
    assert_eq!(sink.started("SetDown"), 0);
    assert!(sink.events.contains(&RobotEvent::CommandBlocked("SetDown")));
    assert_eq!(svc.context().intake_state, IntakeState::Up);
    assert!(!hw.indicator(launchpad::LED_H));

    hw.press(controller::A, false);
    hw.frame.intake_up_limit = Some(true);
    run(&mut svc, &mut hw, &mut sink, 1);
    assert_eq!(svc.fault_flags(), 0);

    hw.press(controller::A, true);
    run(&mut svc, &mut hw, &mut sink, 1);
    assert_eq!(sink.started("SetDown"), 1);
    assert_eq!(svc.context().intake_state, IntakeState::Down);
    assert_eq!(hw.last_power(Channel::IntakePivot), Some(0.2));
}

// ── Simulated scenarios ───────────────────────────────────────

#[test]
fn autonomous_routine_reaches_its_distance() {
    let config = RobotConfig::default();
    let target = config.encoder_drive.auto_distance;
    let mut hw = SimHardware::new(config.tick_secs());
    let mut svc = RobotService::new(config).unwrap();
    let mut sink = RecordingSink::new();

    svc.set_mode(Mode::Autonomous, &mut hw, &mut sink);
    run_sim(&mut svc, &mut hw, &mut sink, 15.0);

    assert_eq!(sink.ended("Autonomous", false), 1);
    assert!((hw.position(Channel::LeftDrive) - target).abs() < 1.0);
    assert!((hw.position(Channel::RightDrive) - target).abs() < 1.0);
    assert!(hw.solenoid(Solenoid::Shifter));
}

#[test]
fn quick_turn_settles_at_half_a_revolution() {
    let config = RobotConfig::default();
    let mut hw = SimHardware::new(config.tick_secs());
    let mut svc = RobotService::new(config).unwrap();
    let mut sink = RecordingSink::new();

    svc.set_mode(Mode::Teleop, &mut hw, &mut sink);
    run_sim(&mut svc, &mut hw, &mut sink, 0.1);
    hw.set_button(controller::RIGHT_BUMPER, true);
    run_sim(&mut svc, &mut hw, &mut sink, 6.0);

    assert_eq!(sink.ended("GyroTurn", false), 1);
    assert!((hw.heading_deg() - 180.0).abs() < 2.0);
}

#[test]
fn operator_climb_locks_both_arms() {
    let config = RobotConfig::default();
    let locked = config.climber.locked_position;
    let mut hw = SimHardware::new(config.tick_secs());
    let mut svc = RobotService::new(config).unwrap();
    let mut sink = RecordingSink::new();

    svc.set_mode(Mode::Teleop, &mut hw, &mut sink);
    run_sim(&mut svc, &mut hw, &mut sink, 0.1);

    hw.set_button(launchpad::MISSILE_A, true);
    run_sim(&mut svc, &mut hw, &mut sink, 0.1);
    hw.release_all();
    run_sim(&mut svc, &mut hw, &mut sink, 4.0);
    assert!(hw.position(Channel::LeftClimber) > 110.0);

    hw.set_button(launchpad::MISSILE_A, true);
    run_sim(&mut svc, &mut hw, &mut sink, 0.1);
    hw.release_all();
    run_sim(&mut svc, &mut hw, &mut sink, 5.0);

    assert_eq!(sink.ended("ClimbSequence", false), 1);
    assert!(hw.position(Channel::LeftClimber) <= locked + 1.0);
    assert!(hw.position(Channel::RightClimber) <= locked + 1.0);
    assert!(hw.solenoid(Solenoid::ClimbExtend));
}

#[test]
fn climber_encoder_dropout_aborts_the_climb() {
    let config = RobotConfig::default();
    let stale = config.sensor_stale_ticks;
    let mut hw = SimHardware::new(config.tick_secs());
    let mut svc = RobotService::new(config).unwrap();
    let mut sink = RecordingSink::new();

    svc.set_mode(Mode::Teleop, &mut hw, &mut sink);
    run_sim(&mut svc, &mut hw, &mut sink, 0.1);
    hw.set_button(launchpad::MISSILE_A, true);
    run_sim(&mut svc, &mut hw, &mut sink, 0.1);
    assert!(svc.is_scheduled(svc.commands().climb));

    hw.set_dropout(SimSensor::LeftClimber, true);
    for _ in 0..=stale {
        svc.tick(&mut hw, &mut sink);
    }

    assert!(!svc.is_scheduled(svc.commands().climb));
    assert_eq!(sink.ended("ClimbSequence", true), 1);
    assert_eq!(hw.applied_power(Channel::LeftClimber), 0.0);
    assert_eq!(hw.applied_power(Channel::RightClimber), 0.0);
}
