//! Commandbot simulator: host entry point.
//!
//! Runs the full robot program against [`SimHardware`] through one scripted
//! match: a short disabled period, the autonomous routine, a teleop script
//! exercising driving, the intake and the climb, then disabled again.
//!
//! ```text
//! commandbot-sim [config.json]
//! COMMANDBOT_LOG=debug commandbot-sim
//! ```

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use log::info;

use commandbot::adapters::console_log;
use commandbot::adapters::log_sink::LogEventSink;
use commandbot::adapters::sim::SimHardware;
use commandbot::app::controls::{controller, launchpad};
use commandbot::app::events::Mode;
use commandbot::app::ports::{Channel, Solenoid};
use commandbot::app::service::RobotService;
use commandbot::config::RobotConfig;

const DISABLED_SECS: f32 = 0.5;
const AUTONOMOUS_SECS: f32 = 15.0;

/// One step of the teleop script: set the inputs, then run for a while.
struct Step {
    label: &'static str,
    secs: f32,
    apply: fn(&mut SimHardware),
}

const TELEOP_SCRIPT: &[Step] = &[
    Step {
        label: "drive forward",
        secs: 2.0,
        apply: |hw| hw.set_axis(controller::RIGHT_TRIGGER, 0.6),
    },
    Step {
        label: "release sticks",
        secs: 0.5,
        apply: SimHardware::release_all,
    },
    Step {
        label: "quick turn",
        secs: 0.1,
        apply: |hw| hw.set_button(controller::RIGHT_BUMPER, true),
    },
    Step {
        label: "wait for turn",
        secs: 4.5,
        apply: SimHardware::release_all,
    },
    Step {
        label: "intake down",
        secs: 0.1,
        apply: |hw| hw.set_button(controller::A, true),
    },
    Step {
        label: "collect",
        secs: 1.5,
        apply: SimHardware::release_all,
    },
    Step {
        label: "intake up",
        secs: 0.1,
        apply: |hw| hw.set_button(controller::X, true),
    },
    Step {
        label: "stow",
        secs: 1.5,
        apply: SimHardware::release_all,
    },
    Step {
        label: "start climb",
        secs: 0.1,
        apply: |hw| hw.set_button(launchpad::MISSILE_A, true),
    },
    Step {
        label: "reach",
        secs: 4.0,
        apply: SimHardware::release_all,
    },
    Step {
        label: "confirm climb",
        secs: 0.1,
        apply: |hw| hw.set_button(launchpad::MISSILE_A, true),
    },
    Step {
        label: "pull",
        secs: 5.0,
        apply: SimHardware::release_all,
    },
];

fn load_config() -> Result<RobotConfig> {
    let Some(path) = std::env::args().nth(1) else {
        info!("Config: built-in defaults");
        return Ok(RobotConfig::default());
    };
    let text = std::fs::read_to_string(&path).with_context(|| format!("reading config file {}", path))?;
    let config: RobotConfig =
        serde_json::from_str(&text).with_context(|| format!("parsing config file {}", path))?;
    config.validate().with_context(|| format!("validating config file {}", path))?;
    info!("Config: loaded from {}", path);
    Ok(config)
}

/// Run the service for `secs` of simulated time.
fn run_for(service: &mut RobotService, hw: &mut SimHardware, sink: &mut LogEventSink, secs: f32) {
    let ticks = service.context().config.ticks_for(secs);
    for _ in 0..ticks {
        service.tick(hw, sink);
    }
}

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    let level = console_log::init().map_err(|e| anyhow!("installing logger: {}", e))?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Commandbot simulator v{}         ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");
    info!("Log level: {}", level);

    // ── 2. Config + program ───────────────────────────────────
    let config = load_config()?;
    let tick = Duration::from_millis(u64::from(config.tick_period_ms));
    let mut hw = SimHardware::new(config.tick_secs());
    let mut sink = LogEventSink::new();
    let mut service = RobotService::new(config).context("building robot program")?;
    info!("Tick period: {:?}", tick);

    // ── 3. Match ──────────────────────────────────────────────
    run_for(&mut service, &mut hw, &mut sink, DISABLED_SECS);

    service.set_mode(Mode::Autonomous, &mut hw, &mut sink);
    run_for(&mut service, &mut hw, &mut sink, AUTONOMOUS_SECS);
    info!(
        "Autonomous done: drive L={:.2} R={:.2} rot, low gear={}",
        hw.position(Channel::LeftDrive),
        hw.position(Channel::RightDrive),
        hw.solenoid(Solenoid::Shifter),
    );

    service.set_mode(Mode::Teleop, &mut hw, &mut sink);
    for step in TELEOP_SCRIPT {
        info!("Script: {}", step.label);
        (step.apply)(&mut hw);
        run_for(&mut service, &mut hw, &mut sink, step.secs);
    }
    info!(
        "Teleop done: heading={:.1}\u{00b0} climbers L={:.1} R={:.1}",
        hw.heading_deg(),
        hw.position(Channel::LeftClimber),
        hw.position(Channel::RightClimber),
    );

    service.set_mode(Mode::Disabled, &mut hw, &mut sink);
    run_for(&mut service, &mut hw, &mut sink, DISABLED_SECS);

    let t = service.build_telemetry();
    info!("Session ended after {} ticks, faults=0b{:08b}", t.tick, t.fault_flags);
    Ok(())
}
