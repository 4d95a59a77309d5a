//! Robot service: the hexagonal core.
//!
//! [`RobotService`] owns the wired [`RobotProgram`], the shared
//! [`RobotContext`], the sensor hub and the safety supervisor.  All I/O
//! flows through port traits passed in at call sites, so the whole robot
//! can be driven by mock adapters in tests.
//!
//! ```text
//!   InputPort ──▶ ┌───────────────────────────┐
//!  SensorPort ──▶ │        RobotService        │ ──▶ EventSink
//! ActuatorPort ◀──│ Safety · Bindings · Sched  │
//!                 └───────────────────────────┘
//! ```
//!
//! One [`tick`](RobotService::tick) is one control cycle:
//!
//! 1. Advance the clock, sample operator input and sensors.
//! 2. Safety: age-check sensors, publish fault changes, block new requests
//!    for subsystems that depend on a faulted sensor.
//! 3. Bindings (teleop only) turn trigger edges into schedule/cancel requests.
//! 4. Fail-stop: cancel non-default owners of subsystems with faulted sensors.
//! 5. Scheduler runs every surviving command (autonomous and teleop).
//! 6. Apply requested outputs; disabled forces every motor off.
//! 7. Drain the scheduler journal and emit telemetry.

use log::{info, warn};

use crate::command::CommandId;
use crate::commands::RobotSubsystems;
use crate::config::RobotConfig;
use crate::error::Result;
use crate::safety::SafetySupervisor;
use crate::scheduler::{Scheduler, SchedulerEvent};
use crate::sensors::SensorHub;

use super::context::{MotorOutput, RobotContext};
use super::events::{Mode, RobotEvent, TelemetryData};
use super::ports::{ActuatorPort, Channel, EventSink, InputPort, SensorPort, Solenoid};
use super::wiring::{RobotCommands, RobotProgram};

/// The robot service orchestrates all control logic.
pub struct RobotService {
    program: RobotProgram,
    ctx: RobotContext,
    hub: SensorHub,
    safety: SafetySupervisor,
    mode: Mode,
    tick_count: u64,
}

impl RobotService {
    /// Validate the configuration and wire the program.  Starts disabled.
    pub fn new(config: RobotConfig) -> Result<Self> {
        config.validate()?;
        let program = RobotProgram::build(&config)?;
        let safety = SafetySupervisor::new(&config);
        Ok(Self {
            program,
            ctx: RobotContext::new(config),
            hub: SensorHub::new(),
            safety,
            mode: Mode::Disabled,
            tick_count: 0,
        })
    }

    // ── Mode control ──────────────────────────────────────────

    /// Switch operating mode and run the matching entry hook.  Re-entering
    /// the current mode is a no-op.
    ///
    /// Every real mode change first cancels all running commands, so nothing
    /// a binding started survives into a mode that does not poll bindings.
    pub fn set_mode(&mut self, mode: Mode, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        if mode == self.mode {
            return;
        }
        let from = self.mode;
        self.mode = mode;
        info!("RobotService: mode {:?} -> {:?}", from, mode);
        sink.emit(&RobotEvent::ModeChanged { from, to: mode });

        self.program.scheduler.cancel_all(&mut self.ctx);
        // Controls held across mode entry are not edges.
        self.program.bindings.reset_edges();

        match mode {
            Mode::Disabled => self.disabled_init(hw),
            Mode::Autonomous => self.autonomous_init(),
            Mode::Teleop => self.teleop_init(),
        }
        self.flush_journal(sink);
    }

    /// Stop every motor.
    fn disabled_init(&mut self, hw: &mut impl ActuatorPort) {
        self.ctx.outputs.stop_all_motors();
        hw.all_off();
    }

    fn autonomous_init(&mut self) {
        let auto = self.program.commands.autonomous;
        self.program.scheduler.schedule(auto, &mut self.ctx);
    }

    fn teleop_init(&mut self) {
        let entry = self.program.commands.teleop_init;
        self.program.scheduler.schedule(entry, &mut self.ctx);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle.
    ///
    /// `hw` satisfies every hardware port at once, which avoids a double
    /// mutable borrow while keeping the port boundary explicit.
    pub fn tick(&mut self, hw: &mut (impl InputPort + SensorPort + ActuatorPort), sink: &mut impl EventSink) {
        self.tick_count += 1;
        self.ctx.tick += 1;

        // 1. Sample
        self.ctx.inputs = hw.read_inputs();
        let frame = hw.read_sensors();
        self.ctx.sensors = self.hub.read(&frame);

        // 2. Safety
        let previous = self.safety.faults();
        let faults = self.safety.evaluate(&self.ctx.sensors);
        self.ctx.fault_flags = faults;
        if faults & !previous != 0 {
            warn!("Sensor fault! flags=0b{:08b}", faults);
            sink.emit(&RobotEvent::FaultDetected(faults));
        } else if faults == 0 && previous != 0 {
            sink.emit(&RobotEvent::FaultCleared);
        }
        let affected = self.program.subsystems.affected_by(faults);
        self.program.scheduler.set_blocked(affected);

        if self.mode != Mode::Disabled {
            // 3. Bindings
            if self.mode == Mode::Teleop {
                self.program.bindings.poll(&mut self.program.scheduler, &mut self.ctx);
            }

            // 4. Fail-stop
            if !affected.is_empty() {
                let canceled = self.program.scheduler.cancel_owners(affected, true, &mut self.ctx);
                if canceled > 0 {
                    warn!("Fail-stop: canceled {} command(s) on faulted subsystems", canceled);
                }
            }

            // 5. Scheduler
            self.program.scheduler.run(&mut self.ctx);
        }

        // 6. Outputs
        self.apply_outputs(hw);

        // 7. Events
        self.flush_journal(sink);
        let interval = self.ctx.config.telemetry_interval_ticks as u64;
        if interval > 0 && self.tick_count % interval == 0 {
            sink.emit(&RobotEvent::Telemetry(self.build_telemetry()));
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot from the current context.
    pub fn build_telemetry(&self) -> TelemetryData {
        let s = &self.ctx.sensors;
        TelemetryData {
            tick: self.tick_count,
            mode: self.mode,
            running_commands: self.program.scheduler.running().len(),
            heading_deg: s.heading_deg,
            left_drive_pos: s.left_drive_pos,
            right_drive_pos: s.right_drive_pos,
            left_climber_pos: s.left_climber_pos,
            right_climber_pos: s.right_climber_pos,
            intake_state: self.ctx.intake_state,
            fault_flags: self.ctx.fault_flags,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Current active fault bitmask (0 = no faults).
    pub fn fault_flags(&self) -> u8 {
        self.ctx.fault_flags
    }

    pub fn context(&self) -> &RobotContext {
        &self.ctx
    }

    pub fn scheduler(&self) -> &Scheduler<RobotContext> {
        &self.program.scheduler
    }

    pub fn commands(&self) -> &RobotCommands {
        &self.program.commands
    }

    pub fn subsystems(&self) -> &RobotSubsystems {
        &self.program.subsystems
    }

    pub fn is_scheduled(&self, id: CommandId) -> bool {
        self.program.scheduler.is_scheduled(id)
    }

    // ── Internal ──────────────────────────────────────────────

    /// Translate requested outputs into port calls.
    fn apply_outputs(&self, hw: &mut impl ActuatorPort) {
        let out = &self.ctx.outputs;

        if self.mode == Mode::Disabled {
            hw.all_off();
        } else {
            for channel in Channel::ALL {
                match out.motor(channel) {
                    MotorOutput::Stopped => hw.stop(channel),
                    MotorOutput::Power(p) => hw.set_power(channel, p),
                    MotorOutput::Position(x) => hw.set_position_target(channel, x),
                }
            }
        }

        for solenoid in Solenoid::ALL {
            hw.set_solenoid(solenoid, out.solenoid(solenoid));
        }
        for (indicator, on) in out.indicators() {
            hw.set_indicator(indicator, on);
        }
    }

    fn flush_journal(&mut self, sink: &mut impl EventSink) {
        let scheduler = &mut self.program.scheduler;
        let mut pending = Vec::new();
        scheduler.drain_events(|e| pending.push(e));
        for event in pending {
            let event = match event {
                SchedulerEvent::Initialized(id) => RobotEvent::CommandStarted(scheduler.command_name(id)),
                SchedulerEvent::Ended { id, interrupted } => RobotEvent::CommandEnded {
                    name: scheduler.command_name(id),
                    interrupted,
                },
                SchedulerEvent::Rejected { id, blocker } => RobotEvent::CommandRejected {
                    name: scheduler.command_name(id),
                    blocker: scheduler.command_name(blocker),
                },
                SchedulerEvent::Blocked { id, .. } => RobotEvent::CommandBlocked(scheduler.command_name(id)),
            };
            sink.emit(&event);
        }
    }
}
