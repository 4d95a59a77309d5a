//! Mock hardware and contexts for integration tests.
//!
//! [`MockHardware`] records every actuator call so tests can assert on the
//! full command history without a plant model.  [`Bench`] is a minimal
//! control context for exercising the scheduler and bindings directly.

use commandbot::app::events::RobotEvent;
use commandbot::app::ports::{ActuatorPort, Channel, EventSink, InputPort, SensorPort, Solenoid};
use commandbot::command::Command;
use commandbot::io::{AxisId, ButtonId, IndicatorId, IndicatorOutput, InputSnapshot, OperatorInput};
use commandbot::sensors::SensorFrame;
use commandbot::subsystem::SubsystemSet;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCall {
    SetPower { channel: Channel, power: f32 },
    Hold { channel: Channel, position: f32 },
    Stop(Channel),
    Solenoid { solenoid: Solenoid, extended: bool },
    Indicator { id: IndicatorId, on: bool },
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<ActuatorCall>,
    pub inputs: InputSnapshot,
    /// Returned by every `read_sensors` call.
    pub frame: SensorFrame,
}

#[allow(dead_code)]
impl MockHardware {
    /// Healthy sensors, intake seated on its up limit.
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            inputs: InputSnapshot::default(),
            frame: SensorFrame {
                heading_deg: Some(0.0),
                left_drive_pos: Some(0.0),
                right_drive_pos: Some(0.0),
                left_climber_pos: Some(0.0),
                right_climber_pos: Some(0.0),
                intake_up_limit: Some(true),
            },
        }
    }

    pub fn press(&mut self, id: ButtonId, pressed: bool) {
        self.inputs.set_button(id, pressed);
    }

    pub fn set_axis(&mut self, id: AxisId, value: f32) {
        self.inputs.set_axis(id, value);
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Last power-type command sent to `channel` (stop = 0).
    pub fn last_power(&self, channel: Channel) -> Option<f32> {
        self.calls.iter().rev().find_map(|c| match c {
            ActuatorCall::SetPower { channel: ch, power } if *ch == channel => Some(*power),
            ActuatorCall::Stop(ch) if *ch == channel => Some(0.0),
            _ => None,
        })
    }

    pub fn last_hold(&self, channel: Channel) -> Option<f32> {
        self.calls.iter().rev().find_map(|c| match c {
            ActuatorCall::Hold { channel: ch, position } if *ch == channel => Some(*position),
            _ => None,
        })
    }

    pub fn solenoid(&self, solenoid: Solenoid) -> Option<bool> {
        self.calls.iter().rev().find_map(|c| match c {
            ActuatorCall::Solenoid { solenoid: s, extended } if *s == solenoid => Some(*extended),
            _ => None,
        })
    }

    pub fn indicator(&self, id: IndicatorId) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                ActuatorCall::Indicator { id: i, on } if *i == id => Some(*on),
                _ => None,
            })
            .unwrap_or(false)
    }

    /// Every motor channel's most recent command was a stop.
    pub fn all_stopped(&self) -> bool {
        Channel::ALL.iter().all(|ch| self.last_command_is_stop(*ch))
    }

    fn last_command_is_stop(&self, channel: Channel) -> bool {
        self.calls
            .iter()
            .rev()
            .find(|c| match c {
                ActuatorCall::SetPower { channel: ch, .. }
                | ActuatorCall::Hold { channel: ch, .. }
                | ActuatorCall::Stop(ch) => *ch == channel,
                _ => false,
            })
            .is_none_or(|c| matches!(c, ActuatorCall::Stop(_)))
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl InputPort for MockHardware {
    fn read_inputs(&mut self) -> InputSnapshot {
        self.inputs
    }
}

impl SensorPort for MockHardware {
    fn read_sensors(&mut self) -> SensorFrame {
        self.frame
    }
}

impl ActuatorPort for MockHardware {
    fn set_power(&mut self, channel: Channel, power: f32) {
        self.calls.push(ActuatorCall::SetPower { channel, power });
    }

    fn set_position_target(&mut self, channel: Channel, position: f32) {
        self.calls.push(ActuatorCall::Hold { channel, position });
    }

    fn stop(&mut self, channel: Channel) {
        self.calls.push(ActuatorCall::Stop(channel));
    }

    fn set_solenoid(&mut self, solenoid: Solenoid, extended: bool) {
        self.calls.push(ActuatorCall::Solenoid { solenoid, extended });
    }

    fn set_indicator(&mut self, id: IndicatorId, on: bool) {
        self.calls.push(ActuatorCall::Indicator { id, on });
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<RobotEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn started(&self, name: &str) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, RobotEvent::CommandStarted(n) if *n == name))
            .count()
    }

    pub fn ended(&self, name: &str, interrupted: bool) -> usize {
        self.events
            .iter()
            .filter(|e| {
                matches!(e, RobotEvent::CommandEnded { name: n, interrupted: i } if *n == name && *i == interrupted)
            })
            .count()
    }

    pub fn telemetry_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, RobotEvent::Telemetry(_)))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &RobotEvent) {
        self.events.push(event.clone());
    }
}

// ── Bench context ─────────────────────────────────────────────

/// Operator input plus a lifecycle log and indicator lamps.
#[derive(Default)]
pub struct Bench {
    pub input: InputSnapshot,
    pub log: Vec<String>,
    pub lamps: [bool; 8],
}

#[allow(dead_code)]
impl Bench {
    pub fn count(&self, entry: &str) -> usize {
        self.log.iter().filter(|e| *e == entry).count()
    }

    pub fn press(&mut self, id: ButtonId, pressed: bool) {
        self.input.set_button(id, pressed);
    }
}

impl OperatorInput for Bench {
    fn button(&self, id: ButtonId) -> bool {
        self.input.button(id)
    }

    fn axis(&self, id: AxisId) -> f32 {
        self.input.axis(id)
    }
}

impl IndicatorOutput for Bench {
    fn set_indicator(&mut self, id: IndicatorId, on: bool) {
        if let Some(lamp) = self.lamps.get_mut(id.0 as usize) {
            *lamp = on;
        }
    }
}

/// Test command logging its lifecycle; finishes after `ticks` executes
/// (`None` = never).
pub struct Probe {
    name: &'static str,
    reqs: SubsystemSet,
    ticks: Option<u32>,
    executed: u32,
}

pub fn probe(name: &'static str, reqs: SubsystemSet, ticks: Option<u32>) -> Probe {
    Probe {
        name,
        reqs,
        ticks,
        executed: 0,
    }
}

impl Command<Bench> for Probe {
    fn name(&self) -> &'static str {
        self.name
    }

    fn requirements(&self) -> SubsystemSet {
        self.reqs
    }

    fn initialize(&mut self, ctx: &mut Bench) {
        self.executed = 0;
        ctx.log.push(format!("init {}", self.name));
    }

    fn execute(&mut self, ctx: &mut Bench) {
        self.executed += 1;
        ctx.log.push(format!("exec {}", self.name));
    }

    fn end(&mut self, ctx: &mut Bench, interrupted: bool) {
        let how = if interrupted { "interrupted" } else { "done" };
        ctx.log.push(format!("end {} {}", self.name, how));
    }

    fn is_finished(&mut self, _ctx: &Bench) -> bool {
        self.ticks.is_some_and(|n| self.executed >= n)
    }
}
