//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured robot events through the
//! `log` facade.  A dashboard or network adapter would implement the same
//! trait.

use log::{info, warn};

use crate::app::events::RobotEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`RobotEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &RobotEvent) {
        match event {
            RobotEvent::Telemetry(t) => {
                info!(
                    "TELEM | tick={} mode={:?} | cmds={} | hdg={:.1}\u{00b0} | \
                     drive L={:.2} R={:.2} | climb L={:.1} R={:.1} | intake={:?} | \
                     faults=0b{:08b}",
                    t.tick,
                    t.mode,
                    t.running_commands,
                    t.heading_deg,
                    t.left_drive_pos,
                    t.right_drive_pos,
                    t.left_climber_pos,
                    t.right_climber_pos,
                    t.intake_state,
                    t.fault_flags,
                );
            }
            RobotEvent::ModeChanged { from, to } => {
                info!("MODE  | {:?} -> {:?}", from, to);
            }
            RobotEvent::CommandStarted(name) => {
                info!("CMD   | start {}", name);
            }
            RobotEvent::CommandEnded { name, interrupted } => {
                if *interrupted {
                    info!("CMD   | {} interrupted", name);
                } else {
                    info!("CMD   | {} finished", name);
                }
            }
            RobotEvent::CommandRejected { name, blocker } => {
                info!("CMD   | {} rejected, {} is not interruptible", name, blocker);
            }
            RobotEvent::CommandBlocked(name) => {
                warn!("CMD   | {} blocked by a sensor fault", name);
            }
            RobotEvent::FaultDetected(flags) => {
                warn!("FAULT | detected, flags=0b{:08b}", flags);
            }
            RobotEvent::FaultCleared => {
                info!("FAULT | all cleared");
            }
        }
    }
}
