//! Concrete robot behaviors.
//!
//! Every command here implements [`Command<RobotContext>`](crate::command::Command):
//! it reads the tick's inputs and sensor snapshot from the context and
//! writes actuator requests back into `ctx.outputs`.  Requirements are taken
//! from the [`RobotSubsystems`] table built at startup.

pub mod climb;
pub mod conveyor;
pub mod drivetrain;
pub mod intake;

use crate::app::context::RobotContext;
use crate::app::ports::Channel;
use crate::error::{Result, SensorFault};
use crate::scheduler::Scheduler;
use crate::sensors::SensorSnapshot;
use crate::subsystem::{SubsystemId, SubsystemSet};

/// Ids of every registered subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobotSubsystems {
    pub drivetrain: SubsystemId,
    pub shifter: SubsystemId,
    pub intake_arm: SubsystemId,
    pub conveyor: SubsystemId,
    pub left_climber: SubsystemId,
    pub right_climber: SubsystemId,
    pub climber_pneumatics: SubsystemId,
}

impl RobotSubsystems {
    pub fn register(scheduler: &mut Scheduler<RobotContext>) -> Result<Self> {
        Ok(Self {
            drivetrain: scheduler.add_subsystem("drivetrain")?,
            shifter: scheduler.add_subsystem("shifter")?,
            intake_arm: scheduler.add_subsystem("intake_arm")?,
            conveyor: scheduler.add_subsystem("conveyor")?,
            left_climber: scheduler.add_subsystem("left_climber")?,
            right_climber: scheduler.add_subsystem("right_climber")?,
            climber_pneumatics: scheduler.add_subsystem("climber_pneumatics")?,
        })
    }

    pub fn arm(&self, side: ArmSide) -> SubsystemId {
        match side {
            ArmSide::Left => self.left_climber,
            ArmSide::Right => self.right_climber,
        }
    }

    /// Subsystems whose commands depend on the faulted sensors.
    pub fn affected_by(&self, faults: u8) -> SubsystemSet {
        let mut set = SubsystemSet::EMPTY;
        let has = |f: SensorFault| faults & f.mask() != 0;
        if has(SensorFault::GyroStale) || has(SensorFault::DriveEncoderStale) {
            set = set.with(self.drivetrain);
        }
        if has(SensorFault::LeftClimberStale) {
            set = set.with(self.left_climber);
        }
        if has(SensorFault::RightClimberStale) {
            set = set.with(self.right_climber);
        }
        if has(SensorFault::IntakeLimitStale) {
            set = set.with(self.intake_arm);
        }
        set
    }
}

/// One of the two climber winches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmSide {
    Left,
    Right,
}

impl ArmSide {
    pub const fn channel(self) -> Channel {
        match self {
            Self::Left => Channel::LeftClimber,
            Self::Right => Channel::RightClimber,
        }
    }

    pub fn position(self, sensors: &SensorSnapshot) -> f32 {
        match self {
            Self::Left => sensors.left_climber_pos,
            Self::Right => sensors.right_climber_pos,
        }
    }
}
