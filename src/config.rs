//! Robot configuration parameters
//!
//! All tunable parameters for the robot program.  Clamp bounds and
//! tolerances are per-behavior settings, not global hardware limits.
//! Values can be overridden by a JSON file handed to the host binary.

use serde::{Deserialize, Serialize};

use crate::control::pid::{PidController, PidGains};
use crate::error::{Error, Result};

/// Gains plus completion band and output clamp of one closed loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoopConfig {
    pub gains: PidGains,
    /// Completion band around the setpoint (same unit as the measurement).
    pub tolerance: f32,
    /// Output is clamped to `[-output_limit, output_limit]`.
    pub output_limit: f32,
}

impl LoopConfig {
    /// Build a fresh controller for a loop running every `period_secs`.
    pub fn controller(&self, period_secs: f32) -> PidController {
        PidController::new(self.gains, period_secs)
            .with_output_limit(self.output_limit)
            .with_tolerance(self.tolerance)
    }

    fn validate(&self, field: &'static str) -> Result<()> {
        if !(self.output_limit > 0.0 && self.output_limit <= 1.0) || self.tolerance < 0.0 {
            return Err(Error::Config(field));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Stick magnitudes below this read as zero.
    pub deadband: f32,
    /// Scale applied to the turn stick before mixing.
    pub turn_scale: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EncoderDriveConfig {
    pub control: LoopConfig,
    /// Distance driven by the autonomous routine (rotations).
    pub auto_distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntakeConfig {
    /// Pivot power while lowering (positive = down).
    pub pivot_down_power: f32,
    /// Pivot power while raising back to the up limit.
    pub pivot_up_power: f32,
    /// Small power that keeps the arm seated against the up limit.
    pub hold_power: f32,
    /// Roller power used when no override button is held.
    pub roller_power: f32,
    /// Conveyor power while feeding from the intake.
    pub conveyor_feed_power: f32,
    pub set_down_secs: f32,
    pub set_load_secs: f32,
    pub set_up_timeout_secs: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimberConfig {
    /// Winch power while extending (positive = up).
    pub raise_power: f32,
    /// Winch power magnitude while pulling the robot up.
    pub retract_power: f32,
    /// Encoder position at which an arm counts as extended.
    pub extended_position: f32,
    /// Encoder position at which a retracting arm locks.
    pub locked_position: f32,
    /// An extended arm that sags this far below `extended_position` resumes raising.
    pub hysteresis: f32,
    pub raise_timeout_secs: f32,
    /// Both arms must sit locked this long before a climb counts as done.
    pub lock_settle_secs: f32,
    /// Travel of the manual lower-arm command (rotations).
    pub lower_distance: f32,
    /// Arm positioning loop.
    pub arm: LoopConfig,
}

/// Core robot configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotConfig {
    // --- Timing ---
    /// Control loop period (milliseconds)
    pub tick_period_ms: u32,
    /// Ticks a sensor may go without a fresh sample before it is faulted
    pub sensor_stale_ticks: u32,
    /// Telemetry report interval (ticks, 0 = off)
    pub telemetry_interval_ticks: u32,

    // --- Behaviors ---
    pub drive: DriveConfig,
    pub gyro_turn: LoopConfig,
    pub encoder_drive: EncoderDriveConfig,
    pub intake: IntakeConfig,
    pub climber: ClimberConfig,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            // Timing
            tick_period_ms: 20, // 50 Hz
            sensor_stale_ticks: 25,
            telemetry_interval_ticks: 50, // 1/s

            drive: DriveConfig {
                deadband: 0.08,
                turn_scale: 0.75,
            },
            gyro_turn: LoopConfig {
                gains: PidGains::p(0.05),
                tolerance: 0.5,
                output_limit: 0.25,
            },
            encoder_drive: EncoderDriveConfig {
                control: LoopConfig {
                    gains: PidGains::p(0.05),
                    tolerance: 1.0,
                    output_limit: 0.25,
                },
                auto_distance: 50.0,
            },
            intake: IntakeConfig {
                pivot_down_power: 0.2,
                pivot_up_power: -0.4,
                hold_power: -0.1,
                roller_power: 0.7,
                conveyor_feed_power: 0.5,
                set_down_secs: 0.25,
                set_load_secs: 0.15,
                set_up_timeout_secs: 1.0,
            },
            climber: ClimberConfig {
                raise_power: 0.8,
                retract_power: 0.6,
                extended_position: 120.0,
                locked_position: 5.0,
                hysteresis: 4.0,
                raise_timeout_secs: 4.0,
                lock_settle_secs: 0.5,
                lower_distance: 30.0,
                arm: LoopConfig {
                    gains: PidGains::p(0.02),
                    tolerance: 1.0,
                    output_limit: 0.5,
                },
            },
        }
    }
}

impl RobotConfig {
    /// Control period in seconds.
    pub fn tick_secs(&self) -> f32 {
        self.tick_period_ms as f32 / 1000.0
    }

    /// Whole ticks covering `secs` (at least one).
    pub fn ticks_for(&self, secs: f32) -> u64 {
        ((secs / self.tick_secs()).ceil() as u64).max(1)
    }

    /// Range-check every field.  Invalid values are rejected, never clamped.
    pub fn validate(&self) -> Result<()> {
        if self.tick_period_ms == 0 {
            return Err(Error::Config("tick_period_ms"));
        }
        if self.sensor_stale_ticks == 0 {
            return Err(Error::Config("sensor_stale_ticks"));
        }
        if !(0.0..1.0).contains(&self.drive.deadband) {
            return Err(Error::Config("drive.deadband"));
        }
        self.gyro_turn.validate("gyro_turn")?;
        self.encoder_drive.control.validate("encoder_drive")?;
        self.climber.arm.validate("climber.arm")?;

        let i = &self.intake;
        for (field, power) in [
            ("intake.pivot_down_power", i.pivot_down_power),
            ("intake.pivot_up_power", i.pivot_up_power),
            ("intake.hold_power", i.hold_power),
            ("intake.roller_power", i.roller_power),
            ("intake.conveyor_feed_power", i.conveyor_feed_power),
        ] {
            if !(-1.0..=1.0).contains(&power) {
                return Err(Error::Config(field));
            }
        }
        for (field, secs) in [
            ("intake.set_down_secs", i.set_down_secs),
            ("intake.set_load_secs", i.set_load_secs),
            ("intake.set_up_timeout_secs", i.set_up_timeout_secs),
            ("climber.raise_timeout_secs", self.climber.raise_timeout_secs),
            ("climber.lock_settle_secs", self.climber.lock_settle_secs),
        ] {
            if secs.is_nan() || secs < 0.0 {
                return Err(Error::Config(field));
            }
        }

        let c = &self.climber;
        if !(c.raise_power > 0.0 && c.raise_power <= 1.0) {
            return Err(Error::Config("climber.raise_power"));
        }
        if !(c.retract_power > 0.0 && c.retract_power <= 1.0) {
            return Err(Error::Config("climber.retract_power"));
        }
        if c.locked_position >= c.extended_position {
            return Err(Error::Config("climber.locked_position"));
        }
        if c.hysteresis < 0.0 || c.hysteresis >= c.extended_position - c.locked_position {
            return Err(Error::Config("climber.hysteresis"));
        }
        if c.lower_distance < 0.0 {
            return Err(Error::Config("climber.lower_distance"));
        }
        Ok(())
    }
}
