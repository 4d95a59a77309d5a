//! Safety supervisor.
//!
//! The supervisor runs **every tick before bindings and the scheduler** and
//! maintains a fault bitmask of stale sensors.  The robot service maps the
//! mask to the subsystems that depend on those sensors and fail-stops them.
//!
//! ## Fault lifecycle
//!
//! 1. A sensor stops delivering samples; the hub holds its last value and
//!    ages it.
//! 2. Once the age exceeds `sensor_stale_ticks`, the supervisor sets the
//!    corresponding bit.
//! 3. The service blocks new schedule requests for every affected subsystem
//!    and cancels each non-default command owning one (their `end` zeroes
//!    the outputs).
//! 4. Each tick the supervisor re-evaluates.  A fresh sample clears the bit.
//!
//! Several faults can be active at once; each clears independently.

use log::{error, info};

use crate::config::RobotConfig;
use crate::error::SensorFault;
use crate::sensors::SensorSnapshot;

/// Safety supervisor.
pub struct SafetySupervisor {
    stale_ticks: u32,
    /// Latched fault bitmask.
    faults: u8,
}

impl SafetySupervisor {
    pub fn new(config: &RobotConfig) -> Self {
        Self {
            stale_ticks: config.sensor_stale_ticks,
            faults: 0,
        }
    }

    /// Evaluate every sensor age against the staleness limit.
    /// Returns the updated fault bitmask.
    pub fn evaluate(&mut self, snap: &SensorSnapshot) -> u8 {
        let ages = &snap.ages;
        self.eval_fault(SensorFault::GyroStale, ages.gyro > self.stale_ticks);
        self.eval_fault(SensorFault::DriveEncoderStale, ages.drive > self.stale_ticks);
        self.eval_fault(
            SensorFault::LeftClimberStale,
            ages.left_climber > self.stale_ticks,
        );
        self.eval_fault(
            SensorFault::RightClimberStale,
            ages.right_climber > self.stale_ticks,
        );
        self.eval_fault(
            SensorFault::IntakeLimitStale,
            ages.intake_limit > self.stale_ticks,
        );
        self.faults
    }

    /// Current fault bitmask.
    pub fn faults(&self) -> u8 {
        self.faults
    }

    // ── Internal ──────────────────────────────────────────────────

    /// Set or clear a fault bit based on a boolean condition.
    fn eval_fault(&mut self, fault: SensorFault, condition: bool) {
        if condition {
            if self.faults & fault.mask() == 0 {
                error!("SENSOR FAULT SET: {fault}");
            }
            self.faults |= fault.mask();
        } else {
            if self.faults & fault.mask() != 0 {
                info!("SENSOR FAULT CLEARED: {fault}");
            }
            self.faults &= !fault.mask();
        }
    }
}
