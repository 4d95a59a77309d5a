//! PID controller for heading, distance and arm-position loops.
//!
//! Proportional-integral-derivative controller with a clamped output and a
//! tolerance band.  Owned by exactly one command; the command resets it in
//! `initialize` and calls [`PidController::calculate`] once per `execute`.

use serde::{Deserialize, Serialize};

/// Loop gains.  I and D may be zero for a pure P loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

impl PidGains {
    pub const fn p(kp: f32) -> Self {
        Self {
            kp,
            ki: 0.0,
            kd: 0.0,
        }
    }
}

/// PID controller
#[derive(Debug, Clone)]
pub struct PidController {
    gains: PidGains,
    setpoint: f32,
    integral: f32,
    prev_error: Option<f32>,
    /// Error seen by the most recent `calculate`.
    last_error: Option<f32>,
    output_min: f32,
    output_max: f32,
    tolerance: f32,
    /// Seconds between `calculate` calls.
    period: f32,
}

impl PidController {
    /// Output limits default to the full actuator range [-1, 1].
    pub fn new(gains: PidGains, period_secs: f32) -> Self {
        Self {
            gains,
            setpoint: 0.0,
            integral: 0.0,
            prev_error: None,
            last_error: None,
            output_min: -1.0,
            output_max: 1.0,
            tolerance: 0.0,
            period: period_secs,
        }
    }

    /// Set output limits.  Reversed bounds are swapped.
    pub fn set_limits(&mut self, min: f32, max: f32) {
        if min <= max {
            self.output_min = min;
            self.output_max = max;
        } else {
            self.output_min = max;
            self.output_max = min;
        }
    }

    /// Symmetric limits `[-limit, limit]`.
    #[must_use]
    pub fn with_output_limit(mut self, limit: f32) -> Self {
        let limit = limit.abs();
        self.set_limits(-limit, limit);
        self
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance.abs();
        self
    }

    pub fn set_setpoint(&mut self, setpoint: f32) {
        self.setpoint = setpoint;
    }

    pub fn setpoint(&self) -> f32 {
        self.setpoint
    }

    pub fn limits(&self) -> (f32, f32) {
        (self.output_min, self.output_max)
    }

    /// Compute the output for this tick's measurement.
    ///
    /// A non-finite measurement yields zero output and leaves the loop state
    /// untouched.
    pub fn calculate(&mut self, measurement: f32) -> f32 {
        if !measurement.is_finite() {
            return 0.0;
        }
        let error = self.setpoint - measurement;
        let dt = self.period;

        // Proportional
        let p = self.gains.kp * error;

        // Integral (with anti-windup)
        self.integral += error * dt;
        let i = self.gains.ki * self.integral;

        // Derivative, skipped on the first sample after a reset
        let d = match self.prev_error {
            Some(prev) if dt > 0.0 => self.gains.kd * (error - prev) / dt,
            _ => 0.0,
        };

        self.prev_error = Some(error);
        self.last_error = Some(error);

        let raw = p + i + d;
        if !raw.is_finite() {
            return 0.0;
        }
        let output = raw.clamp(self.output_min, self.output_max);

        // Anti-windup: if output is saturated, stop integrating
        if output >= self.output_max || output <= self.output_min {
            self.integral -= error * dt;
        }

        output
    }

    /// Whether the last calculated error was within tolerance.  False until
    /// `calculate` has run at least once since the last reset.
    pub fn at_setpoint(&self) -> bool {
        self.last_error.is_some_and(|e| e.abs() <= self.tolerance)
    }

    pub fn last_error(&self) -> Option<f32> {
        self.last_error
    }

    /// Reset controller state
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = None;
        self.last_error = None;
    }
}

/// `true` when `value` lies within a window of total width `window`
/// centered on `target`.
pub fn is_within(value: f32, target: f32, window: f32) -> bool {
    (value - target).abs() <= window / 2.0
}

/// Clamp to the actuator power range; NaN becomes 0.
pub fn clamp_power(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}
