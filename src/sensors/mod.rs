//! Sensor aggregation: raw per-tick frames → held, aged [`SensorSnapshot`].
//!
//! Hardware adapters report whatever they managed to sample this tick as a
//! [`SensorFrame`] (`None` = no fresh sample).  The [`SensorHub`] keeps the
//! last good value of every channel together with its age in ticks, so
//! commands always read a complete snapshot and the safety supervisor can
//! decide when a held value is too old to trust.

/// Age reported for a channel that has never produced a sample.
pub const NEVER_SAMPLED: u32 = u32::MAX;

/// What the hardware delivered this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorFrame {
    /// Gyro heading (degrees, counter-clockwise positive).
    pub heading_deg: Option<f32>,
    /// Drive encoder positions (rotations).
    pub left_drive_pos: Option<f32>,
    pub right_drive_pos: Option<f32>,
    /// Climber winch encoder positions (rotations).
    pub left_climber_pos: Option<f32>,
    pub right_climber_pos: Option<f32>,
    /// Intake arm "up" limit switch (true = arm seated).
    pub intake_up_limit: Option<bool>,
}

/// Ticks since each channel last delivered a fresh sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorAges {
    pub gyro: u32,
    /// Worst of the two drive encoders.
    pub drive: u32,
    pub left_climber: u32,
    pub right_climber: u32,
    pub intake_limit: u32,
}

impl Default for SensorAges {
    fn default() -> Self {
        Self {
            gyro: NEVER_SAMPLED,
            drive: NEVER_SAMPLED,
            left_climber: NEVER_SAMPLED,
            right_climber: NEVER_SAMPLED,
            intake_limit: NEVER_SAMPLED,
        }
    }
}

/// A point-in-time view of every sensor, consumed by triggers, commands
/// and state machines within one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorSnapshot {
    pub heading_deg: f32,
    pub left_drive_pos: f32,
    pub right_drive_pos: f32,
    pub left_climber_pos: f32,
    pub right_climber_pos: f32,
    pub intake_up_limit: bool,
    pub ages: SensorAges,
}

// ---------------------------------------------------------------------------
// Hub
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Held<T> {
    value: T,
    age: u32,
}

impl<T: Copy + Default> Held<T> {
    fn new() -> Self {
        Self {
            value: T::default(),
            age: NEVER_SAMPLED,
        }
    }

    fn update(&mut self, sample: Option<T>) {
        match sample {
            Some(v) => {
                self.value = v;
                self.age = 0;
            }
            None => self.age = self.age.saturating_add(1),
        }
    }
}

/// Holds the last good value of every channel.
#[derive(Debug, Clone)]
pub struct SensorHub {
    gyro: Held<f32>,
    left_drive: Held<f32>,
    right_drive: Held<f32>,
    left_climber: Held<f32>,
    right_climber: Held<f32>,
    intake_limit: Held<bool>,
}

impl Default for SensorHub {
    fn default() -> Self {
        Self::new()
    }
}

fn finite(sample: Option<f32>) -> Option<f32> {
    sample.filter(|v| v.is_finite())
}

impl SensorHub {
    pub fn new() -> Self {
        Self {
            gyro: Held::new(),
            left_drive: Held::new(),
            right_drive: Held::new(),
            left_climber: Held::new(),
            right_climber: Held::new(),
            intake_limit: Held::new(),
        }
    }

    /// Fold this tick's frame in and return the resulting snapshot.
    ///
    /// Missing or non-finite samples keep the previous value and age it by
    /// one tick.
    pub fn read(&mut self, frame: &SensorFrame) -> SensorSnapshot {
        self.gyro.update(finite(frame.heading_deg));
        self.left_drive.update(finite(frame.left_drive_pos));
        self.right_drive.update(finite(frame.right_drive_pos));
        self.left_climber.update(finite(frame.left_climber_pos));
        self.right_climber.update(finite(frame.right_climber_pos));
        self.intake_limit.update(frame.intake_up_limit);
        self.snapshot()
    }

    /// Snapshot of the held values without advancing ages.
    pub fn snapshot(&self) -> SensorSnapshot {
        SensorSnapshot {
            heading_deg: self.gyro.value,
            left_drive_pos: self.left_drive.value,
            right_drive_pos: self.right_drive.value,
            left_climber_pos: self.left_climber.value,
            right_climber_pos: self.right_climber.value,
            intake_up_limit: self.intake_limit.value,
            ages: SensorAges {
                gyro: self.gyro.age,
                drive: self.left_drive.age.max(self.right_drive.age),
                left_climber: self.left_climber.age,
                right_climber: self.right_climber.age,
                intake_limit: self.intake_limit.age,
            },
        }
    }
}
