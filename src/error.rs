//! Unified error types for the command framework.
//!
//! Errors only arise while the robot program is being assembled at startup:
//! registering subsystems and commands, building composite commands, and
//! validating configuration.  The per-tick control path is infallible; a
//! scheduling conflict or an unknown id degrades to a logged no-op so that a
//! single malformed command can never stop the loop.
//! All variants are `Copy` so they can be passed around without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible startup operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Subsystem / command / trigger registration failed.
    Registry(RegistryError),
    /// A composite command could not be built from its children.
    Composite(CompositeError),
    /// Configuration is invalid.  Carries the offending field.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry(e) => write!(f, "registry: {e}"),
            Self::Composite(e) => write!(f, "composite: {e}"),
            Self::Config(field) => write!(f, "config: invalid {field}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Registry errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// No free subsystem slot.
    SubsystemCapacity,
    /// No free command slot.
    CommandCapacity,
    /// No free trigger node.
    TriggerCapacity,
    /// No free binding slot.
    BindingCapacity,
    /// A subsystem id does not belong to this scheduler.
    UnknownSubsystem,
    /// A command id does not belong to this scheduler.
    UnknownCommand,
    /// A trigger id does not belong to this table.
    UnknownTrigger,
    /// A default command must require the subsystem it is the default for.
    DefaultMissingRequirement,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SubsystemCapacity => write!(f, "subsystem table full"),
            Self::CommandCapacity => write!(f, "command table full"),
            Self::TriggerCapacity => write!(f, "trigger table full"),
            Self::BindingCapacity => write!(f, "binding table full"),
            Self::UnknownSubsystem => write!(f, "unknown subsystem"),
            Self::UnknownCommand => write!(f, "unknown command"),
            Self::UnknownTrigger => write!(f, "unknown trigger"),
            Self::DefaultMissingRequirement => {
                write!(f, "default command does not require its subsystem")
            }
        }
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

// ---------------------------------------------------------------------------
// Composite errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeError {
    /// Two children of a parallel group require the same subsystem.
    OverlappingRequirements,
}

impl fmt::Display for CompositeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OverlappingRequirements => {
                write!(f, "parallel children share a required subsystem")
            }
        }
    }
}

impl From<CompositeError> for Error {
    fn from(e: CompositeError) -> Self {
        Self::Composite(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor faults (bitmask values)
// ---------------------------------------------------------------------------

/// A sensor that has gone without a fresh sample for too long.  Not an
/// error return: the safety supervisor latches these into a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SensorFault {
    GyroStale = 0b0000_0001,
    DriveEncoderStale = 0b0000_0010,
    LeftClimberStale = 0b0000_0100,
    RightClimberStale = 0b0000_1000,
    IntakeLimitStale = 0b0001_0000,
}

impl SensorFault {
    pub const ALL: [Self; 5] = [
        Self::GyroStale,
        Self::DriveEncoderStale,
        Self::LeftClimberStale,
        Self::RightClimberStale,
        Self::IntakeLimitStale,
    ];

    /// Return the bitmask for this fault.
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for SensorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GyroStale => write!(f, "gyro stale"),
            Self::DriveEncoderStale => write!(f, "drive encoders stale"),
            Self::LeftClimberStale => write!(f, "left climber encoder stale"),
            Self::RightClimberStale => write!(f, "right climber encoder stale"),
            Self::IntakeLimitStale => write!(f, "intake limit switch stale"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
