//! Subsystem identities and requirement sets.
//!
//! A subsystem is an exclusively-ownable actuator group (drive base, intake
//! arm, one climber winch, ...).  Subsystems live in an arena inside the
//! [`Scheduler`](crate::scheduler::Scheduler) and are referred to by
//! [`SubsystemId`].  Requirement sets are plain bitmasks so composite
//! commands can union their children's requirements without allocating.

use core::fmt;

/// Maximum number of subsystems a scheduler can hold (one bit each).
pub const MAX_SUBSYSTEMS: usize = 32;

/// Index of a registered subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubsystemId(u8);

impl SubsystemId {
    /// Build an id from a raw index.  Returns `None` past [`MAX_SUBSYSTEMS`].
    pub const fn new(index: usize) -> Option<Self> {
        if index < MAX_SUBSYSTEMS {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    const fn mask(self) -> u32 {
        1 << self.0
    }
}

impl fmt::Display for SubsystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subsystem#{}", self.0)
    }
}

/// A set of subsystems, stored as a bitmask.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct SubsystemSet(u32);

impl SubsystemSet {
    /// The empty set (a "global" command that owns nothing).
    pub const EMPTY: Self = Self(0);

    pub const fn of(id: SubsystemId) -> Self {
        Self(id.mask())
    }

    pub fn from_ids(ids: &[SubsystemId]) -> Self {
        ids.iter().fold(Self::EMPTY, |set, id| set.with(*id))
    }

    #[must_use]
    pub const fn with(self, id: SubsystemId) -> Self {
        Self(self.0 | id.mask())
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    pub const fn contains(self, id: SubsystemId) -> bool {
        self.0 & id.mask() != 0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Iterate the member ids in ascending index order.
    pub fn iter(self) -> impl Iterator<Item = SubsystemId> {
        (0..MAX_SUBSYSTEMS)
            .filter(move |i| self.0 & (1 << i) != 0)
            .map(|i| SubsystemId(i as u8))
    }
}

impl fmt::Debug for SubsystemSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(SubsystemId::index)).finish()
    }
}

impl From<SubsystemId> for SubsystemSet {
    fn from(id: SubsystemId) -> Self {
        Self::of(id)
    }
}

/// Registry row for one subsystem.  Only the scheduler mutates `owner`.
#[derive(Debug, Clone)]
pub(crate) struct SubsystemEntry<Id> {
    pub name: &'static str,
    pub default_command: Option<Id>,
    pub owner: Option<Id>,
}

impl<Id> SubsystemEntry<Id> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            default_command: None,
            owner: None,
        }
    }
}
