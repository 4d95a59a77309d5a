//! The command contract.
//!
//! A command is a unit of behavior with a bounded lifecycle and a declared
//! set of required subsystems.  While it is running it exclusively owns
//! those subsystems; the [`Scheduler`](crate::scheduler::Scheduler) is the
//! only thing that starts, advances, and ends it.
//!
//! ```text
//!            schedule()                 run(): execute()
//!   Idle ──────────────▶ Initializing ──▶ Running ◀───────┐
//!    ▲                                      │  └──────────┘
//!    │          end(interrupted)            │ is_finished() / cancel() / preempted
//!    └──────────────── Ending ◀─────────────┘
//! ```
//!
//! Every lifecycle method receives the shared context `C` (the per-tick
//! blackboard holding input and sensor snapshots and actuator outputs), so
//! commands never hold references into hardware or into the scheduler.

pub mod basic;
pub mod group;

use core::fmt;

use crate::subsystem::SubsystemSet;

pub use basic::{InstantCommand, RunCommand, StartEndCommand};
pub use group::{ParallelGroup, ParallelPolicy, SequentialGroup};

/// Lifecycle of a registered command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Idle,
    Initializing,
    Running,
    Ending,
}

/// Handle of a command registered with a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(u16);

impl CommandId {
    pub(crate) const fn new(index: usize) -> Self {
        Self(index as u16)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "command#{}", self.0)
    }
}

/// Fixed method set every behavior implements.
///
/// Composite commands implement the same trait by driving their children's
/// lifecycles, so the scheduler treats them as a single command.
pub trait Command<C> {
    /// Short name used in logs and events.
    fn name(&self) -> &'static str;

    /// Subsystems this command must own while running.  Must not change
    /// after registration.
    fn requirements(&self) -> SubsystemSet;

    /// Called exactly once per scheduling episode, before the first `execute`.
    fn initialize(&mut self, _ctx: &mut C) {}

    /// Called once per tick while running.
    fn execute(&mut self, _ctx: &mut C) {}

    /// Called exactly once per episode.  `interrupted` is true when the
    /// episode was ended by cancellation or preemption.
    fn end(&mut self, _ctx: &mut C, _interrupted: bool) {}

    /// Polled once per tick after `execute`.
    fn is_finished(&mut self, _ctx: &C) -> bool {
        false
    }
}
