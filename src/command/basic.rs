//! Leaf commands built from plain function pointers.
//!
//! Each effect is a `fn(&mut C)` acting on the shared context: no closures,
//! no captured state, so the commands are trivially `'static` and can be
//! declared in a table at startup.

use super::Command;
use crate::subsystem::SubsystemSet;

/// Signature of a context side effect.
pub type Effect<C> = fn(&mut C);

// ---------------------------------------------------------------------------
// Instant
// ---------------------------------------------------------------------------

/// Runs its effect in `initialize` and finishes on the same tick.
pub struct InstantCommand<C> {
    name: &'static str,
    requirements: SubsystemSet,
    effect: Effect<C>,
}

impl<C> InstantCommand<C> {
    pub fn new(name: &'static str, requirements: SubsystemSet, effect: Effect<C>) -> Self {
        Self {
            name,
            requirements,
            effect,
        }
    }
}

impl<C> Command<C> for InstantCommand<C> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn requirements(&self) -> SubsystemSet {
        self.requirements
    }

    fn initialize(&mut self, ctx: &mut C) {
        (self.effect)(ctx);
    }

    fn is_finished(&mut self, _ctx: &C) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// StartEnd
// ---------------------------------------------------------------------------

/// Runs `start` on initialize and `stop` on end; never finishes by itself.
///
/// This is what a toggle binding schedules: the start effect is the
/// "latch on" action and the end effect the "latch off" action.
pub struct StartEndCommand<C> {
    name: &'static str,
    requirements: SubsystemSet,
    start: Effect<C>,
    stop: Effect<C>,
}

impl<C> StartEndCommand<C> {
    pub fn new(
        name: &'static str,
        requirements: SubsystemSet,
        start: Effect<C>,
        stop: Effect<C>,
    ) -> Self {
        Self {
            name,
            requirements,
            start,
            stop,
        }
    }
}

impl<C> Command<C> for StartEndCommand<C> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn requirements(&self) -> SubsystemSet {
        self.requirements
    }

    fn initialize(&mut self, ctx: &mut C) {
        (self.start)(ctx);
    }

    fn end(&mut self, ctx: &mut C, _interrupted: bool) {
        (self.stop)(ctx);
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Runs `body` every tick until interrupted, then `stop`.
pub struct RunCommand<C> {
    name: &'static str,
    requirements: SubsystemSet,
    body: Effect<C>,
    stop: Effect<C>,
}

impl<C> RunCommand<C> {
    pub fn new(
        name: &'static str,
        requirements: SubsystemSet,
        body: Effect<C>,
        stop: Effect<C>,
    ) -> Self {
        Self {
            name,
            requirements,
            body,
            stop,
        }
    }
}

impl<C> Command<C> for RunCommand<C> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn requirements(&self) -> SubsystemSet {
        self.requirements
    }

    fn execute(&mut self, ctx: &mut C) {
        (self.body)(ctx);
    }

    fn end(&mut self, ctx: &mut C, _interrupted: bool) {
        (self.stop)(ctx);
    }
}
