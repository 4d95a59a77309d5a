//! Trigger combinator arena.
//!
//! Every trigger is a node in a flat table.  Leaves read the context
//! (buttons, axis thresholds, predicates) or the scheduler (`Scheduled`);
//! `Not`/`And`/`Or` nodes refer to earlier nodes by id.  Because a child is
//! always created before its parent, one pass over the table in index order
//! evaluates every node exactly once per tick with its children already
//! fresh, and the result is memoized for edge queries.
//!
//! ```text
//!  idx  condition              prev  cur
//!  ───  ─────────────────────  ────  ───
//!   0   Button(A)               0     1    rose(0)
//!   1   Scheduled(intake)       1     1
//!   2   And(1, 0)               0     1    rose(2)  ← gated trigger
//! ```

use core::fmt;

use heapless::Vec as FixedVec;

use crate::command::CommandId;
use crate::error::{RegistryError, Result};
use crate::io::{AxisId, ButtonId, OperatorInput};
use crate::scheduler::Scheduler;

/// Maximum number of trigger nodes per table.
pub const MAX_TRIGGERS: usize = 128;

/// Handle of a trigger node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TriggerId(u16);

impl TriggerId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trigger#{}", self.0)
    }
}

/// Context predicate used by leaf triggers.
pub type Predicate<C> = fn(&C) -> bool;

enum Condition<C> {
    Button(ButtonId),
    /// `axis > threshold`
    AxisAbove(AxisId, f32),
    /// `axis < threshold`
    AxisBelow(AxisId, f32),
    Predicate(Predicate<C>),
    /// True while the command is running.
    Scheduled(CommandId),
    Not(TriggerId),
    And(TriggerId, TriggerId),
    Or(TriggerId, TriggerId),
}

struct Node<C> {
    condition: Condition<C>,
    previous: bool,
    current: bool,
}

/// Arena of trigger nodes sampled once per tick.
pub struct TriggerTable<C> {
    nodes: FixedVec<Node<C>, MAX_TRIGGERS>,
    /// False until the first sample; the first sample seeds both values so a
    /// source already active at startup does not read as an edge.
    primed: bool,
}

impl<C> Default for TriggerTable<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> TriggerTable<C> {
    pub fn new() -> Self {
        Self {
            nodes: FixedVec::new(),
            primed: false,
        }
    }

    // ── Builders ──────────────────────────────────────────────

    pub fn button(&mut self, button: ButtonId) -> Result<TriggerId> {
        self.push(Condition::Button(button))
    }

    pub fn axis_above(&mut self, axis: AxisId, threshold: f32) -> Result<TriggerId> {
        self.push(Condition::AxisAbove(axis, threshold))
    }

    pub fn axis_below(&mut self, axis: AxisId, threshold: f32) -> Result<TriggerId> {
        self.push(Condition::AxisBelow(axis, threshold))
    }

    pub fn predicate(&mut self, predicate: Predicate<C>) -> Result<TriggerId> {
        self.push(Condition::Predicate(predicate))
    }

    pub fn scheduled(&mut self, command: CommandId) -> Result<TriggerId> {
        self.push(Condition::Scheduled(command))
    }

    pub fn not(&mut self, inner: TriggerId) -> Result<TriggerId> {
        self.check(inner)?;
        self.push(Condition::Not(inner))
    }

    pub fn and(&mut self, a: TriggerId, b: TriggerId) -> Result<TriggerId> {
        self.check(a)?;
        self.check(b)?;
        self.push(Condition::And(a, b))
    }

    pub fn or(&mut self, a: TriggerId, b: TriggerId) -> Result<TriggerId> {
        self.check(a)?;
        self.check(b)?;
        self.push(Condition::Or(a, b))
    }

    /// `Scheduled(parent) AND trigger`: active only while `parent` runs.
    pub fn gated(&mut self, parent: CommandId, trigger: TriggerId) -> Result<TriggerId> {
        let running = self.scheduled(parent)?;
        self.and(running, trigger)
    }

    // ── Queries ───────────────────────────────────────────────

    /// This tick's value.  Unknown ids read false.
    pub fn value(&self, id: TriggerId) -> bool {
        self.nodes.get(id.index()).is_some_and(|n| n.current)
    }

    /// Re-evaluate `id` against the scheduler as it is right now.  Input
    /// leaves reuse this tick's sample; stored values are left alone, so
    /// edge queries are unaffected.
    pub fn live_value(&self, id: TriggerId, scheduler: &Scheduler<C>) -> bool {
        let Some(node) = self.nodes.get(id.index()) else {
            return false;
        };
        match &node.condition {
            Condition::Scheduled(command) => scheduler.is_scheduled(*command),
            Condition::Not(inner) => !self.live_value(*inner, scheduler),
            Condition::And(a, b) => self.live_value(*a, scheduler) && self.live_value(*b, scheduler),
            Condition::Or(a, b) => self.live_value(*a, scheduler) || self.live_value(*b, scheduler),
            Condition::Button(_) | Condition::AxisAbove(..) | Condition::AxisBelow(..) | Condition::Predicate(_) => {
                node.current
            }
        }
    }

    /// `previous == false && current == true`
    pub fn rose(&self, id: TriggerId) -> bool {
        self.nodes
            .get(id.index())
            .is_some_and(|n| n.current && !n.previous)
    }

    /// `previous == true && current == false`
    pub fn fell(&self, id: TriggerId) -> bool {
        self.nodes
            .get(id.index())
            .is_some_and(|n| !n.current && n.previous)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Forget history; the next sample seeds values without edges.
    pub fn reset(&mut self) {
        self.primed = false;
        for node in &mut self.nodes {
            node.previous = false;
            node.current = false;
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn push(&mut self, condition: Condition<C>) -> Result<TriggerId> {
        let id = TriggerId(self.nodes.len() as u16);
        self.nodes
            .push(Node {
                condition,
                previous: false,
                current: false,
            })
            .map_err(|_| RegistryError::TriggerCapacity)?;
        Ok(id)
    }

    fn check(&self, id: TriggerId) -> Result<()> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(RegistryError::UnknownTrigger.into())
        }
    }
}

impl<C: OperatorInput> TriggerTable<C> {
    /// Evaluate every node once, in index order.
    pub fn sample(&mut self, ctx: &C, scheduler: &Scheduler<C>) {
        for i in 0..self.nodes.len() {
            let value = match &self.nodes[i].condition {
                Condition::Button(b) => ctx.button(*b),
                Condition::AxisAbove(axis, threshold) => ctx.axis(*axis) > *threshold,
                Condition::AxisBelow(axis, threshold) => ctx.axis(*axis) < *threshold,
                Condition::Predicate(predicate) => predicate(ctx),
                Condition::Scheduled(command) => scheduler.is_scheduled(*command),
                Condition::Not(inner) => !self.nodes[inner.index()].current,
                Condition::And(a, b) => {
                    self.nodes[a.index()].current && self.nodes[b.index()].current
                }
                Condition::Or(a, b) => {
                    self.nodes[a.index()].current || self.nodes[b.index()].current
                }
            };

            let node = &mut self.nodes[i];
            node.previous = if self.primed { node.current } else { value };
            node.current = value;
        }
        self.primed = true;
    }
}
