//! Composite commands.
//!
//! Groups own their children directly (children are never registered with
//! the scheduler) and drive the children's lifecycles from their own.  The
//! group's requirement set is the union of its children's, so the scheduler
//! arbitrates the whole composition as one unit.
//!
//! Invariant: whenever a group ends, every child that was initialized and
//! has not yet ended receives `end(true)` before the group releases its
//! subsystems.  No child is ever left half-run.

use log::debug;

use super::Command;
use crate::error::CompositeError;
use crate::subsystem::SubsystemSet;

type Child<C> = Box<dyn Command<C>>;

fn union_of<C>(children: &[Child<C>]) -> SubsystemSet {
    children
        .iter()
        .fold(SubsystemSet::EMPTY, |acc, c| acc.union(c.requirements()))
}

// ═══════════════════════════════════════════════════════════════
//  Sequential
// ═══════════════════════════════════════════════════════════════

/// Runs children one at a time in declared order.
pub struct SequentialGroup<C> {
    name: &'static str,
    children: Vec<Child<C>>,
    requirements: SubsystemSet,
    /// Index of the active child while running; `None` when idle.
    current: Option<usize>,
}

impl<C> SequentialGroup<C> {
    pub fn new(name: &'static str, children: Vec<Child<C>>) -> Self {
        let requirements = union_of(&children);
        Self {
            name,
            children,
            requirements,
            current: None,
        }
    }

    /// Index of the child currently running, if any.
    pub fn active_child(&self) -> Option<usize> {
        self.current.filter(|i| *i < self.children.len())
    }
}

impl<C> Command<C> for SequentialGroup<C> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn requirements(&self) -> SubsystemSet {
        self.requirements
    }

    fn initialize(&mut self, ctx: &mut C) {
        self.current = Some(0);
        if let Some(first) = self.children.first_mut() {
            first.initialize(ctx);
        }
    }

    fn execute(&mut self, ctx: &mut C) {
        let Some(index) = self.active_child() else {
            return;
        };

        let child = &mut self.children[index];
        child.execute(ctx);
        if !child.is_finished(ctx) {
            return;
        }
        child.end(ctx, false);
        debug!("{}: step {} ({}) done", self.name, index, child.name());

        let next = index + 1;
        self.current = Some(next);
        if let Some(child) = self.children.get_mut(next) {
            child.initialize(ctx);
        }
    }

    fn end(&mut self, ctx: &mut C, _interrupted: bool) {
        if let Some(index) = self.active_child() {
            self.children[index].end(ctx, true);
        }
        self.current = None;
    }

    fn is_finished(&mut self, _ctx: &C) -> bool {
        matches!(self.current, Some(i) if i >= self.children.len())
    }
}

// ═══════════════════════════════════════════════════════════════
//  Parallel
// ═══════════════════════════════════════════════════════════════

/// When a parallel group is considered finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParallelPolicy {
    /// Finish once every child has finished.
    All,
    /// Finish as soon as any child finishes; the rest are ended as interrupted.
    Race,
}

/// Starts all children together.
pub struct ParallelGroup<C> {
    name: &'static str,
    policy: ParallelPolicy,
    children: Vec<Child<C>>,
    /// Per-child "initialized and not yet ended" flag.
    running: Vec<bool>,
    requirements: SubsystemSet,
}

impl<C> ParallelGroup<C> {
    /// Build a group.  Children must require disjoint subsystem sets.
    pub fn new(
        name: &'static str,
        policy: ParallelPolicy,
        children: Vec<Child<C>>,
    ) -> Result<Self, CompositeError> {
        let mut requirements = SubsystemSet::EMPTY;
        for child in &children {
            let reqs = child.requirements();
            if requirements.intersects(reqs) {
                return Err(CompositeError::OverlappingRequirements);
            }
            requirements = requirements.union(reqs);
        }

        let running = vec![false; children.len()];
        Ok(Self {
            name,
            policy,
            children,
            running,
            requirements,
        })
    }

    /// Number of children still running.
    pub fn running_children(&self) -> usize {
        self.running.iter().filter(|r| **r).count()
    }

    fn end_running(&mut self, ctx: &mut C) {
        for (child, running) in self.children.iter_mut().zip(self.running.iter_mut()) {
            if *running {
                child.end(ctx, true);
                *running = false;
            }
        }
    }
}

impl<C> Command<C> for ParallelGroup<C> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn requirements(&self) -> SubsystemSet {
        self.requirements
    }

    fn initialize(&mut self, ctx: &mut C) {
        for (child, running) in self.children.iter_mut().zip(self.running.iter_mut()) {
            child.initialize(ctx);
            *running = true;
        }
    }

    fn execute(&mut self, ctx: &mut C) {
        let mut any_finished = false;
        for (child, running) in self.children.iter_mut().zip(self.running.iter_mut()) {
            if !*running {
                continue;
            }
            child.execute(ctx);
            if child.is_finished(ctx) {
                child.end(ctx, false);
                *running = false;
                any_finished = true;
            }
        }

        if any_finished && self.policy == ParallelPolicy::Race {
            debug!("{}: race decided, ending remaining children", self.name);
            self.end_running(ctx);
        }
    }

    fn end(&mut self, ctx: &mut C, _interrupted: bool) {
        self.end_running(ctx);
    }

    fn is_finished(&mut self, _ctx: &C) -> bool {
        self.running_children() == 0
    }
}
