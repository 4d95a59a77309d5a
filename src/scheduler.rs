//! Command scheduler: the single per-tick arbiter of command lifecycles
//! and subsystem ownership.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         one tick                             │
//! │                                                              │
//! │  bindings ──schedule()/cancel()──▶ interrupts + initialize   │
//! │                                            │                 │
//! │                                            ▼                 │
//! │  run():  execute() every running command (stable order)      │
//! │                                            │                 │
//! │                                            ▼                 │
//! │          is_finished()? ──yes──▶ end(false), release         │
//! │                                            │                 │
//! │                                            ▼                 │
//! │          backfill default commands on unowned subsystems     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ownership lives only in the subsystem table (`owner: Option<CommandId>`)
//! and only this module writes it, so a subsystem can never have two owners.
//! Commands never see the scheduler; they receive the shared context `C`.

use heapless::{Deque, Vec as FixedVec};
use log::{debug, error, info, warn};

use crate::command::{Command, CommandId, Lifecycle};
use crate::error::{RegistryError, Result};
use crate::subsystem::{MAX_SUBSYSTEMS, SubsystemEntry, SubsystemId, SubsystemSet};

/// Maximum number of registered commands.
pub const MAX_COMMANDS: usize = 64;

/// Lifecycle events kept for the application layer to drain each tick.
const JOURNAL_CAP: usize = 64;

// ═══════════════════════════════════════════════════════════════
//  Public types
// ═══════════════════════════════════════════════════════════════

/// Result of a [`Scheduler::schedule`] request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// The command was initialized and now owns its subsystems.
    Scheduled,
    /// The command was already running; nothing happened.
    AlreadyScheduled,
    /// A required subsystem is held by a non-interruptible command.
    Rejected { blocker: CommandId },
    /// A required subsystem is blocked (see [`Scheduler::set_blocked`]).
    Blocked,
    /// The id does not belong to this scheduler.
    Unknown,
}

/// Lifecycle notifications recorded by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerEvent {
    Initialized(CommandId),
    Ended { id: CommandId, interrupted: bool },
    Rejected { id: CommandId, blocker: CommandId },
    Blocked { id: CommandId, subsystems: SubsystemSet },
}

/// Internal bookkeeping for a registered command.
struct CommandSlot<C> {
    command: Box<dyn Command<C>>,
    /// Cached at registration; requirement sets are fixed.
    requirements: SubsystemSet,
    interruptible: bool,
    state: Lifecycle,
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// The command scheduler.
///
/// Built once at startup (subsystems, commands, defaults), then driven by a
/// single [`run`](Self::run) call per control tick.  There is no global
/// instance: the owner threads it explicitly.
pub struct Scheduler<C> {
    subsystems: FixedVec<SubsystemEntry<CommandId>, MAX_SUBSYSTEMS>,
    commands: Vec<CommandSlot<C>>,
    /// Running commands in the order they were scheduled.
    running: FixedVec<CommandId, MAX_COMMANDS>,
    journal: Deque<SchedulerEvent, JOURNAL_CAP>,
    /// Subsystems no new schedule request may claim.
    blocked: SubsystemSet,
    tick_count: u64,
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Scheduler<C> {
    pub fn new() -> Self {
        Self {
            subsystems: FixedVec::new(),
            commands: Vec::new(),
            running: FixedVec::new(),
            journal: Deque::new(),
            blocked: SubsystemSet::EMPTY,
            tick_count: 0,
        }
    }

    // ── Registration (startup only) ───────────────────────────

    /// Register a subsystem.
    pub fn add_subsystem(&mut self, name: &'static str) -> Result<SubsystemId> {
        let id = SubsystemId::new(self.subsystems.len()).ok_or(RegistryError::SubsystemCapacity)?;
        self.subsystems
            .push(SubsystemEntry::new(name))
            .map_err(|_| RegistryError::SubsystemCapacity)?;
        info!("Scheduler: subsystem '{}' registered as {}", name, id);
        Ok(id)
    }

    /// Register a command.  `interruptible = false` means that while it runs,
    /// any schedule request needing one of its subsystems is rejected.
    pub fn register(
        &mut self,
        command: impl Command<C> + 'static,
        interruptible: bool,
    ) -> Result<CommandId> {
        if self.commands.len() >= MAX_COMMANDS {
            return Err(RegistryError::CommandCapacity.into());
        }
        let requirements = command.requirements();
        if requirements.iter().any(|s| s.index() >= self.subsystems.len()) {
            return Err(RegistryError::UnknownSubsystem.into());
        }

        let id = CommandId::new(self.commands.len());
        info!(
            "Scheduler: '{}' registered as {} (requires {:?}, interruptible={})",
            command.name(),
            id,
            requirements,
            interruptible
        );
        self.commands.push(CommandSlot {
            command: Box::new(command),
            requirements,
            interruptible,
            state: Lifecycle::Idle,
        });
        Ok(id)
    }

    /// Make `command` the fallback behavior for `subsystem`.
    pub fn set_default_command(&mut self, subsystem: SubsystemId, command: CommandId) -> Result<()> {
        let requirements = self
            .commands
            .get(command.index())
            .ok_or(RegistryError::UnknownCommand)?
            .requirements;
        let entry = self
            .subsystems
            .get_mut(subsystem.index())
            .ok_or(RegistryError::UnknownSubsystem)?;
        if !requirements.contains(subsystem) {
            return Err(RegistryError::DefaultMissingRequirement.into());
        }
        entry.default_command = Some(command);
        info!(
            "Scheduler: default for '{}' is '{}'",
            entry.name,
            self.commands[command.index()].command.name()
        );
        Ok(())
    }

    // ── Scheduling ────────────────────────────────────────────

    /// Request that `id` start running.
    ///
    /// Interruptible owners of the required subsystems are ended with
    /// `interrupted = true` before `initialize` runs; a non-interruptible
    /// owner makes the request a logged no-op.
    pub fn schedule(&mut self, id: CommandId, ctx: &mut C) -> ScheduleOutcome {
        let Some(slot) = self.commands.get(id.index()) else {
            warn!("Scheduler: schedule of unknown {}", id);
            return ScheduleOutcome::Unknown;
        };
        if slot.state != Lifecycle::Idle {
            return ScheduleOutcome::AlreadyScheduled;
        }
        let requirements = slot.requirements;

        if requirements.intersects(self.blocked) {
            info!(
                "Scheduler: '{}' blocked, requires {:?} while {:?} is blocked",
                slot.command.name(),
                requirements,
                self.blocked
            );
            self.record(SchedulerEvent::Blocked {
                id,
                subsystems: requirements.intersection(self.blocked),
            });
            return ScheduleOutcome::Blocked;
        }

        for sub in requirements.iter() {
            if let Some(owner) = self.subsystems[sub.index()].owner {
                if !self.commands[owner.index()].interruptible {
                    info!(
                        "Scheduler: '{}' rejected, '{}' holds '{}' uninterruptibly",
                        self.commands[id.index()].command.name(),
                        self.commands[owner.index()].command.name(),
                        self.subsystems[sub.index()].name
                    );
                    self.record(SchedulerEvent::Rejected { id, blocker: owner });
                    return ScheduleOutcome::Rejected { blocker: owner };
                }
            }
        }

        let victims: FixedVec<CommandId, MAX_COMMANDS> = self
            .running
            .iter()
            .copied()
            .filter(|r| self.commands[r.index()].requirements.intersects(requirements))
            .collect();
        for victim in victims {
            self.end_command(victim, ctx, true);
        }

        self.start_command(id, ctx);
        ScheduleOutcome::Scheduled
    }

    /// End a running command as interrupted.  Returns `false` (no-op) if it
    /// was not running.
    pub fn cancel(&mut self, id: CommandId, ctx: &mut C) -> bool {
        if !self.is_scheduled(id) {
            return false;
        }
        self.end_command(id, ctx, true);
        true
    }

    /// Refuse new schedule requests touching `subsystems` until the mask
    /// changes.  Running commands and default backfill are unaffected.
    pub fn set_blocked(&mut self, subsystems: SubsystemSet) {
        if subsystems != self.blocked {
            debug!("Scheduler: blocked subsystems {:?} -> {:?}", self.blocked, subsystems);
            self.blocked = subsystems;
        }
    }

    pub fn blocked(&self) -> SubsystemSet {
        self.blocked
    }

    /// Cancel every running command, in scheduling order.
    pub fn cancel_all(&mut self, ctx: &mut C) {
        let active = self.running.clone();
        for id in active {
            self.end_command(id, ctx, true);
        }
    }

    /// Cancel every running command that owns one of `subsystems`.
    /// With `spare_defaults`, default commands are left running.
    /// Returns the number of commands canceled.
    pub fn cancel_owners(&mut self, subsystems: SubsystemSet, spare_defaults: bool, ctx: &mut C) -> usize {
        let victims: FixedVec<CommandId, MAX_COMMANDS> = self
            .running
            .iter()
            .copied()
            .filter(|r| self.commands[r.index()].requirements.intersects(subsystems))
            .filter(|r| !(spare_defaults && self.is_default_command(*r)))
            .collect();
        let count = victims.len();
        for victim in victims {
            self.end_command(victim, ctx, true);
        }
        count
    }

    /// Advance every running command by one tick, then backfill defaults.
    pub fn run(&mut self, ctx: &mut C) {
        self.tick_count += 1;
        let active = self.running.clone();

        for id in &active {
            if self.is_scheduled(*id) {
                self.commands[id.index()].command.execute(ctx);
            }
        }

        for id in &active {
            if self.is_scheduled(*id) && self.commands[id.index()].command.is_finished(ctx) {
                self.end_command(*id, ctx, false);
            }
        }

        self.backfill_defaults(ctx);
    }

    // ── Queries ───────────────────────────────────────────────

    /// Whether `id` is currently running.
    pub fn is_scheduled(&self, id: CommandId) -> bool {
        self.commands
            .get(id.index())
            .is_some_and(|s| s.state != Lifecycle::Idle)
    }

    pub fn lifecycle(&self, id: CommandId) -> Option<Lifecycle> {
        self.commands.get(id.index()).map(|s| s.state)
    }

    /// Current owner of a subsystem.
    pub fn owner(&self, subsystem: SubsystemId) -> Option<CommandId> {
        self.subsystems.get(subsystem.index()).and_then(|e| e.owner)
    }

    pub fn default_command(&self, subsystem: SubsystemId) -> Option<CommandId> {
        self.subsystems
            .get(subsystem.index())
            .and_then(|e| e.default_command)
    }

    /// Whether `id` is the default command of any subsystem.
    pub fn is_default_command(&self, id: CommandId) -> bool {
        self.subsystems
            .iter()
            .any(|e| e.default_command == Some(id))
    }

    pub fn requirements(&self, id: CommandId) -> SubsystemSet {
        self.commands
            .get(id.index())
            .map_or(SubsystemSet::EMPTY, |s| s.requirements)
    }

    pub fn is_interruptible(&self, id: CommandId) -> bool {
        self.commands.get(id.index()).is_some_and(|s| s.interruptible)
    }

    pub fn command_name(&self, id: CommandId) -> &'static str {
        self.commands.get(id.index()).map_or("?", |s| s.command.name())
    }

    /// Running commands in scheduling order.
    pub fn running(&self) -> &[CommandId] {
        &self.running
    }

    pub fn subsystem_count(&self) -> usize {
        self.subsystems.len()
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Drain recorded lifecycle events in FIFO order.
    pub fn drain_events(&mut self, mut handler: impl FnMut(SchedulerEvent)) {
        while let Some(event) = self.journal.pop_front() {
            handler(event);
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn start_command(&mut self, id: CommandId, ctx: &mut C) {
        if self.running.push(id).is_err() {
            // Unreachable while MAX_COMMANDS bounds registration.
            error!("Scheduler: running table full, dropping {}", id);
            return;
        }
        let requirements = self.commands[id.index()].requirements;
        for sub in requirements.iter() {
            self.subsystems[sub.index()].owner = Some(id);
        }

        let slot = &mut self.commands[id.index()];
        slot.state = Lifecycle::Initializing;
        slot.command.initialize(ctx);
        slot.state = Lifecycle::Running;
        debug!("Scheduler: '{}' initialized", slot.command.name());
        self.record(SchedulerEvent::Initialized(id));
    }

    fn end_command(&mut self, id: CommandId, ctx: &mut C, interrupted: bool) {
        let slot = &mut self.commands[id.index()];
        if slot.state != Lifecycle::Running {
            return;
        }
        slot.state = Lifecycle::Ending;
        slot.command.end(ctx, interrupted);
        slot.state = Lifecycle::Idle;
        debug!(
            "Scheduler: '{}' ended (interrupted={})",
            slot.command.name(),
            interrupted
        );

        let requirements = slot.requirements;
        for sub in requirements.iter() {
            let entry = &mut self.subsystems[sub.index()];
            if entry.owner == Some(id) {
                entry.owner = None;
            }
        }
        self.running.retain(|r| *r != id);
        self.record(SchedulerEvent::Ended { id, interrupted });
    }

    /// Schedule defaults for unowned subsystems.  A default only starts when
    /// every subsystem it requires is free, so it never preempts.
    fn backfill_defaults(&mut self, ctx: &mut C) {
        for index in 0..self.subsystems.len() {
            let entry = &self.subsystems[index];
            let (None, Some(default)) = (entry.owner, entry.default_command) else {
                continue;
            };
            if self.is_scheduled(default) {
                continue;
            }
            let requirements = self.commands[default.index()].requirements;
            if requirements
                .iter()
                .any(|s| self.subsystems[s.index()].owner.is_some())
            {
                continue;
            }
            debug!(
                "Scheduler: backfilling '{}' with default '{}'",
                self.subsystems[index].name,
                self.commands[default.index()].command.name()
            );
            self.start_command(default, ctx);
        }
    }

    fn record(&mut self, event: SchedulerEvent) {
        if self.journal.is_full() {
            let _ = self.journal.pop_front();
        }
        let _ = self.journal.push_back(event);
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
