//! Trigger → scheduler bindings.
//!
//! A [`BindingTable`] owns the [`TriggerTable`] and a list of bindings.
//! Each tick [`poll`](BindingTable::poll) samples every trigger once, then
//! walks command bindings in registration order issuing `schedule`/`cancel`
//! requests, then settles held `WhileTrue` bindings whose gate was closed by
//! that walk, then refreshes indicator bindings.  Bindings never hold
//! subsystems; they only ask the scheduler.
//!
//! | Mode           | Action                                                   |
//! |----------------|----------------------------------------------------------|
//! | `OnRisingEdge` | schedule once per `false → true`                         |
//! | `OnFallingEdge`| schedule once per `true → false`                         |
//! | `WhileTrue`    | schedule every tick the trigger holds, cancel on falling |
//! | `Toggle`       | each rising edge flips the latch: on = schedule, off = cancel |

use core::fmt;

use heapless::Vec as FixedVec;
use log::{debug, info, warn};

use crate::command::CommandId;
use crate::error::{RegistryError, Result};
use crate::io::{IndicatorId, IndicatorOutput, OperatorInput};
use crate::scheduler::{ScheduleOutcome, Scheduler};
use crate::trigger::{Predicate, TriggerId, TriggerTable};

/// Maximum command bindings per table.
pub const MAX_BINDINGS: usize = 64;
/// Maximum indicator bindings per table.
pub const MAX_INDICATOR_BINDINGS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindMode {
    OnRisingEdge,
    OnFallingEdge,
    WhileTrue,
    Toggle,
}

/// Handle of a command binding (used to follow a toggle latch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(u16);

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "binding#{}", self.0)
    }
}

/// What an indicator follows.
pub enum IndicatorSource<C> {
    /// The trigger's level ("lit while pressed").
    Trigger(TriggerId),
    /// A toggle binding's latch.
    Latch(BindingId),
    /// An arbitrary context predicate.
    Predicate(Predicate<C>),
}

struct CommandBinding {
    trigger: TriggerId,
    command: CommandId,
    mode: BindMode,
    /// Toggle state; mirrors whether the command is running.
    latch: bool,
}

struct IndicatorBinding<C> {
    indicator: IndicatorId,
    source: IndicatorSource<C>,
}

/// Triggers plus the bindings that act on them.
pub struct BindingTable<C> {
    triggers: TriggerTable<C>,
    bindings: FixedVec<CommandBinding, MAX_BINDINGS>,
    indicators: FixedVec<IndicatorBinding<C>, MAX_INDICATOR_BINDINGS>,
}

impl<C> Default for BindingTable<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> BindingTable<C> {
    pub fn new() -> Self {
        Self {
            triggers: TriggerTable::new(),
            bindings: FixedVec::new(),
            indicators: FixedVec::new(),
        }
    }

    /// Trigger arena, for building conditions.
    pub fn triggers_mut(&mut self) -> &mut TriggerTable<C> {
        &mut self.triggers
    }

    pub fn triggers(&self) -> &TriggerTable<C> {
        &self.triggers
    }

    // ── Registration ──────────────────────────────────────────

    pub fn bind(&mut self, trigger: TriggerId, command: CommandId, mode: BindMode) -> Result<BindingId> {
        if trigger.index() >= self.triggers.len() {
            return Err(RegistryError::UnknownTrigger.into());
        }
        let id = BindingId(self.bindings.len() as u16);
        self.bindings
            .push(CommandBinding {
                trigger,
                command,
                mode,
                latch: false,
            })
            .map_err(|_| RegistryError::BindingCapacity)?;
        debug!("Bindings: {} -> {} as {:?} ({})", trigger, command, mode, id);
        Ok(id)
    }

    pub fn on_rising(&mut self, trigger: TriggerId, command: CommandId) -> Result<BindingId> {
        self.bind(trigger, command, BindMode::OnRisingEdge)
    }

    pub fn on_falling(&mut self, trigger: TriggerId, command: CommandId) -> Result<BindingId> {
        self.bind(trigger, command, BindMode::OnFallingEdge)
    }

    pub fn while_true(&mut self, trigger: TriggerId, command: CommandId) -> Result<BindingId> {
        self.bind(trigger, command, BindMode::WhileTrue)
    }

    pub fn toggle(&mut self, trigger: TriggerId, command: CommandId) -> Result<BindingId> {
        self.bind(trigger, command, BindMode::Toggle)
    }

    /// Drive `indicator` from `source` every tick.  Several bindings may
    /// target one indicator; they run in registration order and the last
    /// one written wins.
    pub fn bind_indicator(&mut self, indicator: IndicatorId, source: IndicatorSource<C>) -> Result<()> {
        match &source {
            IndicatorSource::Trigger(t) if t.index() >= self.triggers.len() => {
                return Err(RegistryError::UnknownTrigger.into());
            }
            IndicatorSource::Latch(b) if b.0 as usize >= self.bindings.len() => {
                return Err(RegistryError::UnknownCommand.into());
            }
            _ => {}
        }
        if self.indicators.iter().any(|i| i.indicator == indicator) {
            warn!(
                "Bindings: indicator {:?} has several sources, last registered wins",
                indicator
            );
        }
        self.indicators
            .push(IndicatorBinding { indicator, source })
            .map_err(|_| RegistryError::BindingCapacity)?;
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current latch of a toggle binding (false for other modes).
    pub fn latch(&self, id: BindingId) -> bool {
        self.bindings.get(id.0 as usize).is_some_and(|b| b.latch)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Forget trigger history (mode entry); latches are kept and resynced.
    pub fn reset_edges(&mut self) {
        self.triggers.reset();
    }
}

impl<C: OperatorInput + IndicatorOutput> BindingTable<C> {
    /// One tick of the binding layer: sample, act, light indicators.
    pub fn poll(&mut self, scheduler: &mut Scheduler<C>, ctx: &mut C) {
        self.triggers.sample(ctx, scheduler);
        let mut held: FixedVec<usize, MAX_BINDINGS> = FixedVec::new();

        for (index, binding) in self.bindings.iter_mut().enumerate() {
            let t = binding.trigger;
            let cmd = binding.command;
            match binding.mode {
                BindMode::OnRisingEdge => {
                    if self.triggers.rose(t) {
                        scheduler.schedule(cmd, ctx);
                    }
                }
                BindMode::OnFallingEdge => {
                    if self.triggers.fell(t) {
                        scheduler.schedule(cmd, ctx);
                    }
                }
                BindMode::WhileTrue => {
                    if self.triggers.value(t) {
                        scheduler.schedule(cmd, ctx);
                        // Same capacity as the binding table.
                        let _ = held.push(index);
                    } else if self.triggers.fell(t) {
                        scheduler.cancel(cmd, ctx);
                    }
                }
                BindMode::Toggle => {
                    if self.triggers.rose(t) {
                        let on = !scheduler.is_scheduled(cmd);
                        if on {
                            if let ScheduleOutcome::Rejected { blocker } = scheduler.schedule(cmd, ctx) {
                                info!(
                                    "Bindings: toggle of '{}' blocked by '{}'",
                                    scheduler.command_name(cmd),
                                    scheduler.command_name(blocker)
                                );
                            }
                        } else {
                            scheduler.cancel(cmd, ctx);
                        }
                    }
                    binding.latch = scheduler.is_scheduled(cmd);
                }
            }
        }

        // A parent canceled above closes its gated triggers this tick, not
        // at the next sample.
        for index in held {
            let binding = &self.bindings[index];
            if scheduler.is_scheduled(binding.command) && !self.triggers.live_value(binding.trigger, scheduler) {
                debug!(
                    "Bindings: gate of '{}' closed this tick",
                    scheduler.command_name(binding.command)
                );
                scheduler.cancel(binding.command, ctx);
            }
        }

        for ind in &self.indicators {
            let on = match &ind.source {
                IndicatorSource::Trigger(t) => self.triggers.value(*t),
                IndicatorSource::Latch(b) => self.bindings.get(b.0 as usize).is_some_and(|b| b.latch),
                IndicatorSource::Predicate(p) => p(ctx),
            };
            ctx.set_indicator(ind.indicator, on);
        }
    }
}
