//! Function-pointer finite state machine engine.
//!
//! Classic embedded FSM pattern, generic over the state enum `S` and the
//! context `X` the handlers operate on:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  StateTable                                              │
//! │  ┌───────────┬───────────┬──────────┬─────────────────┐  │
//! │  │ state     │ on_enter  │ on_exit  │ on_update       │  │
//! │  ├───────────┼───────────┼──────────┼─────────────────┤  │
//! │  │ Idle      │ fn(x)     │ fn(x)    │ fn(x)->Option<S>│  │
//! │  │ Raising   │ fn(x)     │ fn(x)    │ fn(x)->Option<S>│  │
//! │  │ ...       │           │          │                 │  │
//! │  └───────────┴───────────┴──────────┴─────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the **current** state.
//! If it returns `Some(next)`, the engine runs `on_exit` for the current
//! state, then `on_enter` for the next, and updates the current pointer.

use core::fmt::Debug;

use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// A closed set of states that index a table of `COUNT` rows.
pub trait StateSet: Copy + Eq + Debug {
    const COUNT: usize;

    /// Row of this state in the table.  Must be `< COUNT` and unique.
    fn index(self) -> usize;
}

/// A context that wants to know how long the machine has been in its
/// current state (for elapsed-time guards).
pub trait StateClock {
    fn set_ticks_in_state(&mut self, ticks: u64);
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
pub type StateActionFn<X> = fn(&mut X);

/// Signature for the per-tick update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn<S, X> = fn(&mut X) -> Option<S>;

/// Static descriptor for a single FSM state.
pub struct StateDescriptor<S, X> {
    pub id: S,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn<X>>,
    pub on_exit: Option<StateActionFn<X>>,
    pub on_update: StateUpdateFn<S, X>,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
pub struct Fsm<S, X, const N: usize> {
    /// Used in transition logs.
    label: &'static str,
    /// Fixed-size table indexed by `S::index()`.
    table: [StateDescriptor<S, X>; N],
    current: S,
    tick_count: u64,
    state_entry_tick: u64,
}

impl<S: StateSet, X: StateClock, const N: usize> Fsm<S, X, N> {
    /// Construct a new FSM with the given state table, starting in `initial`.
    ///
    /// Rows must be ordered by `S::index()`; this is checked in debug builds.
    pub fn new(label: &'static str, table: [StateDescriptor<S, X>; N], initial: S) -> Self {
        debug_assert_eq!(N, S::COUNT, "{label}: table size");
        debug_assert!(
            table.iter().enumerate().all(|(i, row)| row.id.index() == i),
            "{label}: table rows out of order"
        );
        Self {
            label,
            table,
            current: initial,
            tick_count: 0,
            state_entry_tick: 0,
        }
    }

    /// Enter `initial` from scratch: counters reset, `on_enter` runs.
    /// No `on_exit` runs for whatever state the machine was in before.
    pub fn start(&mut self, initial: S, ctx: &mut X) {
        self.current = initial;
        self.tick_count = 0;
        self.state_entry_tick = 0;
        ctx.set_ticks_in_state(0);
        info!("{}: starting in {}", self.label, self.row().name);
        if let Some(enter) = self.row().on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one tick.
    ///
    /// 1. Increment tick counter and publish ticks-in-state.
    /// 2. Call `on_update` for the current state.
    /// 3. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → update pointer → `on_enter(next)`.
    pub fn tick(&mut self, ctx: &mut X) {
        self.tick_count += 1;
        ctx.set_ticks_in_state(self.tick_count - self.state_entry_tick);

        if let Some(next) = (self.row().on_update)(ctx) {
            if next != self.current {
                self.transition(next, ctx);
            }
        }
    }

    pub fn current_state(&self) -> S {
        self.current
    }

    pub fn state_name(&self) -> &'static str {
        self.row().name
    }

    /// How many ticks the FSM has been in the current state.
    pub fn ticks_in_current_state(&self) -> u64 {
        self.tick_count - self.state_entry_tick
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn row(&self) -> &StateDescriptor<S, X> {
        &self.table[self.current.index()]
    }

    fn transition(&mut self, next: S, ctx: &mut X) {
        info!(
            "{}: {} -> {}",
            self.label,
            self.row().name,
            self.table[next.index()].name
        );

        if let Some(exit) = self.row().on_exit {
            exit(ctx);
        }

        self.current = next;
        self.state_entry_tick = self.tick_count;
        ctx.set_ticks_in_state(0);

        if let Some(enter) = self.row().on_enter {
            enter(ctx);
        }
    }
}
