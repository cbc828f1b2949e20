//! Function-pointer lifecycle state machine.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  StateTable                                                  │
//! │  ┌──────────────────┬──────────┬─────────┬─────────────────┐ │
//! │  │ StateId          │ on_enter │ on_exit │ on_update       │ │
//! │  ├──────────────────┼──────────┼─────────┼─────────────────┤ │
//! │  │ Booting          │ fn(ctx)  │    -    │ fn(ctx)->Option │ │
//! │  │ Active           │ fn(ctx)  │    -    │ fn(ctx)->Option │ │
//! │  │ DisplaySleeping  │ fn(ctx)  │    -    │ fn(ctx)->Option │ │
//! │  │ IdlePolling      │ fn(ctx)  │    -    │ fn(ctx)->Option │ │
//! │  │ DeepSleepPending │ fn(ctx)  │    -    │ fn(ctx)->Option │ │
//! │  │ DeepSleep        │    -     │    -    │ fn(ctx)->Option │ │
//! │  └──────────────────┴──────────┴─────────┴─────────────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each tick the engine calls `on_update` for the current state with the
//! inputs the service collected, runs `on_exit`/`on_enter` on a transition,
//! and then clears the inputs.  Handlers only talk to the outside world
//! through [`LifecycleContext::commands`].

pub mod context;
pub mod states;

use context::{LifecycleContext, LifecycleInputs};
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Booting = 0,
    Active = 1,
    DisplaySleeping = 2,
    IdlePolling = 3,
    DeepSleepPending = 4,
    DeepSleep = 5,
}

impl StateId {
    pub const COUNT: usize = 6;

    /// Convert an index back to `StateId`.  Out-of-range indices assert in
    /// debug builds and fall back to `DeepSleepPending` in release.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Booting,
            1 => Self::Active,
            2 => Self::DisplaySleeping,
            3 => Self::IdlePolling,
            4 => Self::DeepSleepPending,
            5 => Self::DeepSleep,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::DeepSleepPending
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

pub type StateActionFn = fn(&mut LifecycleContext);

/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut LifecycleContext) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    table: [StateDescriptor; StateId::COUNT],
    current: usize,
    tick_count: u64,
    state_entry_tick: u64,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
            state_entry_tick: 0,
        }
    }

    /// Lifecycle machine starting in `Booting`.
    pub fn lifecycle() -> Self {
        Self::new(states::build_state_table(), StateId::Booting)
    }

    /// Run the initial `on_enter`.  Call once before the first `tick()`.
    pub fn start(&mut self, ctx: &mut LifecycleContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance by one tick.
    ///
    /// 1. Call `on_update` for the current state.
    /// 2. On `Some(next)`: `on_exit(current)` → update pointer → `on_enter(next)`.
    /// 3. Clear the inputs consumed by this tick.
    pub fn tick(&mut self, ctx: &mut LifecycleContext) -> Option<(StateId, StateId)> {
        self.tick_count += 1;
        ctx.ticks_in_state = self.tick_count - self.state_entry_tick;
        ctx.total_ticks = self.tick_count;

        let from = self.current_state();
        let next = (self.table[self.current].on_update)(ctx);
        ctx.inputs = LifecycleInputs::default();

        match next {
            Some(next_id) if next_id != from => {
                self.transition(next_id, ctx);
                Some((from, next_id))
            }
            _ => None,
        }
    }

    /// Force an immediate transition, bypassing `on_update`.
    pub fn force_transition(&mut self, next: StateId, ctx: &mut LifecycleContext) {
        if next as usize != self.current {
            self.transition(next, ctx);
        }
    }

    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    pub fn ticks_in_current_state(&self) -> u64 {
        self.tick_count - self.state_entry_tick
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut LifecycleContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.state_entry_tick = self.tick_count;
        ctx.ticks_in_state = 0;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
