//! Concrete lifecycle handlers and table builder.
//!
//! ```text
//!  BOOTING ──[interactive]──▶ ACTIVE ◀──[input, not suppressed]──┐
//!     │  │                      │  │                             │
//!     │  └─[timer wake]──┐      │  └──[display timer]──▶ DISPLAY_SLEEPING
//!     │                  └──────┼─────────────────────▶    │
//!     │                         │                          │
//!     └──[headless]──▶ IDLE_POLLING                        │
//!                          │    │                          │
//!                 [pass done]  [deep timer | sleep now]  [deep timer]
//!                          ▼    ▼                          │
//!                      DEEP_SLEEP_PENDING ◀────────────────┘
//!                               │
//!                        (forced by service)
//!                               ▼
//!                          DEEP_SLEEP
//! ```

use super::context::{DisplayCommand, LifecycleContext};
use super::{StateDescriptor, StateId};
use log::info;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        StateDescriptor {
            id: StateId::Booting,
            name: "Booting",
            on_enter: Some(booting_enter),
            on_exit: None,
            on_update: booting_update,
        },
        StateDescriptor {
            id: StateId::Active,
            name: "Active",
            on_enter: Some(active_enter),
            on_exit: None,
            on_update: active_update,
        },
        StateDescriptor {
            id: StateId::DisplaySleeping,
            name: "DisplaySleeping",
            on_enter: Some(display_sleeping_enter),
            on_exit: None,
            on_update: display_sleeping_update,
        },
        StateDescriptor {
            id: StateId::IdlePolling,
            name: "IdlePolling",
            on_enter: Some(idle_polling_enter),
            on_exit: None,
            on_update: idle_polling_update,
        },
        StateDescriptor {
            id: StateId::DeepSleepPending,
            name: "DeepSleepPending",
            on_enter: Some(deep_sleep_pending_enter),
            on_exit: None,
            on_update: terminal_update,
        },
        StateDescriptor {
            id: StateId::DeepSleep,
            name: "DeepSleep",
            on_enter: None,
            on_exit: None,
            on_update: terminal_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  BOOTING
// ═══════════════════════════════════════════════════════════════════════════

fn booting_enter(ctx: &mut LifecycleContext) {
    info!(
        "BOOT #{}: wake reason {:?}",
        ctx.boot_count, ctx.wake_reason
    );
    if ctx.wake_reason.suppresses_display() {
        ctx.display_suppressed = true;
        ctx.commands.display = DisplayCommand::Off;
        info!("BOOT: timer wake, display stays off");
    }
}

fn booting_update(ctx: &mut LifecycleContext) -> Option<StateId> {
    if ctx.is_headless() {
        Some(StateId::IdlePolling)
    } else if ctx.display_suppressed {
        Some(StateId::DisplaySleeping)
    } else {
        Some(StateId::Active)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  ACTIVE: display on, both countdowns running
// ═══════════════════════════════════════════════════════════════════════════

fn active_enter(ctx: &mut LifecycleContext) {
    ctx.commands.display = DisplayCommand::On;
}

fn active_update(ctx: &mut LifecycleContext) -> Option<StateId> {
    if ctx.inputs.sleep_requested {
        return Some(StateId::DeepSleepPending);
    }
    // Activity has just reset both countdowns; a second landing on the
    // same tick is not counted against them.
    if ctx.inputs.user_activity {
        return None;
    }
    if ctx.inputs.second_elapsed {
        if ctx.deep_sleep_timer.tick() {
            info!("ACTIVE: deep-sleep timeout");
            return Some(StateId::DeepSleepPending);
        }
        if ctx.display_timer.tick() {
            return Some(StateId::DisplaySleeping);
        }
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  DISPLAY_SLEEPING: panel dark, sampling and deep countdown continue
// ═══════════════════════════════════════════════════════════════════════════

fn display_sleeping_enter(ctx: &mut LifecycleContext) {
    ctx.commands.display = DisplayCommand::Off;
}

fn display_sleeping_update(ctx: &mut LifecycleContext) -> Option<StateId> {
    if ctx.inputs.sleep_requested {
        return Some(StateId::DeepSleepPending);
    }
    if ctx.inputs.user_activity {
        if ctx.display_suppressed {
            return None;
        }
        return Some(StateId::Active);
    }
    if ctx.inputs.second_elapsed && ctx.deep_sleep_timer.tick() {
        info!("DISPLAY_SLEEPING: deep-sleep timeout");
        return Some(StateId::DeepSleepPending);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE_POLLING: headless one-shot pass
// ═══════════════════════════════════════════════════════════════════════════

fn idle_polling_enter(ctx: &mut LifecycleContext) {
    ctx.commands.display = DisplayCommand::Off;
    ctx.commands.sample_once = true;
}

fn idle_polling_update(ctx: &mut LifecycleContext) -> Option<StateId> {
    if ctx.inputs.oneshot_done || ctx.inputs.sleep_requested {
        return Some(StateId::DeepSleepPending);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  DEEP_SLEEP_PENDING / DEEP_SLEEP
// ═══════════════════════════════════════════════════════════════════════════

/// The panel keeps its last screen until the shutdown sequence runs.
fn deep_sleep_pending_enter(ctx: &mut LifecycleContext) {
    info!(
        "DEEP_SLEEP_PENDING: wake in {} s or on button",
        ctx.settings.deep_sleep_wakeup_secs
    );
}

/// Only the service's shutdown sequence leaves these states.
fn terminal_update(_ctx: &mut LifecycleContext) -> Option<StateId> {
    None
}
