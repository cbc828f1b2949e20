//! Shared mutable context threaded through every lifecycle handler.
//!
//! `LifecycleContext` is the single struct that state handlers read from
//! and write to: the boot facts, the two idle countdowns, the inputs the
//! service collected since the last tick, and the commands the handlers
//! leave for the service to carry out.

use crate::config::{DeviceSettings, RunMode};
use crate::power::{SleepTimer, WakeReason};

// ---------------------------------------------------------------------------
// Inputs (written by the service before each tick; cleared by the engine)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleInputs {
    /// The 1 s timer task fired since the last tick.
    pub second_elapsed: bool,
    /// A user-visible input event happened (timers already reset).
    pub user_activity: bool,
    /// The "sleep now" command was issued.
    pub sleep_requested: bool,
    /// The headless sampling pass finished.
    pub oneshot_done: bool,
}

// ---------------------------------------------------------------------------
// Commands (written by handlers; consumed by the service)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayCommand {
    #[default]
    Unchanged,
    On,
    Off,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleCommands {
    pub display: DisplayCommand,
    /// Run the one-shot sampling pass.
    pub sample_once: bool,
}

impl LifecycleCommands {
    /// Take the pending display command, leaving `Unchanged`.
    pub fn take_display(&mut self) -> DisplayCommand {
        core::mem::take(&mut self.display)
    }

    pub fn take_sample_once(&mut self) -> bool {
        core::mem::take(&mut self.sample_once)
    }
}

// ---------------------------------------------------------------------------
// LifecycleContext
// ---------------------------------------------------------------------------

pub struct LifecycleContext {
    // -- Timing --
    /// Ticks elapsed since the current state was entered.
    pub ticks_in_state: u64,
    /// Monotonic total tick count.
    pub total_ticks: u64,

    // -- Boot facts (read-only after construction) --
    pub settings: DeviceSettings,
    pub wake_reason: WakeReason,
    pub boot_count: u32,

    // -- Countdowns (this context is their only owner) --
    pub display_timer: SleepTimer,
    pub deep_sleep_timer: SleepTimer,

    /// Set on a timer wake; the display stays dark until the next boot.
    pub display_suppressed: bool,

    pub inputs: LifecycleInputs,
    pub commands: LifecycleCommands,
}

impl LifecycleContext {
    pub fn new(settings: DeviceSettings, wake_reason: WakeReason, boot_count: u32) -> Self {
        Self {
            ticks_in_state: 0,
            total_ticks: 0,
            settings,
            wake_reason,
            boot_count,
            display_timer: SleepTimer::new(settings.display_sleep_timeout_secs),
            deep_sleep_timer: SleepTimer::new(settings.deep_sleep_timeout_secs),
            display_suppressed: false,
            inputs: LifecycleInputs::default(),
            commands: LifecycleCommands::default(),
        }
    }

    pub fn is_headless(&self) -> bool {
        self.settings.run_mode == RunMode::Headless
    }

    /// Record a user-visible input event.  Both countdowns are back at
    /// their maximum when this returns, before the event is handled.
    pub fn note_activity(&mut self) {
        self.reset_timers();
        self.inputs.user_activity = true;
    }

    pub fn reset_timers(&mut self) {
        self.display_timer.reset();
        self.deep_sleep_timer.reset();
    }
}
