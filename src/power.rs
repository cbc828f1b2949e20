//! Power bookkeeping: wake classification, the RTC boot counter, the idle
//! countdowns and the choice of how to wait between loop iterations.
//!
//! ```text
//!   boot ──▶ BootCounter::increment ──▶ WakeReason::from_raw_cause
//!                                              │
//!   loop ──▶ PowerManager::next_action ──▶ Delay | LightSleep | DeepSleep
//! ```
//!
//! The deep-sleep entry sequence itself lives in the service, which owns
//! the ports it has to drive.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::config::DeviceSettings;
use crate::fsm::StateId;

// ---------------------------------------------------------------------------
// Wake reason
// ---------------------------------------------------------------------------

/// Why the chip came out of reset.  Set once per boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeReason {
    /// EXT0 (RTC_IO) or EXT1 (RTC_CNTL) pin wake.
    ExternalSignal,
    Timer,
    Touch,
    UlpProgram,
    /// Power-on, reset, or any cause that is not a deep-sleep wake.
    Unknown,
}

impl WakeReason {
    /// Map an `esp_sleep_source_t` value.
    ///
    /// | value | source   |
    /// |-------|----------|
    /// | 2     | EXT0     |
    /// | 3     | EXT1     |
    /// | 4     | TIMER    |
    /// | 5     | TOUCHPAD |
    /// | 6     | ULP      |
    pub const fn from_raw_cause(cause: u32) -> Self {
        match cause {
            2 | 3 => Self::ExternalSignal,
            4 => Self::Timer,
            5 => Self::Touch,
            6 => Self::UlpProgram,
            _ => Self::Unknown,
        }
    }

    /// A timer wake keeps the display dark for the whole boot.
    pub const fn suppresses_display(self) -> bool {
        matches!(self, Self::Timer)
    }
}

// ---------------------------------------------------------------------------
// Boot counter
// ---------------------------------------------------------------------------

/// Lives in RTC slow memory: survives deep sleep, cleared on power loss.
#[cfg_attr(target_os = "espidf", unsafe(link_section = ".rtc.data.boot_count"))]
static RTC_BOOT_COUNT: AtomicU32 = AtomicU32::new(0);

/// Handle on a boot counter cell.
///
/// Only plain loads and stores are used: RTC memory does not support the
/// ESP32 compare-and-swap instruction, and the counter is touched once, from
/// the boot path, before any other task exists.
pub struct BootCounter {
    cell: &'static AtomicU32,
}

impl BootCounter {
    /// The counter stored in RTC memory.
    pub fn rtc() -> Self {
        Self { cell: &RTC_BOOT_COUNT }
    }

    /// A counter backed by any static cell (tests, simulation).
    pub const fn with_cell(cell: &'static AtomicU32) -> Self {
        Self { cell }
    }

    /// Increment and return the new boot number.  Call exactly once per boot.
    pub fn increment(&self) -> u32 {
        let next = self.cell.load(Ordering::Relaxed).wrapping_add(1);
        self.cell.store(next, Ordering::Relaxed);
        next
    }

    pub fn get(&self) -> u32 {
        self.cell.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// Idle countdown
// ---------------------------------------------------------------------------

/// Seconds countdown decremented once per 1 s tick.
///
/// Expiry and reload happen in the same step, so the counter is never
/// observed at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepTimer {
    max: u32,
    remaining: u32,
}

impl SleepTimer {
    pub fn new(max_secs: u32) -> Self {
        let max = max_secs.max(1);
        Self { max, remaining: max }
    }

    /// One second elapsed.  Returns `true` when the countdown expired; the
    /// timer is already reloaded when this returns.
    pub fn tick(&mut self) -> bool {
        self.remaining -= 1;
        if self.remaining == 0 {
            self.remaining = self.max;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.remaining = self.max;
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn max(&self) -> u32 {
        self.max
    }
}

// ---------------------------------------------------------------------------
// Next sleep action
// ---------------------------------------------------------------------------

/// How the event loop should wait before the next iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepAction {
    /// Plain task delay; peripherals stay clocked.
    Delay(u32),
    /// Light sleep until the next task is due or the wake pin fires.
    LightSleep(u32),
    /// Run the deep-sleep entry sequence.
    DeepSleep,
}

/// Upper bound on a single light sleep so the loop still runs periodically.
const MAX_LIGHT_SLEEP_MS: u32 = 1000;

/// Chooses the wait between loop iterations from the lifecycle state.
pub struct PowerManager {
    poll_interval_ms: u32,
}

impl PowerManager {
    pub fn new(settings: &DeviceSettings) -> Self {
        Self {
            poll_interval_ms: settings.poll_interval_ms,
        }
    }

    /// * `until_next_due_ms`: time until the next periodic task, if any.
    /// * `input_busy`: a button gesture is mid-decode and needs fast polling.
    pub fn next_action(
        &self,
        state: StateId,
        until_next_due_ms: Option<u32>,
        input_busy: bool,
    ) -> SleepAction {
        match state {
            StateId::DeepSleepPending | StateId::DeepSleep => SleepAction::DeepSleep,
            StateId::DisplaySleeping if !input_busy => {
                let ms = until_next_due_ms
                    .unwrap_or(MAX_LIGHT_SLEEP_MS)
                    .min(MAX_LIGHT_SLEEP_MS);
                if ms == 0 {
                    SleepAction::Delay(0)
                } else {
                    SleepAction::LightSleep(ms)
                }
            }
            StateId::Booting | StateId::IdlePolling => SleepAction::Delay(0),
            StateId::Active | StateId::DisplaySleeping => SleepAction::Delay(self.poll_interval_ms),
        }
    }
}
