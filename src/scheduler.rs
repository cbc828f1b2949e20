//! Cooperative periodic task scheduler.
//!
//! Every periodic job of the node (sampling, display refresh, the 1 s idle
//! countdown, the clock) is one fixed-period entry here.  The main loop
//! advances the scheduler by the elapsed wall time and the scheduler
//! notifies a [`SchedulerDelegate`] for every entry that came due.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Task Entries                           │
//! │                                                              │
//! │  ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌──────────┐   │
//! │  │WaterLevel │  │ Battery   │  │ Display   │  │  Sleep   │   │
//! │  │  10 s     │  │  10 s     │  │ 500 ms    │  │ Timers 1s│   │
//! │  └─────┬─────┘  └─────┬─────┘  └─────┬─────┘  └─────┬────┘   │
//! │        │              │              │              │        │
//! │        ▼              ▼              ▼              ▼        │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │              SchedulerDelegate::on_task_due            │  │
//! │  └───────────────────────┬────────────────────────────────┘  │
//! │                          ▼                                   │
//! │                   DeviceService::poll()                      │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tasks are registered once at boot.  Suspending a task freezes its
//! elapsed time; resuming continues from where it stopped.  Headless
//! builds register nothing.

use crate::app::ports::SchedulerDelegate;
use log::{info, warn};

// ═══════════════════════════════════════════════════════════════
//  Task identity
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskId {
    WaterLevel,
    Battery,
    DisplayRefresh,
    /// One-second idle countdown tick.  Backlog is dropped, so a long
    /// blocking pass counts as a single second.
    SleepTimers,
    Clock,
}

impl TaskId {
    pub const fn label(self) -> &'static str {
        match self {
            Self::WaterLevel => "water-level",
            Self::Battery => "battery",
            Self::DisplayRefresh => "display-refresh",
            Self::SleepTimers => "sleep-timers",
            Self::Clock => "clock",
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// One slot per task kind.
pub const MAX_TASKS: usize = 5;

#[derive(Debug, Clone, Copy)]
struct TaskEntry {
    id: TaskId,
    period_ms: u32,
    elapsed_ms: u32,
    suspended: bool,
}

impl TaskEntry {
    fn remaining_ms(&self) -> u32 {
        self.period_ms.saturating_sub(self.elapsed_ms)
    }
}

pub struct Scheduler {
    tasks: [Option<TaskEntry>; MAX_TASKS],
}

impl Scheduler {
    pub const fn new() -> Self {
        Self {
            tasks: [None; MAX_TASKS],
        }
    }

    /// Register a periodic task.  Returns the slot, or `None` if the task
    /// is already registered or the table is full.
    pub fn add(&mut self, id: TaskId, period_ms: u32) -> Option<usize> {
        if self.find(id).is_some() {
            warn!("Scheduler: '{}' already registered", id.label());
            return None;
        }
        let slot = self.tasks.iter().position(Option::is_none)?;
        info!("Scheduler: '{}' every {} ms (slot {})", id.label(), period_ms, slot);
        self.tasks[slot] = Some(TaskEntry {
            id,
            period_ms: period_ms.max(1),
            elapsed_ms: 0,
            suspended: false,
        });
        Some(slot)
    }

    pub fn remove(&mut self, id: TaskId) {
        if let Some(slot) = self.find(id) {
            info!("Scheduler: removed '{}'", id.label());
            self.tasks[slot] = None;
        }
    }

    /// Stop a task from firing.  Its elapsed time is kept.
    pub fn suspend(&mut self, id: TaskId) {
        if let Some(entry) = self.entry_mut(id) {
            if !entry.suspended {
                entry.suspended = true;
                info!("Scheduler: suspended '{}'", id.label());
            }
        }
    }

    pub fn resume(&mut self, id: TaskId) {
        if let Some(entry) = self.entry_mut(id) {
            if entry.suspended {
                entry.suspended = false;
                info!("Scheduler: resumed '{}'", id.label());
            }
        }
    }

    pub fn is_suspended(&self, id: TaskId) -> bool {
        self.find(id)
            .and_then(|slot| self.tasks[slot])
            .is_some_and(|e| e.suspended)
    }

    /// Advance every running task by `elapsed_ms` and report the due ones
    /// in slot order.
    ///
    /// A task fires at most once per call; if the loop stalled for several
    /// periods the backlog is dropped, not replayed.
    pub fn tick(&mut self, elapsed_ms: u32, delegate: &mut dyn SchedulerDelegate) {
        for entry in self.tasks.iter_mut().flatten() {
            if entry.suspended {
                continue;
            }
            entry.elapsed_ms = entry.elapsed_ms.saturating_add(elapsed_ms);
            if entry.elapsed_ms >= entry.period_ms {
                entry.elapsed_ms %= entry.period_ms;
                delegate.on_task_due(entry.id);
            }
        }
    }

    /// Time until the next running task is due, or `None` when nothing
    /// is scheduled.
    pub fn ms_until_next_due(&self) -> Option<u32> {
        self.tasks
            .iter()
            .flatten()
            .filter(|e| !e.suspended)
            .map(TaskEntry::remaining_ms)
            .min()
    }

    /// Number of registered, non-suspended tasks.
    pub fn active_count(&self) -> usize {
        self.tasks.iter().flatten().filter(|e| !e.suspended).count()
    }

    /// Number of registered tasks, suspended or not.
    pub fn registered_count(&self) -> usize {
        self.tasks.iter().flatten().count()
    }

    fn find(&self, id: TaskId) -> Option<usize> {
        self.tasks
            .iter()
            .position(|slot| slot.is_some_and(|e| e.id == id))
    }

    fn entry_mut(&mut self, id: TaskId) -> Option<&mut TaskEntry> {
        self.tasks.iter_mut().flatten().find(|e| e.id == id)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
