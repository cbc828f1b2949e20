//! Device service: the hexagonal core.
//!
//! [`DeviceService`] owns the lifecycle machine, the task scheduler, both
//! samplers, the UI controller and the persistent log.  Every piece of
//! hardware is reached through the port traits passed into each call, so
//! the whole service runs against mocks in host tests.
//!
//! ```text
//!  Board (sensors, buttons,  ──▶ ┌────────────────────────────┐ ──▶ EventSink
//!         display, power)        │        DeviceService       │
//!                                │ FSM · Scheduler · Samplers │
//!  Uplink (frames, scans)   ◀──  │    UI · PersistentLog      │
//!                                └────────────────────────────┘
//! ```
//!
//! One main-loop pass is [`DeviceService::poll`]; between passes the loop
//! waits as told by [`DeviceService::next_sleep_action`].

use log::{info, warn};

use crate::config::DeviceSettings;
use crate::drivers::button::{ButtonEvent, ButtonId};
use crate::error::Error;
use crate::fsm::context::{DisplayCommand, LifecycleContext};
use crate::fsm::{Fsm, StateId};
use crate::link::framer::UplinkLogSink;
use crate::link::{MessageType, Uplink, send_message};
use crate::logstore::PersistentLog;
use crate::pins;
use crate::power::{BootCounter, PowerManager, SleepAction, WakeReason};
use crate::scheduler::{MAX_TASKS, Scheduler, TaskId};
use crate::sensors::battery::BatterySampler;
use crate::sensors::water_level::WaterLevelSampler;
use crate::ui::{Menu, UiController, command_for};

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{Board, EventSink, SchedulerDelegate};

/// Period of the idle-countdown task.
const SECOND_MS: u32 = 1000;
/// Period of the wall-clock task.
const CLOCK_PERIOD_MS: u32 = 1000;

// ───────────────────────────────────────────────────────────────
// Due-task collector
// ───────────────────────────────────────────────────────────────

/// Collects due tasks so they run after the scheduler borrow ends.
#[derive(Default)]
struct DueTasks(heapless::Vec<TaskId, MAX_TASKS>);

impl SchedulerDelegate for DueTasks {
    fn on_task_due(&mut self, task: TaskId) {
        // one slot per task kind, so this never overflows
        let _ = self.0.push(task);
    }
}

// ───────────────────────────────────────────────────────────────
// DeviceService
// ───────────────────────────────────────────────────────────────

pub struct DeviceService {
    fsm: Fsm,
    ctx: LifecycleContext,
    scheduler: Scheduler,
    water: WaterLevelSampler,
    battery: BatterySampler,
    ui: UiController,
    log: PersistentLog,
    power: PowerManager,
    last_poll_ms: Option<u32>,
}

impl DeviceService {
    /// Build the service.  Nothing runs until [`boot`](Self::boot).
    pub fn new(settings: DeviceSettings, log: PersistentLog) -> Self {
        Self {
            fsm: Fsm::lifecycle(),
            ctx: LifecycleContext::new(settings, WakeReason::Unknown, 0),
            scheduler: Scheduler::new(),
            water: WaterLevelSampler::new(),
            battery: BatterySampler::new(),
            ui: UiController::new(),
            log,
            power: PowerManager::new(&settings),
            last_poll_ms: None,
        }
    }

    // ── Boot ──────────────────────────────────────────────────

    /// Count the boot, classify the wake, register the periodic tasks and
    /// leave `Booting`.
    ///
    /// Interactive builds take one reading of each sensor straight away;
    /// headless builds register nothing and do their single pass on the
    /// next [`poll`](Self::poll).
    pub fn boot(
        &mut self,
        counter: &BootCounter,
        hw: &mut impl Board,
        link: &mut impl Uplink,
        sink: &mut impl EventSink,
    ) {
        self.ctx.boot_count = counter.increment();
        self.ctx.wake_reason = hw.wake_reason();
        sink.emit(&AppEvent::Booted {
            wake: self.ctx.wake_reason,
            boot_count: self.ctx.boot_count,
        });

        self.fsm.start(&mut self.ctx);

        if !self.ctx.is_headless() {
            let s = self.ctx.settings;
            self.scheduler.add(TaskId::WaterLevel, s.water_level_interval_secs * 1000);
            self.scheduler.add(TaskId::Battery, s.battery_interval_secs * 1000);
            self.scheduler.add(TaskId::DisplayRefresh, s.display_refresh_ms);
            self.scheduler.add(TaskId::SleepTimers, SECOND_MS);
            self.scheduler.add(TaskId::Clock, CLOCK_PERIOD_MS);
        }

        self.step(hw, sink);

        if !self.ctx.is_headless() {
            self.run_task(TaskId::WaterLevel, hw, link, sink);
            self.run_task(TaskId::Battery, hw, link, sink);
        }
    }

    // ── Main-loop pass ────────────────────────────────────────

    /// One main-loop pass at monotonic time `now_ms`:
    /// buttons → due tasks → one-shot pass → lifecycle tick.
    pub fn poll(
        &mut self,
        now_ms: u32,
        hw: &mut impl Board,
        link: &mut impl Uplink,
        sink: &mut impl EventSink,
    ) {
        let elapsed = self
            .last_poll_ms
            .map_or(0, |last| now_ms.wrapping_sub(last));
        self.last_poll_ms = Some(now_ms);

        if !self.ctx.is_headless() {
            for (button, event) in self.ui.poll_buttons(&*hw, now_ms) {
                self.handle_button(button, event, hw, link, sink);
            }
        }

        let mut due = DueTasks::default();
        self.scheduler.tick(elapsed, &mut due);
        for task in due.0 {
            self.run_task(task, hw, link, sink);
        }

        if self.ctx.commands.take_sample_once() {
            self.run_oneshot(hw, link, sink);
        }

        self.step(hw, sink);
    }

    /// How the loop should wait before the next [`poll`](Self::poll).
    pub fn next_sleep_action(&self) -> SleepAction {
        self.power.next_action(
            self.fsm.current_state(),
            self.scheduler.ms_until_next_due(),
            !self.ui.is_idle(),
        )
    }

    // ── Shutdown ──────────────────────────────────────────────

    /// Orderly shutdown into deep sleep.
    ///
    /// Flush logs, darken the panel, settle, arm the button **and** the
    /// timer wake, then halt.  A wake source that fails to arm is fatal:
    /// the chip would never come back on its own.  A full log is drained
    /// to the gateway or reset, but kept untouched while the link is
    /// offline.
    pub fn enter_deep_sleep(
        &mut self,
        hw: &mut impl Board,
        link: &mut impl Uplink,
        sink: &mut impl EventSink,
    ) -> Result<(), Error> {
        let wakeup_secs = self.ctx.settings.deep_sleep_wakeup_secs;
        info!("Power: shutting down (boot #{})", self.ctx.boot_count);

        if self.log.is_full() && !link.is_online() {
            // Kept for the next boot with a working radio.
            warn!("Power: link offline, keeping full log");
        } else if self.log.is_full() {
            let drained = self.log.drain(&mut UplinkLogSink::new(link)).unwrap_or(false);
            if !drained {
                if let Err(e) = self.log.truncate() {
                    warn!("Power: log reset failed: {}", e);
                }
            }
            sink.emit(&AppEvent::LogRotated { drained });
        }
        log::logger().flush();

        hw.power_off();
        hw.light_sleep_ms(self.ctx.settings.settle_delay_ms);

        hw.arm_external_wakeup(pins::WAKE_GPIO, pins::WAKE_LEVEL)?;
        hw.arm_timer_wakeup(wakeup_secs)?;

        sink.emit(&AppEvent::EnteringDeepSleep { wakeup_secs });
        let from = self.fsm.current_state();
        self.fsm.force_transition(StateId::DeepSleep, &mut self.ctx);
        sink.emit(&AppEvent::StateChanged {
            from,
            to: StateId::DeepSleep,
        });

        hw.enter_deep_sleep();
        Ok(())
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn context(&self) -> &LifecycleContext {
        &self.ctx
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn ui(&self) -> &UiController {
        &self.ui
    }

    pub fn water(&self) -> &WaterLevelSampler {
        &self.water
    }

    pub fn battery(&self) -> &BatterySampler {
        &self.battery
    }

    pub fn log(&self) -> &PersistentLog {
        &self.log
    }

    // ── Internal ──────────────────────────────────────────────

    /// Tick the lifecycle machine and carry out what it asked for.
    fn step(&mut self, hw: &mut impl Board, sink: &mut impl EventSink) {
        if let Some((from, to)) = self.fsm.tick(&mut self.ctx) {
            sink.emit(&AppEvent::StateChanged { from, to });
        }

        match self.ctx.commands.take_display() {
            DisplayCommand::On if !self.ctx.display_suppressed => {
                hw.power_on();
                self.ui.invalidate();
                self.scheduler.resume(TaskId::DisplayRefresh);
                self.scheduler.resume(TaskId::Clock);
            }
            DisplayCommand::On | DisplayCommand::Off => {
                hw.power_off();
                self.scheduler.suspend(TaskId::DisplayRefresh);
                self.scheduler.suspend(TaskId::Clock);
            }
            DisplayCommand::Unchanged => {}
        }
    }

    fn handle_button(
        &mut self,
        button: ButtonId,
        event: ButtonEvent,
        hw: &mut impl Board,
        link: &mut impl Uplink,
        sink: &mut impl EventSink,
    ) {
        info!("UI: {:?} {:?}", button, event);
        self.ctx.note_activity();

        // Outside Active the press only wakes the display.
        if self.fsm.current_state() == StateId::Active {
            let cmd = command_for(button, event);
            sink.emit(&AppEvent::Command(cmd));
            self.execute(cmd, hw, link, sink);
        }
    }

    fn execute(
        &mut self,
        cmd: AppCommand,
        hw: &mut impl Board,
        link: &mut impl Uplink,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::ShowMenu(menu) => self.ui.show(menu),
            AppCommand::WifiScan => {
                let networks = link.scan_networks();
                info!("UI: scan found {} networks", networks.len());
                self.ui.set_networks(networks);
                self.ui.show(Menu::WifiScan);
            }
            AppCommand::TruncateLog => {
                if let Err(e) = self.log.truncate() {
                    warn!("Log: truncate failed: {}", e);
                }
            }
            AppCommand::PublishLog => match self.log.read_tail_json() {
                Ok(json) => self.publish(MessageType::Log, json.as_bytes(), link, sink),
                Err(e) => warn!("Log: tail read failed: {}", e),
            },
            AppCommand::SleepNow => {
                self.ui.show(Menu::DeepSleep);
                self.ui
                    .render_tick(hw, self.water.value_mut(), self.battery.value_mut());
                self.ctx.inputs.sleep_requested = true;
            }
        }
    }

    fn run_task(
        &mut self,
        task: TaskId,
        hw: &mut impl Board,
        link: &mut impl Uplink,
        sink: &mut impl EventSink,
    ) {
        match task {
            TaskId::WaterLevel => {
                if let Some(payload) = self.water.sample(hw) {
                    self.publish(MessageType::SensorInfo, payload.as_bytes(), link, sink);
                }
            }
            TaskId::Battery => {
                if let Some(payload) = self.battery.sample(hw) {
                    self.publish(MessageType::SensorInfo, payload.as_bytes(), link, sink);
                }
            }
            TaskId::DisplayRefresh => {
                self.ui
                    .render_tick(hw, self.water.value_mut(), self.battery.value_mut());
            }
            // At most one second per pass: a pass that blocks longer
            // (a WiFi scan) stretches both countdowns by the overrun.
            TaskId::SleepTimers => self.ctx.inputs.second_elapsed = true,
            TaskId::Clock => {
                let now = hw.wall_clock();
                self.ui.clock_tick(hw, now);
            }
        }
    }

    /// Headless pass: one reading of each sensor, shipped synchronously.
    fn run_oneshot(
        &mut self,
        hw: &mut impl Board,
        link: &mut impl Uplink,
        sink: &mut impl EventSink,
    ) {
        info!("Headless: one-shot sampling pass");
        self.run_task(TaskId::WaterLevel, hw, link, sink);
        self.run_task(TaskId::Battery, hw, link, sink);
        self.ctx.inputs.oneshot_done = true;
    }

    fn publish(
        &mut self,
        kind: MessageType,
        payload: &[u8],
        link: &mut impl Uplink,
        sink: &mut impl EventSink,
    ) {
        match send_message(link, kind, payload) {
            Ok(frames) => sink.emit(&AppEvent::MessageSent { kind, frames }),
            Err(e) => {
                warn!("Link: {:?} message dropped: {}", kind, e);
                sink.emit(&AppEvent::SendFailed { kind });
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
