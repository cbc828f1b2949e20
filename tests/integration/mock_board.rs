//! Mock adapters for integration tests.
//!
//! [`MockBoard`] records every display and power call so tests can assert
//! on the full sequence without touching GPIO or the sleep controller.
//! [`CaptureLink`] keeps every frame and can reassemble them into messages.

use std::sync::atomic::AtomicU32;

use levelsense::app::events::AppEvent;
use levelsense::app::ports::{
    ClockPort, DisplayPort, EventSink, InputPort, MAX_SCAN_RESULTS, NetworkScanPort,
    NetworkSummary, PowerPort, Renderer, SensorPort,
};
use levelsense::app::service::DeviceService;
use levelsense::config::DeviceSettings;
use levelsense::drivers::button::ButtonId;
use levelsense::error::{SendError, SensorError, SleepArmError};
use levelsense::link::frame::OutboundMessage;
use levelsense::link::reassembly::{DEFAULT_TIMEOUT_MS, Reassembler};
use levelsense::link::{FRAME_LEN, MessageType, Transport};
use levelsense::logstore::PersistentLog;
use levelsense::power::{BootCounter, WakeReason};
use levelsense::sensors::water_level::WaterLevel;
use levelsense::ui::{ClockText, Screen};

// ── Board call record ─────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum BoardCall {
    PowerOn,
    PowerOff,
    Render(String),
    Delay(u32),
    LightSleep(u32),
    ArmExternal { gpio: i32, level: i32 },
    ArmTimer(u32),
    DeepSleep,
}

// ── MockBoard ─────────────────────────────────────────────────

pub struct MockBoard {
    pub calls: Vec<BoardCall>,
    pub wake: WakeReason,
    pub water: Result<WaterLevel, SensorError>,
    pub battery: Result<f32, SensorError>,
    pub pressed: Option<ButtonId>,
    pub clock: Option<ClockText>,
    pub fail_timer_arm: bool,
    display_on: bool,
}

#[allow(dead_code)]
impl MockBoard {
    pub fn new(wake: WakeReason) -> Self {
        Self {
            calls: Vec::new(),
            wake,
            water: Ok(WaterLevel::Ok),
            battery: Ok(3.9),
            pressed: None,
            clock: None,
            fail_timer_arm: false,
            display_on: false,
        }
    }

    pub fn count(&self, call: &BoardCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn position(&self, call: &BoardCall) -> Option<usize> {
        self.calls.iter().position(|c| c == call)
    }

    pub fn renders(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                BoardCall::Render(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl SensorPort for MockBoard {
    fn read_water_level(&mut self) -> Result<WaterLevel, SensorError> {
        self.water
    }

    fn read_battery_voltage(&mut self) -> Result<f32, SensorError> {
        self.battery
    }
}

impl InputPort for MockBoard {
    fn is_pressed(&self, button: ButtonId) -> bool {
        self.pressed == Some(button)
    }
}

impl Renderer for MockBoard {
    fn render(&mut self, screen: &Screen<'_>) {
        self.calls.push(BoardCall::Render(screen.to_string()));
    }
}

impl DisplayPort for MockBoard {
    fn is_on(&self) -> bool {
        self.display_on
    }

    fn power_on(&mut self) {
        self.display_on = true;
        self.calls.push(BoardCall::PowerOn);
    }

    fn power_off(&mut self) {
        self.display_on = false;
        self.calls.push(BoardCall::PowerOff);
    }
}

impl PowerPort for MockBoard {
    fn wake_reason(&self) -> WakeReason {
        self.wake
    }

    fn delay_ms(&mut self, ms: u32) {
        self.calls.push(BoardCall::Delay(ms));
    }

    fn light_sleep_ms(&mut self, ms: u32) {
        self.calls.push(BoardCall::LightSleep(ms));
    }

    fn arm_external_wakeup(&mut self, gpio: i32, level: i32) -> Result<(), SleepArmError> {
        self.calls.push(BoardCall::ArmExternal { gpio, level });
        Ok(())
    }

    fn arm_timer_wakeup(&mut self, secs: u32) -> Result<(), SleepArmError> {
        if self.fail_timer_arm {
            return Err(SleepArmError::Timer(-1));
        }
        self.calls.push(BoardCall::ArmTimer(secs));
        Ok(())
    }

    fn enter_deep_sleep(&mut self) {
        self.calls.push(BoardCall::DeepSleep);
    }
}

impl ClockPort for MockBoard {
    fn wall_clock(&self) -> Option<ClockText> {
        self.clock.clone()
    }
}

// ── CaptureLink ───────────────────────────────────────────────

#[derive(Default)]
pub struct CaptureLink {
    pub frames: Vec<[u8; FRAME_LEN]>,
    pub networks: Vec<(&'static str, i8)>,
    pub reject: bool,
}

#[allow(dead_code)]
impl CaptureLink {
    /// Decode and reassemble every captured frame.
    pub fn messages(&self) -> Vec<(MessageType, String)> {
        let mut rx = Reassembler::new(DEFAULT_TIMEOUT_MS);
        self.frames
            .iter()
            .filter_map(|f| {
                let msg = OutboundMessage::decode(f).expect("captured frame decodes");
                rx.feed(&msg, 0)
            })
            .map(|(kind, body)| (kind, String::from_utf8(body).expect("utf-8 payload")))
            .collect()
    }

    pub fn messages_of(&self, kind: MessageType) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, body)| body)
            .collect()
    }
}

impl Transport for CaptureLink {
    type Error = SendError;

    fn send(&mut self, frame: &[u8; FRAME_LEN]) -> Result<(), SendError> {
        if self.reject {
            return Err(SendError::Rejected(-1));
        }
        self.frames.push(*frame);
        Ok(())
    }
}

impl NetworkScanPort for CaptureLink {
    fn scan_networks(&mut self) -> heapless::Vec<NetworkSummary, MAX_SCAN_RESULTS> {
        self.networks
            .iter()
            .take(MAX_SCAN_RESULTS)
            .map(|(ssid, rssi)| NetworkSummary {
                ssid: heapless::String::try_from(*ssid).expect("short ssid"),
                rssi: *rssi,
            })
            .collect()
    }
}

// ── Event recorder ────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn contains(&self, event: &AppEvent) -> bool {
        self.events.contains(event)
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Test rig ──────────────────────────────────────────────────

/// A log file unique to this test process and `name`, starting empty.
pub fn temp_log(name: &str, limit: u64) -> PersistentLog {
    let path = std::env::temp_dir().join(format!(
        "levelsense-it-{}-{}.txt",
        std::process::id(),
        name
    ));
    let log = PersistentLog::new(path, limit);
    log.truncate().expect("fresh log");
    log
}

/// Short timeouts so lifecycle tests stay readable.
pub fn quick_settings() -> DeviceSettings {
    DeviceSettings {
        display_sleep_timeout_secs: 3,
        deep_sleep_timeout_secs: 10,
        ..DeviceSettings::default()
    }
}

pub struct Rig {
    pub svc: DeviceService,
    pub hw: MockBoard,
    pub link: CaptureLink,
    pub sink: RecordingSink,
    pub now: u32,
}

#[allow(dead_code)]
impl Rig {
    /// Boot a service.  Nothing has been polled yet.
    pub fn boot(settings: DeviceSettings, wake: WakeReason, log: PersistentLog) -> Self {
        Self::boot_with(settings, MockBoard::new(wake), CaptureLink::default(), log)
    }

    pub fn boot_with(
        settings: DeviceSettings,
        mut hw: MockBoard,
        mut link: CaptureLink,
        log: PersistentLog,
    ) -> Self {
        let cell: &'static AtomicU32 = Box::leak(Box::new(AtomicU32::new(0)));
        let mut svc = DeviceService::new(settings, log);
        let mut sink = RecordingSink::default();
        svc.boot(&BootCounter::with_cell(cell), &mut hw, &mut link, &mut sink);
        Self {
            svc,
            hw,
            link,
            sink,
            now: 0,
        }
    }

    pub fn poll_at(&mut self, now_ms: u32) {
        self.now = now_ms;
        self.svc
            .poll(now_ms, &mut self.hw, &mut self.link, &mut self.sink);
    }

    /// `n` polls one second apart.
    pub fn seconds(&mut self, n: u32) {
        for _ in 0..n {
            self.poll_at(self.now + 1000);
        }
    }

    /// Press-and-release shorter than a long click, then wait out the
    /// double-click window.
    pub fn click(&mut self, button: ButtonId) {
        let t = self.now;
        self.hw.pressed = Some(button);
        self.poll_at(t + 10);
        self.poll_at(t + 70);
        self.hw.pressed = None;
        self.poll_at(t + 100);
        self.poll_at(t + 450);
    }

    pub fn long_press(&mut self, button: ButtonId) {
        let t = self.now;
        self.hw.pressed = Some(button);
        self.poll_at(t + 10);
        self.poll_at(t + 70);
        self.hw.pressed = None;
        self.poll_at(t + 400);
    }

    pub fn double_click(&mut self, button: ButtonId) {
        let t = self.now;
        self.hw.pressed = Some(button);
        self.poll_at(t + 10);
        self.poll_at(t + 70);
        self.hw.pressed = None;
        self.poll_at(t + 100);
        self.hw.pressed = Some(button);
        self.poll_at(t + 200);
        self.hw.pressed = None;
        self.poll_at(t + 260);
    }

    pub fn enter_deep_sleep(&mut self) -> levelsense::Result<()> {
        self.svc
            .enter_deep_sleep(&mut self.hw, &mut self.link, &mut self.sink)
    }
}
