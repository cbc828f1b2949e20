//! LevelSense Firmware: Main Entry Point
//!
//! Hexagonal architecture with a cooperative main loop and deep sleep.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  Esp32Board              EspNowLink        FileConfigSource    │
//! │  (Sensor+Input+Display   (Transport+Scan)  (ConfigSource)      │
//! │   +Power+Clock)          LogEventSink      PersistentLogger    │
//! │                          (EventSink)       (log backend)       │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │             DeviceService (pure logic)                 │    │
//! │  │  Lifecycle FSM · Scheduler · Samplers · UI · Log       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  poll() ──▶ next_sleep_action() ──▶ delay | light | deep sleep │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{LevelFilter, error, info, warn};

use levelsense::adapters::config_store::FileConfigSource;
use levelsense::adapters::display::PanelDisplay;
use levelsense::adapters::espnow::EspNowLink;
use levelsense::adapters::hardware::Esp32Board;
use levelsense::adapters::log_sink::{LogEventSink, PersistentLogger};
use levelsense::adapters::power::EspPower;
use levelsense::adapters::spiffs;
use levelsense::adapters::time::SystemClock;
use levelsense::app::ports::{
    ConfigSource, MAX_SCAN_RESULTS, NetworkScanPort, NetworkSummary, PowerPort,
};
use levelsense::app::service::DeviceService;
use levelsense::config::{AppConfig, MacAddress};
use levelsense::drivers::hw_init;
use levelsense::error::{Error, SendError};
use levelsense::link::transport::DeliveryStats;
use levelsense::link::{FRAME_LEN, NullTransport, Transport};
use levelsense::logstore::PersistentLog;
use levelsense::power::{BootCounter, SleepAction};

/// Over-the-air delivery counters, fed from the radio callback.
static DELIVERY: DeliveryStats = DeliveryStats::new();

// ── Radio selection ───────────────────────────────────────────
//
// The node keeps running without a radio: sampling, the UI and the
// persistent log still work, and every frame is discarded.

enum Radio {
    EspNow(EspNowLink),
    Offline(NullTransport),
}

impl Transport for Radio {
    type Error = SendError;

    fn send(&mut self, frame: &[u8; FRAME_LEN]) -> Result<(), SendError> {
        match self {
            Self::EspNow(link) => link.send(frame),
            Self::Offline(null) => null.send(frame),
        }
    }

    fn is_online(&self) -> bool {
        match self {
            Self::EspNow(link) => link.is_online(),
            Self::Offline(null) => null.is_online(),
        }
    }
}

impl NetworkScanPort for Radio {
    fn scan_networks(&mut self) -> heapless::Vec<NetworkSummary, MAX_SCAN_RESULTS> {
        match self {
            Self::EspNow(link) => link.scan_networks(),
            Self::Offline(null) => null.scan_networks(),
        }
    }
}

#[cfg(target_os = "espidf")]
fn start_link(peer: MacAddress) -> Result<EspNowLink, Error> {
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;

    let rc = |e: esp_idf_svc::sys::EspError| Error::TransportInit(e.code());
    let peripherals = Peripherals::take().map_err(rc)?;
    let sysloop = EspSystemEventLoop::take().map_err(rc)?;
    let nvs = EspDefaultNvsPartition::take().ok();
    EspNowLink::start(peripherals.modem, sysloop, nvs, peer, &DELIVERY)
}

#[cfg(not(target_os = "espidf"))]
fn start_link(peer: MacAddress) -> Result<EspNowLink, Error> {
    Ok(EspNowLink::start(peer, &DELIVERY))
}

fn bring_up_radio(config: &AppConfig) -> Radio {
    let started = config
        .peer
        .gateway_mac()
        .map_err(Error::from)
        .and_then(start_link);
    match started {
        Ok(link) => Radio::EspNow(link),
        Err(e) => {
            warn!("Link: {} (running offline)", e);
            Radio::Offline(NullTransport)
        }
    }
}

#[allow(clippy::empty_loop)]
fn halt() -> ! {
    loop {}
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    #[cfg(target_os = "espidf")]
    esp_idf_svc::sys::link_patches();

    // Appends fail quietly until the mount below succeeds.
    PersistentLogger::new(PersistentLog::default())
        .install(LevelFilter::Info)
        .map_err(|e| anyhow::anyhow!("logger: {e}"))?;
    let storage = spiffs::mount();

    info!("╔══════════════════════════════════════╗");
    info!("║  LevelSense v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    if let Err(e) = hw_init::init_peripherals() {
        error!("HAL init failed: {} (halting)", e);
        halt();
    }

    // ── 2. Configuration ──────────────────────────────────────
    let config = match storage.and_then(|()| FileConfigSource::default().load()) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("{} (using defaults)", Error::ConfigLoad(e));
            AppConfig::default()
        }
    };
    let settings = config.device;

    // ── 3. Adapters ───────────────────────────────────────────
    let mut board = Esp32Board::new(PanelDisplay::new(), EspPower::new(), SystemClock::new());
    let mut radio = bring_up_radio(&config);
    let mut events = LogEventSink::new();
    let uptime = SystemClock::new();

    // ── 4. Service ────────────────────────────────────────────
    let mut svc = DeviceService::new(settings, PersistentLog::default());
    svc.boot(&BootCounter::rtc(), &mut board, &mut radio, &mut events);
    info!("System ready ({:?} mode). Entering main loop.", settings.run_mode);

    // ── 5. Main loop ──────────────────────────────────────────
    loop {
        svc.poll(uptime.uptime_ms(), &mut board, &mut radio, &mut events);

        let failures = DELIVERY.take_new_failures();
        if failures > 0 {
            warn!("Link: {} delivery failure(s), {} total", failures, DELIVERY.failed());
        }

        match svc.next_sleep_action() {
            SleepAction::Delay(ms) => board.delay_ms(ms),
            SleepAction::LightSleep(ms) => board.light_sleep_ms(ms),
            SleepAction::DeepSleep => {
                info!(
                    "Link: {} delivered, {} failed this boot",
                    DELIVERY.delivered(),
                    DELIVERY.failed()
                );
                if let Err(e) = svc.enter_deep_sleep(&mut board, &mut radio, &mut events) {
                    error!("{} (halting)", e);
                    halt();
                }
                // Only the host simulation gets here.
                return Ok(());
            }
        }
    }
}
