//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ DeviceService (domain)
//! ```
//!
//! Driven adapters (sensors, buttons, display, sleep controller, storage,
//! peer link) implement these traits.  The
//! [`DeviceService`](super::service::DeviceService) consumes them via
//! generics, so the domain core never touches hardware directly.
//!
//! Callbacks (display redraw, log flush, delivery status) are traits too,
//! injected at construction or at the call site.

use crate::config::{AppConfig, MacAddress};
use crate::drivers::button::ButtonId;
use crate::error::{SensorError, SleepArmError};
use crate::power::WakeReason;
use crate::scheduler::TaskId;
use crate::sensors::water_level::WaterLevel;
use crate::ui::{ClockText, Screen};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the two measured quantities.
pub trait SensorPort {
    /// Sample the float switch once.
    fn read_water_level(&mut self) -> Result<WaterLevel, SensorError>;

    /// Averaged battery voltage in volts.
    fn read_battery_voltage(&mut self) -> Result<f32, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Input port (buttons)
// ───────────────────────────────────────────────────────────────

/// Raw button levels.  Gesture decoding happens in the domain.
pub trait InputPort {
    fn is_pressed(&self, button: ButtonId) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Display ports
// ───────────────────────────────────────────────────────────────

/// Draws one screen.  What "draw" means is up to the adapter.
pub trait Renderer {
    fn render(&mut self, screen: &Screen<'_>);
}

/// Panel power control on top of [`Renderer`].
pub trait DisplayPort: Renderer {
    fn is_on(&self) -> bool;
    fn power_on(&mut self);
    fn power_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Power port (sleep controller)
// ───────────────────────────────────────────────────────────────

/// Sleep and wake-source control.
pub trait PowerPort {
    /// Why this boot happened.  Stable for the whole boot.
    fn wake_reason(&self) -> WakeReason;

    /// Busy-free wait; yields to other tasks.
    fn delay_ms(&mut self, ms: u32);

    /// Light sleep for at most `ms`.  A button press ends it early.
    fn light_sleep_ms(&mut self, ms: u32);

    /// Arm an edge/level-triggered wake on an RTC-capable pin.
    fn arm_external_wakeup(&mut self, gpio: i32, level: i32) -> Result<(), SleepArmError>;

    /// Arm the RTC timer wake.
    fn arm_timer_wakeup(&mut self, secs: u32) -> Result<(), SleepArmError>;

    /// Halt into deep sleep.  Does not return on hardware; mocks return so
    /// tests can inspect the recorded sequence.
    fn enter_deep_sleep(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Optional collaborators
// ───────────────────────────────────────────────────────────────

/// Wall clock for the status line.  `None` until time is synced.
pub trait ClockPort {
    fn wall_clock(&self) -> Option<ClockText>;
}

/// One access point found by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSummary {
    pub ssid: heapless::String<32>,
    pub rssi: i8,
}

/// Maximum networks kept from one scan (fits the panel).
pub const MAX_SCAN_RESULTS: usize = 8;

/// Station-mode scan, shared with the radio used by the peer link.
pub trait NetworkScanPort {
    fn scan_networks(&mut self) -> heapless::Vec<NetworkSummary, MAX_SCAN_RESULTS>;
}

/// Everything the service needs from the board, in one bound.
pub trait Board: SensorPort + InputPort + DisplayPort + PowerPort + ClockPort {}

impl<T> Board for T where T: SensorPort + InputPort + DisplayPort + PowerPort + ClockPort {}

// ───────────────────────────────────────────────────────────────
// Log sink (log drain target)
// ───────────────────────────────────────────────────────────────

/// Receives the full persistent-log content when it is drained.
/// Returning `false` keeps the stored log intact.
pub trait LogSink {
    fn flush(&mut self, buffer: &[u8]) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Transport listener (delivery callback)
// ───────────────────────────────────────────────────────────────

/// Asynchronous delivery status from the radio driver.
///
/// Runs in the driver's callback context: implementations only count.
/// Logging here would reach the persistent log, which blocks on flash.
pub trait TransportListener: Send + Sync {
    fn on_send_result(&self, peer: &MacAddress, delivered: bool);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads the node configuration.  Read-only: the node never writes it.
pub trait ConfigSource {
    fn load(&self) -> Result<AppConfig, ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Scheduler delegate (decouples scheduler from the service)
// ───────────────────────────────────────────────────────────────

/// Callback trait that the scheduler invokes when a periodic task is due.
pub trait SchedulerDelegate {
    fn on_task_due(&mut self, task: TaskId);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigSource`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config file on the storage partition.
    NotFound,
    /// File exists but is not a valid config document.
    Corrupted,
    /// A field failed validation.
    ValidationFailed(&'static str),
    /// The storage partition could not be mounted (ESP-IDF error code).
    StorageUnavailable(i32),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::StorageUnavailable(rc) => write!(f, "storage unavailable (rc={})", rc),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
