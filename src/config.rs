//! Node configuration.
//!
//! Loaded once at boot from `config.json` on the SPIFFS partition and
//! immutable afterwards.  The credential sections mirror the JSON document
//! shared with the gateway tooling; the optional `device` section carries
//! the runtime tunables (timeouts, sampling intervals, run mode).
//!
//! ```json
//! {
//!   "wifi":   { "ssid": "...", "password": "..." },
//!   "mqtt":   { "clientName": "...", "server": "...", "port": 1883,
//!               "user": "...", "password": "..." },
//!   "peer":   { "gatewayMacAddress": "24:0a:c4:12:34:56" },
//!   "device": { "runMode": "headless", "deepSleepWakeupSecs": 600 }
//! }
//! ```

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

// ---------------------------------------------------------------------------
// Credential sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WifiConfig {
    pub ssid: heapless::String<32>,
    pub password: heapless::String<64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MqttConfig {
    pub client_name: heapless::String<32>,
    pub server: heapless::String<64>,
    pub port: u16,
    pub user: heapless::String<32>,
    pub password: heapless::String<64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PeerConfig {
    /// Colon-delimited hex, e.g. `24:0a:c4:12:34:56`.
    pub gateway_mac_address: heapless::String<17>,
}

impl PeerConfig {
    /// Parse the configured gateway address.
    pub fn gateway_mac(&self) -> Result<MacAddress, ConfigError> {
        self.gateway_mac_address.parse()
    }
}

// ---------------------------------------------------------------------------
// MAC address
// ---------------------------------------------------------------------------

/// Six-byte station address of the ESP-NOW peer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl FromStr for MacAddress {
    type Err = ConfigError;

    /// Accepts six colon-separated groups of one or two hex digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut out = [0u8; 6];
        let mut parts = s.trim().split(':');
        for byte in &mut out {
            let part = parts
                .next()
                .ok_or(ConfigError::ValidationFailed("MAC address needs 6 groups"))?;
            if part.is_empty() || part.len() > 2 {
                return Err(ConfigError::ValidationFailed("MAC group must be 1-2 hex digits"));
            }
            *byte = u8::from_str_radix(part, 16)
                .map_err(|_| ConfigError::ValidationFailed("MAC group is not hex"))?;
        }
        if parts.next().is_some() {
            return Err(ConfigError::ValidationFailed("MAC address has more than 6 groups"));
        }
        Ok(Self(out))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

// ---------------------------------------------------------------------------
// Runtime settings
// ---------------------------------------------------------------------------

/// Whether the node runs the display/button UI or a single headless pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    #[default]
    Interactive,
    Headless,
}

/// Runtime tunables.  Every field has a default so a partial `device`
/// section (or none at all) is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceSettings {
    pub run_mode: RunMode,
    /// Seconds without interaction before the display powers down.
    pub display_sleep_timeout_secs: u32,
    /// Seconds without interaction before the node enters deep sleep.
    pub deep_sleep_timeout_secs: u32,
    /// Deep-sleep duration before the timer wake fires.
    pub deep_sleep_wakeup_secs: u32,
    pub water_level_interval_secs: u32,
    pub battery_interval_secs: u32,
    pub display_refresh_ms: u32,
    /// Light-sleep settle time before arming deep sleep.
    pub settle_delay_ms: u32,
    /// Main loop yield while the display is on.
    pub poll_interval_ms: u32,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            run_mode: RunMode::Interactive,
            display_sleep_timeout_secs: 10,
            deep_sleep_timeout_secs: 60,
            deep_sleep_wakeup_secs: 600,
            water_level_interval_secs: 10,
            battery_interval_secs: 10,
            display_refresh_ms: 500,
            settle_delay_ms: 200,
            poll_interval_ms: 20,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub wifi: WifiConfig,
    pub mqtt: MqttConfig,
    /// Older documents call this section `espnow`.
    #[serde(alias = "espnow")]
    pub peer: PeerConfig,
    pub device: DeviceSettings,
}

impl AppConfig {
    /// Parse a JSON document.  Range problems in `device` are not errors
    /// here; see [`AppConfig::sanitized`].
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        serde_json::from_slice(bytes).map_err(|_| ConfigError::Corrupted)
    }

    /// Replace out-of-range device settings with defaults, logging why.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        if let Err(e) = validate_settings(&self.device) {
            log::warn!("Config: {} (using default device settings)", e);
            self.device = DeviceSettings {
                run_mode: self.device.run_mode,
                ..DeviceSettings::default()
            };
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn check(value: u32, min: u32, max: u32, field: &'static str) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ValidationFailed(field))
    }
}

/// Range-check every device setting.
pub fn validate_settings(s: &DeviceSettings) -> Result<(), ConfigError> {
    check(s.display_sleep_timeout_secs, 3, 600, "displaySleepTimeoutSecs must be 3-600")?;
    check(s.deep_sleep_timeout_secs, 10, 3600, "deepSleepTimeoutSecs must be 10-3600")?;
    check(s.deep_sleep_wakeup_secs, 60, 86_400, "deepSleepWakeupSecs must be 60-86400")?;
    check(s.water_level_interval_secs, 1, 3600, "waterLevelIntervalSecs must be 1-3600")?;
    check(s.battery_interval_secs, 1, 3600, "batteryIntervalSecs must be 1-3600")?;
    check(s.display_refresh_ms, 100, 5000, "displayRefreshMs must be 100-5000")?;
    check(s.settle_delay_ms, 0, 10_000, "settleDelayMs must be 0-10000")?;
    check(s.poll_interval_ms, 5, 500, "pollIntervalMs must be 5-500")?;
    Ok(())
}
