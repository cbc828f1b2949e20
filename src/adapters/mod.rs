//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements           | Connects to                  |
//! |----------------|----------------------|------------------------------|
//! | `hardware`     | SensorPort           | Float switch GPIO, ADC1      |
//! |                | InputPort            | Button GPIOs                 |
//! | `display`      | Renderer/DisplayPort | Panel backlight, console     |
//! | `power`        | PowerPort            | ESP-IDF sleep controller     |
//! | `time`         | ClockPort            | ESP32 system timer, RTC      |
//! | `espnow`       | Transport            | ESP-NOW unicast to gateway   |
//! |                | NetworkScanPort      | ESP-IDF WiFi STA scan        |
//! | `config_store` | ConfigSource         | `config.json` on SPIFFS      |
//! | `spiffs`       | (mount only)         | SPIFFS VFS mount             |
//! | `log_sink`     | EventSink, log::Log  | Serial log + persistent log  |

pub mod config_store;
pub mod display;
pub mod espnow;
pub mod hardware;
pub mod log_sink;
pub mod power;
pub mod spiffs;
pub mod time;
