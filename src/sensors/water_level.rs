//! Float-switch water level sampler.
//!
//! The switch pulls the input low while the water is above the float.
//! A released float (pin high through the pull-up) means LOW water.

use log::{info, warn};

use super::{DeviceUpdate, ObservedValue};
use crate::app::ports::SensorPort;

/// Device index of the water-level switch on the gateway side.
pub const WATER_LEVEL_DEVICE_IDX: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaterLevel {
    Ok,
    Low,
}

impl WaterLevel {
    pub const fn from_pin_high(high: bool) -> Self {
        if high { Self::Low } else { Self::Ok }
    }

    /// Numeric value reported upstream (the raw pin level).
    pub const fn nvalue(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::Low => 1,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Low => "LOW",
        }
    }
}

pub struct WaterLevelSampler {
    value: ObservedValue<WaterLevel>,
}

impl WaterLevelSampler {
    pub const fn new() -> Self {
        Self {
            value: ObservedValue::new(),
        }
    }

    /// Take one reading.  Returns the telemetry payload for this cycle, or
    /// `None` when the read failed (stale values are never reported).
    pub fn sample(&mut self, port: &mut impl SensorPort) -> Option<String> {
        match port.read_water_level() {
            Ok(level) => {
                info!("Water level: {} ({})", level.label(), level.nvalue());
                self.value.record(level);
                telemetry(level)
            }
            Err(e) => {
                warn!("Water level read failed: {}", e);
                self.value.record_failure();
                None
            }
        }
    }

    pub fn value(&self) -> &ObservedValue<WaterLevel> {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut ObservedValue<WaterLevel> {
        &mut self.value
    }
}

impl Default for WaterLevelSampler {
    fn default() -> Self {
        Self::new()
    }
}

fn telemetry(level: WaterLevel) -> Option<String> {
    let update = DeviceUpdate {
        idx: WATER_LEVEL_DEVICE_IDX,
        nvalue: level.nvalue(),
        svalue: None,
    };
    serde_json::to_string(&update)
        .map_err(|_| warn!("Water level: telemetry encode failed"))
        .ok()
}
