//! 18650 cell monitor.
//!
//! Voltage comes from the divider on the ADC pin; charge level is
//! interpolated from a resting-voltage table.  There is no charge-status
//! pin: anything at or above the USB threshold is treated as charging.

use log::{info, warn};

use super::{DeviceUpdate, ObservedValue};
use crate::app::ports::SensorPort;

pub const VOLTAGE_DEVICE_IDX: u32 = 6;
pub const CHARGE_DEVICE_IDX: u32 = 7;

/// At or above this the board is on USB power.
pub const CHARGING_THRESHOLD_V: f32 = 4.8;

/// (volts, percent), descending.
const DISCHARGE_CURVE: [(f32, u8); 11] = [
    (4.20, 100),
    (4.10, 90),
    (4.00, 80),
    (3.90, 70),
    (3.85, 60),
    (3.80, 50),
    (3.75, 40),
    (3.70, 30),
    (3.65, 20),
    (3.55, 10),
    (3.20, 0),
];

/// Charge level (0–100 %) for a resting cell voltage.
pub fn charge_percent(volts: f32) -> u8 {
    let (top_v, top_pct) = DISCHARGE_CURVE[0];
    if volts >= top_v {
        return top_pct;
    }
    for pair in DISCHARGE_CURVE.windows(2) {
        let (hi_v, hi_pct) = pair[0];
        let (lo_v, lo_pct) = pair[1];
        if volts >= lo_v {
            let frac = (volts - lo_v) / (hi_v - lo_v);
            let pct = f32::from(lo_pct) + frac * f32::from(hi_pct - lo_pct);
            return pct.round() as u8;
        }
    }
    0
}

/// One battery sample.  Millivolts keep equality exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryReading {
    pub millivolts: u16,
    pub charge_pct: u8,
}

impl BatteryReading {
    pub fn from_volts(volts: f32) -> Self {
        Self {
            millivolts: (volts * 1000.0).round().clamp(0.0, f32::from(u16::MAX)) as u16,
            charge_pct: charge_percent(volts),
        }
    }

    pub fn volts(&self) -> f32 {
        f32::from(self.millivolts) / 1000.0
    }

    pub fn is_charging(&self) -> bool {
        self.volts() >= CHARGING_THRESHOLD_V
    }
}

pub struct BatterySampler {
    value: ObservedValue<BatteryReading>,
}

impl BatterySampler {
    pub const fn new() -> Self {
        Self {
            value: ObservedValue::new(),
        }
    }

    /// Take one reading.  Returns one payload carrying both the voltage and
    /// the charge device updates, or `None` when the read failed.
    pub fn sample(&mut self, port: &mut impl SensorPort) -> Option<String> {
        match port.read_battery_voltage() {
            Ok(volts) => {
                let reading = BatteryReading::from_volts(volts);
                info!(
                    "Battery: {:.2} V, {}%{}",
                    reading.volts(),
                    reading.charge_pct,
                    if reading.is_charging() { " (charging)" } else { "" }
                );
                self.value.record(reading);
                telemetry(&reading)
            }
            Err(e) => {
                warn!("Battery read failed: {}", e);
                self.value.record_failure();
                None
            }
        }
    }

    pub fn value(&self) -> &ObservedValue<BatteryReading> {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut ObservedValue<BatteryReading> {
        &mut self.value
    }
}

impl Default for BatterySampler {
    fn default() -> Self {
        Self::new()
    }
}

fn telemetry(reading: &BatteryReading) -> Option<String> {
    let updates = [
        DeviceUpdate {
            idx: VOLTAGE_DEVICE_IDX,
            nvalue: 0,
            svalue: Some(format!("{:.2}", reading.volts())),
        },
        DeviceUpdate {
            idx: CHARGE_DEVICE_IDX,
            nvalue: 0,
            svalue: Some(format!("{}", reading.charge_pct)),
        },
    ];
    serde_json::to_string(&updates)
        .map_err(|_| warn!("Battery: telemetry encode failed"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SensorError;
    use crate::sensors::water_level::WaterLevel;

    struct Cell(Result<f32, SensorError>);

    impl SensorPort for Cell {
        fn read_water_level(&mut self) -> Result<WaterLevel, SensorError> {
            Ok(WaterLevel::Ok)
        }
        fn read_battery_voltage(&mut self) -> Result<f32, SensorError> {
            self.0
        }
    }

    #[test]
    fn curve_endpoints_and_midpoints() {
        assert_eq!(charge_percent(4.35), 100);
        assert_eq!(charge_percent(4.20), 100);
        assert_eq!(charge_percent(3.80), 50);
        assert_eq!(charge_percent(3.825), 55);
        assert_eq!(charge_percent(3.20), 0);
        assert_eq!(charge_percent(2.90), 0);
    }

    #[test]
    fn charging_threshold() {
        assert!(BatteryReading::from_volts(4.8).is_charging());
        assert!(BatteryReading::from_volts(5.1).is_charging());
        assert!(!BatteryReading::from_volts(4.79).is_charging());
    }

    #[test]
    fn payload_holds_both_updates() {
        let mut s = BatterySampler::new();
        let payload = s.sample(&mut Cell(Ok(3.9))).unwrap();
        assert_eq!(
            payload,
            r#"[{"idx":6,"nvalue":0,"svalue":"3.90"},{"idx":7,"nvalue":0,"svalue":"70"}]"#
        );
    }

    #[test]
    fn failed_read_sends_nothing() {
        let mut s = BatterySampler::new();
        s.sample(&mut Cell(Ok(3.7)));
        assert!(s.sample(&mut Cell(Err(SensorError::AdcReadFailed(-1)))).is_none());
        assert_eq!(s.value().current().map(|r| r.millivolts), Some(3700));
        assert!(!s.value().changed());
    }
}
