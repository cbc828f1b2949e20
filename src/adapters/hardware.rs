//! Hardware adapter: bridges the board's peripherals to the domain ports.
//!
//! [`Esp32Board`] reads the float switch and the battery divider directly
//! and composes the display, sleep controller and clock adapters, so the
//! service sees a single [`Board`](crate::app::ports::Board).  On
//! non-espidf targets the underlying GPIO/ADC helpers are simulation stubs.

use crate::app::ports::{ClockPort, DisplayPort, InputPort, PowerPort, Renderer, SensorPort};
use crate::drivers::button::ButtonId;
use crate::drivers::hw_init;
use crate::error::{SensorError, SleepArmError};
use crate::pins;
use crate::power::WakeReason;
use crate::sensors::water_level::WaterLevel;
use crate::ui::{ClockText, Screen};

use super::display::PanelDisplay;
use super::power::EspPower;
use super::time::SystemClock;

/// Raw ADC samples averaged per battery reading.
pub const BATTERY_READS: u32 = 30;
/// Divider ratio times the ADC millivolt step.
pub const BATTERY_CONV_FACTOR: f32 = 1.8;
/// Anything above this did not come from a single 18650 cell or USB.
const BATTERY_MAX_PLAUSIBLE_V: f32 = 7.0;

/// Convert a mean raw ADC count to volts.
pub fn raw_to_volts(mean_raw: f32) -> f32 {
    mean_raw * BATTERY_CONV_FACTOR / 1000.0
}

/// The whole board behind the port traits.
pub struct Esp32Board {
    display: PanelDisplay,
    power: EspPower,
    clock: SystemClock,
}

impl Esp32Board {
    pub fn new(display: PanelDisplay, power: EspPower, clock: SystemClock) -> Self {
        Self {
            display,
            power,
            clock,
        }
    }
}

// ── SensorPort ────────────────────────────────────────────────

impl SensorPort for Esp32Board {
    fn read_water_level(&mut self) -> Result<WaterLevel, SensorError> {
        Ok(WaterLevel::from_pin_high(hw_init::gpio_read(
            pins::WATER_LEVEL_GPIO,
        )))
    }

    fn read_battery_voltage(&mut self) -> Result<f32, SensorError> {
        hw_init::gpio_write(pins::BATTERY_ADC_ENABLE_GPIO, true);
        let mut sum: u32 = 0;
        for _ in 0..BATTERY_READS {
            let raw = hw_init::adc1_read(pins::BATTERY_ADC_CHANNEL)
                .map_err(SensorError::AdcReadFailed)?;
            sum += u32::from(raw);
        }
        let volts = raw_to_volts(sum as f32 / BATTERY_READS as f32);
        if volts <= 0.0 || volts > BATTERY_MAX_PLAUSIBLE_V {
            return Err(SensorError::OutOfRange);
        }
        Ok(volts)
    }
}

// ── InputPort ─────────────────────────────────────────────────

impl InputPort for Esp32Board {
    /// Buttons are active-low.
    fn is_pressed(&self, button: ButtonId) -> bool {
        !hw_init::gpio_read(button.gpio())
    }
}

// ── Delegated ports ───────────────────────────────────────────

impl Renderer for Esp32Board {
    fn render(&mut self, screen: &Screen<'_>) {
        self.display.render(screen);
    }
}

impl DisplayPort for Esp32Board {
    fn is_on(&self) -> bool {
        self.display.is_on()
    }

    fn power_on(&mut self) {
        self.display.power_on();
    }

    fn power_off(&mut self) {
        self.display.power_off();
    }
}

impl PowerPort for Esp32Board {
    fn wake_reason(&self) -> WakeReason {
        self.power.wake_reason()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.power.delay_ms(ms);
    }

    fn light_sleep_ms(&mut self, ms: u32) {
        self.power.light_sleep_ms(ms);
    }

    fn arm_external_wakeup(&mut self, gpio: i32, level: i32) -> Result<(), SleepArmError> {
        self.power.arm_external_wakeup(gpio, level)
    }

    fn arm_timer_wakeup(&mut self, secs: u32) -> Result<(), SleepArmError> {
        self.power.arm_timer_wakeup(secs)
    }

    fn enter_deep_sleep(&mut self) {
        self.power.enter_deep_sleep();
    }
}

impl ClockPort for Esp32Board {
    fn wall_clock(&self) -> Option<ClockText> {
        self.clock.wall_clock()
    }
}
