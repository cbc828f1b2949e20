//! Sleep controller adapter.
//!
//! Implements [`PowerPort`] on top of the ESP-IDF sleep API.  The wake
//! cause is read once at construction; after that the RTC controller is
//! only written (wake sources, sleep entry).
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_sleep_*` calls via `esp_idf_svc::sys`.
//! - **all other targets**: sleeps become thread sleeps and arming is
//!   recorded, so the simulation loop can run on a host.

use log::info;

use crate::app::ports::PowerPort;
use crate::error::SleepArmError;
use crate::power::WakeReason;

#[cfg(target_os = "espidf")]
use crate::pins;
#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::{self, ESP_OK};

/// Either button ends a light sleep (both are active-low).
#[cfg(target_os = "espidf")]
const LIGHT_SLEEP_WAKE_PINS: [i32; 2] = [pins::BUTTON_LEFT_GPIO, pins::BUTTON_RIGHT_GPIO];

pub struct EspPower {
    wake: WakeReason,
    /// Wake sources armed since the last deep-sleep attempt.
    armed_external: bool,
    armed_timer: bool,
}

impl EspPower {
    /// Capture the wake cause of the current boot.
    #[cfg(target_os = "espidf")]
    pub fn new() -> Self {
        // SAFETY: read-only query of the RTC controller.
        let cause = unsafe { sys::esp_sleep_get_wakeup_cause() };
        Self::with_wake(WakeReason::from_raw_cause(cause as u32))
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self::with_wake(WakeReason::Unknown)
    }

    pub const fn with_wake(wake: WakeReason) -> Self {
        Self {
            wake,
            armed_external: false,
            armed_timer: false,
        }
    }

    /// Both wake sources armed (button and timer).
    pub fn fully_armed(&self) -> bool {
        self.armed_external && self.armed_timer
    }
}

impl Default for EspPower {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerPort for EspPower {
    fn wake_reason(&self) -> WakeReason {
        self.wake
    }

    #[cfg(target_os = "espidf")]
    fn delay_ms(&mut self, ms: u32) {
        esp_idf_svc::hal::delay::FreeRtos::delay_ms(ms);
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }

    #[cfg(target_os = "espidf")]
    fn light_sleep_ms(&mut self, ms: u32) {
        // SAFETY: wake sources are configured from the main task only;
        // light sleep returns with all peripherals and RAM intact.
        unsafe {
            sys::esp_sleep_enable_timer_wakeup(u64::from(ms) * 1000);
            for pin in LIGHT_SLEEP_WAKE_PINS {
                sys::gpio_wakeup_enable(pin, sys::gpio_int_type_t_GPIO_INTR_LOW_LEVEL);
            }
            sys::esp_sleep_enable_gpio_wakeup();
            let ret = sys::esp_light_sleep_start();
            if ret != ESP_OK as i32 {
                log::warn!("Power: light sleep rejected (rc={})", ret);
            }
            for pin in LIGHT_SLEEP_WAKE_PINS {
                sys::gpio_wakeup_disable(pin);
            }
            sys::esp_sleep_disable_wakeup_source(sys::esp_sleep_source_t_ESP_SLEEP_WAKEUP_GPIO);
            sys::esp_sleep_disable_wakeup_source(sys::esp_sleep_source_t_ESP_SLEEP_WAKEUP_TIMER);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn light_sleep_ms(&mut self, ms: u32) {
        self.delay_ms(ms);
    }

    fn arm_external_wakeup(&mut self, gpio: i32, level: i32) -> Result<(), SleepArmError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: `gpio` is RTC-capable (see pins::WAKE_GPIO).
            let ret = unsafe { sys::esp_sleep_enable_ext0_wakeup(gpio, level) };
            if ret != ESP_OK as i32 {
                return Err(SleepArmError::ExternalPin(ret));
            }
        }
        info!("Power: wake on GPIO{} level {}", gpio, level);
        self.armed_external = true;
        Ok(())
    }

    fn arm_timer_wakeup(&mut self, secs: u32) -> Result<(), SleepArmError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: plain RTC timer configuration.
            let ret = unsafe { sys::esp_sleep_enable_timer_wakeup(u64::from(secs) * 1_000_000) };
            if ret != ESP_OK as i32 {
                return Err(SleepArmError::Timer(ret));
            }
        }
        info!("Power: timer wake in {} s", secs);
        self.armed_timer = true;
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn enter_deep_sleep(&mut self) {
        if !self.fully_armed() {
            log::warn!("Power: deep sleep with a wake source missing");
        }
        info!("Power: entering deep sleep");
        // SAFETY: does not return; the chip resets on wake.
        unsafe { sys::esp_deep_sleep_start() };
    }

    #[cfg(not(target_os = "espidf"))]
    fn enter_deep_sleep(&mut self) {
        info!(
            "Power(sim): deep sleep (external={}, timer={})",
            self.armed_external, self.armed_timer
        );
        self.armed_external = false;
        self.armed_timer = false;
    }
}
