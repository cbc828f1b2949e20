//! Two-button menu UI on the built-in panel.
//!
//! ```text
//!   InputPort ──▶ ButtonDriver ×2 ──▶ (ButtonId, ButtonEvent)
//!                                           │ command_for()
//!                                           ▼
//!                                      AppCommand ──▶ DeviceService
//!
//!   display-refresh task ──▶ render_tick() ──▶ Renderer::render(Screen)
//! ```
//!
//! The controller owns the menu selection and the scan results.  The
//! sampled values stay with their samplers; rendering only touches their
//! `last_rendered` marks.

use core::fmt;

use crate::app::commands::AppCommand;
use crate::app::ports::{InputPort, MAX_SCAN_RESULTS, NetworkSummary, Renderer};
use crate::drivers::button::{ButtonDriver, ButtonEvent, ButtonId};
use crate::sensors::ObservedValue;
use crate::sensors::battery::BatteryReading;
use crate::sensors::water_level::WaterLevel;

/// Formatted wall-clock text, e.g. `2024-05-01 14:03:12`.
pub type ClockText = heapless::String<24>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Menu {
    Instructions,
    WaterLevel,
    WifiScan,
    BatteryInfo,
    DeepSleep,
}

/// What the panel should show.  Borrowed data lives in the controller or
/// the samplers for the duration of one render call.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen<'a> {
    Instructions,
    WaterLevel(Option<WaterLevel>),
    Battery(Option<BatteryReading>),
    WifiScan(&'a [NetworkSummary]),
    GoingToSleep,
    Clock(&'a str),
}

impl fmt::Display for Screen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instructions => {
                writeln!(f, "LeftButton: [Water Level]")?;
                writeln!(f, "LeftButtonLongPress: [WiFi Scan]")?;
                writeln!(f, "RightButton: [Battery Info]")?;
                write!(f, "RightButtonLongPress: [Deep Sleep]")
            }
            Self::WaterLevel(level) => {
                writeln!(f, "Water Level is")?;
                write!(f, "{}", level.map_or("--", WaterLevel::label))
            }
            Self::Battery(None) => write!(f, "Battery\n--"),
            Self::Battery(Some(r)) => {
                if r.is_charging() {
                    writeln!(f, "Charge: charging...")?;
                } else {
                    writeln!(f, "Charge: {}%", r.charge_pct)?;
                }
                write!(f, "Voltage: {:.2}V", r.volts())
            }
            Self::WifiScan([]) => write!(f, "Scan Network\nno networks found"),
            Self::WifiScan(networks) => {
                write!(f, "Scan Network")?;
                for n in networks.iter() {
                    write!(f, "\n{} ({})", n.ssid, n.rssi)?;
                }
                Ok(())
            }
            Self::GoingToSleep => write!(f, "Press again to wake up"),
            Self::Clock(text) => write!(f, "{}", text),
        }
    }
}

/// Fixed button map.
pub const fn command_for(button: ButtonId, event: ButtonEvent) -> AppCommand {
    match (button, event) {
        (ButtonId::Left, ButtonEvent::Click) => AppCommand::ShowMenu(Menu::WaterLevel),
        (ButtonId::Left, ButtonEvent::LongClick) => AppCommand::WifiScan,
        (ButtonId::Left, ButtonEvent::DoubleClick) => AppCommand::TruncateLog,
        (ButtonId::Right, ButtonEvent::Click) => AppCommand::ShowMenu(Menu::BatteryInfo),
        (ButtonId::Right, ButtonEvent::LongClick) => AppCommand::SleepNow,
        (ButtonId::Right, ButtonEvent::DoubleClick) => AppCommand::PublishLog,
    }
}

pub struct UiController {
    left: ButtonDriver,
    right: ButtonDriver,
    menu: Menu,
    menu_dirty: bool,
    networks: heapless::Vec<NetworkSummary, MAX_SCAN_RESULTS>,
    clock: ObservedValue<ClockText>,
}

impl UiController {
    pub const fn new() -> Self {
        Self {
            left: ButtonDriver::new(ButtonId::Left),
            right: ButtonDriver::new(ButtonId::Right),
            menu: Menu::Instructions,
            menu_dirty: true,
            networks: heapless::Vec::new(),
            clock: ObservedValue::new(),
        }
    }

    pub fn menu(&self) -> Menu {
        self.menu
    }

    /// Both buttons idle: no gesture needs fast polling.
    pub fn is_idle(&self) -> bool {
        self.left.is_idle() && self.right.is_idle()
    }

    /// Sample both buttons and return completed gestures.
    pub fn poll_buttons(
        &mut self,
        input: &impl InputPort,
        now_ms: u32,
    ) -> heapless::Vec<(ButtonId, ButtonEvent), 2> {
        let mut events = heapless::Vec::new();
        for driver in [&mut self.left, &mut self.right] {
            let id = driver.id();
            if let Some(ev) = driver.tick(input.is_pressed(id), now_ms) {
                // capacity is one slot per button
                let _ = events.push((id, ev));
            }
        }
        events
    }

    /// Switch menus.  The new screen draws on the next refresh even when
    /// its value has not changed.
    pub fn show(&mut self, menu: Menu) {
        if menu != self.menu {
            log::info!("UI: menu {:?}", menu);
        }
        self.menu = menu;
        self.menu_dirty = true;
    }

    pub fn set_networks(&mut self, networks: heapless::Vec<NetworkSummary, MAX_SCAN_RESULTS>) {
        self.networks = networks;
    }

    pub fn networks(&self) -> &[NetworkSummary] {
        &self.networks
    }

    /// Force a full redraw (display just powered on).
    pub fn invalidate(&mut self) {
        self.menu_dirty = true;
        self.clock.invalidate_render();
    }

    /// Periodic refresh: draw the active menu only if what it shows differs
    /// from what is on the panel.
    pub fn render_tick(
        &mut self,
        display: &mut impl Renderer,
        water: &mut ObservedValue<WaterLevel>,
        battery: &mut ObservedValue<BatteryReading>,
    ) {
        let dirty = core::mem::take(&mut self.menu_dirty);
        match self.menu {
            Menu::Instructions if dirty => display.render(&Screen::Instructions),
            Menu::WifiScan if dirty => display.render(&Screen::WifiScan(&self.networks)),
            Menu::DeepSleep if dirty => display.render(&Screen::GoingToSleep),
            Menu::WaterLevel if dirty || water.needs_render() => {
                display.render(&Screen::WaterLevel(water.current().copied()));
                water.mark_rendered();
            }
            Menu::BatteryInfo if dirty || battery.needs_render() => {
                display.render(&Screen::Battery(battery.current().copied()));
                battery.mark_rendered();
            }
            _ => {}
        }
    }

    /// Clock task: record the current wall-clock text and draw it when it
    /// changed.
    pub fn clock_tick(&mut self, display: &mut impl Renderer, now: Option<ClockText>) {
        let Some(text) = now else {
            return;
        };
        self.clock.record(text);
        if self.clock.needs_render() {
            if let Some(current) = self.clock.current() {
                display.render(&Screen::Clock(current));
            }
            self.clock.mark_rendered();
        }
    }
}

impl Default for UiController {
    fn default() -> Self {
        Self::new()
    }
}
