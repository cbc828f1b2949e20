//! Panel adapter.
//!
//! Drives the backlight enable line and presents each [`Screen`] on the
//! serial console, one log line per text row.  The TFT controller itself
//! stays blank; the backlight tracks the lifecycle so the power profile is
//! the same as with a drawn panel.

use log::info;

use crate::app::ports::{DisplayPort, Renderer};
use crate::drivers::hw_init;
use crate::pins;
use crate::ui::Screen;

pub struct PanelDisplay {
    on: bool,
    frames: u32,
}

impl PanelDisplay {
    pub const fn new() -> Self {
        Self { on: false, frames: 0 }
    }

    /// Screens drawn since boot.
    pub fn frames(&self) -> u32 {
        self.frames
    }
}

impl Default for PanelDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PanelDisplay {
    fn render(&mut self, screen: &Screen<'_>) {
        if !self.on {
            return;
        }
        self.frames = self.frames.wrapping_add(1);
        let text = screen.to_string();
        for row in text.lines() {
            info!("PANEL | {}", row);
        }
    }
}

impl DisplayPort for PanelDisplay {
    fn is_on(&self) -> bool {
        self.on
    }

    fn power_on(&mut self) {
        if !self.on {
            hw_init::gpio_write(pins::DISPLAY_BACKLIGHT_GPIO, true);
            self.on = true;
            info!("Display: on");
        }
    }

    fn power_off(&mut self) {
        if self.on {
            hw_init::gpio_write(pins::DISPLAY_BACKLIGHT_GPIO, false);
            self.on = false;
            info!("Display: off");
        }
    }
}
