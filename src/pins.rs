//! GPIO / peripheral pin assignments for the LevelSense node
//! (TTGO T-Display class board, ESP32).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// Float switch input with internal pull-up. LOW = water OK, HIGH = LOW water.
pub const WATER_LEVEL_GPIO: i32 = 12;

/// Battery voltage divider tap.  ADC1 channel 6 on the ESP32.
pub const BATTERY_ADC_GPIO: i32 = 34;
pub const BATTERY_ADC_CHANNEL: u32 = 6;

/// Digital output that powers the battery divider (active HIGH).
pub const BATTERY_ADC_ENABLE_GPIO: i32 = 14;

// ---------------------------------------------------------------------------
// Buttons (active-low)
// ---------------------------------------------------------------------------

/// Right button.  RTC-capable, so it doubles as the deep-sleep wake pin.
pub const BUTTON_RIGHT_GPIO: i32 = 35;
/// Left button (BOOT strap pin).
pub const BUTTON_LEFT_GPIO: i32 = 0;

/// Pin armed as the EXT0 wake source before deep sleep.
pub const WAKE_GPIO: i32 = BUTTON_RIGHT_GPIO;
/// Level that triggers the wake (button pressed pulls the line low).
pub const WAKE_LEVEL: i32 = 0;

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

/// TFT backlight enable (active HIGH).
pub const DISPLAY_BACKLIGHT_GPIO: i32 = 4;
