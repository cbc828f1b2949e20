//! ESP32 time adapter.
//!
//! - **`target_os = "espidf"`**: monotonic time from `esp_timer_get_time()`
//!   and wall-clock time from `gettimeofday`/`localtime_r`.
//! - **`not(target_os = "espidf")`**: `std::time::Instant` for uptime;
//!   the wall clock is never synced.

use core::fmt::Write as _;

use crate::app::ports::ClockPort;
use crate::ui::ClockText;

/// Anything before 2020-01-01 means SNTP never ran.
#[cfg(target_os = "espidf")]
const EPOCH_2020: i64 = 1_577_836_800;

pub struct SystemClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot (monotonic, wraps after ~49 days).
    #[cfg(target_os = "espidf")]
    pub fn uptime_ms(&self) -> u32 {
        ((unsafe { esp_idf_svc::sys::esp_timer_get_time() }) / 1000) as u32
    }

    /// Milliseconds since boot (monotonic, wraps after ~49 days).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }
}

/// Broken-down local time, as returned by `localtime_r`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilTime {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl CivilTime {
    /// `YYYY-MM-DD HH:MM:SS`.
    pub fn format(&self) -> ClockText {
        let mut out = ClockText::new();
        // 19 chars always fit the 24-byte buffer
        let _ = write!(
            out,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        );
        out
    }
}

#[cfg(target_os = "espidf")]
fn local_time() -> Option<CivilTime> {
    use core::ptr;
    use esp_idf_svc::sys;

    let mut tv = sys::timeval {
        tv_sec: 0,
        tv_usec: 0,
    };
    if unsafe { sys::gettimeofday(&mut tv, ptr::null_mut()) } != 0 {
        return None;
    }
    if (tv.tv_sec as i64) < EPOCH_2020 {
        return None;
    }
    let secs = tv.tv_sec as sys::time_t;
    let mut tm: sys::tm = unsafe { core::mem::zeroed() };
    if unsafe { sys::localtime_r(&secs, &mut tm) }.is_null() {
        return None;
    }
    Some(CivilTime {
        year: tm.tm_year + 1900,
        month: (tm.tm_mon + 1) as u8,
        day: tm.tm_mday as u8,
        hour: tm.tm_hour as u8,
        minute: tm.tm_min as u8,
        second: tm.tm_sec as u8,
    })
}

#[cfg(not(target_os = "espidf"))]
fn local_time() -> Option<CivilTime> {
    None
}

impl ClockPort for SystemClock {
    fn wall_clock(&self) -> Option<ClockText> {
        local_time().map(|t| t.format())
    }
}
