//! Sensor subsystem: the observed-value cell and the two samplers.
//!
//! Each sampler owns its [`ObservedValue`]; nothing else writes the sample
//! fields.  The presentation path only touches `last_rendered`.

pub mod battery;
pub mod water_level;

use serde::Serialize;

/// Home-automation device update, the telemetry unit the gateway forwards.
///
/// Serialises as `{"idx":8,"nvalue":0}` or, with a string value,
/// `{"idx":6,"nvalue":0,"svalue":"3.92"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceUpdate {
    pub idx: u32,
    pub nvalue: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub svalue: Option<String>,
}

/// A sampled value plus the bookkeeping the display needs.
///
/// ```text
///   record(v):  changed ← v ≠ current
///               if changed: previous ← current
///               current ← v
///   mark_rendered():  last_rendered ← current
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedValue<T> {
    previous: Option<T>,
    current: Option<T>,
    changed: bool,
    last_rendered: Option<T>,
}

impl<T: Clone + PartialEq> ObservedValue<T> {
    pub const fn new() -> Self {
        Self {
            previous: None,
            current: None,
            changed: false,
            last_rendered: None,
        }
    }

    /// Store a new sample.  `changed` compares against the value held
    /// immediately before this call, never against older history.
    pub fn record(&mut self, value: T) {
        self.changed = self.current.as_ref() != Some(&value);
        if self.changed {
            self.previous = self.current.replace(value);
        } else {
            self.current = Some(value);
        }
    }

    /// A read failed: keep the value, clear `changed`.
    pub fn record_failure(&mut self) {
        self.changed = false;
    }

    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    pub fn previous(&self) -> Option<&T> {
        self.previous.as_ref()
    }

    pub fn changed(&self) -> bool {
        self.changed
    }

    /// True when the screen shows something other than `current`.
    pub fn needs_render(&self) -> bool {
        self.current.is_some() && self.current != self.last_rendered
    }

    pub fn mark_rendered(&mut self) {
        self.last_rendered.clone_from(&self.current);
    }

    /// Forget what is on screen so the next refresh redraws.
    pub fn invalidate_render(&mut self) {
        self.last_rendered = None;
    }

    pub fn last_rendered(&self) -> Option<&T> {
        self.last_rendered.as_ref()
    }
}

impl<T: Clone + PartialEq> Default for ObservedValue<T> {
    fn default() -> Self {
        Self::new()
    }
}
