//! Unified error types for the LevelSense firmware.
//!
//! Every subsystem error converts into [`Error`], so the event loop can log
//! any failure through one `Display` path.  All variants are `Copy` so they
//! travel through the service and the state machine without allocation.
//!
//! Only [`Error::SleepArm`] is fatal.  Everything else is logged and
//! absorbed by the caller.

use core::fmt;

use crate::app::ports::ConfigError;
use crate::logstore::LogError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Configuration file missing, unreadable or malformed.
    ConfigLoad(ConfigError),
    /// The peer link could not be brought up (ESP-IDF error code).
    TransportInit(i32),
    /// A frame could not be handed to the transport.
    Send(SendError),
    /// Persistent log rejected a write or could not be read.
    Log(LogError),
    /// A sensor read failed; the previous value stays in place.
    Sensor(SensorError),
    /// A wake source could not be armed.  The device must not sleep.
    SleepArm(SleepArmError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigLoad(e) => write!(f, "config: {e}"),
            Self::TransportInit(rc) => write!(f, "transport init failed (rc={rc})"),
            Self::Send(e) => write!(f, "send: {e}"),
            Self::Log(e) => write!(f, "log: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::SleepArm(e) => write!(f, "sleep arm: {e}"),
        }
    }
}

impl Error {
    /// Whether the firmware must halt instead of continuing.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::SleepArm(_))
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::ConfigLoad(e)
    }
}

impl From<LogError> for Error {
    fn from(e: LogError) -> Self {
        Self::Log(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// ADC read returned an error.
    AdcReadFailed(i32),
    /// GPIO level could not be sampled.
    GpioReadFailed,
    /// Reading is outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdcReadFailed(rc) => write!(f, "ADC read failed (rc={rc})"),
            Self::GpioReadFailed => write!(f, "GPIO read failed"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Link errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    /// Payload needs more pages than the frame header can count.
    PayloadTooLarge(usize),
    /// The driver refused the frame (ESP-IDF error code, 0 in simulation).
    Rejected(i32),
    /// No peer is registered.
    NoPeer,
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PayloadTooLarge(len) => write!(f, "payload of {len} bytes too large"),
            Self::Rejected(rc) => write!(f, "frame rejected (rc={rc})"),
            Self::NoPeer => write!(f, "no peer registered"),
        }
    }
}

impl From<SendError> for Error {
    fn from(e: SendError) -> Self {
        Self::Send(e)
    }
}

// ---------------------------------------------------------------------------
// Sleep arming errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepArmError {
    /// External pin wake source rejected (ESP-IDF error code).
    ExternalPin(i32),
    /// Timer wake source rejected (ESP-IDF error code).
    Timer(i32),
}

impl fmt::Display for SleepArmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExternalPin(rc) => write!(f, "external pin wakeup (rc={rc})"),
            Self::Timer(rc) => write!(f, "timer wakeup (rc={rc})"),
        }
    }
}

impl From<SleepArmError> for Error {
    fn from(e: SleepArmError) -> Self {
        Self::SleepArm(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
