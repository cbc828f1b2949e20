//! LevelSense firmware library.
//!
//! Exposes the pure-logic modules for integration testing and the binary.
//! All ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module, with host simulation paths alongside.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod link;
pub mod logstore;
pub mod pins;
pub mod power;
pub mod scheduler;
pub mod sensors;
pub mod ui;

pub use error::{Error, Result};
