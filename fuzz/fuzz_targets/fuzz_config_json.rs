//! Fuzz target: `AppConfig::from_json`
//!
//! Whatever the config file holds, parsing must not panic and a sanitized
//! result must pass validation.
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use levelsense::config::{AppConfig, validate_settings};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(cfg) = AppConfig::from_json(data) {
        let cfg = cfg.sanitized();
        assert!(validate_settings(&cfg.device).is_ok());
    }
});
