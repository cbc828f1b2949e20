//! File-backed configuration source.
//!
//! Reads `config.json` from the SPIFFS partition through `std::fs` and
//! hands it to [`AppConfig::from_json`].  The node never writes the file;
//! it is provisioned together with the filesystem image.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::info;

use crate::app::ports::{ConfigError, ConfigSource};
use crate::config::AppConfig;

/// Where the provisioning image puts the node configuration.
pub const DEFAULT_CONFIG_PATH: &str = "/spiffs/config.json";

/// Largest document accepted; anything bigger is not a node config.
const MAX_CONFIG_BYTES: u64 = 4096;

pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigSource {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }
}

impl ConfigSource for FileConfigSource {
    fn load(&self) -> Result<AppConfig, ConfigError> {
        let meta = std::fs::metadata(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::IoError,
        })?;
        if meta.len() > MAX_CONFIG_BYTES {
            return Err(ConfigError::Corrupted);
        }
        let bytes = std::fs::read(&self.path).map_err(|_| ConfigError::IoError)?;
        let cfg = AppConfig::from_json(&bytes)?.sanitized();
        info!(
            "Config: loaded {} ({:?} mode)",
            self.path.display(),
            cfg.device.run_mode
        );
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DeviceSettings, RunMode};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("levelsense-cfg-{}-{}", std::process::id(), name))
    }

    #[test]
    fn missing_file_is_not_found() {
        let src = FileConfigSource::new(temp_path("missing.json"));
        assert_eq!(src.load(), Err(ConfigError::NotFound));
    }

    #[test]
    fn loads_and_sanitizes() {
        let path = temp_path("bad-range.json");
        std::fs::write(
            &path,
            r#"{ "device": { "runMode": "headless", "displaySleepTimeoutSecs": 1 } }"#,
        )
        .unwrap();
        let cfg = FileConfigSource::new(&path).load().unwrap();
        assert_eq!(cfg.device.run_mode, RunMode::Headless);
        assert_eq!(
            cfg.device.display_sleep_timeout_secs,
            DeviceSettings::default().display_sleep_timeout_secs
        );
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn garbage_is_corrupted() {
        let path = temp_path("garbage.json");
        std::fs::write(&path, b"\x00\x01 not json").unwrap();
        assert_eq!(FileConfigSource::new(&path).load(), Err(ConfigError::Corrupted));
        std::fs::remove_file(&path).unwrap();
    }
}
