//! SPIFFS mount.
//!
//! Registers the `storage` partition under [`BASE_PATH`] so the config
//! file and the persistent log are reachable through `std::fs`.  A
//! partition that fails to mount is formatted once.

use crate::app::ports::ConfigError;

/// VFS prefix for every file on the data partition.
pub const BASE_PATH: &str = "/spiffs";

#[cfg(target_os = "espidf")]
pub fn mount() -> Result<(), ConfigError> {
    use esp_idf_svc::sys;

    let conf = sys::esp_vfs_spiffs_conf_t {
        base_path: c"/spiffs".as_ptr(),
        partition_label: core::ptr::null(),
        max_files: 4,
        format_if_mount_failed: true,
    };
    // SAFETY: `conf` outlives the call; the driver copies the paths.
    let ret = unsafe { sys::esp_vfs_spiffs_register(&conf) };
    if ret != sys::ESP_OK as i32 {
        return Err(ConfigError::StorageUnavailable(ret));
    }

    let (mut total, mut used) = (0usize, 0usize);
    // SAFETY: out-pointers to locals.
    if unsafe { sys::esp_spiffs_info(core::ptr::null(), &mut total, &mut used) } == sys::ESP_OK as i32 {
        log::info!("SPIFFS: mounted at {} ({}/{} bytes used)", BASE_PATH, used, total);
    }
    Ok(())
}

/// Simulation: files live under the host's working directory instead.
#[cfg(not(target_os = "espidf"))]
pub fn mount() -> Result<(), ConfigError> {
    log::info!("SPIFFS(sim): mount skipped");
    Ok(())
}
