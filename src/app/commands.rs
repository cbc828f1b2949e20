//! Inbound commands to the device service.
//!
//! Produced by the button map in [`ui`](crate::ui) and interpreted by
//! [`DeviceService`](super::service::DeviceService).

use crate::ui::Menu;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Switch the panel to another menu.
    ShowMenu(Menu),

    /// Scan for access points and show the result list.
    WifiScan,

    /// Delete the persistent log.
    TruncateLog,

    /// Send the log tail to the gateway as a Log message.
    PublishLog,

    /// Show the sleep screen and start the deep-sleep sequence now.
    SleepNow,
}
