//! Outbound application events.
//!
//! The [`DeviceService`](super::service::DeviceService) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  The adapter on the
//! other side decides what to do with them; on the node they go to the log.

use crate::app::commands::AppCommand;
use crate::fsm::StateId;
use crate::link::MessageType;
use crate::power::WakeReason;

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Boot classified.
    Booted { wake: WakeReason, boot_count: u32 },

    /// The lifecycle machine changed state.
    StateChanged { from: StateId, to: StateId },

    /// A message went out in `frames` frames.
    MessageSent { kind: MessageType, frames: usize },

    /// The transport rejected a frame; the rest of the message was dropped.
    SendFailed { kind: MessageType },

    /// A button gesture was turned into a command.
    Command(AppCommand),

    /// The persistent log was full and has been drained or reset.
    LogRotated { drained: bool },

    /// Wake sources armed; the next thing the chip does is halt.
    EnteringDeepSleep { wakeup_secs: u32 },
}
