//! Transport abstraction: anything that can carry one fixed-size frame
//! to the configured peer.
//!
//! Concrete implementations:
//! - ESP-NOW unicast to the gateway (`adapters::espnow`)
//! - [`NullTransport`] when the radio failed to come up
//!
//! Delivery is fire-and-forget.  `send` returning `Ok` means the driver
//! queued the frame; the over-the-air outcome arrives later through a
//! [`TransportListener`].

use core::sync::atomic::{AtomicU32, Ordering};

use super::frame::FRAME_LEN;
use crate::app::ports::{MAX_SCAN_RESULTS, NetworkScanPort, NetworkSummary, TransportListener};
use crate::config::MacAddress;
use crate::error::SendError;

/// Frame-oriented transport channel.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug + Into<SendError>;

    /// Queue one frame for the peer.  Must not block on delivery.
    fn send(&mut self, frame: &[u8; FRAME_LEN]) -> Result<(), Self::Error>;

    /// False when frames cannot leave the device at all.
    fn is_online(&self) -> bool {
        true
    }
}

/// The radio as the service sees it: frames out, plus station scans.
pub trait Uplink: Transport + NetworkScanPort {}

impl<T> Uplink for T where T: Transport + NetworkScanPort {}

/// A null transport that accepts and discards every frame.
/// Stands in when link initialisation failed, so sending is a no-op.
pub struct NullTransport;

impl Transport for NullTransport {
    type Error = SendError;

    fn send(&mut self, _frame: &[u8; FRAME_LEN]) -> Result<(), SendError> {
        Ok(())
    }

    fn is_online(&self) -> bool {
        false
    }
}

impl NetworkScanPort for NullTransport {
    fn scan_networks(&mut self) -> heapless::Vec<NetworkSummary, MAX_SCAN_RESULTS> {
        heapless::Vec::new()
    }
}

// ── Delivery statistics listener ──────────────────────────────

/// Counts delivery outcomes.
///
/// `on_send_result` runs in the WiFi driver task, so it only touches the
/// counters.  The main loop reports failures via
/// [`take_new_failures`](Self::take_new_failures).
#[derive(Default)]
pub struct DeliveryStats {
    delivered: AtomicU32,
    failed: AtomicU32,
    reported: AtomicU32,
}

impl DeliveryStats {
    pub const fn new() -> Self {
        Self {
            delivered: AtomicU32::new(0),
            failed: AtomicU32::new(0),
            reported: AtomicU32::new(0),
        }
    }

    pub fn delivered(&self) -> u32 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u32 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Failures counted since the previous call.
    pub fn take_new_failures(&self) -> u32 {
        let failed = self.failed();
        let before = self.reported.swap(failed, Ordering::Relaxed);
        failed.wrapping_sub(before)
    }
}

impl TransportListener for DeliveryStats {
    fn on_send_result(&self, _peer: &MacAddress, delivered: bool) {
        let counter = if delivered { &self.delivered } else { &self.failed };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_transport_accepts_everything() {
        let mut t = NullTransport;
        assert!(t.send(&[0u8; FRAME_LEN]).is_ok());
        assert!(!t.is_online());
    }

    #[test]
    fn stats_count_outcomes() {
        let stats = DeliveryStats::new();
        let peer = MacAddress([1, 2, 3, 4, 5, 6]);
        stats.on_send_result(&peer, true);
        stats.on_send_result(&peer, true);
        stats.on_send_result(&peer, false);
        assert_eq!(stats.delivered(), 2);
        assert_eq!(stats.failed(), 1);
    }

    #[test]
    fn new_failures_are_reported_once() {
        let stats = DeliveryStats::new();
        let peer = MacAddress([1, 2, 3, 4, 5, 6]);
        assert_eq!(stats.take_new_failures(), 0);
        stats.on_send_result(&peer, false);
        stats.on_send_result(&peer, false);
        assert_eq!(stats.take_new_failures(), 2);
        assert_eq!(stats.take_new_failures(), 0);
        stats.on_send_result(&peer, true);
        stats.on_send_result(&peer, false);
        assert_eq!(stats.take_new_failures(), 1);
    }
}
