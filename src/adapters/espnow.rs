//! ESP-NOW uplink adapter.
//!
//! Brings the WiFi driver up in station mode (started, never associated),
//! registers the gateway as the single ESP-NOW peer and implements
//! [`Transport`] and [`NetworkScanPort`] on top of it.  Delivery status
//! from the driver callback is forwarded to a static
//! [`TransportListener`].
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::wifi` + `esp_idf_svc::espnow`.
//! - **all other targets**: frames are recorded in memory and scans return
//!   a fixed list, for host-side tests and the simulation loop.

use log::info;

use crate::app::ports::{MAX_SCAN_RESULTS, NetworkScanPort, NetworkSummary, TransportListener};
use crate::config::MacAddress;
use crate::error::SendError;
use crate::link::{FRAME_LEN, Transport};

#[cfg(target_os = "espidf")]
use crate::error::Error;
#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    espnow::{EspNow, PeerInfo, SendStatus},
    eventloop::EspSystemEventLoop,
    hal::modem::Modem,
    nvs::EspDefaultNvsPartition,
    wifi::{BlockingWifi, ClientConfiguration, Configuration, EspWifi},
};

// ── Scan result shaping ───────────────────────────────────────

/// Strongest networks first, hidden SSIDs dropped, at most
/// [`MAX_SCAN_RESULTS`] kept.
pub fn strongest_networks<'a>(
    found: impl IntoIterator<Item = (&'a str, i8)>,
) -> heapless::Vec<NetworkSummary, MAX_SCAN_RESULTS> {
    let mut all: Vec<(&str, i8)> = found.into_iter().filter(|(s, _)| !s.is_empty()).collect();
    all.sort_by(|a, b| b.1.cmp(&a.1));

    let mut out = heapless::Vec::new();
    for (ssid, rssi) in all.into_iter().take(MAX_SCAN_RESULTS) {
        let Ok(ssid) = heapless::String::try_from(ssid) else {
            continue;
        };
        // take() bounds the count to the capacity
        let _ = out.push(NetworkSummary { ssid, rssi });
    }
    out
}

// ── Link ──────────────────────────────────────────────────────

pub struct EspNowLink {
    peer: MacAddress,
    #[cfg(target_os = "espidf")]
    wifi: BlockingWifi<EspWifi<'static>>,
    #[cfg(target_os = "espidf")]
    espnow: EspNow<'static>,
    #[cfg(not(target_os = "espidf"))]
    sent: Vec<[u8; FRAME_LEN]>,
    #[cfg(not(target_os = "espidf"))]
    listener: &'static dyn TransportListener,
}

impl EspNowLink {
    /// Start the radio and register `peer`.
    #[cfg(target_os = "espidf")]
    pub fn start(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
        peer: MacAddress,
        listener: &'static dyn TransportListener,
    ) -> Result<Self, Error> {
        let rc = |e: esp_idf_svc::sys::EspError| Error::TransportInit(e.code());

        let mut wifi =
            BlockingWifi::wrap(EspWifi::new(modem, sysloop.clone(), nvs).map_err(rc)?, sysloop)
                .map_err(rc)?;
        wifi.set_configuration(&Configuration::Client(ClientConfiguration::default()))
            .map_err(rc)?;
        wifi.start().map_err(rc)?;

        let espnow = EspNow::take().map_err(rc)?;
        espnow
            .add_peer(PeerInfo {
                peer_addr: peer.octets(),
                channel: 0,
                ifidx: esp_idf_svc::sys::wifi_interface_t_WIFI_IF_STA,
                encrypt: false,
                ..Default::default()
            })
            .map_err(rc)?;
        espnow
            .register_send_cb(move |mac: &[u8], status: SendStatus| {
                let mut addr = [0u8; 6];
                if let Some(src) = mac.get(..6) {
                    addr.copy_from_slice(src);
                }
                listener.on_send_result(&MacAddress(addr), matches!(status, SendStatus::SUCCESS));
            })
            .map_err(rc)?;

        info!("Link: ESP-NOW up, gateway {}", peer);
        Ok(Self { peer, wifi, espnow })
    }

    /// Simulation link: frames are kept for inspection.
    #[cfg(not(target_os = "espidf"))]
    pub fn start(peer: MacAddress, listener: &'static dyn TransportListener) -> Self {
        info!("Link(sim): gateway {}", peer);
        Self {
            peer,
            sent: Vec::new(),
            listener,
        }
    }

    pub fn peer(&self) -> MacAddress {
        self.peer
    }

    /// Frames handed to the simulated radio.
    #[cfg(not(target_os = "espidf"))]
    pub fn sent(&self) -> &[[u8; FRAME_LEN]] {
        &self.sent
    }
}

impl Transport for EspNowLink {
    type Error = SendError;

    #[cfg(target_os = "espidf")]
    fn send(&mut self, frame: &[u8; FRAME_LEN]) -> Result<(), SendError> {
        self.espnow
            .send(self.peer.octets(), frame)
            .map_err(|e| SendError::Rejected(e.code()))
    }

    #[cfg(not(target_os = "espidf"))]
    fn send(&mut self, frame: &[u8; FRAME_LEN]) -> Result<(), SendError> {
        self.sent.push(*frame);
        self.listener.on_send_result(&self.peer, true);
        Ok(())
    }
}

impl NetworkScanPort for EspNowLink {
    #[cfg(target_os = "espidf")]
    fn scan_networks(&mut self) -> heapless::Vec<NetworkSummary, MAX_SCAN_RESULTS> {
        match self.wifi.scan() {
            Ok(aps) => strongest_networks(aps.iter().map(|ap| (ap.ssid.as_str(), ap.signal_strength))),
            Err(e) => {
                log::warn!("Link: scan failed: {}", e);
                heapless::Vec::new()
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn scan_networks(&mut self) -> heapless::Vec<NetworkSummary, MAX_SCAN_RESULTS> {
        strongest_networks([("levelsense-bench", -48), ("guest", -71)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::transport::DeliveryStats;

    static STATS: DeliveryStats = DeliveryStats::new();

    #[test]
    fn strongest_first_and_capped() {
        let names: Vec<String> = (0..12).map(|i| format!("ap{i}")).collect();
        let found = names.iter().enumerate().map(|(i, n)| (n.as_str(), -90 + i as i8));
        let nets = strongest_networks(found);
        assert_eq!(nets.len(), MAX_SCAN_RESULTS);
        assert_eq!(nets[0].ssid.as_str(), "ap11");
        assert!(nets.windows(2).all(|w| w[0].rssi >= w[1].rssi));
    }

    #[test]
    fn hidden_networks_dropped() {
        let nets = strongest_networks([("", -30), ("home", -60)]);
        assert_eq!(nets.len(), 1);
        assert_eq!(nets[0].ssid.as_str(), "home");
    }

    #[test]
    fn sim_link_records_frames_and_reports_delivery() {
        let mut link = EspNowLink::start(MacAddress([2, 0, 0, 0, 0, 1]), &STATS);
        let before = STATS.delivered();
        link.send(&[7u8; FRAME_LEN]).unwrap();
        assert_eq!(link.sent().len(), 1);
        assert_eq!(STATS.delivered(), before + 1);
    }
}
