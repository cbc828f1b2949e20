//! Receiver-side reassembly of multi-frame messages.
//!
//! Used by the gateway side of the link and by the host simulation.
//! Frames arrive best-effort: a gap, a type change or a stale partial
//! discards the partial message instead of delivering corrupt data.

extern crate alloc;
use alloc::vec::Vec;

use log::warn;

use super::frame::{MessageType, OutboundMessage};

/// Default time a partial message may wait for its next page.
pub const DEFAULT_TIMEOUT_MS: u32 = 2000;

struct Partial {
    kind: MessageType,
    page_count: u16,
    next_page: u16,
    last_rx_ms: u32,
    buffer: Vec<u8>,
}

/// Reassembly buffer for incoming frames.
pub struct Reassembler {
    partial: Option<Partial>,
    timeout_ms: u32,
}

impl Reassembler {
    pub fn new(timeout_ms: u32) -> Self {
        Self {
            partial: None,
            timeout_ms,
        }
    }

    /// Feed one decoded frame received at `now_ms`.
    ///
    /// Returns the complete payload when a page-0 frame or the last page of
    /// a multi-frame message arrives.
    pub fn feed(&mut self, msg: &OutboundMessage, now_ms: u32) -> Option<(MessageType, Vec<u8>)> {
        self.expire(now_ms);

        if msg.is_single() {
            return Some((msg.kind(), msg.content().to_vec()));
        }

        let page = msg.page() as u16;

        if page == 1 {
            if self.partial.is_some() {
                warn!("Reassembly: new message started, dropping partial");
            }
            self.partial = Some(Partial {
                kind: msg.kind(),
                page_count: msg.page_count(),
                next_page: 1,
                last_rx_ms: now_ms,
                buffer: Vec::new(),
            });
        }

        let Some(partial) = self.partial.as_mut() else {
            warn!("Reassembly: page {} without a start, dropped", page);
            return None;
        };

        if page != partial.next_page
            || msg.kind() != partial.kind
            || msg.page_count() != partial.page_count
        {
            warn!(
                "Reassembly: expected page {}/{}, got {}/{}; discarding",
                partial.next_page,
                partial.page_count,
                page,
                msg.page_count()
            );
            self.partial = None;
            return None;
        }

        partial.buffer.extend_from_slice(msg.content());
        partial.next_page += 1;
        partial.last_rx_ms = now_ms;

        if page == partial.page_count {
            let done = self.partial.take()?;
            Some((done.kind, done.buffer))
        } else {
            None
        }
    }

    /// Whether a multi-frame message is in progress.
    pub fn is_active(&self) -> bool {
        self.partial.is_some()
    }

    /// Drop the partial if its last page is older than the timeout.
    pub fn expire(&mut self, now_ms: u32) {
        if let Some(p) = &self.partial {
            if now_ms.wrapping_sub(p.last_rx_ms) > self.timeout_ms {
                warn!(
                    "Reassembly: timed out at page {}/{}",
                    p.next_page.saturating_sub(1),
                    p.page_count
                );
                self.partial = None;
            }
        }
    }

    pub fn reset(&mut self) {
        self.partial = None;
    }
}

impl Default for Reassembler {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT_MS)
    }
}

// ── Tests ────────────────────────────────────────────────────
