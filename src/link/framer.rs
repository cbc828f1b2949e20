//! Message framer: splits a payload into ordered frames and hands them to
//! a [`Transport`].
//!
//! ```text
//! L <  240  →  one frame, page 0
//! L >= 240  →  n = ceil(L / 239) frames, pages 1..=n, 239-byte slices
//! ```
//!
//! Slices are contiguous and non-overlapping, so concatenating pages
//! `1..=n` reproduces the payload byte for byte.  Payloads are text:
//! the receiver treats the first NUL as the end of a slice.

use log::warn;

use super::frame::{MAX_CONTENT, MessageType, OutboundMessage};
use super::transport::Transport;
use crate::app::ports::LogSink;
use crate::error::SendError;

/// Number of frames `len` bytes need.
pub const fn page_count_for(len: usize) -> usize {
    if len <= MAX_CONTENT { 1 } else { len.div_ceil(MAX_CONTENT) }
}

/// Iterator over the frames of one message.
pub struct Pages<'a> {
    kind: MessageType,
    single: Option<&'a [u8]>,
    chunks: core::slice::Chunks<'a, u8>,
    next_page: u16,
    page_count: u16,
}

impl Iterator for Pages<'_> {
    type Item = OutboundMessage;

    fn next(&mut self) -> Option<OutboundMessage> {
        if let Some(body) = self.single.take() {
            return OutboundMessage::single(self.kind, body).ok();
        }
        let chunk = self.chunks.next()?;
        let msg = OutboundMessage::part(self.kind, chunk, self.next_page, self.page_count).ok();
        self.next_page += 1;
        msg
    }
}

/// Split `payload` into frames.
pub fn paginate(kind: MessageType, payload: &[u8]) -> Result<Pages<'_>, SendError> {
    let pages = page_count_for(payload.len());
    let page_count = u16::try_from(pages).map_err(|_| SendError::PayloadTooLarge(payload.len()))?;

    // L == MAX_CONTENT still fits one terminated frame.
    if payload.len() <= MAX_CONTENT {
        return Ok(Pages {
            kind,
            single: Some(payload),
            chunks: <&[u8]>::default().chunks(MAX_CONTENT),
            next_page: 0,
            page_count: 0,
        });
    }

    Ok(Pages {
        kind,
        single: None,
        chunks: payload.chunks(MAX_CONTENT),
        next_page: 1,
        page_count,
    })
}

/// Frame and send `payload`, in order, without waiting for delivery.
///
/// Stops at the first frame the transport refuses; the receiver drops the
/// incomplete message.  Returns the number of frames queued.
pub fn send_message<T: Transport>(
    link: &mut T,
    kind: MessageType,
    payload: &[u8],
) -> Result<usize, SendError> {
    let mut sent = 0;
    for msg in paginate(kind, payload)? {
        link.send(&msg.encode()).map_err(Into::into)?;
        sent += 1;
    }
    Ok(sent)
}

// ── Log drain over the link ───────────────────────────────────

/// [`LogSink`] that ships drained log content as `Log` messages.
pub struct UplinkLogSink<'a, T: Transport> {
    link: &'a mut T,
}

impl<'a, T: Transport> UplinkLogSink<'a, T> {
    pub fn new(link: &'a mut T) -> Self {
        Self { link }
    }
}

impl<T: Transport> LogSink for UplinkLogSink<'_, T> {
    fn flush(&mut self, buffer: &[u8]) -> bool {
        match send_message(&mut *self.link, MessageType::Log, buffer) {
            Ok(_) => true,
            Err(e) => {
                warn!("Link: log drain failed: {}", e);
                false
            }
        }
    }
}
