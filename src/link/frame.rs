//! Fixed-size peer-link frame.
//!
//! Every frame is exactly [`FRAME_LEN`] bytes, the ESP-NOW payload limit.
//! The first 248 bytes match the gateway's C layout
//! `{ char content[240]; uint32 type; int32 page; }`; the trailing
//! `page_count` tells the receiver when a multi-frame message is complete.
//!
//! ```text
//! ┌──────────────────────────────┬────────┬────────┬────────────┐
//! │ content (240, NUL padded)    │ type   │ page   │ page_count │
//! │ 0..240                       │ u32 LE │ i32 LE │ u16 LE     │
//! └──────────────────────────────┴────────┴────────┴────────────┘
//! ```

use core::fmt;

/// Content bytes per frame, including the NUL terminator.
pub const CONTENT_CAPACITY: usize = 240;

/// Payload bytes carried by one frame (one byte is kept for the NUL).
pub const MAX_CONTENT: usize = CONTENT_CAPACITY - 1;

/// Bytes on the wire per frame.
pub const FRAME_LEN: usize = 250;

const TYPE_OFFSET: usize = CONTENT_CAPACITY;
const PAGE_OFFSET: usize = TYPE_OFFSET + 4;
const COUNT_OFFSET: usize = PAGE_OFFSET + 4;

/// What the payload means to the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MessageType {
    SensorInfo = 1,
    Log = 2,
    Command = 3,
}

impl MessageType {
    pub const fn from_u32(v: u32) -> Option<Self> {
        match v {
            1 => Some(Self::SensorInfo),
            2 => Some(Self::Log),
            3 => Some(Self::Command),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Buffer shorter than a full frame.
    TooShort(usize),
    /// Content longer than [`MAX_CONTENT`].
    ContentTooLong(usize),
    UnknownType(u32),
    /// Page outside `0..=page_count`, or a page-0 frame with a count.
    BadPage { page: i32, page_count: u16 },
    /// No NUL within the content area.
    Unterminated,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort(n) => write!(f, "frame too short ({n} bytes)"),
            Self::ContentTooLong(n) => write!(f, "content too long ({n} bytes)"),
            Self::UnknownType(t) => write!(f, "unknown message type {t}"),
            Self::BadPage { page, page_count } => write!(f, "bad page {page}/{page_count}"),
            Self::Unterminated => write!(f, "content not NUL terminated"),
        }
    }
}

/// One frame's worth of message.
///
/// `page == 0` is a complete single-frame message; `1..=page_count` are the
/// ordered parts of a multi-frame message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    content: heapless::Vec<u8, MAX_CONTENT>,
    kind: MessageType,
    page: i32,
    page_count: u16,
}

impl OutboundMessage {
    /// A complete message in one frame.
    pub fn single(kind: MessageType, content: &[u8]) -> Result<Self, FrameError> {
        Self::build(kind, content, 0, 0)
    }

    /// Part `page` (1-based) of a `page_count`-frame message.
    pub fn part(
        kind: MessageType,
        content: &[u8],
        page: u16,
        page_count: u16,
    ) -> Result<Self, FrameError> {
        if page == 0 || page > page_count {
            return Err(FrameError::BadPage {
                page: i32::from(page),
                page_count,
            });
        }
        Self::build(kind, content, i32::from(page), page_count)
    }

    fn build(kind: MessageType, content: &[u8], page: i32, page_count: u16) -> Result<Self, FrameError> {
        let content = heapless::Vec::from_slice(content)
            .map_err(|()| FrameError::ContentTooLong(content.len()))?;
        Ok(Self {
            content,
            kind,
            page,
            page_count,
        })
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn kind(&self) -> MessageType {
        self.kind
    }

    pub fn page(&self) -> i32 {
        self.page
    }

    pub fn page_count(&self) -> u16 {
        self.page_count
    }

    pub fn is_single(&self) -> bool {
        self.page == 0
    }

    /// Wire image.  Unused content bytes are zero, which also terminates.
    pub fn encode(&self) -> [u8; FRAME_LEN] {
        let mut out = [0u8; FRAME_LEN];
        out[..self.content.len()].copy_from_slice(&self.content);
        out[TYPE_OFFSET..PAGE_OFFSET].copy_from_slice(&(self.kind as u32).to_le_bytes());
        out[PAGE_OFFSET..COUNT_OFFSET].copy_from_slice(&self.page.to_le_bytes());
        out[COUNT_OFFSET..FRAME_LEN].copy_from_slice(&self.page_count.to_le_bytes());
        out
    }

    pub fn decode(buf: &[u8]) -> Result<Self, FrameError> {
        if buf.len() < FRAME_LEN {
            return Err(FrameError::TooShort(buf.len()));
        }

        let len = buf[..CONTENT_CAPACITY]
            .iter()
            .position(|&b| b == 0)
            .ok_or(FrameError::Unterminated)?;

        let raw_type = u32::from_le_bytes([buf[240], buf[241], buf[242], buf[243]]);
        let kind = MessageType::from_u32(raw_type).ok_or(FrameError::UnknownType(raw_type))?;
        let page = i32::from_le_bytes([buf[244], buf[245], buf[246], buf[247]]);
        let page_count = u16::from_le_bytes([buf[248], buf[249]]);

        let page_ok = if page == 0 {
            page_count == 0
        } else {
            page > 0 && page <= i32::from(page_count)
        };
        if !page_ok {
            return Err(FrameError::BadPage { page, page_count });
        }

        Self::build(kind, &buf[..len], page, page_count)
    }
}
