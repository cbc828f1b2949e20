//! Peer link: fixed-size frames over a fire-and-forget transport.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       Link Stack                           │
//! │                                                            │
//! │  payload ──▶ ┌──────────┐ ──▶ ┌──────────┐ ──▶ ┌─────────┐ │
//! │              │  Framer  │     │  Frame   │     │Transport│ │
//! │              │ (paging) │     │ (250 B)  │     │ (trait) │ │
//! │              └──────────┘     └──────────┘     └─────────┘ │
//! │                                                     │      │
//! │  gateway ◀── ┌────────────┐ ◀── decode ◀────────────┘      │
//! │              │ Reassembler│                                │
//! │              └────────────┘                                │
//! └────────────────────────────────────────────────────────────┘
//! ```

pub mod frame;
pub mod framer;
pub mod reassembly;
pub mod transport;

pub use frame::{FRAME_LEN, MessageType, OutboundMessage};
pub use framer::send_message;
pub use transport::{NullTransport, Transport, Uplink};
