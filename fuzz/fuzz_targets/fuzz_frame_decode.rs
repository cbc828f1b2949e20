//! Fuzz target: `OutboundMessage::decode` + `Reassembler::feed`
//!
//! Splits the input into 250-byte frames and pushes every one that decodes
//! through a reassembler.  Neither step may panic, and whatever decodes must
//! re-encode to a frame that decodes to the same message.
//!
//! cargo fuzz run fuzz_frame_decode

#![no_main]

use levelsense::link::frame::{MAX_CONTENT, OutboundMessage};
use levelsense::link::reassembly::{DEFAULT_TIMEOUT_MS, Reassembler};
use levelsense::link::FRAME_LEN;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut rx = Reassembler::new(DEFAULT_TIMEOUT_MS);

    for (i, wire) in data.chunks(FRAME_LEN).enumerate() {
        let Ok(msg) = OutboundMessage::decode(wire) else {
            continue;
        };
        assert!(msg.content().len() <= MAX_CONTENT);
        assert_eq!(OutboundMessage::decode(&msg.encode()).ok(), Some(msg.clone()));

        // Large time steps exercise the stale-partial path too.
        let _ = rx.feed(&msg, (i as u32).wrapping_mul(997));
    }
});
