//! Property tests for the peer link and the observed-value cell.
//!
//! Runs on host (x86_64) only; proptest is not available for ESP32 targets.

#![cfg(not(target_os = "espidf"))]

use levelsense::error::SendError;
use levelsense::link::frame::{MAX_CONTENT, OutboundMessage};
use levelsense::link::reassembly::{DEFAULT_TIMEOUT_MS, Reassembler};
use levelsense::link::{FRAME_LEN, MessageType, Transport, send_message};
use levelsense::sensors::ObservedValue;
use proptest::prelude::*;

#[derive(Default)]
struct Capture(Vec<[u8; FRAME_LEN]>);

impl Transport for Capture {
    type Error = SendError;

    fn send(&mut self, frame: &[u8; FRAME_LEN]) -> Result<(), SendError> {
        self.0.push(*frame);
        Ok(())
    }
}

fn kind() -> impl Strategy<Value = MessageType> {
    prop_oneof![
        Just(MessageType::SensorInfo),
        Just(MessageType::Log),
        Just(MessageType::Command),
    ]
}

proptest! {
    /// Whatever goes through the framer comes out of the reassembler
    /// unchanged, in exactly one complete message.
    #[test]
    fn framer_reassembler_round_trip(
        kind in kind(),
        body in proptest::collection::vec(1u8..=255, 0..3000),
    ) {
        let mut link = Capture::default();
        let frames = send_message(&mut link, kind, &body).unwrap();
        prop_assert_eq!(frames, link.0.len());

        let mut rx = Reassembler::new(DEFAULT_TIMEOUT_MS);
        let mut done = Vec::new();
        for (i, wire) in link.0.iter().enumerate() {
            let msg = OutboundMessage::decode(wire).unwrap();
            if let Some(m) = rx.feed(&msg, i as u32) {
                done.push(m);
            }
        }
        prop_assert_eq!(done, vec![(kind, body)]);
    }

    /// Short payloads use one page-0 frame; longer ones are numbered 1..=N.
    #[test]
    fn single_frame_iff_it_fits(len in 0usize..2000) {
        let body = vec![b'a'; len];
        let mut link = Capture::default();
        send_message(&mut link, MessageType::Log, &body).unwrap();

        let pages: Vec<i32> = link
            .0
            .iter()
            .map(|w| OutboundMessage::decode(w).unwrap().page())
            .collect();
        if len <= MAX_CONTENT {
            prop_assert_eq!(pages, vec![0]);
        } else {
            let expected: Vec<i32> = (1..=len.div_ceil(MAX_CONTENT) as i32).collect();
            prop_assert_eq!(pages, expected);
        }
    }

    /// `changed` reflects only the last record against the value before it.
    #[test]
    fn observed_value_changed_tracks_last_record(values in proptest::collection::vec(0u8..4, 1..50)) {
        let mut cell = ObservedValue::new();
        let mut before: Option<u8> = None;
        for v in values {
            cell.record(v);
            prop_assert_eq!(cell.changed(), before != Some(v));
            prop_assert_eq!(cell.current(), Some(&v));
            before = Some(v);
        }
    }
}
