//! Property-based tests for the session controller.
//!
//! These verify the counter invariants for all inputs proptest can throw at
//! them: outbound sequence numbers advance exactly once per build, accepted
//! inbound frames advance the expected counter exactly once, out-of-sync
//! and garbled frames leave it alone, and every built frame is its own
//! valid envelope input.

use chrono::{TimeZone, Utc};
use fixline_core::{
    Decoder,
    clock::FixedClock,
    session::{Controller, Disposition, Role, SessionConfig, SessionEvent},
};
use fixline_proto::{envelope, tag, tokenizer::split_fields};
use proptest::prelude::*;

fn controller(sender: &str, target: &str, role: Role) -> Controller {
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 6, 15, 9, 30, 0).unwrap());
    Controller::with_clock(sender, target, role, SessionConfig::default(), clock)
}

fn handshaken_pair() -> (Controller, Controller) {
    let mut initiator = controller("INITIATOR", "ACCEPTOR", Role::Initiator);
    let mut acceptor = controller("ACCEPTOR", "INITIATOR", Role::Acceptor);
    let reply = acceptor.on_message(&initiator.build_logon(false));
    initiator.on_message(&reply.outbound[0]);
    (initiator, acceptor)
}

fn seq_of(frame: &[u8]) -> Option<u32> {
    let text = String::from_utf8_lossy(frame).into_owned();
    split_fields(&text)
        .into_iter()
        .find(|f| f.tag == tag::MSG_SEQ_NUM)
        .and_then(|f| text[f.value].parse().ok())
}

// FIX values: printable ASCII without the field and token delimiters.
fn value_strategy() -> impl Strategy<Value = String> {
    "[ -<>-{}~]{1,16}"
}

fn msg_type_strategy() -> impl Strategy<Value = String> {
    "[A-Z0-9]{1,2}"
}

proptest! {
    #[test]
    fn outbound_seq_is_assigned_then_advanced_once(
        msg_type in msg_type_strategy(),
        values in prop::collection::vec(value_strategy(), 0..4),
    ) {
        let mut session = controller("ALPHA", "BETA", Role::Initiator);

        for round in 0..3u32 {
            let before = session.next_outgoing_seq();
            let fields = values
                .iter()
                .enumerate()
                .map(|(i, v)| (5000 + i as u32, v.clone()))
                .collect();
            let frame = session.build_application(&msg_type, fields);

            prop_assert_eq!(seq_of(&frame), Some(before));
            prop_assert_eq!(session.next_outgoing_seq(), before + 1);
            prop_assert_eq!(before, round + 1);
        }
    }

    #[test]
    fn built_frames_validate_their_own_envelope(
        msg_type in msg_type_strategy(),
        values in prop::collection::vec(value_strategy(), 0..6),
    ) {
        let mut session = controller("ALPHA", "BETA", Role::Initiator);
        let fields = values
            .iter()
            .enumerate()
            .map(|(i, v)| (6000 + i as u32, v.clone()))
            .collect();
        let frame = session.build_application(&msg_type, fields);

        prop_assert!(envelope::validate_envelope(&frame).is_ok());
    }

    #[test]
    fn accepted_messages_advance_expected_by_exactly_one(
        values in prop::collection::vec(value_strategy(), 0..3),
    ) {
        let (mut initiator, mut acceptor) = handshaken_pair();

        let fields = values
            .iter()
            .enumerate()
            .map(|(i, v)| (7000 + i as u32, v.clone()))
            .collect();
        let frame = initiator.build_application("D", fields);

        let before = acceptor.expected_incoming_seq();
        let action = acceptor.on_message(&frame);

        prop_assert_eq!(action.disposition, Disposition::Accepted);
        prop_assert_eq!(acceptor.expected_incoming_seq(), before + 1);
    }

    #[test]
    fn gap_high_never_advances_expected(delta in 1u32..1000) {
        let (mut initiator, mut acceptor) = handshaken_pair();

        initiator.skip_outbound_sequence(delta);
        let frame = initiator.build_heartbeat("");

        let before = acceptor.expected_incoming_seq();
        let action = acceptor.on_message(&frame);

        prop_assert_eq!(action.disposition, Disposition::OutOfSync);
        prop_assert_eq!(action.events, vec![SessionEvent::SequenceGap]);
        prop_assert_eq!(acceptor.expected_incoming_seq(), before);
    }

    #[test]
    fn garbled_frames_never_advance_expected(junk in "[ -~]{1,48}") {
        let (_, mut acceptor) = handshaken_pair();

        let before = acceptor.expected_incoming_seq();
        // Syntactically frame-shaped but with a broken envelope.
        let frame = format!("8=FIX.4.4\u{1}9=3\u{1}{junk}\u{1}10=000\u{1}");
        let action = acceptor.on_message(frame.as_bytes());

        prop_assert_eq!(action.disposition, Disposition::Garbled);
        prop_assert_eq!(acceptor.expected_incoming_seq(), before);
    }

    #[test]
    fn chunked_feed_matches_whole_feed(chunk in 1usize..32) {
        let mut peer = controller("BETA", "ALPHA", Role::Initiator);
        let first = peer.build_logon(false);
        let second = peer.build_application("D", vec![(tag::SYMBOL, "IBM".to_string())]);

        let mut stream = first.clone();
        stream.extend_from_slice(&second);

        let mut session = controller("ALPHA", "BETA", Role::Acceptor);
        let mut collected = Vec::new();
        for piece in stream.chunks(chunk) {
            collected.extend(session.consume(piece));
        }

        prop_assert_eq!(collected, vec![first, second]);
    }

    #[test]
    fn round_trip_decode_of_built_frames(
        values in prop::collection::vec(value_strategy(), 0..3),
    ) {
        let mut session = controller("ALPHA", "BETA", Role::Initiator);
        let fields: Vec<(u32, String)> = values
            .iter()
            .enumerate()
            .map(|(i, v)| (8000 + i as u32, v.clone()))
            .collect();
        let frame = session.build_application("D", fields);

        let decoder = Decoder::new();
        let text = String::from_utf8_lossy(&frame).into_owned();
        let decoded = decoder.decode(&text);

        prop_assert_eq!(decoded.begin_string(), session.begin_string());
        prop_assert_eq!(decoded.msg_type(), "D");
        prop_assert!(envelope::validate_envelope(&frame).is_ok());
    }
}
