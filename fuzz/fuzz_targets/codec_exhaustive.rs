//! Fuzzer for the frame codec and stream reframing.
//!
//! Feeds arbitrary bytes through every total entry point and checks the
//! invariants that must hold for ALL inputs:
//! - normalization is idempotent
//! - the lenient scan never panics and never produces out-of-bounds ranges
//! - envelope validation never panics
//! - reframing only ever emits frames that start at `8=` and end with a
//!   digit-valid checksum trailer, and feeding those frames onward never
//!   panics the session state machine

#![no_main]

use fixline_core::session::{Controller, Role};
use fixline_proto::{
    envelope,
    tokenizer::{SOH, normalize_bytes, split_fields, split_fields_strict},
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // INVARIANT 1: normalization is idempotent
    let once = normalize_bytes(data).into_owned();
    let twice = normalize_bytes(&once).into_owned();
    assert_eq!(once, twice, "normalize must be idempotent");

    // INVARIANT 2: the lenient scan is total and in-bounds
    let text = String::from_utf8_lossy(&once).into_owned();
    for field in split_fields(&text) {
        assert!(field.tag > 0, "scanned tags are positive");
        assert!(field.value.start <= field.value.end);
        assert!(field.value.end <= text.len(), "ranges stay in bounds");
    }

    // INVARIANT 3: the strict scan agrees with the lenient one on success
    if let Ok(strict) = split_fields_strict(&text) {
        assert_eq!(strict, split_fields(&text));
    }

    // INVARIANT 4: envelope validation is total
    let _ = envelope::validate_envelope(&once);

    // INVARIANT 5: reframing emits only well-delimited frames, and the
    // session state machine accepts arbitrary frames without panicking
    let mut controller = Controller::new("FUZZER", "PEER", Role::Acceptor);
    for frame in controller.consume(data) {
        assert!(frame.starts_with(b"8="), "frames start at BeginString");
        assert_eq!(frame.last(), Some(&SOH), "frames end with SOH");
        let trailer = &frame[frame.len() - 8..];
        assert!(trailer.starts_with(&[SOH, b'1', b'0', b'=']), "checksum trailer present");
        assert!(trailer[4..7].iter().all(u8::is_ascii_digit), "checksum digits");

        let action = controller.on_message(&frame);
        for outbound in &action.outbound {
            assert!(envelope::validate_envelope(outbound).is_ok(), "outbound self-valid");
        }
    }
});
