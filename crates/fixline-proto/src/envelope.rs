//! BodyLength and CheckSum envelope validation.
//!
//! The envelope is only enforced for framed messages handed to the session
//! controller; the decoder deliberately skips it so that damaged captures
//! can still be inspected field by field.
//!
//! Layout of a valid frame:
//!
//! ```text
//! 8=<bs> SOH 9=<N> SOH <body: N bytes> 10=ddd SOH
//! ```
//!
//! The body runs from the byte after the `9=<N>` terminator up to and
//! including the SOH that precedes `10=`. The checksum is the byte sum of
//! everything before `10=` (including that SOH), modulo 256, rendered as
//! three zero-padded decimal digits.

use crate::{errors::FrameError, tokenizer::SOH};

/// The `SOH 1 0 =` byte pattern that opens the checksum trailer.
const TRAILER: [u8; 4] = [SOH, b'1', b'0', b'='];

/// Total byte length of the trailer: `SOH 10=ddd SOH`.
const TRAILER_LEN: usize = 8;

/// Compute the FIX checksum of `bytes`: byte sum modulo 256.
#[must_use]
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, &b| sum.wrapping_add(b))
}

/// Render a checksum as the three-digit zero-padded decimal FIX uses on the
/// wire.
#[must_use]
pub fn format_checksum(sum: u8) -> String {
    format!("{sum:03}")
}

/// Position of the last `SOH 1 0 =` in `frame`, i.e. the index of the SOH
/// that terminates the body.
fn find_trailer(frame: &[u8]) -> Option<usize> {
    frame.windows(TRAILER.len()).rposition(|window| window == TRAILER)
}

/// Full-consume unsigned decimal parse (rejects empty input, signs, and any
/// non-digit byte).
fn parse_uint(value: &[u8]) -> Option<u32> {
    if value.is_empty() || !value.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(value).ok()?.parse().ok()
}

/// Validate the `10=ddd` trailer against the computed byte sum.
///
/// The trailer must be the final 8 bytes of the frame and its three value
/// bytes must all be ASCII digits.
#[must_use]
pub fn validate_checksum(frame: &[u8]) -> bool {
    let Some(trailer) = find_trailer(frame) else {
        return false;
    };
    if trailer + TRAILER_LEN != frame.len() {
        return false;
    }

    let digits = &frame[trailer + 4..trailer + 7];
    let Some(expected) = parse_uint(digits) else {
        return false;
    };

    // Sum covers everything up to and including the SOH before "10=".
    u32::from(checksum(&frame[..=trailer])) == expected
}

/// Validate that the declared BodyLength matches the measured body.
///
/// The frame must open with `8=<bs> SOH 9=<N> SOH`; the measured body is the
/// byte run from after the tag-9 terminator to the SOH preceding `10=`.
#[must_use]
pub fn validate_body_length(frame: &[u8]) -> bool {
    if !frame.starts_with(b"8=") {
        return false;
    }

    let Some(begin_field_end) = frame.iter().position(|&b| b == SOH) else {
        return false;
    };
    if !frame[begin_field_end + 1..].starts_with(b"9=") {
        return false;
    }

    let Some(off) = frame[begin_field_end + 1..].iter().position(|&b| b == SOH) else {
        return false;
    };
    let body_field_end = begin_field_end + 1 + off;

    let Some(declared) = parse_uint(&frame[begin_field_end + 3..body_field_end]) else {
        return false;
    };

    let Some(trailer) = find_trailer(frame) else {
        return false;
    };
    if trailer < body_field_end {
        return false;
    }

    trailer - body_field_end == declared as usize
}

/// Validate the complete envelope of one frame.
///
/// # Errors
///
/// [`FrameError::BodyLength`] when the BodyLength check fails,
/// [`FrameError::CheckSum`] when the trailer check fails. BodyLength is
/// checked first.
pub fn validate_envelope(frame: &[u8]) -> Result<(), FrameError> {
    if !validate_body_length(frame) {
        return Err(FrameError::BodyLength);
    }
    if !validate_checksum(frame) {
        return Err(FrameError::CheckSum);
    }
    Ok(())
}
