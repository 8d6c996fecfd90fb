//! Delimiter normalization and tag=value tokenization.
//!
//! Two scan modes exist because the decoder and the session controller have
//! different contracts:
//!
//! - The **lenient** scan ([`split_fields`]) never fails. Tokens without an
//!   `=` or without a positive decimal tag prefix are skipped. The decoder
//!   uses it so that a damaged frame still yields every well-formed field.
//! - The **strict** scan ([`split_fields_strict`]) aborts at the first
//!   defect. The session controller uses it because a frame it cannot fully
//!   account for must be classified as garbled.
//!
//! Both scans produce [`RawField`]s holding byte-offset ranges into the
//! normalized input rather than borrowed slices, so the caller can own the
//! buffer and the fields in one aggregate.

use std::{borrow::Cow, ops::Range};

use crate::errors::ParseError;

/// SOH byte - the FIX field delimiter (ASCII `0x01`).
pub const SOH: u8 = 0x01;

/// Pipe byte - accepted on input as a readable stand-in for SOH.
const PIPE: u8 = b'|';

/// A single `tag=value` token located in a normalized message.
///
/// `value` is a byte range into the buffer the token was scanned from; the
/// range excludes the `=` and the terminating SOH.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawField {
    /// Numeric FIX tag (always positive).
    pub tag: u32,
    /// Byte range of the raw value within the normalized message.
    pub value: Range<usize>,
}

/// Normalize delimiters in a message.
///
/// Input that already contains SOH passes through unchanged (borrowed);
/// otherwise every `|` is replaced by SOH. The operation is idempotent:
/// `normalize(normalize(x)) == normalize(x)`.
#[must_use]
pub fn normalize(raw: &str) -> Cow<'_, str> {
    if raw.as_bytes().contains(&SOH) {
        return Cow::Borrowed(raw);
    }
    if raw.as_bytes().contains(&PIPE) {
        return Cow::Owned(raw.replace('|', "\u{1}"));
    }
    Cow::Borrowed(raw)
}

/// Byte-level variant of [`normalize`] for raw transport input.
#[must_use]
pub fn normalize_bytes(raw: &[u8]) -> Cow<'_, [u8]> {
    if raw.contains(&SOH) {
        return Cow::Borrowed(raw);
    }
    if raw.contains(&PIPE) {
        let normalized =
            raw.iter().map(|&b| if b == PIPE { SOH } else { b }).collect::<Vec<u8>>();
        return Cow::Owned(normalized);
    }
    Cow::Borrowed(raw)
}

/// Parse a tag prefix as a positive decimal integer.
///
/// Rejects empty input, any non-digit byte (including a leading `+`), and
/// zero. Mirrors full-consume integer parsing: `"34x"` is not a tag.
fn parse_tag(prefix: &str) -> Option<u32> {
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match prefix.parse::<u32>() {
        Ok(tag) if tag > 0 => Some(tag),
        _ => None,
    }
}

/// Lenient scan: collect every well-formed `tag=value` token in wire order.
///
/// A token is the byte run up to the next SOH (or end of buffer). Tokens
/// with no `=` before the delimiter, or whose tag prefix is not a positive
/// decimal integer, are skipped without aborting the scan.
#[must_use]
pub fn split_fields(message: &str) -> Vec<RawField> {
    let bytes = message.as_bytes();
    let mut result = Vec::new();

    let mut start = 0;
    while start < bytes.len() {
        let token_end = bytes[start..]
            .iter()
            .position(|&b| b == SOH)
            .map_or(bytes.len(), |off| start + off);

        if let Some(eq_off) = bytes[start..token_end].iter().position(|&b| b == b'=') {
            let eq_pos = start + eq_off;
            if let Some(tag) = parse_tag(&message[start..eq_pos]) {
                result.push(RawField { tag, value: (eq_pos + 1)..token_end });
            }
        }

        if token_end == bytes.len() {
            break;
        }
        start = token_end + 1;
    }

    result
}

/// Strict scan: every token must be well-formed and SOH-terminated.
///
/// # Errors
///
/// - [`ParseError::MissingFieldTerminator`] when the final token has no SOH
/// - [`ParseError::MalformedTagValue`] when a token has no `=`
/// - [`ParseError::TagNotNumeric`] when a tag prefix is not a positive
///   decimal integer
pub fn split_fields_strict(message: &str) -> Result<Vec<RawField>, ParseError> {
    let bytes = message.as_bytes();
    let mut result = Vec::new();

    let mut start = 0;
    while start < bytes.len() {
        let Some(off) = bytes[start..].iter().position(|&b| b == SOH) else {
            return Err(ParseError::MissingFieldTerminator);
        };
        let token_end = start + off;

        let Some(eq_off) = bytes[start..token_end].iter().position(|&b| b == b'=') else {
            return Err(ParseError::MalformedTagValue);
        };
        let eq_pos = start + eq_off;

        let Some(tag) = parse_tag(&message[start..eq_pos]) else {
            return Err(ParseError::TagNotNumeric);
        };

        result.push(RawField { tag, value: (eq_pos + 1)..token_end });
        start = token_end + 1;
    }

    Ok(result)
}

/// Extract the first value of `tag` from a raw (not necessarily normalized)
/// message, accepting both SOH and `|` as delimiters.
///
/// This is a delimiter-driven point lookup that avoids full tokenization;
/// the message-generator registry uses it to key builders off one tag (by
/// default MsgType) without decoding the frame.
#[must_use]
pub fn extract_tag_value(message: &str, tag: u32) -> Option<&str> {
    let bytes = message.as_bytes();
    let mut start = 0;

    while start < bytes.len() {
        let token_end = bytes[start..]
            .iter()
            .position(|&b| b == SOH || b == PIPE)
            .map_or(bytes.len(), |off| start + off);

        if let Some(eq_off) = bytes[start..token_end].iter().position(|&b| b == b'=') {
            let eq_pos = start + eq_off;
            if parse_tag(&message[start..eq_pos]) == Some(tag) {
                return Some(&message[eq_pos + 1..token_end]);
            }
        }

        if token_end == bytes.len() {
            break;
        }
        start = token_end + 1;
    }

    None
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn normalize_replaces_pipes_when_no_soh_present() {
        let normalized = normalize("8=FIX.4.2|35=T|");
        assert_eq!(normalized.as_bytes(), b"8=FIX.4.2\x0135=T\x01");
    }

    #[test]
    fn normalize_passes_soh_input_through() {
        let raw = "8=FIX.4.2\x0135=T|still-a-value\x01";
        let normalized = normalize(raw);
        assert_eq!(normalized.as_ref(), raw);
        assert!(matches!(normalized, Cow::Borrowed(_)));
    }

    #[test]
    fn lenient_scan_preserves_wire_order() {
        let message = "8=FIX.4.2\x0135=D\x0155=IBM\x01";
        let fields = split_fields(message);
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].tag, 8);
        assert_eq!(&message[fields[0].value.clone()], "FIX.4.2");
        assert_eq!(fields[2].tag, 55);
        assert_eq!(&message[fields[2].value.clone()], "IBM");
    }

    #[test]
    fn lenient_scan_skips_malformed_tokens() {
        // no '=', non-numeric tag, zero tag, then a good one
        let message = "garbage\x01X5=no\x010=zero\x0135=T\x01";
        let fields = split_fields(message);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].tag, 35);
    }

    #[test]
    fn lenient_scan_accepts_unterminated_final_token() {
        let fields = split_fields("8=FIX.4.2\x0135=T");
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].tag, 35);
    }

    #[test]
    fn strict_scan_rejects_missing_terminator() {
        assert_eq!(
            split_fields_strict("8=FIX.4.2\x0135=T"),
            Err(ParseError::MissingFieldTerminator)
        );
    }

    #[test]
    fn strict_scan_rejects_missing_equals() {
        assert_eq!(split_fields_strict("8=FIX.4.2\x01garbage\x01"), Err(ParseError::MalformedTagValue));
    }

    #[test]
    fn strict_scan_rejects_non_numeric_tag() {
        assert_eq!(split_fields_strict("8x=FIX.4.2\x01"), Err(ParseError::TagNotNumeric));
        assert_eq!(split_fields_strict("+8=FIX.4.2\x01"), Err(ParseError::TagNotNumeric));
    }

    #[test]
    fn strict_scan_keeps_empty_values() {
        let message = "58=\x01";
        let fields = split_fields_strict(message).unwrap();
        assert_eq!(fields.len(), 1);
        assert!(fields[0].value.is_empty());
    }

    #[test]
    fn extract_finds_value_across_both_delimiters() {
        assert_eq!(extract_tag_value("8=FIX.4.2|35=D|55=IBM|", 35), Some("D"));
        assert_eq!(extract_tag_value("8=FIX.4.2\x0135=D\x0155=IBM\x01", 55), Some("IBM"));
        assert_eq!(extract_tag_value("8=FIX.4.2|35=D|", 49), None);
    }

    #[test]
    fn extract_does_not_match_tag_prefixes() {
        // tag 3 must not match "35=" and tag 35 must not match "355="
        assert_eq!(extract_tag_value("35=D|355=x|", 3), None);
        assert_eq!(extract_tag_value("355=x|35=D|", 35), Some("D"));
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(raw in "[ -~\\x01]{0,64}") {
            let once = normalize(&raw).into_owned();
            let twice = normalize(&once).into_owned();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn lenient_scan_is_total(raw in "[ -~\\x01]{0,128}") {
            // Must never panic, and every produced range must be in bounds.
            for field in split_fields(&raw) {
                prop_assert!(field.value.end <= raw.len());
                prop_assert!(field.value.start <= field.value.end);
            }
        }

        #[test]
        fn strict_scan_agrees_with_lenient_on_success(raw in "[ -~\\x01]{0,128}") {
            if let Ok(strict) = split_fields_strict(&raw) {
                prop_assert_eq!(strict, split_fields(&raw));
            }
        }
    }
}
