//! Outbound frame assembly.
//!
//! [`FrameBuilder`] accumulates body fields in insertion order and emits a
//! complete wire frame with auto-computed BodyLength and CheckSum. Tag 8,
//! tag 9, tag 35, and tag 10 are managed by the builder; everything else is
//! the caller's responsibility (the session controller prepends 34/49/56/52
//! in the fixed header order before application fields).
//!
//! Every frame this builder emits satisfies [`crate::envelope`] validation:
//! a built message is its own valid input.

use crate::{envelope, tag, tokenizer::SOH};

/// Builder for one outbound FIX frame.
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    begin_string: String,
    msg_type: String,
    /// Body fields after tag 35, in insertion order.
    fields: Vec<(u32, String)>,
}

impl FrameBuilder {
    /// Create a builder for a message of the given FIX version and type.
    #[must_use]
    pub fn new(begin_string: impl Into<String>, msg_type: impl Into<String>) -> Self {
        Self { begin_string: begin_string.into(), msg_type: msg_type.into(), fields: Vec::new() }
    }

    /// Append one `tag=value` body field.
    #[must_use]
    pub fn field(mut self, tag: u32, value: impl Into<String>) -> Self {
        self.fields.push((tag, value.into()));
        self
    }

    /// Append a numeric body field.
    #[must_use]
    pub fn field_u32(self, tag: u32, value: u32) -> Self {
        self.field(tag, value.to_string())
    }

    /// Serialize to wire format.
    ///
    /// Emits `8=<bs> SOH 9=<len> SOH 35=<type> SOH <fields...> 10=<ccc> SOH`
    /// with BodyLength measured over the body (tag 35 through the last
    /// caller field, terminators included) and CheckSum computed over all
    /// preceding bytes.
    #[must_use]
    pub fn build(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(256);
        append_field(&mut body, tag::MSG_TYPE, &self.msg_type);
        for (field_tag, value) in &self.fields {
            append_field(&mut body, *field_tag, value);
        }

        let mut frame = Vec::with_capacity(body.len() + 32);
        append_field(&mut frame, tag::BEGIN_STRING, &self.begin_string);
        append_field(&mut frame, tag::BODY_LENGTH, &body.len().to_string());
        frame.extend_from_slice(&body);

        let sum = envelope::checksum(&frame);
        frame.extend_from_slice(b"10=");
        frame.extend_from_slice(envelope::format_checksum(sum).as_bytes());
        frame.push(SOH);

        frame
    }
}

/// Append `<tag>=<value>` plus the SOH terminator to `buf`.
fn append_field(buf: &mut Vec<u8>, tag: u32, value: &str) {
    buf.extend_from_slice(tag.to_string().as_bytes());
    buf.push(b'=');
    buf.extend_from_slice(value.as_bytes());
    buf.push(SOH);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::split_fields_strict;

    #[test]
    fn built_frame_opens_and_closes_correctly() {
        let frame = FrameBuilder::new("FIX.4.4", "0")
            .field(tag::MSG_SEQ_NUM, "1")
            .field(tag::SENDER_COMP_ID, "ALPHA")
            .field(tag::TARGET_COMP_ID, "BETA")
            .build();

        assert!(frame.starts_with(b"8=FIX.4.4\x01"));
        assert_eq!(frame.last(), Some(&SOH));
        assert!(frame[frame.len() - 8..].starts_with(b"\x0110="));
    }

    #[test]
    fn built_frame_is_its_own_valid_input() {
        let frame = FrameBuilder::new("FIX.4.4", "D")
            .field(tag::MSG_SEQ_NUM, "7")
            .field(tag::SYMBOL, "BTCUSD")
            .field(tag::PRICE, "50000")
            .build();

        assert!(envelope::validate_envelope(&frame).is_ok());
    }

    #[test]
    fn body_length_covers_msg_type_through_last_field() {
        let frame = FrameBuilder::new("FIX.4.2", "0").build();
        // Body is exactly "35=0<SOH>" = 5 bytes.
        let text = String::from_utf8(frame).unwrap();
        assert!(text.contains("9=5\x01"));
    }

    #[test]
    fn fields_keep_insertion_order() {
        let frame = FrameBuilder::new("FIX.4.4", "0")
            .field(tag::TARGET_COMP_ID, "BETA")
            .field(tag::SENDER_COMP_ID, "ALPHA")
            .build();
        let text = String::from_utf8(frame).unwrap();

        let fields = split_fields_strict(&text).unwrap();
        let tags: Vec<u32> = fields.iter().map(|f| f.tag).collect();
        assert_eq!(tags, vec![8, 9, 35, 56, 49, 10]);
    }

    #[test]
    fn empty_values_are_emitted() {
        let frame = FrameBuilder::new("FIX.4.4", "5").field(tag::TEXT, "").build();
        let text = String::from_utf8(frame).unwrap();
        assert!(text.contains("58=\x01"));
    }
}
