//! Parse and envelope error taxonomies.
//!
//! These errors describe why a frame could not be interpreted at the wire
//! level. They carry no session state; the session controller maps them to
//! dispositions and outbound Reject text. The rendered messages include the
//! offending tag number where one is known, because they end up verbatim in
//! `58=<Text>` fields on the wire.

use thiserror::Error;

/// Errors from strict tag=value tokenization of a single frame.
///
/// The lenient scan used by the decoder never fails; this taxonomy exists for
/// the session controller, where the first defect aborts processing and the
/// frame is classified as garbled.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// The final token has no terminating SOH.
    #[error("Missing SOH-delimited field terminator")]
    MissingFieldTerminator,

    /// A token contains no `=` before its delimiter.
    #[error("Malformed tag=value field")]
    MalformedTagValue,

    /// The prefix before `=` is not a positive decimal integer.
    #[error("Tag is not numeric")]
    TagNotNumeric,

    /// Tag 34 is present but its value is not an unsigned decimal.
    #[error("Invalid MsgSeqNum (tag 34)")]
    InvalidMsgSeqNum,

    /// Tag 35 is absent from the frame.
    #[error("Missing MsgType (tag 35)")]
    MissingMsgType,

    /// Tag 34 is absent from the frame.
    #[error("Missing MsgSeqNum (tag 34)")]
    MissingMsgSeqNum,
}

/// Errors from envelope validation of a full frame.
///
/// Either failure means the frame cannot be trusted at the session layer;
/// the controller treats both as garbled and keeps the session alive.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Tag 9 is absent, malformed, or does not match the measured body size.
    #[error("BodyLength does not match message body")]
    BodyLength,

    /// The `10=ddd` trailer is absent, malformed, or does not match the
    /// computed byte sum.
    #[error("CheckSum does not match message content")]
    CheckSum,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_text_carries_tag_when_known() {
        assert_eq!(ParseError::InvalidMsgSeqNum.to_string(), "Invalid MsgSeqNum (tag 34)");
        assert_eq!(ParseError::MissingMsgType.to_string(), "Missing MsgType (tag 35)");
        assert_eq!(ParseError::MissingMsgSeqNum.to_string(), "Missing MsgSeqNum (tag 34)");
    }

    #[test]
    fn structural_parse_errors_have_no_tag_suffix() {
        assert_eq!(
            ParseError::MissingFieldTerminator.to_string(),
            "Missing SOH-delimited field terminator"
        );
        assert_eq!(ParseError::MalformedTagValue.to_string(), "Malformed tag=value field");
        assert_eq!(ParseError::TagNotNumeric.to_string(), "Tag is not numeric");
    }
}
