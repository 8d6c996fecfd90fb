//! Field-by-field decoded view.
//!
//! A [`DecodedMessage`] owns the normalized message buffer; every
//! [`DecodedField`] locates its raw value by byte range within that buffer.
//! The aggregate therefore outlives all derived views by construction - no
//! slice escapes it unresolved.

use std::ops::Range;

use super::value::Value;

/// One decoded field, in wire order.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedField {
    /// Numeric FIX tag.
    pub tag: u32,
    /// Dictionary field name, when a dictionary matched.
    pub name: Option<String>,
    /// Dictionary type name (e.g. `STRING`, `PRICE`), when known.
    pub type_name: Option<String>,
    /// Byte range of the raw value in the owning message's normalized
    /// buffer.
    pub value: Range<usize>,
    /// Typed decoding of the raw value.
    pub typed: Value,
}

/// Parsed content of one decoded FIX message.
#[derive(Debug, Clone, Default)]
pub struct DecodedMessage {
    pub(crate) begin_string: String,
    pub(crate) msg_type: String,
    pub(crate) normalized: String,
    pub(crate) fields: Vec<DecodedField>,
    pub(crate) structurally_valid: bool,
    pub(crate) validation_errors: Vec<String>,
}

impl DecodedMessage {
    /// Value of tag 8, or empty when absent.
    #[must_use]
    pub fn begin_string(&self) -> &str {
        &self.begin_string
    }

    /// Value of tag 35, or empty when absent.
    #[must_use]
    pub fn msg_type(&self) -> &str {
        &self.msg_type
    }

    /// The normalized message backing every field range.
    #[must_use]
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// All parsed fields in wire order.
    #[must_use]
    pub fn fields(&self) -> &[DecodedField] {
        &self.fields
    }

    /// First field with the given tag.
    #[must_use]
    pub fn first(&self, tag: u32) -> Option<&DecodedField> {
        self.fields.iter().find(|field| field.tag == tag)
    }

    /// Raw value of a field, resolved against the owned buffer.
    #[must_use]
    pub fn raw_value(&self, field: &DecodedField) -> &str {
        &self.normalized[field.value.clone()]
    }

    /// Typed text of a field, when its value decoded as text.
    #[must_use]
    pub fn typed_text(&self, field: &DecodedField) -> Option<&str> {
        field.typed.text_range().map(|range| &self.normalized[range])
    }

    /// Whether the structural walk recorded no errors.
    ///
    /// True when no dictionary matched: without metadata there is nothing
    /// to validate against.
    #[must_use]
    pub fn structurally_valid(&self) -> bool {
        self.structurally_valid
    }

    /// Human-readable structural validation errors.
    #[must_use]
    pub fn validation_errors(&self) -> &[String] {
        &self.validation_errors
    }
}
