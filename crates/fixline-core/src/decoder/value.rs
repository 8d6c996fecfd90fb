//! Typed field values and the built-in decoder table.
//!
//! A decoded value is a closed sum type. Text never copies: the [`Value`]
//! stores a byte range into the owning view's normalized buffer, and the
//! view resolves it to a `&str` on access. This is the offset-pair rendition
//! of a borrowed slice, chosen so one aggregate can own the buffer and every
//! value derived from it.
//!
//! Dispatch is a table, not a virtual call: the per-version resolver yields
//! a small [`DecoderKey`] that maps straight onto the built-in decoders,
//! while dictionary type names go through a case-insensitive registry that
//! callers may extend or override.

use std::{collections::HashMap, ops::Range, rc::Rc};

/// Semantic decoder selector produced by a per-version resolver.
///
/// These are the keys a build-time generated `tag -> key` map emits, one map
/// per BeginString. The core consumes the maps as data; it generates
/// nothing itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoderKey {
    /// `BOOLEAN` semantics.
    Bool,
    /// Signed 64-bit integer semantics (`INT`, `SEQNUM`, `LENGTH`).
    Int64,
    /// 32-bit float semantics (`FLOAT`).
    Float,
    /// 64-bit float semantics (`PRICE`, `QTY`, `AMT`, ...).
    Double,
    /// Plain text semantics (`STRING`, `CHAR`, timestamps, ...).
    String,
    /// Repeating-group entry count (`NUMINGROUP`); decodes as integer.
    GroupCount,
    /// Opaque payload (`DATA`); kept as text.
    RawData,
}

/// Per-version typed-decoder map: resolves a tag number to its decoder key.
///
/// One resolver exists per BeginString in
/// `{FIX.4.0, FIX.4.1, FIX.4.2, FIX.4.3, FIX.4.4, FIX.5.0, FIXT.1.1}`,
/// registered on the decoder by the caller. A message whose effective
/// BeginString has no registered resolver falls back to STRING decoding.
pub type VersionResolver = fn(u32) -> DecoderKey;

/// A decoded field value.
///
/// `Text` carries the byte range of the raw value within the owning view's
/// normalized buffer; resolve it through the view, not directly.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No typed interpretation (absent field, or a failed numeric parse).
    Absent,
    /// Boolean.
    Bool(bool),
    /// Signed 64-bit integer.
    Int(i64),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// Text span into the owning normalized buffer.
    Text(Range<usize>),
}

impl Default for Value {
    fn default() -> Self {
        Self::Absent
    }
}

impl Value {
    /// Whether this value carries no typed interpretation.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Boolean accessor.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer accessor.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// 32-bit float accessor.
    #[must_use]
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// 64-bit float accessor.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Double(x) => Some(*x),
            _ => None,
        }
    }

    /// Text span accessor; resolve against the owning view's buffer.
    #[must_use]
    pub fn text_range(&self) -> Option<Range<usize>> {
        match self {
            Self::Text(range) => Some(range.clone()),
            _ => None,
        }
    }
}

/// A registrable semantic decoder: raw value slice plus its span in the
/// normalized buffer, out comes a typed [`Value`].
///
/// `Rc` so one decoder can back several type names, matching how the
/// built-in table aliases `INT` under `SEQNUM`, `LENGTH`, and friends.
pub type TypeDecoder = Rc<dyn Fn(&str, Range<usize>) -> Value>;

/// Full-consume guard shared by the numeric decoders: FIX numerics never
/// carry an explicit `+`.
fn numeric_input(value: &str) -> Option<&str> {
    if value.is_empty() || value.starts_with('+') {
        return None;
    }
    Some(value)
}

pub(crate) fn decode_bool(value: &str, _span: Range<usize>) -> Value {
    match value {
        "Y" | "y" | "1" | "TRUE" | "true" => Value::Bool(true),
        "N" | "n" | "0" | "FALSE" | "false" => Value::Bool(false),
        _ => Value::Absent,
    }
}

pub(crate) fn decode_int(value: &str, _span: Range<usize>) -> Value {
    numeric_input(value)
        .and_then(|v| v.parse::<i64>().ok())
        .map_or(Value::Absent, Value::Int)
}

pub(crate) fn decode_f32(value: &str, _span: Range<usize>) -> Value {
    numeric_input(value)
        .and_then(|v| v.parse::<f32>().ok())
        .map_or(Value::Absent, Value::Float)
}

pub(crate) fn decode_f64(value: &str, _span: Range<usize>) -> Value {
    numeric_input(value)
        .and_then(|v| v.parse::<f64>().ok())
        .map_or(Value::Absent, Value::Double)
}

pub(crate) fn decode_text(_value: &str, span: Range<usize>) -> Value {
    Value::Text(span)
}

/// Decode through a resolver-produced key.
///
/// This path uses the built-in decoders directly: the generated maps were
/// produced against the built-in semantics, so later type-name overrides do
/// not affect it.
pub(crate) fn decode_by_key(key: DecoderKey, value: &str, span: Range<usize>) -> Value {
    match key {
        DecoderKey::Bool => decode_bool(value, span),
        DecoderKey::Int64 | DecoderKey::GroupCount => decode_int(value, span),
        DecoderKey::Float => decode_f32(value, span),
        DecoderKey::Double => decode_f64(value, span),
        DecoderKey::String | DecoderKey::RawData => decode_text(value, span),
    }
}

/// The built-in case-normalized type-name table.
pub(crate) fn builtin_type_decoders() -> HashMap<String, TypeDecoder> {
    let bool_decoder: TypeDecoder = Rc::new(decode_bool);
    let int_decoder: TypeDecoder = Rc::new(decode_int);
    let f32_decoder: TypeDecoder = Rc::new(decode_f32);
    let f64_decoder: TypeDecoder = Rc::new(decode_f64);
    let text_decoder: TypeDecoder = Rc::new(decode_text);

    let mut table: HashMap<String, TypeDecoder> = HashMap::new();

    table.insert("BOOLEAN".to_string(), bool_decoder);

    for name in ["INT", "NUMINGROUP", "SEQNUM", "LENGTH"] {
        table.insert(name.to_string(), Rc::clone(&int_decoder));
    }

    table.insert("FLOAT".to_string(), f32_decoder);

    for name in ["DOUBLE", "AMT", "PRICE", "PRICEOFFSET", "PERCENTAGE", "QTY"] {
        table.insert(name.to_string(), Rc::clone(&f64_decoder));
    }

    for name in [
        "STRING",
        "CHAR",
        "MULTIPLECHARVALUE",
        "MULTIPLESTRINGVALUE",
        "EXCHANGE",
        "CURRENCY",
        "UTCTIMESTAMP",
        "UTCTIMEONLY",
        "UTCDATEONLY",
        "LOCALMKTDATE",
        "MONTHYEAR",
        "DAYOFMONTH",
        "DATA",
        "COUNTRY",
        "LANGUAGE",
    ] {
        table.insert(name.to_string(), Rc::clone(&text_decoder));
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_literals() {
        for truthy in ["Y", "y", "1", "TRUE", "true"] {
            assert_eq!(decode_bool(truthy, 0..0), Value::Bool(true));
        }
        for falsy in ["N", "n", "0", "FALSE", "false"] {
            assert_eq!(decode_bool(falsy, 0..0), Value::Bool(false));
        }
        assert_eq!(decode_bool("yes", 0..0), Value::Absent);
    }

    #[test]
    fn integer_requires_full_consume() {
        assert_eq!(decode_int("123", 0..0), Value::Int(123));
        assert_eq!(decode_int("-42", 0..0), Value::Int(-42));
        assert_eq!(decode_int("12x", 0..0), Value::Absent);
        assert_eq!(decode_int("+5", 0..0), Value::Absent);
        assert_eq!(decode_int("", 0..0), Value::Absent);
    }

    #[test]
    fn float_requires_full_consume() {
        assert_eq!(decode_f64("123.45", 0..0), Value::Double(123.45));
        assert_eq!(decode_f64("100", 0..0), Value::Double(100.0));
        assert_eq!(decode_f64("1.2.3", 0..0), Value::Absent);
        assert_eq!(decode_f32("0.5", 0..0), Value::Float(0.5));
    }

    #[test]
    fn text_keeps_its_span() {
        assert_eq!(decode_text("IBM", 10..13), Value::Text(10..13));
    }

    #[test]
    fn key_dispatch_covers_every_key() {
        assert_eq!(decode_by_key(DecoderKey::Bool, "Y", 0..1), Value::Bool(true));
        assert_eq!(decode_by_key(DecoderKey::Int64, "7", 0..1), Value::Int(7));
        assert_eq!(decode_by_key(DecoderKey::GroupCount, "2", 0..1), Value::Int(2));
        assert_eq!(decode_by_key(DecoderKey::Float, "1.5", 0..3), Value::Float(1.5));
        assert_eq!(decode_by_key(DecoderKey::Double, "1.5", 0..3), Value::Double(1.5));
        assert_eq!(decode_by_key(DecoderKey::String, "x", 0..1), Value::Text(0..1));
        assert_eq!(decode_by_key(DecoderKey::RawData, "x", 0..1), Value::Text(0..1));
    }

    #[test]
    fn builtin_table_aliases_numeric_families() {
        let table = builtin_type_decoders();
        assert_eq!(table["SEQNUM"]("9", 0..1), Value::Int(9));
        assert_eq!(table["PRICE"]("1.25", 0..4), Value::Double(1.25));
        assert_eq!(table["UTCTIMESTAMP"]("20260101-00:00:00", 5..22), Value::Text(5..22));
    }
}
