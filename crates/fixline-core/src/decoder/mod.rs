//! Dictionary-driven message decoding.
//!
//! The decoder turns raw FIX frames into typed, indexable views. Per
//! message it:
//!
//! 1. Normalizes delimiters and scans tag=value tokens (lenient: damaged
//!    tokens are skipped, not fatal).
//! 2. Selects the *effective BeginString* - tag 1128 (ApplVerID) when
//!    present, otherwise tag 8 - and through it both the per-version typed
//!    decoder resolver and the metadata dictionary, independently.
//! 3. Decodes each value through the resolver's [`DecoderKey`], or the
//!    dictionary type name, or STRING as the final fallback.
//! 4. Runs the structural walk when a dictionary matched the message.
//!
//! Decoding never fails and never touches the BodyLength/CheckSum envelope;
//! that asymmetry with the session controller is deliberate, so damaged
//! captures remain inspectable.

mod message;
mod object;
mod validate;
mod value;

use std::{collections::HashMap, ops::Range, rc::Rc};

use fixline_dict::{Dictionary, DictionaryError, DictionarySet};
use fixline_proto::{
    RawField, tag,
    tokenizer::{normalize, split_fields},
};

pub use message::{DecodedField, DecodedMessage};
pub use object::{DecodedObject, Lookup, Node};
pub use value::{DecoderKey, TypeDecoder, Value, VersionResolver};

use value::{builtin_type_decoders, decode_by_key};

/// Map an ApplVerID (tag 1128) literal to its BeginString.
///
/// Unknown values pass through verbatim, so a future ApplVerID can still
/// select a dictionary registered under its own name.
#[must_use]
pub fn appl_ver_id_to_begin_string(value: &str) -> &str {
    match value {
        "2" => "FIX.4.0",
        "3" => "FIX.4.1",
        "4" => "FIX.4.2",
        "5" => "FIX.4.3",
        "6" => "FIX.4.4",
        "7" | "8" | "9" => "FIX.5.0",
        other => other,
    }
}

/// Decodes raw FIX messages using QuickFIX XML dictionaries and per-version
/// typed-decoder maps.
///
/// Single-owner object: share the loaded [`DictionarySet`] by borrow if
/// several decoders must agree on metadata.
pub struct Decoder {
    dictionaries: DictionarySet,
    type_decoders: HashMap<String, TypeDecoder>,
    version_resolvers: HashMap<String, VersionResolver>,
}

/// Version selection derived from one message's tokens.
struct VersionSelection<'a> {
    /// Raw tag 8 value (empty when absent).
    raw_begin: &'a str,
    /// ApplVerID-mapped BeginString, or the raw one.
    effective_begin: String,
    resolver: Option<VersionResolver>,
}

impl Decoder {
    /// Create a decoder with the built-in type-name table, no dictionaries,
    /// and no version resolvers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dictionaries: DictionarySet::new(),
            type_decoders: builtin_type_decoders(),
            version_resolvers: HashMap::new(),
        }
    }

    /// Load all dictionary XML files from a directory, replacing any
    /// previously loaded set.
    ///
    /// # Errors
    ///
    /// Propagates [`DictionaryError`] from the directory scan; see
    /// [`DictionarySet::load_from_directory`].
    pub fn load_dictionaries(&mut self, dir: impl AsRef<std::path::Path>) -> Result<(), DictionaryError> {
        self.dictionaries = DictionarySet::load_from_directory(dir)?;
        Ok(())
    }

    /// Replace the dictionary set (e.g. one assembled from
    /// [`Dictionary::from_xml`] documents).
    pub fn set_dictionaries(&mut self, dictionaries: DictionarySet) {
        self.dictionaries = dictionaries;
    }

    /// The loaded dictionaries.
    #[must_use]
    pub fn dictionaries(&self) -> &DictionarySet {
        &self.dictionaries
    }

    /// Register or override a semantic decoder for a dictionary type name.
    ///
    /// Names compare case-insensitively: registering `price` replaces the
    /// built-in `PRICE` decoder.
    pub fn register_type_decoder<F>(&mut self, type_name: impl AsRef<str>, decoder: F)
    where
        F: Fn(&str, Range<usize>) -> Value + 'static,
    {
        self.type_decoders.insert(type_name.as_ref().to_ascii_uppercase(), Rc::new(decoder));
    }

    /// Register the typed-decoder map for one BeginString.
    ///
    /// The maps are code-generated from the dictionaries at build time and
    /// consumed here as plain data; a message whose effective BeginString
    /// has no resolver falls back to STRING decoding for every tag.
    pub fn register_version_resolver(
        &mut self,
        begin_string: impl Into<String>,
        resolver: VersionResolver,
    ) {
        self.version_resolvers.insert(begin_string.into(), resolver);
    }

    /// Decode a raw FIX message into an ordered field-by-field view.
    ///
    /// `raw` may use SOH or `|` delimiters. A message with no recognizable
    /// tags yields an empty field list with empty `begin_string`/`msg_type`.
    #[must_use]
    pub fn decode(&self, raw: &str) -> DecodedMessage {
        let normalized = normalize(raw).into_owned();
        let fields = split_fields(&normalized);
        let selection = self.select_version(&normalized, &fields);
        let dict = self.select_dictionary(&selection);

        let mut decoded = DecodedMessage {
            structurally_valid: true,
            fields: Vec::with_capacity(fields.len()),
            ..DecodedMessage::default()
        };

        for parsed in &fields {
            let raw_value = &normalized[parsed.value.clone()];

            if parsed.tag == tag::BEGIN_STRING {
                decoded.begin_string = raw_value.to_string();
            }
            if parsed.tag == tag::MSG_TYPE {
                decoded.msg_type = raw_value.to_string();
            }

            let (name, type_name) = match dict.and_then(|d| d.field_by_number(parsed.tag)) {
                Some(def) => (Some(def.name.clone()), Some(def.type_name.clone())),
                None => (None, None),
            };

            let typed = match selection.resolver {
                Some(resolver) => decode_by_key(resolver(parsed.tag), raw_value, parsed.value.clone()),
                None => self.decode_by_type_name(
                    type_name.as_deref().unwrap_or(""),
                    raw_value,
                    parsed.value.clone(),
                ),
            };

            decoded.fields.push(DecodedField {
                tag: parsed.tag,
                name,
                type_name,
                value: parsed.value.clone(),
                typed,
            });
        }

        if let Some(dict) = dict {
            decoded.validation_errors =
                validate::validate_structure(dict, &decoded.msg_type, &normalized, &fields);
            decoded.structurally_valid = decoded.validation_errors.is_empty();
        }

        decoded.normalized = normalized;
        decoded
    }

    /// Decode a raw FIX message into a tag-keyed lookup view.
    ///
    /// On duplicate tags the first occurrence wins. The reported
    /// `begin_string` is the *effective* one (ApplVerID-mapped when tag 1128
    /// is present).
    #[must_use]
    pub fn decode_object(&self, raw: &str) -> DecodedObject {
        let normalized = normalize(raw).into_owned();
        let fields = split_fields(&normalized);
        let selection = self.select_version(&normalized, &fields);
        let dict = self.select_dictionary(&selection);

        let mut decoded = DecodedObject {
            begin_string: selection.effective_begin.clone(),
            structurally_valid: true,
            ..DecodedObject::default()
        };

        for parsed in &fields {
            let raw_value = &normalized[parsed.value.clone()];

            if parsed.tag == tag::BEGIN_STRING && decoded.begin_string.is_empty() {
                decoded.begin_string = raw_value.to_string();
            }
            if parsed.tag == tag::MSG_TYPE && decoded.msg_type.is_empty() {
                decoded.msg_type = raw_value.to_string();
            }

            let typed = match selection.resolver {
                Some(resolver) => decode_by_key(resolver(parsed.tag), raw_value, parsed.value.clone()),
                None => self.decode_by_type_name("STRING", raw_value, parsed.value.clone()),
            };

            decoded
                .fields
                .entry(parsed.tag)
                .or_insert_with(|| Node { value: typed, children: HashMap::new() });
        }

        if let Some(dict) = dict {
            decoded.validation_errors =
                validate::validate_structure(dict, &decoded.msg_type, &normalized, &fields);
            decoded.structurally_valid = decoded.validation_errors.is_empty();
        }

        decoded.normalized = normalized;
        decoded
    }

    /// Resolve the effective BeginString and its resolver from the tokens.
    fn select_version<'a>(&self, message: &'a str, fields: &[RawField]) -> VersionSelection<'a> {
        let mut raw_begin = "";
        let mut appl_ver_id = "";

        for field in fields {
            let value = &message[field.value.clone()];
            if field.tag == tag::BEGIN_STRING && raw_begin.is_empty() {
                raw_begin = value;
            } else if field.tag == tag::APPL_VER_ID && appl_ver_id.is_empty() {
                appl_ver_id = value;
            }
        }

        let effective_begin = if appl_ver_id.is_empty() {
            raw_begin.to_string()
        } else {
            appl_ver_id_to_begin_string(appl_ver_id).to_string()
        };

        let resolver = self.version_resolvers.get(&effective_begin).copied();
        VersionSelection { raw_begin, effective_begin, resolver }
    }

    /// Metadata dictionary for the message: the effective BeginString first,
    /// then the raw tag 8 value.
    fn select_dictionary(&self, selection: &VersionSelection<'_>) -> Option<&Dictionary> {
        if let Some(dict) = self.dictionaries.find_by_begin_string(&selection.effective_begin) {
            return Some(dict);
        }
        if selection.raw_begin.is_empty() {
            return None;
        }
        self.dictionaries.find_by_begin_string(selection.raw_begin)
    }

    /// Decode through the case-insensitive type-name registry, falling back
    /// to STRING for unknown names.
    fn decode_by_type_name(&self, type_name: &str, value: &str, span: Range<usize>) -> Value {
        let key = type_name.to_ascii_uppercase();
        if let Some(decoder) = self.type_decoders.get(&key) {
            return decoder(value, span);
        }
        if let Some(decoder) = self.type_decoders.get("STRING") {
            return decoder(value, span);
        }
        Value::Absent
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}
