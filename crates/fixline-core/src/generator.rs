//! MsgType-keyed domain-object factory registry.
//!
//! Bridges raw frames to caller-defined domain objects without decoding:
//! a [`GeneratorMap`] extracts the value of one key tag (MsgType by default)
//! straight from the frame bytes and dispatches to the builder registered
//! for that value. Useful when a driver wants to route execution reports,
//! order acks, and the like to typed constructors before (or instead of)
//! full dictionary decoding.

use std::collections::HashMap;

use fixline_proto::{tag, tokenizer::extract_tag_value};

/// Registry of frame builders keyed by the value of one tag.
///
/// The key extractor accepts both SOH and `|` delimiters, so the registry
/// works on raw wire frames and on readable fixtures alike.
pub struct GeneratorMap<T> {
    key_tag: u32,
    builders: HashMap<String, Box<dyn Fn(&str) -> T>>,
}

impl<T> GeneratorMap<T> {
    /// Create a registry keyed on MsgType (tag 35).
    #[must_use]
    pub fn new() -> Self {
        Self::with_key_tag(tag::MSG_TYPE)
    }

    /// Create a registry keyed on an arbitrary tag.
    #[must_use]
    pub fn with_key_tag(key_tag: u32) -> Self {
        Self { key_tag, builders: HashMap::new() }
    }

    /// Register (or replace) the builder for one key value.
    ///
    /// The builder receives the full raw frame and produces the caller's
    /// domain object.
    pub fn register<F>(&mut self, key: impl Into<String>, builder: F)
    where
        F: Fn(&str) -> T + 'static,
    {
        self.builders.insert(key.into(), Box::new(builder));
    }

    /// Build a domain object for `raw_frame`.
    ///
    /// Returns `None` when the key tag is absent from the frame or no
    /// builder is registered for its value.
    #[must_use]
    pub fn generate(&self, raw_frame: &str) -> Option<T> {
        let key = extract_tag_value(raw_frame, self.key_tag)?;
        self.builders.get(key).map(|builder| builder(raw_frame))
    }
}

impl<T> Default for GeneratorMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Domain {
        Order { symbol: String },
        Heartbeat,
    }

    fn registry() -> GeneratorMap<Domain> {
        let mut map = GeneratorMap::new();
        map.register("D", |frame: &str| Domain::Order {
            symbol: extract_tag_value(frame, tag::SYMBOL).unwrap_or_default().to_string(),
        });
        map.register("0", |_| Domain::Heartbeat);
        map
    }

    #[test]
    fn dispatches_on_msg_type_value() {
        let map = registry();
        assert_eq!(
            map.generate("8=FIX.4.4|35=D|55=IBM|"),
            Some(Domain::Order { symbol: "IBM".to_string() })
        );
        assert_eq!(map.generate("8=FIX.4.4|35=0|"), Some(Domain::Heartbeat));
    }

    #[test]
    fn unknown_key_or_missing_tag_yields_none() {
        let map = registry();
        assert_eq!(map.generate("8=FIX.4.4|35=8|"), None);
        assert_eq!(map.generate("8=FIX.4.4|55=IBM|"), None);
    }

    #[test]
    fn custom_key_tag() {
        let mut map = GeneratorMap::with_key_tag(tag::SYMBOL);
        map.register("IBM", |_| "big blue");
        assert_eq!(map.generate("35=D\x0155=IBM\x01"), Some("big blue"));
        assert_eq!(map.generate("35=D\x0155=MSFT\x01"), None);
    }
}
