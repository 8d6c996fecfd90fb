//! Dictionary data model and lookups.
//!
//! The model mirrors the QuickFIX schema: flat field definitions keyed by
//! tag number, message definitions keyed by MsgType code, and named
//! components holding ordered member lists. Component definitions stay in
//! their own name-keyed map and are resolved lazily during validation, so
//! recursive component reuse never materializes an expanded member tree.

use std::collections::HashMap;

/// One enumerated literal of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEnum {
    /// Raw enum value as it appears in messages.
    pub value: String,
    /// Human-readable description from the dictionary.
    pub description: String,
}

/// Definition of one FIX field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Numeric field tag.
    pub number: u32,
    /// Field name (e.g. `MsgType`).
    pub name: String,
    /// Dictionary type name (e.g. `STRING`, `INT`, `PRICE`).
    pub type_name: String,
    /// Enumerated literals, when the dictionary defines any.
    pub enums: Vec<FieldEnum>,
}

/// Kind of a message or component member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// Leaf field reference.
    Field,
    /// Reference to a reusable component.
    Component,
    /// Repeating group; the member name is the group-count field.
    Group,
}

/// One entry in a message or component definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Member kind.
    pub kind: MemberKind,
    /// Member name; resolves through the dictionary (field name or
    /// component name).
    pub name: String,
    /// Whether the member is required (`required="Y"` in the XML).
    pub required: bool,
    /// Nested members of one group entry (empty unless `kind` is
    /// [`MemberKind::Group`]).
    pub children: Vec<Member>,
}

/// Definition of one FIX message type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDef {
    /// Human-readable message name (e.g. `NewOrderSingle`).
    pub name: String,
    /// MsgType code (tag 35 value, e.g. `D`).
    pub msg_type: String,
    /// Message category (`admin` or `app`).
    pub category: String,
    /// Ordered members of the message body.
    pub members: Vec<Member>,
}

/// Metadata for one FIX version, immutable after load.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    pub(crate) begin_string: String,
    pub(crate) fix_type: String,
    pub(crate) major: u32,
    pub(crate) minor: u32,
    pub(crate) servicepack: u32,
    pub(crate) fields: HashMap<u32, FieldDef>,
    pub(crate) fields_by_name: HashMap<String, u32>,
    pub(crate) messages: HashMap<String, MessageDef>,
    pub(crate) components: HashMap<String, Vec<Member>>,
}

impl Dictionary {
    /// BeginString computed from the root attributes (e.g. `FIX.4.2`,
    /// `FIXT.1.1`).
    #[must_use]
    pub fn begin_string(&self) -> &str {
        &self.begin_string
    }

    /// Transport type from the root element: `FIX` or `FIXT`.
    #[must_use]
    pub fn fix_type(&self) -> &str {
        &self.fix_type
    }

    /// Major and minor version numbers from the root element.
    #[must_use]
    pub fn version(&self) -> (u32, u32) {
        (self.major, self.minor)
    }

    /// Service pack number from the root element (0 when absent).
    #[must_use]
    pub fn servicepack(&self) -> u32 {
        self.servicepack
    }

    /// Find a field definition by tag number.
    #[must_use]
    pub fn field_by_number(&self, number: u32) -> Option<&FieldDef> {
        self.fields.get(&number)
    }

    /// Find a field definition by name.
    ///
    /// The structural walk uses this to resolve member names back to tag
    /// numbers.
    #[must_use]
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDef> {
        self.fields_by_name.get(name).and_then(|number| self.fields.get(number))
    }

    /// Find a message definition by MsgType code.
    #[must_use]
    pub fn message_by_type(&self, msg_type: &str) -> Option<&MessageDef> {
        self.messages.get(msg_type)
    }

    /// Find a component's ordered member list by name.
    #[must_use]
    pub fn component_by_name(&self, name: &str) -> Option<&[Member]> {
        self.components.get(name).map(Vec::as_slice)
    }

    /// Convert a QuickFIX `required` attribute value to a boolean: true iff
    /// the value starts with `Y` or `y`.
    #[must_use]
    pub fn is_required_attr(value: Option<&str>) -> bool {
        matches!(value.and_then(|v| v.bytes().next()), Some(b'Y' | b'y'))
    }
}

/// A collection of dictionaries indexed by BeginString.
///
/// When two documents compute the same BeginString the later one wins.
#[derive(Debug, Clone, Default)]
pub struct DictionarySet {
    pub(crate) by_begin_string: HashMap<String, Dictionary>,
}

impl DictionarySet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Find a dictionary by BeginString (e.g. `FIX.4.2`).
    #[must_use]
    pub fn find_by_begin_string(&self, begin_string: &str) -> Option<&Dictionary> {
        self.by_begin_string.get(begin_string)
    }

    /// Number of dictionaries in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_begin_string.len()
    }

    /// Whether the set holds no dictionaries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_begin_string.is_empty()
    }

    /// Iterate over the loaded dictionaries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Dictionary> {
        self.by_begin_string.values()
    }

    /// Insert a dictionary, replacing any existing one with the same
    /// BeginString.
    pub fn insert(&mut self, dictionary: Dictionary) {
        self.by_begin_string.insert(dictionary.begin_string.clone(), dictionary);
    }
}
