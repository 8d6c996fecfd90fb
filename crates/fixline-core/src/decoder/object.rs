//! Lookup-oriented decoded view.
//!
//! A [`DecodedObject`] collapses a message into a tag-keyed map for random
//! access; on duplicate tags the first occurrence wins. Access goes through
//! chainable [`Lookup`] handles: a lookup that misses a node's children
//! falls back to the root map, and the resulting handle carries the root
//! for further chaining, so `msg.get(35).get(55)` resolves tag 55 even
//! though tag 35 has no children.

use std::collections::HashMap;

use super::value::Value;

/// A node in the decoded object graph.
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub(crate) value: Value,
    pub(crate) children: HashMap<u32, Node>,
}

/// Decoded FIX message optimized for tag-keyed access.
#[derive(Debug, Clone, Default)]
pub struct DecodedObject {
    pub(crate) begin_string: String,
    pub(crate) msg_type: String,
    pub(crate) normalized: String,
    pub(crate) fields: HashMap<u32, Node>,
    pub(crate) structurally_valid: bool,
    pub(crate) validation_errors: Vec<String>,
}

impl DecodedObject {
    /// Effective BeginString: the ApplVerID-mapped version when tag 1128 was
    /// present, otherwise the raw tag 8 value.
    #[must_use]
    pub fn begin_string(&self) -> &str {
        &self.begin_string
    }

    /// Value of tag 35, or empty when absent.
    #[must_use]
    pub fn msg_type(&self) -> &str {
        &self.msg_type
    }

    /// The normalized message backing every text value.
    #[must_use]
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Set of distinct tags in the message.
    #[must_use]
    pub fn tags(&self) -> Vec<u32> {
        self.fields.keys().copied().collect()
    }

    /// Look up a tag at the root.
    #[must_use]
    pub fn get(&self, tag: u32) -> Lookup<'_> {
        Lookup { object: self, node: self.fields.get(&tag) }
    }

    /// Whether the structural walk recorded no errors.
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

/// Absent placeholder returned by lookups that resolve nothing.
const ABSENT: Value = Value::Absent;

/// Lightweight lookup handle over one node (or over nothing).
///
/// Handles are cheap copies; chaining never fails, it only produces handles
/// that do not [`exist`](Lookup::exists).
#[derive(Debug, Clone, Copy)]
pub struct Lookup<'a> {
    object: &'a DecodedObject,
    node: Option<&'a Node>,
}

impl<'a> Lookup<'a> {
    /// Whether this handle resolved to a node.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.node.is_some()
    }

    /// Chained lookup: the node's own children first, then the root map.
    #[must_use]
    pub fn get(&self, tag: u32) -> Lookup<'a> {
        if let Some(node) = self.node {
            if let Some(child) = node.children.get(&tag) {
                return Lookup { object: self.object, node: Some(child) };
            }
        }
        Lookup { object: self.object, node: self.object.fields.get(&tag) }
    }

    /// The node's typed value, or [`Value::Absent`] for a missing node.
    #[must_use]
    pub fn value(&self) -> &Value {
        self.node.map_or(&ABSENT, |node| &node.value)
    }

    /// Boolean accessor.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        self.value().as_bool()
    }

    /// Integer accessor.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.value().as_i64()
    }

    /// 32-bit float accessor.
    #[must_use]
    pub fn as_f32(&self) -> Option<f32> {
        self.value().as_f32()
    }

    /// 64-bit float accessor.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.value().as_f64()
    }

    /// Text accessor, resolved against the owning object's buffer.
    #[must_use]
    pub fn as_str(&self) -> Option<&'a str> {
        match self.node?.value {
            Value::Text(ref range) => Some(&self.object.normalized[range.clone()]),
            _ => None,
        }
    }
}
