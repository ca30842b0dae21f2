//! YAML node tree with source ranges.

use crate::SourceRange;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The structural kind of a node, as named in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Mapping,
    Sequence,
    Scalar,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Mapping => "Mapping",
            NodeKind::Sequence => "Sequence",
            NodeKind::Scalar => "Scalar",
        };
        f.write_str(name)
    }
}

/// How a scalar was written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
}

/// A scalar value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scalar {
    /// The scalar's value after unquoting and folding.
    pub text: String,
    pub style: ScalarStyle,
    /// True when the source has no text at all for this value (`port:`).
    pub empty: bool,
}

impl Scalar {
    /// True for empty values and the plain null spellings.
    pub fn is_null(&self) -> bool {
        self.empty
            || (self.style == ScalarStyle::Plain
                && matches!(self.text.as_str(), "" | "~" | "null" | "Null" | "NULL"))
    }
}

/// A key-value pair in a mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub key: YamlNode,
    pub value: YamlNode,
}

impl MappingEntry {
    /// The key's text when the key is a scalar.
    pub fn key_text(&self) -> Option<&str> {
        self.key.as_scalar().map(|s| s.text.as_str())
    }

    /// Source range of just the key.
    pub fn key_range(&self) -> SourceRange {
        self.key.range
    }

    /// Source range from the start of the key to the end of the value.
    pub fn range(&self) -> SourceRange {
        self.key.range.cover(&self.value.range)
    }
}

/// The payload of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeValue {
    Scalar(Scalar),
    Sequence(Vec<YamlNode>),
    Mapping(Vec<MappingEntry>),
}

/// A YAML node with the byte range it was parsed from.
///
/// Child ranges are disjoint and nested inside the parent's range. Mapping
/// entries keep document order, including repeated keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YamlNode {
    pub range: SourceRange,
    pub value: NodeValue,
}

impl YamlNode {
    /// Create a scalar node.
    pub fn new_scalar(scalar: Scalar, range: SourceRange) -> Self {
        Self {
            range,
            value: NodeValue::Scalar(scalar),
        }
    }

    /// Create a null node standing for a missing value.
    pub fn new_empty(range: SourceRange) -> Self {
        Self::new_scalar(
            Scalar {
                text: String::new(),
                style: ScalarStyle::Plain,
                empty: true,
            },
            range,
        )
    }

    /// Create a sequence node.
    pub fn new_sequence(items: Vec<YamlNode>, range: SourceRange) -> Self {
        Self {
            range,
            value: NodeValue::Sequence(items),
        }
    }

    /// Create a mapping node.
    pub fn new_mapping(entries: Vec<MappingEntry>, range: SourceRange) -> Self {
        Self {
            range,
            value: NodeValue::Mapping(entries),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self.value {
            NodeValue::Scalar(_) => NodeKind::Scalar,
            NodeValue::Sequence(_) => NodeKind::Sequence,
            NodeValue::Mapping(_) => NodeKind::Mapping,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.value, NodeValue::Scalar(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self.value, NodeValue::Sequence(_))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self.value, NodeValue::Mapping(_))
    }

    /// True for scalars that carry no value (see [`Scalar::is_null`]).
    pub fn is_null(&self) -> bool {
        self.as_scalar().is_some_and(Scalar::is_null)
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match &self.value {
            NodeValue::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[YamlNode]> {
        match &self.value {
            NodeValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&[MappingEntry]> {
        match &self.value {
            NodeValue::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a mapping value by scalar key.
    ///
    /// When a key is repeated the last occurrence wins, which is how the
    /// value would bind.
    pub fn get(&self, key: &str) -> Option<&YamlNode> {
        self.as_mapping()?
            .iter()
            .rev()
            .find(|entry| entry.key_text() == Some(key))
            .map(|entry| &entry.value)
    }

    /// Number of children (sequence items or mapping entries).
    pub fn len(&self) -> usize {
        match &self.value {
            NodeValue::Scalar(_) => 0,
            NodeValue::Sequence(items) => items.len(),
            NodeValue::Mapping(entries) => entries.len(),
        }
    }

    /// Check if this node has no children.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
