//! Core value types shared by nodes and documents
//!
//! Key design principles:
//! 1. Ordered maps everywhere: insertion order is render order
//! 2. Content shape is decided once, at construction, never at render time
//! 3. Attribute values keep their kind so quoting is a property of the type

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::node::Node;

/// Attribute name → value, rendered in insertion order
pub type Attributes = IndexMap<String, AttrValue>;

/// CSS property → value for a single selector, rendered in insertion order
pub type Declarations = IndexMap<String, String>;

/// Attribute value
///
/// Only `Str` is quoted when rendered; every other kind is embedded with
/// its `Display` output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    /// Integers above `i64::MAX`
    UInt(u64),
    Float(f64),
    Str(String),
}

impl AttrValue {
    pub fn is_str(&self) -> bool {
        matches!(self, AttrValue::Str(_))
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Str(s) => f.write_str(s),
            AttrValue::Int(i) => write!(f, "{}", i),
            AttrValue::UInt(u) => write!(f, "{}", u),
            AttrValue::Float(x) => write!(f, "{}", x),
            AttrValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl From<&String> for AttrValue {
    fn from(value: &String) -> Self {
        AttrValue::Str(value.clone())
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Int(value.into())
    }
}

impl From<u32> for AttrValue {
    fn from(value: u32) -> Self {
        AttrValue::Int(value.into())
    }
}

impl From<u64> for AttrValue {
    fn from(value: u64) -> Self {
        i64::try_from(value)
            .map(AttrValue::Int)
            .unwrap_or(AttrValue::UInt(value))
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

/// Element content
///
/// Exactly three shapes. A list of children can only ever hold nodes, so a
/// mixed list is unrepresentable.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum Content {
    #[default]
    Empty,
    Text(String),
    Children(Vec<Node>),
}

impl Content {
    pub fn is_empty(&self) -> bool {
        match self {
            Content::Empty => true,
            Content::Text(_) => false,
            Content::Children(children) => children.is_empty(),
        }
    }
}

impl From<&str> for Content {
    fn from(value: &str) -> Self {
        Content::Text(value.to_string())
    }
}

impl From<String> for Content {
    fn from(value: String) -> Self {
        Content::Text(value)
    }
}

impl From<Node> for Content {
    fn from(value: Node) -> Self {
        Content::Children(vec![value])
    }
}

impl From<Vec<Node>> for Content {
    fn from(value: Vec<Node>) -> Self {
        Content::Children(value)
    }
}

impl<T: Into<Content>> From<Option<T>> for Content {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attr_value_display() {
        assert_eq!(AttrValue::from("x").to_string(), "x");
        assert_eq!(AttrValue::from(3).to_string(), "3");
        assert_eq!(AttrValue::from(1.5).to_string(), "1.5");
        assert_eq!(AttrValue::from(true).to_string(), "true");
        assert_eq!(AttrValue::from(7u64), AttrValue::Int(7));
        assert_eq!(AttrValue::from(u64::MAX).to_string(), "18446744073709551615");
        assert!(AttrValue::from("x").is_str());
        assert!(!AttrValue::from(0).is_str());
    }

    #[test]
    fn test_content_from_option() {
        assert_eq!(Content::from(None::<&str>), Content::Empty);
        assert_eq!(Content::from(Some("hi")), Content::Text("hi".to_string()));
        assert!(Content::Children(vec![]).is_empty());
    }
}
