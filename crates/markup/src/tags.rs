//! Named-tag construction helpers
//!
//! Convenience constructors take one `TagOptions` value instead of a pile of
//! optional arguments. Two attribute sources are merged into the node:
//! free-form pairs added one at a time (`extra`) and a structured map
//! (`attributes`). The structured map wins on collision.

use crate::node::Node;
use crate::types::{AttrValue, Attributes, Content};

/// Build an attribute map from pairs, keeping their order
pub fn attrs<K, V, I>(pairs: I) -> Attributes
where
    K: Into<String>,
    V: Into<AttrValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Merge free-form attributes with an explicit attribute map
///
/// Order: keys of `extra` first, then keys only present in `explicit`.
/// On collision the value comes from `explicit` and the key keeps its
/// position from `extra`.
pub fn merge_attributes(extra: Attributes, explicit: Option<Attributes>) -> Attributes {
    let mut merged = extra;
    if let Some(explicit) = explicit {
        for (name, value) in explicit {
            merged.insert(name, value);
        }
    }
    merged
}

/// Arguments for a named-tag constructor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagOptions {
    pub content: Content,
    pub attributes: Option<Attributes>,
    pub extra: Attributes,
}

impl TagOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: impl Into<Content>) -> Self {
        self.content = content.into();
        self
    }

    /// Set the explicit attribute map
    pub fn attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    /// Add one free-form attribute
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// Merge attributes and build a node with the given tag
    pub fn into_node(self, tag: &str) -> Node {
        let attributes = merge_attributes(self.extra, self.attributes);
        Node::new(tag, attributes, self.content)
    }
}

impl From<&str> for TagOptions {
    fn from(value: &str) -> Self {
        Self::new().content(value)
    }
}

impl From<String> for TagOptions {
    fn from(value: String) -> Self {
        Self::new().content(value)
    }
}

impl From<Node> for TagOptions {
    fn from(value: Node) -> Self {
        Self::new().content(value)
    }
}

impl From<Vec<Node>> for TagOptions {
    fn from(value: Vec<Node>) -> Self {
        Self::new().content(value)
    }
}

impl From<Content> for TagOptions {
    fn from(value: Content) -> Self {
        Self::new().content(value)
    }
}
