//! Node - a single renderable element
//!
//! ```text
//! Node { tag, attributes, content }
//!          ↓ render()
//! <tag key="value" flag=true>content</tag>
//! ```
//!
//! Rendering is total: every shape `Content` can hold has exactly one
//! rendering, so the only failure point is building a node from untyped
//! input (`Node::from_value`).

use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::error::{MarkupError, Result};
use crate::types::{AttrValue, Attributes, Content};

/// A tree of markup
///
/// A node without a tag is a text leaf: it renders its content only and is
/// accepted as a child, never at the top level of a document.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Node {
    pub tag: Option<String>,
    pub attributes: Attributes,
    pub content: Content,
}

impl Node {
    /// Create a node with every field given
    pub fn new(
        tag: impl Into<String>,
        attributes: Attributes,
        content: impl Into<Content>,
    ) -> Self {
        Self {
            tag: Some(tag.into()),
            attributes,
            content: content.into(),
        }
    }

    /// Create an empty element
    pub fn element(tag: impl Into<String>) -> Self {
        Self::new(tag, Attributes::new(), Content::Empty)
    }

    /// Create a tagless text leaf
    ///
    /// A leaf has no element to carry attributes: any set on it later with
    /// `with_attr` are kept but never rendered.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            tag: None,
            attributes: Attributes::new(),
            content: Content::Text(text.into()),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_content(mut self, content: impl Into<Content>) -> Self {
        self.content = content.into();
        self
    }

    /// Append a child, turning empty or text content into a child list
    ///
    /// Existing text is kept as a leading text leaf.
    pub fn child(mut self, node: Node) -> Self {
        self.content = match std::mem::take(&mut self.content) {
            Content::Empty => Content::Children(vec![node]),
            Content::Text(text) => Content::Children(vec![Node::text(text), node]),
            Content::Children(mut children) => {
                children.push(node);
                Content::Children(children)
            }
        };
        self
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn is_text(&self) -> bool {
        self.tag.is_none()
    }

    /// Get attribute value
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Render this node and its subtree to markup
    pub fn render(&self) -> String {
        let mut output = String::with_capacity(64);
        self.render_into(&mut output);
        output
    }

    /// Render into an existing buffer (avoids one allocation per child)
    ///
    /// A tagless node writes its content only; its attributes are ignored.
    pub fn render_into(&self, output: &mut String) {
        let Some(tag) = self.tag.as_deref() else {
            self.render_content(output);
            return;
        };

        // Format: <tag key="value" key=value>
        // The space after the tag stays even without attributes.
        output.push('<');
        output.push_str(tag);
        output.push(' ');
        render_attributes(&self.attributes, output);
        output.push('>');

        self.render_content(output);

        output.push_str("</");
        output.push_str(tag);
        output.push('>');
    }

    fn render_content(&self, output: &mut String) {
        match &self.content {
            Content::Empty => {}
            // Raw, unescaped. Callers pre-escape (see utils::escape_html).
            Content::Text(text) => output.push_str(text),
            Content::Children(children) => {
                for child in children {
                    child.render_into(output);
                }
            }
        }
    }

    /// Build a node from untyped JSON
    ///
    /// Input format:
    /// ```json
    /// {
    ///   "tag": "div",
    ///   "attributes": { "class": "box", "tabindex": 0 },
    ///   "content": [{ "tag": "span", "content": "hello" }]
    /// }
    /// ```
    ///
    /// `content` may be null, a scalar (stored as text), a single node
    /// object, or an array whose elements must all be node objects. Anything
    /// else is rejected here so that rendering never has to check. A node
    /// without a tag may not carry attributes, since they could not render.
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or(MarkupError::InvalidNode {
            expected: "object",
            actual: json_kind(value),
        })?;

        let tag = match object.get("tag") {
            None | Some(Value::Null) => None,
            Some(Value::String(tag)) => Some(tag.clone()),
            Some(other) => {
                return Err(MarkupError::InvalidNode {
                    expected: "string tag",
                    actual: json_kind(other),
                })
            }
        };

        let attributes = match object.get("attributes") {
            None | Some(Value::Null) => Attributes::new(),
            Some(Value::Object(map)) => map
                .iter()
                .map(|(name, value)| attr_from_value(name, value).map(|v| (name.clone(), v)))
                .collect::<Result<Attributes>>()?,
            Some(other) => {
                return Err(MarkupError::InvalidNode {
                    expected: "attribute object",
                    actual: json_kind(other),
                })
            }
        };

        if tag.is_none() && !attributes.is_empty() {
            return Err(MarkupError::InvalidNode {
                expected: "tag on a node with attributes",
                actual: "null",
            });
        }

        let content = match object.get("content") {
            None | Some(Value::Null) => Content::Empty,
            Some(Value::String(text)) => Content::Text(text.clone()),
            Some(scalar @ (Value::Number(_) | Value::Bool(_))) => Content::Text(scalar.to_string()),
            Some(child @ Value::Object(_)) => Content::Children(vec![Node::from_value(child)?]),
            Some(Value::Array(items)) => Content::Children(
                items
                    .iter()
                    .map(|item| match item {
                        Value::Object(_) => Node::from_value(item),
                        other => Err(MarkupError::MalformedContent {
                            kind: json_kind(other),
                        }),
                    })
                    .collect::<Result<Vec<_>>>()?,
            ),
        };

        Ok(Self {
            tag,
            attributes,
            content,
        })
    }

    /// Parse JSON text and build a node from it
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Serialize attributes as space separated `key=value` pairs
///
/// String values are double-quoted, everything else is written bare.
pub fn render_attributes(attributes: &Attributes, output: &mut String) {
    for (i, (name, value)) in attributes.iter().enumerate() {
        if i > 0 {
            output.push(' ');
        }
        output.push_str(name);
        output.push('=');
        if value.is_str() {
            output.push('"');
            output.push_str(&value.to_string());
            output.push('"');
        } else {
            output.push_str(&value.to_string());
        }
    }
}

fn attr_from_value(name: &str, value: &Value) -> Result<AttrValue> {
    match value {
        Value::String(s) => Ok(AttrValue::Str(s.clone())),
        Value::Bool(b) => Ok(AttrValue::Bool(*b)),
        Value::Number(n) => Ok(if let Some(i) = n.as_i64() {
            AttrValue::Int(i)
        } else if let Some(u) = n.as_u64() {
            AttrValue::UInt(u)
        } else {
            AttrValue::Float(n.as_f64().unwrap_or_default())
        }),
        other => Err(MarkupError::InvalidAttribute {
            name: name.to_string(),
            kind: json_kind(other),
        }),
    }
}

/// Observed kind of a JSON value, for error messages
fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::attrs;
    use serde_json::json;

    #[test]
    fn test_render_empty_element() {
        assert_eq!(Node::element("hr").render(), "<hr ></hr>");
    }

    #[test]
    fn test_render_attribute_quoting() {
        let node = Node::element("input")
            .with_attr("type", "checkbox")
            .with_attr("tabindex", 2)
            .with_attr("checked", true);

        assert_eq!(
            node.render(),
            r#"<input type="checkbox" tabindex=2 checked=true></input>"#
        );
    }

    #[test]
    fn test_render_text_is_not_escaped() {
        let node = Node::new("span", attrs([("class", "x")]), "a <b> & c");
        assert_eq!(node.render(), r#"<span class="x">a <b> & c</span>"#);
    }

    #[test]
    fn test_render_nested_children() {
        let node = Node::new(
            "div",
            Attributes::new(),
            vec![
                Node::new("span", Attributes::new(), "div el 1"),
                Node::element("p").child(Node::new("em", Attributes::new(), "deep")),
                Node::text("tail"),
            ],
        );

        assert_eq!(
            node.render(),
            "<div ><span >div el 1</span><p ><em >deep</em></p>tail</div>"
        );
    }

    #[test]
    fn test_child_keeps_existing_text() {
        let node = Node::new("p", Attributes::new(), "hello ").child(Node::text("world"));
        assert_eq!(node.render(), "<p >hello world</p>");
        assert!(matches!(node.content, Content::Children(ref c) if c.len() == 2));
    }

    #[test]
    fn test_display_matches_render() {
        let node = Node::element("br");
        assert_eq!(format!("{}", node), node.render());
    }

    #[test]
    fn test_from_value_builds_tree() {
        let node = Node::from_value(&json!({
            "tag": "div",
            "attributes": { "class": "box", "tabindex": 0, "ratio": 0.5 },
            "content": [
                { "tag": "span", "content": "one" },
                { "tag": "span", "content": 2 },
                { "content": "text" }
            ]
        }))
        .unwrap();

        assert_eq!(
            node.render(),
            r#"<div class="box" tabindex=0 ratio=0.5><span >one</span><span >2</span>text</div>"#
        );
    }

    #[test]
    fn test_from_value_rejects_non_node_children() {
        let err = Node::from_value(&json!({
            "tag": "div",
            "content": [{ "tag": "span" }, "plain string"]
        }))
        .unwrap_err();

        match err {
            MarkupError::MalformedContent { kind } => assert_eq!(kind, "string"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_from_value_rejects_nested_malformed_content() {
        let err = Node::from_value(&json!({
            "tag": "div",
            "content": [{ "tag": "ul", "content": [{ "tag": "li" }, 7] }]
        }))
        .unwrap_err();

        assert!(matches!(err, MarkupError::MalformedContent { kind: "number" }));
    }

    #[test]
    fn test_from_value_rejects_nested_attribute_objects() {
        let err = Node::from_value(&json!({
            "tag": "div",
            "attributes": { "style": { "color": "red" } }
        }))
        .unwrap_err();

        assert!(matches!(
            err,
            MarkupError::InvalidAttribute { ref name, kind: "object" } if name == "style"
        ));
    }

    #[test]
    fn test_from_value_keeps_large_integers_exact() {
        let node = Node::from_value(&json!({
            "tag": "i",
            "attributes": { "n": 18446744073709551615u64, "m": -3 }
        }))
        .unwrap();

        assert_eq!(node.attr("n"), Some(&AttrValue::UInt(u64::MAX)));
        assert_eq!(node.render(), "<i n=18446744073709551615 m=-3></i>");
    }

    #[test]
    fn test_from_value_rejects_non_object_node() {
        for value in [json!("x"), json!([1])] {
            match Node::from_value(&value).unwrap_err() {
                MarkupError::InvalidNode { expected, actual } => {
                    assert_eq!(expected, "object");
                    assert_eq!(actual, if value.is_string() { "string" } else { "array" });
                }
                other => panic!("unexpected error: {}", other),
            }
        }
    }

    #[test]
    fn test_from_value_rejects_non_string_tag() {
        let err = Node::from_value(&json!({ "tag": 3 })).unwrap_err();
        assert!(matches!(
            err,
            MarkupError::InvalidNode { expected: "string tag", actual: "number" }
        ));
    }

    #[test]
    fn test_from_value_rejects_non_object_attributes() {
        let err = Node::from_value(&json!({ "tag": "div", "attributes": [1] })).unwrap_err();
        assert!(matches!(
            err,
            MarkupError::InvalidNode { expected: "attribute object", actual: "array" }
        ));
    }

    #[test]
    fn test_from_value_rejects_attributes_without_tag() {
        let err = Node::from_value(&json!({
            "attributes": { "class": "x" },
            "content": "t"
        }))
        .unwrap_err();

        assert!(matches!(
            err,
            MarkupError::InvalidNode { expected: "tag on a node with attributes", actual: "null" }
        ));
    }

    #[test]
    fn test_text_leaf_ignores_attributes() {
        let leaf = Node::text("t").with_attr("class", "x");
        assert_eq!(leaf.render(), "t");
    }

    #[test]
    fn test_from_json_rejects_invalid_text() {
        let err = Node::from_json(r#"{"tag": "div""#).unwrap_err();
        assert!(matches!(err, MarkupError::ParseError(_)));
    }

    #[test]
    fn test_serialized_node_rebuilds_identically() {
        let node = Node::new(
            "button",
            attrs([("onclick", "alert(1)")]),
            vec![Node::text("click me")],
        );

        let json = serde_json::to_string(&node).unwrap();
        let rebuilt = Node::from_json(&json).unwrap();
        assert_eq!(rebuilt, node);
    }
}
