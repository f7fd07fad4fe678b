//! Error types for markup operations
//!
//! Simple, flat error hierarchy. No over-engineering.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MarkupError>;

#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("Malformed content: expected nested content to contain nodes but got {kind}")]
    MalformedContent { kind: &'static str },

    #[error("Invalid node: expected {expected}, got {actual}")]
    InvalidNode {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Invalid attribute {name}: expected a scalar value, got {kind}")]
    InvalidAttribute { name: String, kind: &'static str },

    #[error("Nodes without a tag cannot be registered at the top level")]
    UntaggedTopLevel,

    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
