//! Pagecraft markup library
//!
//! Declarative HTML document construction and rendering.
//!
//! ## Core Design
//!
//! ```text
//! Node (tag, attributes, content) ──render()──→ markup
//!   ↓ register
//! Document (nodes + styles) ──render_document()──→ page ──→ WriteSink / HTTP
//! ```
//!
//! Content is a closed enum (empty, text, or child nodes), so a tree that
//! type-checks always renders. Untyped input goes through
//! `Node::from_value`, which validates up front.

pub mod document;
pub mod error;
pub mod node;
pub mod sink;
pub mod tags;
pub mod types;
pub mod utils;

pub use document::{Document, DEFAULT_TITLE};
pub use error::{MarkupError, Result};
pub use node::Node;
pub use sink::{FileSink, WriteSink, INDEX_FILE};
pub use tags::{attrs, merge_attributes, TagOptions};
pub use types::*;
pub use utils::escape_html;
