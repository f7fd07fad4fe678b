//! Document - top-level container and page composition
//!
//! ```text
//! register()/span()/div()... → nodes ──→ render_body()   ─┐ (cached)
//! set_style()                → styles ─→ render_styles() ─┤ (cached)
//!                                                         ↓
//!                                              render_document()
//!                                                         ↓
//!                                        WriteSink / HTTP response
//! ```
//!
//! ## Caching
//!
//! Style and body renders are computed once and kept in a `OnceLock`, so a
//! shared `&Document` can be rendered from many threads. Every mutation
//! takes `&mut self` and drops the cache it affects; a document behind an
//! `Arc` cannot be mutated at all, which is what makes serving safe.

use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::{MarkupError, Result};
use crate::node::Node;
use crate::sink::{FileSink, WriteSink, INDEX_FILE};
use crate::tags::TagOptions;
use crate::types::Declarations;

/// Title used when none is given
pub const DEFAULT_TITLE: &str = "Pagecraft";

/// Selector → declarations, kept in registration order
pub type StyleMap = IndexMap<String, Declarations, ahash::RandomState>;

/// A complete HTML page under construction
#[derive(Debug)]
pub struct Document {
    title: String,
    nodes: Vec<Node>,
    styles: StyleMap,

    styles_cache: OnceLock<String>,
    body_cache: OnceLock<String>,
}

/// Generates one registering method per tag name
macro_rules! tag_methods {
    ($($tag:ident),* $(,)?) => {
        $(
            #[doc = concat!("Register a `<", stringify!($tag), ">` element")]
            pub fn $tag(&mut self, options: impl Into<TagOptions>) {
                self.push(options.into().into_node(stringify!($tag)));
            }
        )*
    };
}

impl Document {
    /// Create an empty document with the default title
    pub fn new() -> Self {
        Self::with_title(DEFAULT_TITLE)
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            nodes: Vec::new(),
            styles: StyleMap::default(),
            styles_cache: OnceLock::new(),
            body_cache: OnceLock::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The title is read on every composition, so no cache is touched
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Top-level nodes in render order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of top-level nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a top-level node
    ///
    /// Duplicates are fine. Text leaves are rejected: the body is a
    /// sequence of elements.
    pub fn register(&mut self, node: Node) -> Result<()> {
        if node.is_text() {
            return Err(MarkupError::UntaggedTopLevel);
        }
        self.push(node);
        Ok(())
    }

    fn push(&mut self, node: Node) {
        tracing::debug!(
            "Registered <{}> at position {}",
            node.tag().unwrap_or_default(),
            self.nodes.len()
        );
        self.nodes.push(node);
        self.body_cache.take();
    }

    tag_methods!(
        span, div, button, p, a, h1, h2, h3, ul, ol, li, section, header, footer, nav, main,
        article, label, pre, code, strong, em, img, input, hr, br,
    );

    /// Store the declarations for a selector, replacing any previous set
    ///
    /// A replaced selector keeps its original position in the stylesheet.
    pub fn set_style<K, V, I>(&mut self, selector: impl Into<String>, declarations: I)
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let declarations: Declarations = declarations
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let selector = selector.into();

        tracing::debug!(
            "Set style {} ({} declarations)",
            selector,
            declarations.len()
        );
        self.styles.insert(selector, declarations);
        self.styles_cache.take();
    }

    /// Declarations registered for a selector
    pub fn style(&self, selector: &str) -> Option<&Declarations> {
        self.styles.get(selector)
    }

    pub fn styles(&self) -> &StyleMap {
        &self.styles
    }

    /// Stylesheet text: `selector{prop: value,\nprop: value}` blocks joined by newlines
    pub fn render_styles(&self) -> &str {
        self.styles_cache.get_or_init(|| {
            tracing::debug!("Rendering {} style blocks", self.styles.len());
            render_style_map(&self.styles)
        })
    }

    /// Concatenated markup of all top-level nodes
    pub fn render_body(&self) -> &str {
        self.body_cache.get_or_init(|| {
            tracing::debug!("Rendering {} top-level nodes", self.nodes.len());
            let mut body = String::with_capacity(self.nodes.len() * 64);
            for node in &self.nodes {
                node.render_into(&mut body);
            }
            body
        })
    }

    /// Full page, composed fresh from the cached style and body renders
    pub fn render_document(&self) -> String {
        format!(
            "<html><head><title>{}</title><style>{}</style></head><body>{}</body></html>",
            self.title,
            self.render_styles(),
            self.render_body()
        )
    }

    /// Drop both render caches
    pub fn invalidate(&mut self) {
        self.styles_cache.take();
        self.body_cache.take();
    }

    /// Render the page and hand it to `sink` as `dir/index.html`
    pub fn write_to(&self, dir: impl AsRef<Path>, sink: &impl WriteSink) -> Result<PathBuf> {
        let path = dir.as_ref().join(INDEX_FILE);
        sink.write(&path, &self.render_document())?;
        tracing::info!("Wrote document to {}", path.display());
        Ok(path)
    }

    /// Write the page to `dir/index.html` on disk
    pub fn build(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        self.write_to(dir, &FileSink)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn render_style_map(styles: &StyleMap) -> String {
    styles
        .iter()
        .map(|(selector, declarations)| {
            let body = declarations
                .iter()
                .map(|(property, value)| format!("{}: {}", property, value))
                .collect::<Vec<_>>()
                .join(",\n");
            format!("{}{{{}}}", selector, body)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
