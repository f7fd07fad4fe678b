//! Pagecraft document server
//!
//! Serves one rendered `markup::Document` on a single HTTP route.
//!
//! # Architecture
//!
//! 1. **Freeze, then serve**: the document moves into an `Arc` before the
//!    first accept, so it cannot change under concurrent requests
//! 2. **Sink at the seam**: the core serve path hands a status and body to a
//!    `ResponseSink`; only `HttpResponder` knows about HTTP bytes
//! 3. **Observable**: lifecycle and per-request events go out on an `EventBus`

pub mod error;
pub mod events;
pub mod response;
pub mod server;

pub use error::{Result, ServerError};
pub use events::{EventBus, ServerEvent};
pub use response::{serve_document, HtmlResponse, HttpResponder, ResponseSink, CONTENT_TYPE};
pub use server::{handle_connection, BoundServer, DocumentServer, ServerConfig};
