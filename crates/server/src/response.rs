//! HTTP response sink
//!
//! The document side only produces a status and an HTML body. Getting
//! those bytes onto a socket is the sink's job, behind `ResponseSink`.

use async_trait::async_trait;
use markup::Document;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::Result;

/// Content type of every response
pub const CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Status and body handed to a sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlResponse {
    pub status: u16,
    pub body: String,
}

impl HtmlResponse {
    /// The document route: always 200, composed fresh
    pub fn document(document: &Document) -> Self {
        Self {
            status: 200,
            body: document.render_document(),
        }
    }

    pub fn not_found() -> Self {
        Self::error(404)
    }

    pub fn method_not_allowed() -> Self {
        Self::error(405)
    }

    pub fn bad_request() -> Self {
        Self::error(400)
    }

    fn error(status: u16) -> Self {
        let reason = reason_phrase(status);
        Self {
            status,
            body: format!(
                "<html><head><title>{status} {reason}</title></head><body>{reason}</body></html>"
            ),
        }
    }
}

/// Anything that can deliver a response to a client
#[async_trait]
pub trait ResponseSink: Send {
    async fn send(&mut self, response: HtmlResponse) -> Result<()>;
}

/// Hand the document to a sink as a 200 response
pub async fn serve_document(document: &Document, sink: &mut dyn ResponseSink) -> Result<()> {
    sink.send(HtmlResponse::document(document)).await
}

/// Writes HTTP/1.1 responses to a byte stream
///
/// One response per connection: every response carries `Connection: close`.
pub struct HttpResponder<W> {
    writer: W,
    head_only: bool,
}

impl<W> HttpResponder<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            head_only: false,
        }
    }

    /// Answer a HEAD request: headers as for GET, no body
    pub fn head_only(mut self) -> Self {
        self.head_only = true;
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W> ResponseSink for HttpResponder<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, response: HtmlResponse) -> Result<()> {
        let head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            response.status,
            reason_phrase(response.status),
            CONTENT_TYPE,
            response.body.len()
        );

        let mut bytes = head.into_bytes();
        if !self.head_only {
            bytes.extend_from_slice(response.body.as_bytes());
        }

        self.writer.write_all(&bytes).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Captured(Vec<HtmlResponse>);

    #[async_trait]
    impl ResponseSink for Captured {
        async fn send(&mut self, response: HtmlResponse) -> Result<()> {
            self.0.push(response);
            Ok(())
        }
    }

    fn sample_document() -> Document {
        let mut doc = Document::with_title("T");
        doc.span("hi");
        doc
    }

    #[tokio::test]
    async fn test_serve_document_is_always_ok() {
        let doc = sample_document();
        let mut sink = Captured(Vec::new());

        serve_document(&doc, &mut sink).await.unwrap();
        serve_document(&doc, &mut sink).await.unwrap();

        assert_eq!(sink.0.len(), 2);
        assert!(sink.0.iter().all(|r| r.status == 200));
        assert_eq!(sink.0[0].body, doc.render_document());
        assert_eq!(sink.0[0], sink.0[1]);
    }

    #[tokio::test]
    async fn test_http_responder_writes_exact_bytes() {
        let body = "<html><head><title>T</title><style></style></head><body><span >hi</span></body></html>";
        let expected = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );

        let mock = tokio_test::io::Builder::new()
            .write(expected.as_bytes())
            .build();
        let mut responder = HttpResponder::new(mock);

        serve_document(&sample_document(), &mut responder)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_head_only_omits_body() {
        let mut responder = HttpResponder::new(Vec::new()).head_only();
        responder.send(HtmlResponse::not_found()).await.unwrap();

        let written = String::from_utf8(responder.into_inner()).unwrap();
        let body_len = HtmlResponse::not_found().body.len();

        assert!(written.starts_with("HTTP/1.1 404 Not Found\r\n"));
        assert!(written.contains(&format!("Content-Length: {}\r\n", body_len)));
        assert!(written.ends_with("\r\n\r\n"));
    }
}
