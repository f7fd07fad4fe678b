//! Document Server - one route, one document
//!
//! Design decisions:
//! 1. The document is frozen behind an `Arc` before the first accept.
//!    Nothing can register nodes or styles while requests are in flight.
//! 2. One task per connection, one request per connection.
//! 3. Fail fast - no retries, no keep-alive. Let the client reconnect.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::net::TcpListener;
use tracing::Instrument;
use uuid::Uuid;

use markup::Document;

use crate::error::{Result, ServerError};
use crate::events::{EventBus, ServerEvent};
use crate::response::{HtmlResponse, HttpResponder, ResponseSink};

/// Upper bound on the request head we are willing to buffer
pub const MAX_REQUEST_HEAD: usize = 8 * 1024;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Path of the single document route
    pub route: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            route: "/".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Serves one document over HTTP
pub struct DocumentServer {
    config: ServerConfig,
    document: Arc<Document>,
    events: EventBus,
}

impl DocumentServer {
    /// Take ownership of a finished document
    pub fn new(document: Document, config: ServerConfig) -> Self {
        Self {
            config,
            document: Arc::new(document),
            events: EventBus::new(),
        }
    }

    /// Bind the listening socket
    pub async fn bind(self) -> Result<BoundServer> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        Ok(BoundServer {
            listener,
            server: self,
        })
    }
}

/// A server with a live listening socket
pub struct BoundServer {
    listener: TcpListener,
    server: DocumentServer,
}

impl BoundServer {
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn events(&self) -> &EventBus {
        &self.server.events
    }

    /// Serve until `shutdown` resolves
    ///
    /// In-flight connections finish on their own tasks. Connections are not
    /// timed out: a client that sends part of a request head and then goes
    /// quiet keeps its task alive until it disconnects.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let addr = self.local_addr()?;
        let DocumentServer {
            config,
            document,
            events,
        } = self.server;
        let route: Arc<str> = Arc::from(config.route.as_str());

        tracing::info!("Serving document on http://{}{}", addr, route);
        events.publish(ServerEvent::Listening { addr });

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            let document = document.clone();
                            let route = route.clone();
                            let events = events.clone();
                            let request_id = Uuid::now_v7();
                            let span = tracing::info_span!("request", id = %request_id, %peer);

                            tokio::spawn(
                                async move {
                                    match handle_connection(stream, &document, &route).await {
                                        Ok(Some(served)) => {
                                            tracing::debug!("{} {} -> {}", served.method, served.path, served.status);
                                            events.publish(ServerEvent::Served {
                                                request_id,
                                                path: served.path,
                                                status: served.status,
                                            });
                                        }
                                        Ok(None) => {
                                            tracing::debug!("Connection closed before a request arrived");
                                        }
                                        Err(e) => {
                                            tracing::error!("Connection failed: {}", e);
                                        }
                                    }
                                }
                                .instrument(span),
                            );
                        }
                        Err(e) => {
                            tracing::error!("Accept failed: {}", e);
                        }
                    }
                }
                _ = &mut shutdown => {
                    tracing::info!("Shutdown signal received");
                    break;
                }
            }
        }

        events.publish(ServerEvent::Stopped);
        Ok(())
    }
}

/// Parsed request line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    pub path: String,
}

impl RequestLine {
    /// Parse `METHOD target HTTP/x.y`; the query string is dropped
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let method = parts.next()?;
        let target = parts.next()?;
        let version = parts.next()?;

        if !version.starts_with("HTTP/") || parts.next().is_some() {
            return None;
        }

        let path = target.split('?').next().unwrap_or(target);
        Some(Self {
            method: method.to_string(),
            path: path.to_string(),
        })
    }
}

/// Outcome of one handled connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served {
    pub method: String,
    pub path: String,
    pub status: u16,
}

/// Read one request from `stream` and answer it
///
/// Returns `None` when the peer hung up without sending anything.
pub async fn handle_connection<S>(
    mut stream: S,
    document: &Document,
    route: &str,
) -> Result<Option<Served>>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let head = match read_request_head(&mut stream).await? {
        Some(head) => head,
        None => return Ok(None),
    };

    let request = head.lines().next().and_then(RequestLine::parse);
    let (response, head_only) = route_request(request.as_ref(), document, route);
    let served = Served {
        method: request.as_ref().map(|r| r.method.clone()).unwrap_or_default(),
        path: request.map(|r| r.path).unwrap_or_default(),
        status: response.status,
    };

    let mut responder = HttpResponder::new(&mut stream);
    if head_only {
        responder = responder.head_only();
    }
    responder.send(response).await?;

    Ok(Some(served))
}

/// Pick the response for a request; the bool is true for HEAD
fn route_request(
    request: Option<&RequestLine>,
    document: &Document,
    route: &str,
) -> (HtmlResponse, bool) {
    let Some(request) = request else {
        tracing::warn!("Malformed request line");
        return (HtmlResponse::bad_request(), false);
    };

    let head_only = request.method == "HEAD";
    if request.path != route {
        return (HtmlResponse::not_found(), head_only);
    }

    match request.method.as_str() {
        "GET" | "HEAD" => (HtmlResponse::document(document), head_only),
        _ => (HtmlResponse::method_not_allowed(), false),
    }
}

/// Buffer bytes until the blank line ending the request head
///
/// Returns `None` on EOF before any byte. A head larger than
/// `MAX_REQUEST_HEAD` is cut off; only the request line is used anyway.
async fn read_request_head<R>(reader: &mut R) -> Result<Option<String>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if buf.windows(4).any(|w| w == b"\r\n\r\n") || buf.len() >= MAX_REQUEST_HEAD {
            break;
        }
    }

    if buf.is_empty() {
        return Ok(None);
    }
    buf.truncate(MAX_REQUEST_HEAD);
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{duplex, AsyncWriteExt};

    fn sample_document() -> Document {
        let mut doc = Document::with_title("T");
        doc.set_style(".x", [("font-size", "12px")]);
        doc.span("hi");
        doc
    }

    async fn roundtrip(request: &[u8], route: &str) -> (Option<Served>, String) {
        let doc = sample_document();
        let (mut client, server) = duplex(64 * 1024);

        client.write_all(request).await.unwrap();
        let served = handle_connection(server, &doc, route).await.unwrap();

        let mut response = String::new();
        client.read_to_string(&mut response).await.unwrap();
        (served, response)
    }

    #[test]
    fn test_parse_request_line() {
        assert_eq!(
            RequestLine::parse("GET /?a=1 HTTP/1.1"),
            Some(RequestLine {
                method: "GET".to_string(),
                path: "/".to_string(),
            })
        );
        assert_eq!(RequestLine::parse("GET /"), None);
        assert_eq!(RequestLine::parse("GET / FTP/1.0"), None);
        assert_eq!(RequestLine::parse(""), None);
    }

    #[test]
    fn test_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "127.0.0.1:8000");
        assert_eq!(config.route, "/");
    }

    #[tokio::test]
    async fn test_get_document_route() {
        let (served, response) = roundtrip(b"GET / HTTP/1.1\r\nHost: x\r\n\r\n", "/").await;

        assert_eq!(served.unwrap().status, 200);
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("Content-Type: text/html; charset=utf-8\r\n"));
        assert!(response.ends_with(&sample_document().render_document()));
    }

    #[tokio::test]
    async fn test_head_document_route() {
        let (served, response) = roundtrip(b"HEAD / HTTP/1.1\r\n\r\n", "/").await;

        assert_eq!(served.unwrap().status, 200);
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.ends_with("\r\n\r\n"));
    }

    #[tokio::test]
    async fn test_other_path_is_not_found() {
        let (served, response) = roundtrip(b"GET /missing HTTP/1.1\r\n\r\n", "/").await;

        let served = served.unwrap();
        assert_eq!(served.status, 404);
        assert_eq!(served.path, "/missing");
        assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
    }

    #[tokio::test]
    async fn test_custom_route() {
        let (served, _) = roundtrip(b"GET /page HTTP/1.1\r\n\r\n", "/page").await;
        assert_eq!(served.unwrap().status, 200);

        let (served, _) = roundtrip(b"GET / HTTP/1.1\r\n\r\n", "/page").await;
        assert_eq!(served.unwrap().status, 404);
    }

    #[tokio::test]
    async fn test_post_is_not_allowed() {
        let (served, response) = roundtrip(b"POST / HTTP/1.1\r\n\r\n", "/").await;

        assert_eq!(served.unwrap().status, 405);
        assert!(response.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"));
    }

    #[tokio::test]
    async fn test_garbage_is_bad_request() {
        let (served, response) = roundtrip(b"hello\r\n\r\n", "/").await;

        assert_eq!(served.unwrap().status, 400);
        assert!(response.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    #[tokio::test]
    async fn test_silent_peer() {
        let doc = sample_document();
        let (client, server) = duplex(1024);
        drop(client);

        let served = handle_connection(server, &doc, "/").await.unwrap();
        assert!(served.is_none());
    }
}
