//! Viza Networking
//!
//! Request/response model, the [`Fetch`] seam the worker talks to, and an
//! async HTTP/1.1 client for the dashboard backend.

pub mod loader;
pub mod fetch;
pub mod http1;
pub mod client;

use std::future::Future;
use std::time::Duration;

pub use loader::{Request, Method};
pub use fetch::fetch_with_timeout;
pub use client::{HttpClient, HttpClientBuilder, ClientConfig};
pub use http1::{Http1Request, Http1Response, Http1Parser, HttpVersion};
pub use url::Url;

/// Anything that can turn a [`Request`] into a [`Response`].
///
/// The worker only ever reaches the network through this trait, which keeps
/// the caching policy independent of the transport.
pub trait Fetch: Send + Sync {
    fn fetch(&self, request: &Request) -> impl Future<Output = Result<Response, NetError>> + Send;
}

/// HTTP Response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    /// Create a response with the canonical reason phrase for `status`
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            status_text: reason_phrase(status).to_string(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Plain 200 OK
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, body)
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Get header value (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Get body as text
    pub fn text(&self) -> Option<String> {
        String::from_utf8(self.body.clone()).ok()
    }

    /// Decode the body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, NetError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| NetError::Network(e.to_string()))
    }

    /// Check if response is successful
    pub fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Network error
#[derive(Debug, Clone, thiserror::Error)]
pub enum NetError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

impl From<std::io::Error> for NetError {
    fn from(e: std::io::Error) -> Self {
        NetError::Network(e.to_string())
    }
}

impl From<url::ParseError> for NetError {
    fn from(e: url::ParseError) -> Self {
        NetError::InvalidUrl(e.to_string())
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_is_success() {
        assert!(Response::ok("hi").is_success());
        assert!(!Response::new(404, "").is_success());
    }

    #[test]
    fn test_response_reason_phrase() {
        assert_eq!(Response::new(503, "").status_text, "Service Unavailable");
        assert_eq!(Response::new(299, "").status_text, "");
    }

    #[test]
    fn test_response_header_case_insensitive() {
        let resp = Response::ok("{}").with_header("Content-Type", "application/json");
        assert_eq!(resp.header("content-type"), Some("application/json"));
        assert_eq!(resp.header("etag"), None);
    }

    #[test]
    fn test_response_json() {
        let resp = Response::ok(r#"{"brilho": 80}"#);
        let value: serde_json::Value = resp.json().unwrap();
        assert_eq!(value["brilho"], 80);
    }
}
