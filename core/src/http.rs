//! HTTP transport types and the transport seam.
//!
//! # Design
//! Requests and responses are plain data. The core builds `HttpRequest`
//! values and interprets `HttpResponse` values; the socket work belongs to
//! whatever implements `Transport` (a real HTTP agent, an in-memory mock, a
//! record/replay harness). The response payload is already JSON-decoded by
//! the transport, so the core never parses raw HTTP.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

/// Error produced by a transport when the round-trip itself fails
/// (connection refused, timeout, TLS failure, ...).
pub type TransportError = Box<dyn Error + Send + Sync + 'static>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// Built by `Executor::build` from a `RequestSpec`. `url` is absolute (base URL
/// plus path plus query). `body` is already serialized JSON and is always
/// `None` for GET.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    /// Per-call timeout. `None` leaves the transport's default in place.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// The normalized response envelope a transport hands back.
///
/// `data` is `None` when the response carried no decodable body; the
/// executor treats that as fatal for every status code.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub data: Option<Value>,
}

impl HttpResponse {
    /// Convenience constructor for a response with a JSON payload.
    pub fn json(status: u16, data: Value) -> Self {
        Self {
            status,
            status_text: String::new(),
            headers: Vec::new(),
            data: Some(data),
        }
    }

    /// A response without any payload.
    pub fn empty(status: u16) -> Self {
        Self {
            status,
            status_text: String::new(),
            headers: Vec::new(),
            data: None,
        }
    }

    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// The network collaborator.
///
/// Implementations must surface timeouts (`HttpRequest::timeout`) and
/// connectivity failures as `Err`. Non-2xx statuses are *not* errors at this
/// level; they come back as an `HttpResponse` for the core to interpret.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
