//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. The core builds an `HttpRequest`
//! and hands it to whatever [`Transport`] the client was constructed with;
//! the transport performs the I/O and resolves a one-shot [`Completion`].
//! Swapping the transport is how callers pick between real network access,
//! [`SimulatedTransport`], or a test double.
//!
//! All fields use owned types (`String`, `Vec`) so values can cross FFI
//! boundaries without lifetime concerns.

use std::fmt;

use crate::error::ApiError;

/// HTTP method for a request. The nudge API only uses these three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
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
/// `url` is absolute. `body` is only set for POST and is already
/// form-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// The body is never interpreted by the core; callers receive it verbatim
/// whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// One-shot continuation a transport resolves when the round-trip ends.
pub type Completion = Box<dyn FnOnce(Result<HttpResponse, ApiError>) + Send + 'static>;

/// The injected "make an HTTP request" capability.
///
/// Implementations must invoke `done` exactly once, either inline or from
/// another thread. They must not retry.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest, done: Completion);
}

/// Transport that never touches the network and answers every request with
/// its own URL as the body, status 200.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedTransport;

impl Transport for SimulatedTransport {
    fn execute(&self, request: HttpRequest, done: Completion) {
        done(Ok(HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: request.url,
        }));
    }
}
