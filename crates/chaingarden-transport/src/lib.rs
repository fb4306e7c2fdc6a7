//! Transport abstraction layer for Chain Gardens.
//!
//! Provides the [`Transport`] trait that abstracts over how a request
//! reaches the garden backend. Everything above this crate speaks in
//! [`ApiRequest`] / [`ApiResponse`] and never touches an HTTP client
//! directly.
//!
//! # Feature Flags
//!
//! - `http` (default): real HTTP transport via `reqwest`
//!
//! [`MemoryTransport`] is always available: it has no extra dependencies
//! and backs the tests of every crate above this one.

mod error;
#[cfg(feature = "http")]
mod http;
mod memory;

pub use error::TransportError;
#[cfg(feature = "http")]
pub use http::HttpTransport;
pub use memory::MemoryTransport;

use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Client-level timeout applied to every request unless overridden.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(10_000);

/// The HTTP verbs the garden backend uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// A request addressed to the backend, relative to its base URL.
///
/// The `authorization` value is the complete header value (for example
/// `Token abc123`). It travels with the request rather than living in a
/// client-wide default, so two requests never share credentials by
/// accident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base, always starting with `/`.
    pub path: String,
    /// JSON body, already encoded.
    pub body: Option<Vec<u8>>,
    pub authorization: Option<String>,
}

impl ApiRequest {
    /// A body-less `GET`.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
            authorization: None,
        }
    }

    /// A `POST` with an encoded JSON body.
    pub fn post(path: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
            authorization: None,
        }
    }

    /// A body-less `DELETE`.
    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            path: path.into(),
            body: None,
            authorization: None,
        }
    }

    /// Attaches an `Authorization` header value.
    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }
}

/// The raw answer to an [`ApiRequest`]: status code plus body bytes.
///
/// Non-2xx statuses are NOT transport errors. The transport only fails
/// when no response arrived at all; interpreting error bodies is the
/// protocol layer's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Delivers requests to the backend.
///
/// The returned future must be `Send` because the garden poller runs
/// on its own Tokio task and issues requests from there.
pub trait Transport: Send + Sync + 'static {
    /// Sends one request and waits for its response.
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send;
}
