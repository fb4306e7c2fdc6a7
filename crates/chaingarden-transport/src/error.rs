/// Errors that can occur in the transport layer.
///
/// Only covers "no usable response arrived". A 4xx/5xx answer is a
/// successful transport round trip and is handled further up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request did not complete within the client timeout.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// The backend could not be reached.
    #[error("connect failed: {0}")]
    ConnectFailed(String),

    /// The request could not be built or sent.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// The response body could not be read.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// No route is configured for this request (in-memory transport only).
    #[error("no route for {method} {path}")]
    NoRoute { method: String, path: String },
}
