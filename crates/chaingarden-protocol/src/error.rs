//! Error types for the protocol layer.
//!
//! A `ProtocolError` always means the bytes were the problem: a body
//! that couldn't be produced, couldn't be parsed, or parsed into
//! something that breaks the backend contract.

/// Errors that can occur while encoding or decoding bodies.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing required fields,
    /// or wrong data types.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The body parsed but violates the backend contract, e.g. a success
    /// envelope without its `data` member.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

/// Errors returned by [`GardenApi`](crate::GardenApi) calls.
///
/// The split matters to callers: a `Transport` error means no answer
/// arrived, `Unauthorized` means the session token is no longer good,
/// and `Rejected` carries the backend's own explanation.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] chaingarden_transport::TransportError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// 401 or 403: missing, invalid, or expired credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The backend answered with an error status or an error envelope.
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl ApiError {
    /// The backend's message for rejections, or the error's display text.
    pub fn message(&self) -> String {
        match self {
            Self::Unauthorized(message) | Self::Rejected { message, .. } => {
                message.clone()
            }
            other => other.to_string(),
        }
    }

    /// HTTP status of the failed answer, if one arrived.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
