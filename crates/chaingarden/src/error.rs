//! Unified error type for the Chain Gardens client.

use chaingarden_garden::GardenError;
use chaingarden_protocol::{ApiError, ProtocolError};
use chaingarden_session::SessionError;
use chaingarden_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// Callers of the `chaingarden` crate deal with this single type instead
/// of importing errors from each layer. The `#[from]` attributes let `?`
/// convert layer errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ChainGardenError {
    /// No response arrived (connect, timeout, broken body).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A body could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The backend answered with an error.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Wallet connection or authentication failed.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Loading the garden or acting on a slot failed.
    #[error(transparent)]
    Garden(#[from] GardenError),
}

impl ChainGardenError {
    /// `true` when the user declined a wallet prompt.
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Self::Session(SessionError::AuthRejected(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectFailed("refused".into());
        let cg_err: ChainGardenError = err.into();
        assert!(matches!(cg_err, ChainGardenError::Transport(_)));
        assert!(cg_err.to_string().contains("refused"));
    }

    #[test]
    fn test_from_api_error() {
        let err = ApiError::Unauthorized("Invalid token.".into());
        let cg_err: ChainGardenError = err.into();
        assert!(matches!(cg_err, ChainGardenError::Api(_)));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::AuthFailed("nope".into());
        let cg_err: ChainGardenError = err.into();
        assert!(matches!(cg_err, ChainGardenError::Session(_)));
        assert!(!cg_err.is_user_rejection());
    }

    #[test]
    fn test_from_garden_error() {
        let cg_err: ChainGardenError = GardenError::SlotBusy(2).into();
        assert!(matches!(cg_err, ChainGardenError::Garden(GardenError::SlotBusy(2))));
    }

    #[test]
    fn test_rejected_signature_is_user_rejection() {
        let cg_err: ChainGardenError =
            SessionError::AuthRejected("User rejected the request.".into()).into();
        assert!(cg_err.is_user_rejection());
    }
}
