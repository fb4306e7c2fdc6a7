//! Error types for the session layer.

use crate::WalletError;

/// Errors from connecting a wallet and authenticating a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No wallet extension is installed.
    #[error("no wallet available, please install a wallet extension")]
    WalletUnavailable,

    /// The wallet could neither switch to nor add the target chain.
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    /// The wallet is on a different chain than the one configured.
    #[error("wrong network: expected chain {expected}, wallet is on {actual}")]
    WrongNetwork { expected: u64, actual: u64 },

    /// `authenticate` was called without a wallet connection.
    #[error("wallet not connected")]
    NotConnected,

    /// The user declined to sign the challenge.
    #[error("signature rejected: {0}")]
    AuthRejected(String),

    /// Signing failed for another reason, or the backend refused the
    /// signature.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// A wallet call failed while connecting.
    #[error("wallet error: {0}")]
    Wallet(#[from] WalletError),
}
