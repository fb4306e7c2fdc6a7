//! Wallet collaborator seams.
//!
//! Chain Gardens never touches keys. Everything wallet-shaped (network
//! switching, signing, smart-wallet derivation) is delegated to whatever
//! implements these traits: a browser-extension bridge, a local signer,
//! or a mock in tests.
//!
//! # The three traits
//!
//! - [`WalletProvider`]: the wallet extension itself. It knows the
//!   active chain, can switch or add chains, hands out a signer, and
//!   publishes account-change events.
//! - [`WalletSigner`]: one externally-owned account that can sign text.
//! - [`SmartWalletFactory`]: derives the deterministic smart-wallet
//!   address for an owner and builds a client bound to a signer.
//!
//! Every async method returns `impl Future + Send` so the session
//! manager can be driven from any Tokio task.

use std::fmt;
use std::future::Future;

use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// WalletError
// ---------------------------------------------------------------------------

/// EIP-1193 code for "the user rejected the request".
pub const USER_REJECTED_CODE: i64 = 4001;

/// Code wallets return from a chain switch when the chain is unknown.
pub const UNRECOGNIZED_CHAIN_CODE: i64 = 4902;

/// Structured classification of a wallet failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletErrorKind {
    /// The user declined the prompt.
    UserRejected,
    /// The wallet doesn't know the requested chain.
    ChainNotAdded,
    Other,
}

/// A failure reported by a wallet collaborator.
///
/// `kind` is `None` when the wallet only gave us a message. In that case
/// [`is_user_rejection`](Self::is_user_rejection) falls back to looking
/// at the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletError {
    pub kind: Option<WalletErrorKind>,
    pub message: String,
}

impl WalletError {
    /// An error with a structured kind.
    pub fn new(kind: WalletErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            message: message.into(),
        }
    }

    /// An error that only carries a description.
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            kind: None,
            message: message.into(),
        }
    }

    /// Classifies a provider RPC error code.
    pub fn from_code(code: i64, message: impl Into<String>) -> Self {
        let kind = match code {
            USER_REJECTED_CODE => WalletErrorKind::UserRejected,
            UNRECOGNIZED_CHAIN_CODE => WalletErrorKind::ChainNotAdded,
            _ => WalletErrorKind::Other,
        };
        Self::new(kind, message)
    }

    /// Did the user decline the request?
    ///
    /// Trusts the structured kind when there is one; otherwise matches
    /// "user rejected" case-insensitively in the message.
    pub fn is_user_rejection(&self) -> bool {
        match self.kind {
            Some(kind) => kind == WalletErrorKind::UserRejected,
            None => self.message.to_lowercase().contains("user rejected"),
        }
    }
}

impl fmt::Display for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WalletError {}

// ---------------------------------------------------------------------------
// ChainParams
// ---------------------------------------------------------------------------

/// Native currency description sent along with an add-chain request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Default for NativeCurrency {
    fn default() -> Self {
        Self {
            name: "Ethereum".into(),
            symbol: "ETH".into(),
            decimals: 18,
        }
    }
}

/// Everything a wallet needs to add a chain it doesn't know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainParams {
    pub chain_id: u64,
    pub chain_name: String,
    pub rpc_urls: Vec<String>,
    pub native_currency: NativeCurrency,
    pub block_explorer_urls: Vec<String>,
}

impl ChainParams {
    /// The chain id in the `0x…` form wallets expect.
    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id)
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// One externally-owned account able to sign messages.
///
/// `Clone` because the manager hands the signer out in the
/// [`WalletConnection`](crate::WalletConnection) and keeps its own copy.
pub trait WalletSigner: Clone + Send + Sync + 'static {
    /// The account address, in whatever case the wallet reports it.
    fn address(&self) -> impl Future<Output = Result<String, WalletError>> + Send;

    /// Signs `message` as a personal message and returns the signature.
    fn sign_message(
        &self,
        message: &str,
    ) -> impl Future<Output = Result<String, WalletError>> + Send;
}

/// The wallet extension (or anything acting like one).
pub trait WalletProvider: Send + Sync + 'static {
    type Signer: WalletSigner;

    /// Returns `false` when no wallet is installed.
    fn is_available(&self) -> bool;

    /// Asks the wallet to make `chain_id` the active chain.
    fn switch_chain(
        &self,
        chain_id: u64,
    ) -> impl Future<Output = Result<(), WalletError>> + Send;

    /// Asks the wallet to register a chain.
    fn add_chain(
        &self,
        params: &ChainParams,
    ) -> impl Future<Output = Result<(), WalletError>> + Send;

    /// The currently active chain id.
    fn chain_id(&self) -> impl Future<Output = Result<u64, WalletError>> + Send;

    /// The active account's signer.
    fn signer(&self) -> impl Future<Output = Result<Self::Signer, WalletError>> + Send;

    /// Starts delivering account-change events. Each event carries the
    /// full new account list.
    fn subscribe_accounts(&self) -> mpsc::UnboundedReceiver<Vec<String>>;

    /// Stops every account-change subscription.
    fn unsubscribe_accounts(&self);
}

/// Smart-wallet derivation and client construction.
pub trait SmartWalletFactory: Send + Sync + 'static {
    /// Handle for submitting smart-wallet transactions.
    type Client: Send + Sync + 'static;

    /// Deterministically derives the smart-wallet address owned by `owner`.
    fn derive_address(
        &self,
        owner: &str,
    ) -> impl Future<Output = Result<String, WalletError>> + Send;

    /// Builds a client that signs through `signer`.
    fn create_client<S: WalletSigner>(
        &self,
        signer: &S,
    ) -> impl Future<Output = Result<Self::Client, WalletError>> + Send;
}
