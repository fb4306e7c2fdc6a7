//! Session types: configuration, lifecycle state, and the data a live
//! session carries.

use std::fmt;

use chaingarden_protocol::SessionToken;

use crate::{ChainParams, NativeCurrency};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// The chain the wallet must be on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub chain_name: String,
    pub rpc_url: String,
    pub explorer_url: String,
}

impl ChainConfig {
    /// Parameters for an add-chain request.
    pub fn params(&self) -> ChainParams {
        ChainParams {
            chain_id: self.chain_id,
            chain_name: self.chain_name.clone(),
            rpc_urls: vec![self.rpc_url.clone()],
            native_currency: NativeCurrency::default(),
            block_explorer_urls: vec![self.explorer_url.clone()],
        }
    }
}

/// Abstract Testnet.
impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: 0x2B74,
            chain_name: "Abstract Testnet".into(),
            rpc_url: "https://api.testnet.abs.xyz".into(),
            explorer_url: "https://explorer.testnet.abs.xyz".into(),
        }
    }
}

/// Configuration for the session manager.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub chain: ChainConfig,
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Where the session is in its lifecycle.
///
/// ```text
///   Disconnected ──(connect)──→ Connected ──(authenticate)──→ Authenticated
///        ↑                          │   ↑                          │
///        │                          │   └──(auth fails)────────────┤
///        └──(disconnect / account change)──────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No wallet bound to the session.
    Disconnected,
    /// Wallet connected, no backend token yet.
    Connected,
    /// Backend token present.
    Authenticated,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "Disconnected"),
            Self::Connected => write!(f, "Connected"),
            Self::Authenticated => write!(f, "Authenticated"),
        }
    }
}

// ---------------------------------------------------------------------------
// WalletConnection / Session
// ---------------------------------------------------------------------------

/// What a successful `connect` produces.
#[derive(Debug, Clone)]
pub struct WalletConnection<S, C> {
    pub signer: S,
    /// The externally-owned account address.
    pub address: String,
    pub smart_wallet_address: String,
    pub client: C,
}

/// A snapshot of the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub wallet_address: String,
    pub smart_wallet_address: String,
    pub token: Option<SessionToken>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}
