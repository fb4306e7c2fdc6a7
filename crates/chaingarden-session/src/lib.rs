//! Wallet connection and session lifecycle for Chain Gardens.
//!
//! This crate handles everything between "the user has a wallet" and
//! "the client holds a backend session token":
//!
//! 1. **Wallet seams**: [`WalletProvider`], [`WalletSigner`],
//!    [`SmartWalletFactory`]
//! 2. **Session tracking**: [`SessionManager`] drives connect,
//!    challenge signing, authentication, and teardown
//!
//! # How it fits in the stack
//!
//! ```text
//! Facade (above)  ← starts/stops polling as the session comes and goes
//!     ↕
//! Session Layer (this crate)  ← wallet identity and the session token
//!     ↕
//! Protocol Layer (below)  ← GardenApi, SessionToken
//! ```

#![allow(async_fn_in_trait)]

mod error;
mod manager;
mod session;
mod wallet;

pub use error::SessionError;
pub use manager::{SessionManager, challenge_message};
pub use session::{
    ChainConfig, Session, SessionConfig, SessionState, WalletConnection,
};
pub use wallet::{
    ChainParams, NativeCurrency, SmartWalletFactory, UNRECOGNIZED_CHAIN_CODE,
    USER_REJECTED_CODE, WalletError, WalletErrorKind, WalletProvider,
    WalletSigner,
};
