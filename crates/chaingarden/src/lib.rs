//! # Chain Gardens
//!
//! Wallet-gated client for the Chain Gardens garden backend.
//!
//! A user connects a wallet, signs a challenge to get a session token,
//! then reads and tends a simulated garden. [`GardenClient`] drives that
//! whole lifecycle: it owns the wallet session, keeps a background poller
//! running while authenticated, and exposes the garden snapshot together
//! with its derived statistics.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chaingarden::prelude::*;
//!
//! // Implement WalletProvider / SmartWalletFactory for your wallet, then:
//! // let mut client = GardenClientBuilder::new()
//! //     .config(ClientConfig::from_env())
//! //     .build(wallet, factory)?;
//! // client.connect_wallet().await?;
//! // client.authenticate().await?;
//! // let stats = client.stats().await;
//! ```

mod client;
pub mod config;
mod error;
mod notice;
pub mod telemetry;

pub use client::{GardenClient, GardenClientBuilder};
pub use config::ClientConfig;
pub use error::ChainGardenError;
pub use notice::{DEFAULT_NOTICE_TTL, Notice, NoticeKind, Notifier};

pub use chaingarden_garden as garden;
pub use chaingarden_poll as poll;
pub use chaingarden_protocol as protocol;
pub use chaingarden_session as session;
pub use chaingarden_transport as transport;

/// Common imports for applications.
pub mod prelude {
    pub use crate::{
        ChainGardenError, ClientConfig, GardenClient, GardenClientBuilder,
        Notice, NoticeKind,
    };
    pub use chaingarden_garden::{
        DamageLevel, GardenError, GardenState, GardenStats, PestAlert,
    };
    pub use chaingarden_protocol::{
        Garden, GrowthStage, PestType, Plant, PlantType, SessionToken, Weather,
        WeatherType,
    };
    pub use chaingarden_session::{
        ChainParams, SessionError, SessionState, SmartWalletFactory,
        WalletError, WalletErrorKind, WalletProvider, WalletSigner,
    };
    pub use chaingarden_transport::{HttpTransport, Transport};
}
