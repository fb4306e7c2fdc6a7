//! Wire contract for Chain Gardens.
//!
//! This crate defines the "language" the client and the garden backend
//! speak:
//!
//! - **Types** ([`Garden`], [`Plant`], [`Weather`], [`Envelope`], etc.):
//!   the structures that travel in request and response bodies.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those structures are
//!   converted to and from bytes.
//! - **Api** ([`GardenApi`]): one async method per backend endpoint.
//! - **Errors** ([`ProtocolError`], [`ApiError`]).
//!
//! # Architecture
//!
//! ```text
//! Transport (ApiRequest/ApiResponse) → Protocol (typed endpoints) → Session / Garden
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

#[cfg(feature = "json")]
mod api;
mod codec;
mod error;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

#[cfg(feature = "json")]
pub use api::{
    AUTHENTICATE_PATH, DISCONNECT_PATH, GARDEN_PATH, GardenApi,
    PLANT_TYPES_PATH, PLANTS_PATH, STATUS_PATH, plant_path,
};
pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::{ApiError, ProtocolError};
pub use types::{
    AuthPayload, AuthenticateRequest, Envelope, Garden, GrowthStage, PestType,
    Plant, PlantPayload, PlantSeedRequest, PlantType, PlantTypesPayload,
    SessionToken, StatusPayload, Weather, WeatherType,
};
