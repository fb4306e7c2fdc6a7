//! Error types for the garden layer.

use chaingarden_protocol::ApiError;

/// Errors from loading the garden or acting on its slots.
#[derive(Debug, thiserror::Error)]
pub enum GardenError {
    /// The garden or the plant catalog couldn't be fetched. The previous
    /// snapshot stays in place (minus weather).
    #[error("failed to load garden data: {0}")]
    DataFetchFailed(#[source] ApiError),

    /// Weather couldn't be fetched. Never returned from a load; it is
    /// logged and the snapshot carries no weather.
    #[error("weather unavailable: {0}")]
    WeatherUnavailable(#[source] ApiError),

    /// A plant or remove request failed for a reason without its own
    /// variant.
    #[error("action failed: {0}")]
    ActionFailed(String),

    #[error("slot {0} is already occupied")]
    SlotOccupied(u32),

    #[error("unknown plant type {0:?}")]
    InvalidPlantType(String),

    #[error("slot {0} does not exist in this garden")]
    InvalidSlot(u32),

    #[error("no plant with id {0:?} in this garden")]
    PlantNotFound(String),

    /// Another action on the same slot hasn't finished yet.
    #[error("slot {0} is busy with another action")]
    SlotBusy(u32),

    /// A removal of the same plant hasn't finished yet.
    #[error("plant {0:?} is busy with another action")]
    PlantBusy(String),

    /// The operation needs a session token.
    #[error("not authenticated")]
    NotAuthenticated,
}
