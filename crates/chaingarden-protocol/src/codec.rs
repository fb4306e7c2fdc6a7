//! Codec trait and implementations for request and response bodies.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! [`GardenApi`](crate::GardenApi) doesn't care HOW bodies are
//! serialized; it only needs something that implements [`Codec`]. The
//! backend speaks JSON today, so [`JsonCodec`] is the one implementation.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes Rust values to bytes and decodes bytes back.
///
/// `Send + Sync + 'static` because the API client (and its codec) is
/// shared with the background poller task.
///
/// `decode` asks for `DeserializeOwned`: decoded snapshots outlive the
/// response buffer they came from.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or
    /// don't match the expected shape.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use chaingarden_protocol::{Codec, JsonCodec, PlantSeedRequest};
///
/// let codec = JsonCodec;
/// let request = PlantSeedRequest {
///     plant_type_id: "tomato".into(),
///     slot_position: 3,
/// };
///
/// let bytes = codec.encode(&request).unwrap();
/// let decoded: PlantSeedRequest = codec.decode(&bytes).unwrap();
/// assert_eq!(request, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
