//! Typed client for the garden backend's REST endpoints.
//!
//! [`GardenApi`] turns each endpoint into one async method: it builds the
//! [`ApiRequest`], attaches the caller's [`SessionToken`], sends it over
//! any [`Transport`], and unwraps the response [`Envelope`].
//!
//! There is no client-wide credential. Every authenticated call takes the
//! token explicitly, so a poller still holding an old token can never
//! pick up a newer session's header by accident (or the reverse).

use chaingarden_transport::{ApiRequest, ApiResponse, Transport};
use serde::de::{DeserializeOwned, IgnoredAny};

use crate::types::{
    AuthPayload, AuthenticateRequest, Envelope, Garden, Plant, PlantPayload,
    PlantSeedRequest, PlantType, PlantTypesPayload, SessionToken,
    StatusPayload, Weather,
};
use crate::{ApiError, Codec, JsonCodec, ProtocolError};

// ---------------------------------------------------------------------------
// Endpoint paths
// ---------------------------------------------------------------------------

pub const AUTHENTICATE_PATH: &str = "/user/authenticate/";
pub const DISCONNECT_PATH: &str = "/user/disconnect/";
pub const GARDEN_PATH: &str = "/garden/";
pub const STATUS_PATH: &str = "/garden/status/";
pub const PLANT_TYPES_PATH: &str = "/garden/plant-types/";
pub const PLANTS_PATH: &str = "/garden/plants/";

/// Path of a single plant resource.
pub fn plant_path(plant_id: &str) -> String {
    format!("{PLANTS_PATH}{plant_id}/")
}

// ---------------------------------------------------------------------------
// GardenApi
// ---------------------------------------------------------------------------

/// Endpoint client over a [`Transport`] and a [`Codec`].
///
/// Cheap to share: wrap it in an `Arc` to hand it to the poller task.
#[derive(Debug, Clone)]
pub struct GardenApi<T: Transport, C: Codec = JsonCodec> {
    transport: T,
    codec: C,
}

impl<T: Transport> GardenApi<T> {
    /// Creates a JSON client over `transport`.
    pub fn new(transport: T) -> Self {
        Self::with_codec(transport, JsonCodec)
    }
}

impl<T: Transport, C: Codec> GardenApi<T, C> {
    pub fn with_codec(transport: T, codec: C) -> Self {
        Self { transport, codec }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Exchanges a wallet address and its challenge signature for a
    /// session token (`POST /user/authenticate/`).
    pub async fn authenticate(
        &self,
        wallet_address: &str,
        signature: &str,
    ) -> Result<SessionToken, ApiError> {
        let body = self.codec.encode(&AuthenticateRequest {
            wallet_address: wallet_address.to_string(),
            signature: signature.to_string(),
        })?;
        let response =
            self.execute(ApiRequest::post(AUTHENTICATE_PATH, body)).await?;
        let payload: AuthPayload = self.unwrap_data(&response)?;
        Ok(payload.token)
    }

    /// Invalidates the backend session (`POST /user/disconnect/`).
    pub async fn disconnect(&self, token: &SessionToken) -> Result<(), ApiError> {
        let body = self.codec.encode(&EmptyBody {})?;
        let request = ApiRequest::post(DISCONNECT_PATH, body);
        self.execute(authorized(request, token)).await?;
        Ok(())
    }

    /// Fetches the caller's garden (`GET /garden/`). The backend creates
    /// the garden on first access.
    pub async fn garden(&self, token: &SessionToken) -> Result<Garden, ApiError> {
        let request = authorized(ApiRequest::get(GARDEN_PATH), token);
        let response = self.execute(request).await?;
        self.unwrap_data(&response)
    }

    /// Fetches current weather (`GET /garden/status/`). `Ok(None)` when
    /// the backend has no weather record yet.
    pub async fn weather(
        &self,
        token: &SessionToken,
    ) -> Result<Option<Weather>, ApiError> {
        let request = authorized(ApiRequest::get(STATUS_PATH), token);
        let response = self.execute(request).await?;
        let payload: StatusPayload = self.unwrap_data(&response)?;
        Ok(payload.weather_data)
    }

    /// Fetches the plant catalog (`GET /garden/plant-types/`).
    pub async fn plant_types(
        &self,
        token: &SessionToken,
    ) -> Result<Vec<PlantType>, ApiError> {
        let request = authorized(ApiRequest::get(PLANT_TYPES_PATH), token);
        let response = self.execute(request).await?;
        let payload: PlantTypesPayload = self.unwrap_data(&response)?;
        Ok(payload.plant_types_data)
    }

    /// Plants a seed of `plant_type_id` in `slot` (`POST /garden/plants/`).
    pub async fn plant_seed(
        &self,
        token: &SessionToken,
        slot: u32,
        plant_type_id: &str,
    ) -> Result<Plant, ApiError> {
        let body = self.codec.encode(&PlantSeedRequest {
            plant_type_id: plant_type_id.to_string(),
            slot_position: slot,
        })?;
        let request = authorized(ApiRequest::post(PLANTS_PATH, body), token);
        let response = self.execute(request).await?;
        let payload: PlantPayload = self.unwrap_data(&response)?;
        Ok(payload.plant_data)
    }

    /// Removes (harvests) a plant (`DELETE /garden/plants/{id}/`).
    pub async fn remove_plant(
        &self,
        token: &SessionToken,
        plant_id: &str,
    ) -> Result<(), ApiError> {
        let request = authorized(ApiRequest::delete(plant_path(plant_id)), token);
        self.execute(request).await?;
        Ok(())
    }

    // -- internals ----------------------------------------------------------

    /// Sends a request; non-2xx answers become typed errors.
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let method = request.method;
        let path = request.path.clone();

        let response = self.transport.send(request).await?;
        tracing::debug!(%method, %path, status = response.status, "backend answered");

        if response.is_success() {
            Ok(response)
        } else {
            Err(self.rejection(&response))
        }
    }

    fn rejection(&self, response: &ApiResponse) -> ApiError {
        let message = self
            .codec
            .decode::<Envelope<IgnoredAny>>(&response.body)
            .ok()
            .and_then(|envelope| envelope.error_message().map(str::to_string))
            .unwrap_or_else(|| {
                format!("request failed with status {}", response.status)
            });

        match response.status {
            401 | 403 => ApiError::Unauthorized(message),
            status => ApiError::Rejected { status, message },
        }
    }

    /// Decodes the envelope and returns its `data` member.
    fn unwrap_data<P: DeserializeOwned>(
        &self,
        response: &ApiResponse,
    ) -> Result<P, ApiError> {
        let envelope: Envelope<P> = self.codec.decode(&response.body)?;

        if envelope.success == Some(false)
            || envelope.status.as_deref() == Some("error")
        {
            return Err(ApiError::Rejected {
                status: response.status,
                message: envelope
                    .error_message()
                    .unwrap_or("request rejected")
                    .to_string(),
            });
        }

        envelope.data.ok_or_else(|| {
            ProtocolError::InvalidMessage("response envelope has no data".into())
                .into()
        })
    }
}

#[derive(serde::Serialize)]
struct EmptyBody {}

fn authorized(request: ApiRequest, token: &SessionToken) -> ApiRequest {
    request.with_authorization(token.authorization_header())
}
