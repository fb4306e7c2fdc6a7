//! Fetching a fresh garden snapshot.

use chaingarden_protocol::{GardenApi, SessionToken};
use chaingarden_transport::Transport;
use tokio::sync::Mutex;

use crate::{GardenError, GardenState, LoadedGarden};

/// Fetches garden, weather, and plant catalog concurrently.
///
/// All three requests are in flight at once. A weather failure is not
/// fatal: the result simply carries no weather. A garden or catalog
/// failure fails the whole load with [`GardenError::DataFetchFailed`].
pub async fn load_garden_data<T: Transport>(
    api: &GardenApi<T>,
    token: &SessionToken,
) -> Result<LoadedGarden, GardenError> {
    let (garden, weather, plant_types) = tokio::join!(
        api.garden(token),
        api.weather(token),
        api.plant_types(token),
    );

    let weather = weather.unwrap_or_else(|e| {
        let err = GardenError::WeatherUnavailable(e);
        tracing::warn!(error = %err, "continuing without weather");
        None
    });
    let garden = garden.map_err(GardenError::DataFetchFailed)?;
    let plant_types = plant_types.map_err(GardenError::DataFetchFailed)?;

    tracing::debug!(
        plants = garden.plants.len(),
        plant_types = plant_types.len(),
        has_weather = weather.is_some(),
        "garden data loaded"
    );

    Ok(LoadedGarden {
        garden,
        weather,
        plant_types,
    })
}

/// Loads a fresh snapshot and applies it to `state`.
///
/// The state lock is only taken once the requests have settled, never
/// across I/O.
pub async fn refresh_garden<T: Transport>(
    api: &GardenApi<T>,
    token: &SessionToken,
    state: &Mutex<GardenState>,
) -> Result<(), GardenError> {
    let result = load_garden_data(api, token).await;
    state.lock().await.apply_load(result)
}
