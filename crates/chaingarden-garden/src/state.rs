//! The current garden snapshot.
//!
//! A load replaces everything at once. There is never a merge between
//! an old and a new snapshot, so at most one garden is "current".

use chaingarden_protocol::{Garden, Plant, PlantType, Weather};
use chrono::{DateTime, Utc};

use crate::{GardenError, GardenStats};

/// Result of one successful [`load_garden_data`](crate::load_garden_data).
#[derive(Debug, Clone)]
pub struct LoadedGarden {
    pub garden: Garden,
    pub weather: Option<Weather>,
    pub plant_types: Vec<PlantType>,
}

/// Garden, weather, and plant catalog as last loaded.
#[derive(Debug, Clone, Default)]
pub struct GardenState {
    garden: Option<Garden>,
    weather: Option<Weather>,
    plant_types: Vec<PlantType>,
    /// Bumped on every successful load.
    generation: u64,
    loaded_at: Option<DateTime<Utc>>,
}

impl GardenState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies the outcome of a load.
    ///
    /// On success garden, weather, and catalog are all replaced. On
    /// failure only the weather is cleared; garden and catalog stay as
    /// they were. The error is handed back to the caller.
    pub fn apply_load(
        &mut self,
        result: Result<LoadedGarden, GardenError>,
    ) -> Result<(), GardenError> {
        match result {
            Ok(loaded) => {
                self.garden = Some(loaded.garden);
                self.weather = loaded.weather;
                self.plant_types = loaded.plant_types;
                self.generation += 1;
                self.loaded_at = Some(Utc::now());
                Ok(())
            }
            Err(err) => {
                self.weather = None;
                Err(err)
            }
        }
    }

    /// Forgets everything (used when the session ends).
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn garden(&self) -> Option<&Garden> {
        self.garden.as_ref()
    }

    pub fn weather(&self) -> Option<&Weather> {
        self.weather.as_ref()
    }

    pub fn plant_types(&self) -> &[PlantType] {
        &self.plant_types
    }

    pub fn plant_type(&self, id: &str) -> Option<&PlantType> {
        self.plant_types.iter().find(|t| t.id == id)
    }

    /// Plants of the current garden (empty before the first load).
    pub fn plants(&self) -> &[Plant] {
        self.garden
            .as_ref()
            .map(|g| g.plants.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_loaded(&self) -> bool {
        self.garden.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    /// Derived statistics for the current snapshot.
    pub fn stats(&self) -> Option<GardenStats> {
        self.garden
            .as_ref()
            .map(|g| GardenStats::compute(g, self.weather.as_ref()))
    }
}
