//! Garden layer for Chain Gardens.
//!
//! Holds the current garden snapshot and everything computed from or
//! done to it:
//!
//! - [`load_garden_data`] / [`refresh_garden`]: concurrent fetch of
//!   garden, weather, and plant catalog
//! - [`GardenState`]: the snapshot, replaced wholesale on each load
//! - [`stats`]: pure derived figures (health, efficiency, stage counts)
//! - [`actions`]: planting and removal with per-slot locks
//! - [`GardenPoller`]: the background refresh task

pub mod actions;
mod error;
mod loader;
mod poller;
mod state;
pub mod stats;

pub use actions::{
    PlantGuard, SlotGuard, SlotLocks, check_plant_seed, plant_and_reload, plant_seed,
    remove_and_reload, remove_plant,
};
pub use error::GardenError;
pub use loader::{load_garden_data, refresh_garden};
pub use poller::{GardenPoller, PollerHandle};
pub use state::{GardenState, LoadedGarden};
pub use stats::{
    DamageLevel, GardenStats, PestAlert, StageHistogram, average_health,
    days_since_activity, growth_efficiency, growth_stage_histogram, pest_remedy,
    weather_multiplier,
};
