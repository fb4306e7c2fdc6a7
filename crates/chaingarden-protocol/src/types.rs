//! Core data model for the Chain Gardens backend contract.
//!
//! Every type here mirrors a JSON shape the backend sends or accepts.
//! Field names follow the backend's snake_case wire names, so serde
//! needs no renames on the structs.
//!
//! String enumerations (`growth_stage`, `weather_type`, `pest_type`) are
//! decoded leniently: values the client doesn't know land in an
//! `Other(String)` variant instead of failing the whole snapshot. The
//! stats engine relies on that to drop unknown stages and to give
//! unknown weather its default multiplier.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Session token
// ---------------------------------------------------------------------------

/// Opaque credential issued by the backend after signature verification.
///
/// The token is the whole session context: every authenticated request
/// takes a `&SessionToken` explicitly. `Debug` is redacted so the token
/// never ends up in logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The full `Authorization` header value the backend expects.
    pub fn authorization_header(&self) -> String {
        format!("Token {}", self.0)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

// ---------------------------------------------------------------------------
// Lenient string enums
// ---------------------------------------------------------------------------

/// Discrete lifecycle phase of a plant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum GrowthStage {
    Seed,
    Sprout,
    Growing,
    Mature,
    Flowering,
    Harvest,
    /// A stage name this client doesn't recognize.
    Other(String),
}

impl GrowthStage {
    /// The fixed stage set, in lifecycle order.
    pub const ALL: [GrowthStage; 6] = [
        GrowthStage::Seed,
        GrowthStage::Sprout,
        GrowthStage::Growing,
        GrowthStage::Mature,
        GrowthStage::Flowering,
        GrowthStage::Harvest,
    ];

    /// Wire name (`"seed"`, `"harvest"`, or the raw unknown value).
    pub fn as_str(&self) -> &str {
        match self {
            Self::Seed => "seed",
            Self::Sprout => "sprout",
            Self::Growing => "growing",
            Self::Mature => "mature",
            Self::Flowering => "flowering",
            Self::Harvest => "harvest",
            Self::Other(raw) => raw,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &str {
        match self {
            Self::Seed => "Seed",
            Self::Sprout => "Sprout",
            Self::Growing => "Growing",
            Self::Mature => "Mature",
            Self::Flowering => "Flowering",
            Self::Harvest => "Ready to Harvest",
            Self::Other(raw) => raw,
        }
    }

    /// Returns `true` for members of the fixed stage set.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for GrowthStage {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "seed" => Self::Seed,
            "sprout" => Self::Sprout,
            "growing" => Self::Growing,
            "mature" => Self::Mature,
            "flowering" => Self::Flowering,
            "harvest" => Self::Harvest,
            _ => Self::Other(raw),
        }
    }
}

impl From<GrowthStage> for String {
    fn from(stage: GrowthStage) -> Self {
        match stage {
            GrowthStage::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for GrowthStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of weather currently affecting every garden.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WeatherType {
    Sunny,
    Cloudy,
    Rainy,
    Stormy,
    Other(String),
}

impl WeatherType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Sunny => "sunny",
            Self::Cloudy => "cloudy",
            Self::Rainy => "rainy",
            Self::Stormy => "stormy",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for WeatherType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "sunny" => Self::Sunny,
            "cloudy" => Self::Cloudy,
            "rainy" => Self::Rainy,
            "stormy" => Self::Stormy,
            _ => Self::Other(raw),
        }
    }
}

impl From<WeatherType> for String {
    fn from(weather: WeatherType) -> Self {
        match weather {
            WeatherType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for WeatherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of pest infesting a garden.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PestType {
    Aphids,
    Slugs,
    Fungus,
    Other(String),
}

impl PestType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Aphids => "aphids",
            Self::Slugs => "slugs",
            Self::Fungus => "fungus",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for PestType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "aphids" => Self::Aphids,
            "slugs" => Self::Slugs,
            "fungus" => Self::Fungus,
            _ => Self::Other(raw),
        }
    }
}

impl From<PestType> for String {
    fn from(pest: PestType) -> Self {
        match pest {
            PestType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for PestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Catalog, plants, garden, weather
// ---------------------------------------------------------------------------

/// An immutable entry of the plant catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantType {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Base growth rate multiplier.
    pub growth_rate: f64,
    #[serde(default)]
    pub max_health: Option<u32>,
    /// Minimum soil quality (percent) this plant wants.
    pub required_soil_quality: u32,
}

fn default_growth_multiplier() -> f64 {
    1.0
}

/// One plant occupying a slot of a garden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    pub id: String,
    /// Unique within the garden; `0..plot_size`.
    pub slot_position: u32,
    pub plant_type: PlantType,
    pub growth_stage: GrowthStage,
    /// Percent, 0-100.
    #[serde(default)]
    pub growth_progress: f64,
    /// Percent, 0-100.
    pub health: f64,
    /// Percent, 0-100.
    #[serde(default)]
    pub pest_damage: u32,
    #[serde(default = "default_growth_multiplier")]
    pub growth_multiplier: f64,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
}

/// A user's garden plot as returned by `GET /garden/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Garden {
    #[serde(default)]
    pub id: String,
    pub level: u32,
    /// Percent, 0-100.
    pub soil_quality: u32,
    /// Number of plant slots.
    pub plot_size: u32,
    #[serde(default)]
    pub plants: Vec<Plant>,
    #[serde(default)]
    pub pest_infestation: bool,
    #[serde(default)]
    pub pest_type: Option<PestType>,
    /// Percent, 0-100.
    #[serde(default)]
    pub pest_severity: u32,
    #[serde(default)]
    pub total_onchain_actions: u64,
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
}

impl Garden {
    /// The plant in `slot`, if any.
    pub fn plant_at(&self, slot: u32) -> Option<&Plant> {
        self.plants.iter().find(|p| p.slot_position == slot)
    }

    /// Looks a plant up by id.
    pub fn plant(&self, plant_id: &str) -> Option<&Plant> {
        self.plants.iter().find(|p| p.id == plant_id)
    }

    /// Returns `true` if `slot` exists in this plot.
    pub fn has_slot(&self, slot: u32) -> bool {
        slot < self.plot_size
    }

    /// Every slot of the plot in order, paired with its plant.
    pub fn slots(&self) -> impl Iterator<Item = (u32, Option<&Plant>)> + '_ {
        (0..self.plot_size).map(|slot| (slot, self.plant_at(slot)))
    }

    /// Slots that currently hold no plant.
    pub fn empty_slots(&self) -> Vec<u32> {
        self.slots()
            .filter(|(_, plant)| plant.is_none())
            .map(|(slot, _)| slot)
            .collect()
    }
}

/// Ambient weather, derived by the backend from chain activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    pub weather_type: WeatherType,
    pub temperature: f64,
    pub rainfall: f64,
    /// Percent, 0-100.
    pub sunlight: f64,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Request and response bodies
// ---------------------------------------------------------------------------

/// Response envelope wrapped around every backend payload.
///
/// The backend is not consistent: some views answer
/// `{"status": "success", ...}`, others `{"success": true, ...}`, and
/// framework-level rejections carry only `{"detail": "..."}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub status: Option<String>,
    pub success: Option<bool>,
    pub data: Option<T>,
    pub error: Option<String>,
    pub detail: Option<String>,
}

impl<T> Envelope<T> {
    /// The most specific error text the backend provided.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().or(self.detail.as_deref())
    }
}

/// Body of `POST /user/authenticate/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticateRequest {
    pub wallet_address: String,
    pub signature: String,
}

/// `data` of a successful authentication.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
    pub token: SessionToken,
}

/// `data` of `GET /garden/status/`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusPayload {
    #[serde(default)]
    pub weather_data: Option<Weather>,
}

/// `data` of `GET /garden/plant-types/`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlantTypesPayload {
    #[serde(default)]
    pub plant_types_data: Vec<PlantType>,
}

/// Body of `POST /garden/plants/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantSeedRequest {
    pub plant_type_id: String,
    pub slot_position: u32,
}

/// `data` of a successful planting.
#[derive(Debug, Clone, Deserialize)]
pub struct PlantPayload {
    pub plant_data: Plant,
}
