//! Derived garden statistics.
//!
//! Everything here is a pure function of a garden snapshot and the
//! current weather: no I/O, no clock unless one is passed in.
//!
//! Two behaviours are kept exactly as the game has always shown them:
//! weather types outside the known four get a multiplier of 1.0 (more
//! than any known type), and growth stages outside the fixed six are left
//! out of the histogram entirely.

use std::fmt;

use chaingarden_protocol::{
    Garden, GrowthStage, PestType, Plant, Weather, WeatherType,
};
use chrono::{DateTime, Utc};

// ---------------------------------------------------------------------------
// Health and efficiency
// ---------------------------------------------------------------------------

/// Growth multiplier for a weather type.
pub fn weather_multiplier(weather_type: &WeatherType) -> f64 {
    match weather_type {
        WeatherType::Sunny => 0.5,
        WeatherType::Cloudy => 0.3,
        WeatherType::Rainy => 0.2,
        WeatherType::Stormy => 0.1,
        WeatherType::Other(_) => 1.0,
    }
}

/// Mean plant health, rounded to the nearest whole percent. 0 for no
/// plants.
pub fn average_health(plants: &[Plant]) -> u32 {
    if plants.is_empty() {
        return 0;
    }
    let total: f64 = plants.iter().map(|p| p.health).sum();
    (total / plants.len() as f64).round().max(0.0) as u32
}

/// How well the garden grows under the current weather, in percent.
///
/// 0 without plants or without weather. Otherwise the weather multiplier
/// scaled by the (rounded) average health.
pub fn growth_efficiency(plants: &[Plant], weather: Option<&Weather>) -> u32 {
    let Some(weather) = weather else {
        return 0;
    };
    if plants.is_empty() {
        return 0;
    }
    let multiplier = weather_multiplier(&weather.weather_type);
    let health = f64::from(average_health(plants)) / 100.0;
    (multiplier * health * 100.0).round() as u32
}

// ---------------------------------------------------------------------------
// Growth-stage histogram
// ---------------------------------------------------------------------------

const STAGE_COUNT: usize = 6;

/// Plant counts per growth stage, over the fixed stage set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageHistogram {
    counts: [usize; STAGE_COUNT],
}

impl StageHistogram {
    /// Count for `stage`. Always 0 for stages outside the fixed set.
    pub fn count(&self, stage: &GrowthStage) -> usize {
        stage_index(stage).map_or(0, |i| self.counts[i])
    }

    /// Plants counted across all buckets.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// `(stage, count)` pairs in lifecycle order, empty buckets included.
    pub fn iter(&self) -> impl Iterator<Item = (GrowthStage, usize)> + '_ {
        GrowthStage::ALL.into_iter().zip(self.counts.iter().copied())
    }
}

fn stage_index(stage: &GrowthStage) -> Option<usize> {
    GrowthStage::ALL.iter().position(|s| s == stage)
}

/// Counts plants per growth stage. Unknown stages are not counted.
pub fn growth_stage_histogram(plants: &[Plant]) -> StageHistogram {
    let mut histogram = StageHistogram::default();
    for plant in plants {
        if let Some(i) = stage_index(&plant.growth_stage) {
            histogram.counts[i] += 1;
        }
    }
    histogram
}

// ---------------------------------------------------------------------------
// Pests and damage
// ---------------------------------------------------------------------------

/// The advice shown for a pest, if there is one.
pub fn pest_remedy(pest: &PestType) -> Option<&'static str> {
    match pest {
        PestType::Aphids => Some("Transfer tokens to combat aphids"),
        PestType::Slugs => Some("Transfer tokens to remove slugs"),
        PestType::Fungus => Some("Transfer tokens to cure fungus"),
        PestType::Other(_) => None,
    }
}

/// Summary of an active infestation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PestAlert {
    /// Capitalized pest name, e.g. `"Aphids"`.
    pub pest: String,
    pub severity: u32,
    pub remedy: Option<&'static str>,
}

impl PestAlert {
    /// `Some` only while the garden reports an infestation.
    pub fn from_garden(garden: &Garden) -> Option<Self> {
        if !garden.pest_infestation {
            return None;
        }
        let (pest, remedy) = match &garden.pest_type {
            Some(pest) => (capitalize(pest.as_str()), pest_remedy(pest)),
            None => ("Unknown pests".to_string(), None),
        };
        Some(Self {
            pest,
            severity: garden.pest_severity,
            remedy,
        })
    }
}

/// How badly pests have hurt a single plant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DamageLevel {
    None,
    /// 1-40%
    Low,
    /// 41-70%
    Moderate,
    /// Over 70%
    Severe,
}

impl DamageLevel {
    pub fn from_damage(pest_damage: u32) -> Self {
        match pest_damage {
            0 => Self::None,
            1..=40 => Self::Low,
            41..=70 => Self::Moderate,
            _ => Self::Severe,
        }
    }
}

impl fmt::Display for DamageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Low => write!(f, "low"),
            Self::Moderate => write!(f, "moderate"),
            Self::Severe => write!(f, "severe"),
        }
    }
}

// ---------------------------------------------------------------------------
// Activity
// ---------------------------------------------------------------------------

/// Whole days between `last_activity` and `now`, rounded down. `None`
/// when the garden has never been active.
pub fn days_since_activity(
    last_activity: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<i64> {
    last_activity.map(|at| (now - at).num_days())
}

// ---------------------------------------------------------------------------
// GardenStats
// ---------------------------------------------------------------------------

/// Everything the statistics panel shows, computed in one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct GardenStats {
    pub total_plants: usize,
    pub harvest_ready: usize,
    pub average_health: u32,
    pub growth_efficiency: u32,
    /// Weather type name, or `"Unknown"` without weather.
    pub weather_label: String,
    pub histogram: StageHistogram,
}

impl GardenStats {
    pub fn compute(garden: &Garden, weather: Option<&Weather>) -> Self {
        let plants = garden.plants.as_slice();
        Self {
            total_plants: plants.len(),
            harvest_ready: plants
                .iter()
                .filter(|p| p.growth_stage == GrowthStage::Harvest)
                .count(),
            average_health: average_health(plants),
            growth_efficiency: growth_efficiency(plants, weather),
            weather_label: weather
                .map_or_else(|| "Unknown".to_string(), |w| w.weather_type.to_string()),
            histogram: growth_stage_histogram(plants),
        }
    }

    /// Fraction (0.0-1.0) of all plants in `stage`. Divides by the total
    /// plant count, unknown stages included, and never by zero.
    pub fn stage_share(&self, stage: &GrowthStage) -> f64 {
        self.histogram.count(stage) as f64 / self.total_plants.max(1) as f64
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
