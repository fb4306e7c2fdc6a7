//! Prints a garden report: slots, statistics, pests, and activity.
//!
//! Reads either a saved snapshot or the live backend:
//!
//! ```text
//! garden-report snapshot garden.json
//! CHAIN_GARDENS_TOKEN=abc123 garden-report live
//! ```

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chaingarden::garden::{days_since_activity, load_garden_data};
use chaingarden::prelude::*;
use chaingarden::protocol::GardenApi;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Deserialize;

#[derive(Parser)]
#[command(name = "garden-report", version, about = "Chain Gardens garden report")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report on a snapshot file: `{"garden": {...}, "weather": {...}}`
    Snapshot { path: PathBuf },
    /// Fetch the garden from the backend and report on it
    Live {
        /// Session token from a previous sign-in
        #[arg(long, env = "CHAIN_GARDENS_TOKEN")]
        token: String,
    },
}

#[derive(Deserialize)]
struct Snapshot {
    garden: Garden,
    #[serde(default)]
    weather: Option<Weather>,
}

#[tokio::main]
async fn main() -> Result<()> {
    chaingarden::telemetry::init_tracing();
    let cli = Cli::parse();

    let (garden, weather) = match cli.command {
        Command::Snapshot { path } => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let snapshot: Snapshot = serde_json::from_str(&raw)
                .with_context(|| format!("parsing {}", path.display()))?;
            (snapshot.garden, snapshot.weather)
        }
        Command::Live { token } => {
            let config = ClientConfig::from_env();
            let transport = HttpTransport::with_timeout(&config.api_url, config.request_timeout)?;
            let api = GardenApi::new(transport);
            tracing::info!(api_url = %config.api_url, "fetching garden");
            let loaded = load_garden_data(&api, &SessionToken::new(token)).await?;
            (loaded.garden, loaded.weather)
        }
    };

    print!("{}", render_report(&garden, weather.as_ref(), Utc::now()));
    Ok(())
}

fn render_report(garden: &Garden, weather: Option<&Weather>, now: DateTime<Utc>) -> String {
    let stats = GardenStats::compute(garden, weather);
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Garden {} (level {}, soil {}%, {} slots)",
        garden.id, garden.level, garden.soil_quality, garden.plot_size
    );

    let _ = writeln!(out, "\nSlots");
    for (slot, plant) in garden.slots() {
        match plant {
            Some(plant) => {
                let _ = write!(
                    out,
                    "  [{slot}] {} - {}, health {:.0}%",
                    plant.plant_type.name,
                    plant.growth_stage.label(),
                    plant.health
                );
                match DamageLevel::from_damage(plant.pest_damage) {
                    DamageLevel::None => {}
                    level => {
                        let _ = write!(out, ", pest damage {}% ({level})", plant.pest_damage);
                    }
                }
                out.push('\n');
            }
            None => {
                let _ = writeln!(out, "  [{slot}] empty");
            }
        }
    }

    let _ = writeln!(out, "\nStatistics");
    let _ = writeln!(out, "  Plants:            {}", stats.total_plants);
    let _ = writeln!(out, "  Ready to harvest:  {}", stats.harvest_ready);
    let _ = writeln!(out, "  Average health:    {}%", stats.average_health);
    let _ = writeln!(out, "  Growth efficiency: {}%", stats.growth_efficiency);
    let _ = writeln!(out, "  Weather:           {}", stats.weather_label);
    for (stage, count) in stats.histogram.iter() {
        let _ = writeln!(
            out,
            "  {:<18} {count} ({:.0}%)",
            format!("{}:", stage.label()),
            stats.stage_share(&stage) * 100.0
        );
    }

    if let Some(alert) = PestAlert::from_garden(garden) {
        let _ = writeln!(out, "\nPest alert: {} (severity {}%)", alert.pest, alert.severity);
        if let Some(remedy) = alert.remedy {
            let _ = writeln!(out, "  {remedy}");
        }
    }

    let _ = writeln!(out, "\nActivity");
    let _ = writeln!(out, "  On-chain actions: {}", garden.total_onchain_actions);
    let last = match days_since_activity(garden.last_activity, now) {
        Some(0) => "today".to_string(),
        Some(1) => "1 day ago".to_string(),
        Some(days) => format!("{days} days ago"),
        None => "Never".to_string(),
    };
    let _ = writeln!(out, "  Last activity:    {last}");

    out
}
