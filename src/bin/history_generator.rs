//! Synthetic Delivery History
//!
//! Generates a forecast request with plausible Gulf-of-Mexico style history
//! for exercising the engine:
//! - Locations with a linear trend, quarter seasonality and Gaussian noise
//! - Vessels with a steady delivery rate and noise
//! - A drilling-campaign inject and a dry-dock inject after the history ends
//!
//! # Usage
//! ```bash
//! ./history-generator --locations 8 --vessels 6 --seed 7 > request.json
//! ./fleet-forecast --input request.json
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use rand::prelude::*;
use rand_distr::{Distribution, Normal};
use std::io::Write;
use std::path::PathBuf;

use fleet_forecast::types::{DemandCategory, Inject, InjectKind, MonthKey, SeasonalFactors};
use fleet_forecast::{ForecastRequest, LocationDemandSeries, VesselCapabilitySeries};

// ============================================================================
// Generation Constants
// ============================================================================

/// Monthly deliveries at a location, drawn uniformly per location
const LOCATION_LEVEL: (f64, f64) = (40.0, 120.0);
/// Monthly trend per location (deliveries/month)
const LOCATION_TREND: (f64, f64) = (-1.0, 2.0);
/// Noise standard deviation as a share of the location level
const LOCATION_NOISE: f64 = 0.08;
/// Monthly deliveries a vessel completes
const VESSEL_LEVEL: (f64, f64) = (15.0, 25.0);
/// Vessel noise standard deviation (deliveries)
const VESSEL_NOISE: f64 = 1.5;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "history-generator")]
#[command(about = "Synthetic delivery history for fleet-forecast testing")]
#[command(version)]
struct Args {
    /// Number of field locations
    #[arg(short, long, default_value = "8", value_parser = clap::value_parser!(u32).range(1..=200))]
    locations: u32,

    /// Number of vessels
    #[arg(short, long, default_value = "6", value_parser = clap::value_parser!(u32).range(0..=100))]
    vessels: u32,

    /// Months of history per series
    #[arg(short, long, default_value = "24", value_parser = clap::value_parser!(u32).range(1..=120))]
    months: u32,

    /// Last month of history (YYYY-MM)
    #[arg(long, default_value = "2024-12")]
    end: MonthKey,

    /// Leave the sample injects out
    #[arg(long)]
    no_injects: bool,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Write to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut rng = match args.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let months = args.months as usize;
    let start = args.end.offset(1 - args.months as i32);
    let request = generate(&mut rng, &args, start, months)?;

    let json = serde_json::to_string_pretty(&request).context("serializing request")?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), "Request written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}").context("writing to stdout")?;
        }
    }

    tracing::info!(
        locations = request.locations.len(),
        vessels = request.vessels.len(),
        history_months = months,
        seed = ?args.seed,
        "Synthetic history generated"
    );
    Ok(())
}

fn generate(rng: &mut StdRng, args: &Args, start: MonthKey, months: usize) -> Result<ForecastRequest> {
    let vessel_noise = Normal::new(0.0, VESSEL_NOISE).context("vessel noise distribution")?;
    let calendar = start.range(months);
    // Gulf-of-Mexico weather: busy winter, quiet hurricane season
    let seasonal = SeasonalFactors::default();

    let mut locations = Vec::with_capacity(args.locations as usize);
    for n in 0..args.locations {
        let level = rng.gen_range(LOCATION_LEVEL.0..LOCATION_LEVEL.1);
        let trend = rng.gen_range(LOCATION_TREND.0..LOCATION_TREND.1);
        let noise = Normal::new(0.0, level * LOCATION_NOISE).context("location noise distribution")?;
        let category = if n % 3 == 2 {
            DemandCategory::Production
        } else {
            DemandCategory::Drilling
        };

        let values: Vec<f64> = calendar
            .iter()
            .enumerate()
            .map(|(i, month)| {
                let base = (level + trend * i as f64) * seasonal.factor(month.quarter());
                (base + noise.sample(rng)).max(0.0).round()
            })
            .collect();
        locations.push(LocationDemandSeries::from_values(
            format!("LOC-{:03}", n + 1),
            category,
            start,
            &values,
        ));
    }

    let mut vessels = Vec::with_capacity(args.vessels as usize);
    for n in 0..args.vessels {
        let level = rng.gen_range(VESSEL_LEVEL.0..VESSEL_LEVEL.1);
        let values: Vec<f64> = (0..months)
            .map(|_| (level + vessel_noise.sample(rng)).max(0.0).round())
            .collect();
        let mut series = VesselCapabilitySeries::from_values(format!("PSV-{:02}", n + 1), start, &values);
        series.name = Some(format!("Supply Vessel {}", n + 1));
        vessels.push(series);
    }

    let first_forecast = args.end.next();
    let injects = if args.no_injects {
        Vec::new()
    } else {
        let mut campaign = Inject::new(
            "drilling-campaign",
            InjectKind::DemandIncrease,
            first_forecast.offset(3),
            first_forecast.offset(5),
            2.0,
            0.6,
        );
        campaign.name = Some("Three-well exploration campaign".to_string());
        let mut dry_dock = Inject::new(
            "dry-dock",
            InjectKind::CapabilityReduction,
            first_forecast.offset(1),
            first_forecast.offset(1),
            1.0,
            1.0,
        );
        dry_dock.name = Some("Class renewal dry-dock".to_string());
        vec![campaign, dry_dock]
    };

    Ok(ForecastRequest {
        start_month: Some(first_forecast),
        locations,
        vessels,
        injects,
        scenarios: None,
        baseline: None,
        base_scenario: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleet_forecast::types::Quarter;

    fn quarter_total(request: &ForecastRequest, quarter: Quarter) -> f64 {
        request
            .locations
            .iter()
            .flat_map(|l| l.monthly.iter())
            .filter(|(month, _)| month.quarter() == quarter)
            .map(|(_, v)| v)
            .sum()
    }

    #[test]
    fn history_follows_default_seasonality() {
        let args = Args::parse_from(["history-generator", "--locations", "200", "--seed", "3"]);
        let start = args.end.offset(1 - args.months as i32);
        let request = generate(&mut StdRng::seed_from_u64(3), &args, start, 24).unwrap();

        // Q3/Q1 = 0.90/1.10 plus about half a year of trend
        let ratio = quarter_total(&request, Quarter::Q3) / quarter_total(&request, Quarter::Q1);
        assert!((0.78..0.92).contains(&ratio), "{ratio}");
        assert_eq!(request.injects.len(), 2);
        assert_eq!(request.base_scenario, None);
    }

    #[test]
    fn same_seed_same_history() {
        let args = Args::parse_from(["history-generator", "--seed", "11"]);
        let start = args.end.offset(1 - args.months as i32);
        let a = generate(&mut StdRng::seed_from_u64(11), &args, start, 24).unwrap();
        let b = generate(&mut StdRng::seed_from_u64(11), &args, start, 24).unwrap();
        assert_eq!(a.locations, b.locations);
        assert_eq!(a.vessels, b.vessels);
    }
}
