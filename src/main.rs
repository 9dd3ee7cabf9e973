//! Fleet Forecast - offshore vessel fleet-sizing CLI
//!
//! Reads a JSON forecast request (location and vessel history, injects,
//! optional scenarios, baseline and base scenario), runs every scenario
//! and prints a summary of fleet requirements and recommendations.
//!
//! # Usage
//!
//! ```bash
//! # Generate synthetic history and forecast it
//! ./history-generator --seed 7 > request.json
//! ./fleet-forecast --input request.json --output result.json
//!
//! # Flat rows only, for spreadsheets and dashboards
//! ./fleet-forecast --input request.json --export rows.json
//!
//! # Show the effective configuration
//! ./fleet-forecast --print-config
//! ```
//!
//! # Environment Variables
//!
//! - `FLEET_FORECAST_CONFIG`: Path to the engine TOML config
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;

use fleet_forecast::types::VesselForecastResult;
use fleet_forecast::{FleetForecastEngine, ForecastConfig, ForecastRequest};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "fleet-forecast")]
#[command(about = "Offshore supply-vessel fleet sizing forecast")]
#[command(version)]
struct CliArgs {
    /// Forecast request (JSON)
    #[arg(short, long, value_name = "FILE", required_unless_present = "print_config")]
    input: Option<PathBuf>,

    /// Engine config (TOML); otherwise $FLEET_FORECAST_CONFIG, ./forecast_config.toml, defaults
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the full result as pretty JSON
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write only the flat export rows as pretty JSON
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,

    /// Compute scenarios one after another instead of in parallel
    #[arg(long)]
    sequential: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => ForecastConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ForecastConfig::load(),
    };
    if args.sequential {
        config.run.parallel_scenarios = false;
    }

    if args.print_config {
        print!("{}", config.to_toml().context("serializing config")?);
        return Ok(());
    }

    let input = args.input.as_deref().context("--input is required")?;
    let request = read_request(input)?;
    info!(
        locations = request.locations.len(),
        vessels = request.vessels.len(),
        injects = request.injects.len(),
        "Loaded forecast request from {}",
        input.display()
    );

    let engine = FleetForecastEngine::new(config);
    let result = engine.run(&request).context("forecast run failed")?;

    print_summary(&result);

    if let Some(path) = &args.output {
        write_json(path, &result)?;
        info!(path = %path.display(), "Full result written");
    }
    if let Some(path) = &args.export {
        write_json(path, &result.export_data)?;
        info!(path = %path.display(), rows = result.export_data.len(), "Export rows written");
    }

    Ok(())
}

fn read_request(path: &Path) -> Result<ForecastRequest> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serializing result")?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}

// ============================================================================
// Summary
// ============================================================================

fn print_summary(result: &VesselForecastResult) {
    println!("Fleet forecast from {}", result.generated_for);
    println!();
    println!(
        "  {:<16} {:>8} {:>10} {:>8} {:>11} {:>10}",
        "scenario", "months", "peak", "fleet", "avg util", "confidence"
    );
    for s in &result.scenarios {
        let marker = if s.scenario_id == result.base_scenario_id { "*" } else { " " };
        println!(
            "{} {:<16} {:>8} {:>10} {:>8} {:>10.0}% {:>10.2}",
            marker,
            s.scenario_id,
            s.horizon_months,
            s.peak_demand_month.map_or_else(|| "-".to_string(), |m| m.to_string()),
            s.recommended_fleet_size,
            s.average_utilization * 100.0,
            s.confidence_score,
        );
    }

    if let Some(gaps) = result.gap_analysis(&result.base_scenario_id) {
        println!();
        println!(
            "  Core fleet {} | peak gap {:+} | vessel-months short {} / surplus {}",
            gaps.baseline_vessels, gaps.peak_gap, gaps.vessel_months_short, gaps.vessel_months_surplus
        );
    }

    if !result.recommendations.is_empty() {
        println!();
        println!("  Recommendations:");
        for rec in &result.recommendations {
            println!("  {} [{}] {}", rec.id, rec.priority, rec.title);
            println!("      {}", rec.rationale);
        }
    }

    if !result.warnings.is_empty() {
        println!();
        println!("  Input warnings: {}", result.warnings.len());
        for w in &result.warnings {
            println!("    - {w}");
        }
    }
}
