//! Forecasting & Fleet-Sizing Engine
//!
//! Leaf estimators (trend, seasonality) feed per-location demand and
//! per-vessel capability forecasts. Scenarios combine those with growth
//! assumptions and injects, gaps are measured against the core fleet, and a
//! deterministic rule cascade turns the gaps into recommendations. Everything
//! here is pure computation over in-memory inputs.

mod capability;
mod demand;
mod engine;
mod export;
mod gap;
mod injects;
mod recommendations;
mod scenario;
mod seasonal;
mod trend;

pub use capability::CapabilityForecaster;
pub use demand::{distance_factor, DemandForecaster};
pub use engine::{FleetForecastEngine, ForecastRequest};
pub use export::export_rows;
pub use gap::GapAnalyzer;
pub use injects::{InjectApplication, InjectEngine};
pub use recommendations::RecommendationGenerator;
pub use scenario::ScenarioEngine;
pub use seasonal::SeasonalAdjuster;
pub use trend::TrendEstimator;
