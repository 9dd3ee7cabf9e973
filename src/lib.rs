//! Fleet Forecast: offshore supply-vessel fleet sizing
//!
//! Turns delivery history per field location and per vessel into a rolling
//! month-by-month forecast of how many vessels are needed, under several
//! named scenarios, and compares that against the contracted core fleet.
//!
//! ## Architecture
//!
//! - **Types**: month keys, history series, forecasts, injects, scenarios, results
//! - **Forecasting**: trend and seasonal estimators, scenario composition,
//!   gap analysis and recommendation rules behind `FleetForecastEngine`
//! - **Config**: every engine constant as a TOML value with validation
//!
//! The library never prints. Diagnostics go through `tracing`; install a
//! subscriber to see them.

pub mod config;
pub mod error;
pub mod forecasting;
pub mod types;

// Re-export configuration
pub use config::ForecastConfig;

// Re-export the engine entry points
pub use error::ForecastError;
pub use forecasting::{FleetForecastEngine, ForecastRequest};

// Re-export commonly used types
pub use types::{
    CoreFleetBaseline, ForecastScenario, Inject, InjectKind, LocationDemandSeries,
    ManagementRecommendation, MonthKey, ScenarioResult, VesselCapabilitySeries,
    VesselForecastResult,
};
