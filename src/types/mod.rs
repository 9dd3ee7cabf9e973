//! Shared data structures for offshore fleet-sizing forecasts
//!
//! This module defines the types that flow through the forecasting engine:
//! - Inputs: LocationDemandSeries, VesselCapabilitySeries, Inject, ForecastScenario, CoreFleetBaseline
//! - Estimates: TrendFit, SeasonalFactors, ForecastDemand, VesselCapabilityForecast
//! - Outputs: ScenarioResult, GapAnalysis, ManagementRecommendation, VesselForecastResult

mod month;
mod history;
mod forecast;
mod inject;
mod scenario;
mod fleet;
mod recommendation;
mod result;

pub use month::*;
pub use history::*;
pub use forecast::*;
pub use inject::*;
pub use scenario::*;
pub use fleet::*;
pub use recommendation::*;
pub use result::*;
