//! Forecast Configuration Module
//!
//! Engine constants (confidence decay, seasonal fallbacks, maintenance
//! rhythm, recommendation thresholds, computation budget) loaded from TOML.
//!
//! ## Loading Order
//!
//! 1. `FLEET_FORECAST_CONFIG` environment variable (path to TOML file)
//! 2. `forecast_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! The engine never reads configuration itself; callers load a
//! `ForecastConfig` and hand it to `FleetForecastEngine::new`.

mod forecast_config;
pub mod defaults;
pub mod validation;

pub use forecast_config::*;
