//! Forecast Configuration - every engine constant as an operator-tunable TOML value
//!
//! Each struct implements `Default` with the values in `defaults.rs`, so a run
//! with no config file behaves exactly like the documented engine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;
use crate::types::{CoreFleetBaseline, ForecastScenario, SeasonalFactors};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a forecasting deployment.
///
/// Load with `ForecastConfig::load()` which searches:
/// 1. `$FLEET_FORECAST_CONFIG` env var
/// 2. `./forecast_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForecastConfig {
    /// Trend extrapolation and confidence decay
    #[serde(default)]
    pub forecast: ForecastTuning,

    /// Fallback quarter multipliers
    #[serde(default)]
    pub seasonal: SeasonalConfig,

    /// Vessel capability projection
    #[serde(default)]
    pub capability: CapabilityConfig,

    /// Baseline gap flags
    #[serde(default)]
    pub gap: GapConfig,

    /// Recommendation rule thresholds
    #[serde(default)]
    pub recommendations: RecommendationConfig,

    /// Input size limits checked before a run
    #[serde(default)]
    pub budget: BudgetConfig,

    /// Run-level options
    #[serde(default)]
    pub run: RunConfig,

    /// Contracted core fleet
    #[serde(default)]
    pub baseline: CoreFleetBaseline,

    /// Scenario set; empty means the predefined three
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scenarios: Vec<ForecastScenario>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            forecast: ForecastTuning::default(),
            seasonal: SeasonalConfig::default(),
            capability: CapabilityConfig::default(),
            gap: GapConfig::default(),
            recommendations: RecommendationConfig::default(),
            budget: BudgetConfig::default(),
            run: RunConfig::default(),
            baseline: CoreFleetBaseline::default(),
            scenarios: Vec::new(),
        }
    }
}

impl ForecastConfig {
    /// Load configuration using the standard search order:
    /// 1. `$FLEET_FORECAST_CONFIG` environment variable
    /// 2. `./forecast_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded forecast config from {}", defaults::CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", defaults::CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", defaults::CONFIG_ENV_VAR);
            }
        }

        // 2. Check ./forecast_config.toml
        let local = PathBuf::from(defaults::LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded forecast config from ./{}", defaults::LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", defaults::LOCAL_CONFIG_FILE);
                }
            }
        }

        // 3. Defaults
        info!("No forecast config found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are logged as warnings (with suggestions) before the
    /// strict serde pass.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let typo_warnings = super::validation::validate_unknown_keys(contents);
        for w in &typo_warnings {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Save config to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Forecast config saved");
        Ok(())
    }

    /// The configured scenarios, or the predefined three when none are set.
    pub fn scenarios_or_predefined(&self, inject_ids: &[String]) -> Vec<ForecastScenario> {
        if self.scenarios.is_empty() {
            ForecastScenario::predefined(self.forecast.default_horizon_months, inject_ids)
        } else {
            self.scenarios.clone()
        }
    }

    /// Validate all values for internal consistency.
    ///
    /// Rules:
    /// - Probabilities, utilizations and decay factors lie in [0, 1]
    /// - Under-utilization threshold < over-utilization threshold
    /// - Budget limits and maintenance interval are > 0
    /// - No NaN/Inf anywhere
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let f = &self.forecast;
        Self::check_unit_interval(f.confidence_floor, "forecast.confidence_floor", &mut errors);
        Self::check_unit_interval(f.distance_decay_floor, "forecast.distance_decay_floor", &mut errors);
        if f.trend_slope_threshold < 0.0 {
            errors.push("forecast.trend_slope_threshold must be >= 0".to_string());
        }
        if f.default_horizon_months == 0 || f.default_horizon_months > self.budget.max_horizon_months {
            errors.push(format!(
                "forecast.default_horizon_months ({}) must be in 1..={}",
                f.default_horizon_months, self.budget.max_horizon_months
            ));
        }

        let c = &self.capability;
        if c.maintenance_interval_months == 0 {
            errors.push("capability.maintenance_interval_months must be > 0".to_string());
        }
        Self::check_unit_interval(c.maintenance_derate, "capability.maintenance_derate", &mut errors);
        Self::check_unit_interval(c.optimal_utilization, "capability.optimal_utilization", &mut errors);

        Self::check_unit_interval(self.gap.low_utilization, "gap.low_utilization", &mut errors);

        let r = &self.recommendations;
        if r.under_utilization >= r.over_utilization {
            errors.push(format!(
                "recommendations.under_utilization ({:.2}) must be less than over_utilization ({:.2})",
                r.under_utilization, r.over_utilization
            ));
        }
        if r.release_min_consecutive_months == 0 {
            errors.push("recommendations.release_min_consecutive_months must be > 0".to_string());
        }
        if r.release_gap >= 0 {
            errors.push(format!(
                "recommendations.release_gap ({}) must be negative",
                r.release_gap
            ));
        }
        if r.contingency_spread <= 0 {
            errors.push("recommendations.contingency_spread must be > 0".to_string());
        }

        let b = &self.budget;
        if b.max_scenarios == 0 || b.max_horizon_months == 0 || b.max_cells == 0 {
            errors.push("budget limits must all be > 0".to_string());
        }

        if self.run.base_scenario.trim().is_empty() {
            errors.push("run.base_scenario must not be empty".to_string());
        }

        // Physical range validation
        let (range_errors, range_warnings) = super::validation::validate_value_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        // Reject NaN/Inf in any float value. Scenario names are free text, so
        // the floats are swept by field rather than by scanning serialized TOML.
        if self.float_fields().iter().any(|v| !v.is_finite()) {
            errors.push(
                "Config contains NaN or Inf values, all values must be finite numbers".to_string(),
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn float_fields(&self) -> Vec<f64> {
        let mut values = vec![
            self.forecast.confidence_floor,
            self.forecast.distance_decay_floor,
            self.forecast.trend_slope_threshold,
            self.seasonal.q1,
            self.seasonal.q2,
            self.seasonal.q3,
            self.seasonal.q4,
            self.capability.maintenance_derate,
            self.capability.optimal_utilization,
            self.gap.low_utilization,
            self.recommendations.over_utilization,
            self.recommendations.under_utilization,
            self.baseline.utilization_band.min,
            self.baseline.utilization_band.max,
            self.baseline.day_rates.core,
            self.baseline.day_rates.spot,
        ];
        for s in &self.scenarios {
            values.push(s.demand_growth_rate);
            values.push(s.capability_growth_rate);
            values.push(s.confidence_threshold);
        }
        values
    }

    fn check_unit_interval(value: f64, name: &str, errors: &mut Vec<String>) {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            errors.push(format!("{name} ({value}) must be within [0, 1]"));
        }
    }
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastTuning {
    /// Minimum trend confidence regardless of r²
    pub confidence_floor: f64,
    /// Distance factor at the final forecast month
    pub distance_decay_floor: f64,
    /// |slope| above which a trend is increasing/decreasing
    pub trend_slope_threshold: f64,
    /// Horizon of the predefined scenarios
    pub default_horizon_months: u32,
}

impl Default for ForecastTuning {
    fn default() -> Self {
        Self {
            confidence_floor: defaults::CONFIDENCE_FLOOR,
            distance_decay_floor: defaults::DISTANCE_DECAY_FLOOR,
            trend_slope_threshold: defaults::TREND_SLOPE_THRESHOLD,
            default_horizon_months: defaults::DEFAULT_HORIZON_MONTHS,
        }
    }
}

/// Quarter multipliers used when a quarter has no history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeasonalConfig {
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
    pub q4: f64,
}

impl Default for SeasonalConfig {
    fn default() -> Self {
        Self {
            q1: defaults::SEASONAL_Q1,
            q2: defaults::SEASONAL_Q2,
            q3: defaults::SEASONAL_Q3,
            q4: defaults::SEASONAL_Q4,
        }
    }
}

impl SeasonalConfig {
    pub const fn factors(&self) -> SeasonalFactors {
        SeasonalFactors {
            q1: self.q1,
            q2: self.q2,
            q3: self.q3,
            q4: self.q4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CapabilityConfig {
    pub maintenance_interval_months: u32,
    pub maintenance_derate: f64,
    pub optimal_utilization: f64,
}

impl Default for CapabilityConfig {
    fn default() -> Self {
        Self {
            maintenance_interval_months: defaults::MAINTENANCE_INTERVAL_MONTHS,
            maintenance_derate: defaults::MAINTENANCE_DERATE,
            optimal_utilization: defaults::OPTIMAL_UTILIZATION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GapConfig {
    pub high_risk_gap: i64,
    pub low_utilization: f64,
}

impl Default for GapConfig {
    fn default() -> Self {
        Self {
            high_risk_gap: defaults::HIGH_RISK_GAP,
            low_utilization: defaults::LOW_UTILIZATION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecommendationConfig {
    pub critical_gap: i64,
    pub release_gap: i64,
    pub release_min_consecutive_months: usize,
    pub over_utilization: f64,
    pub under_utilization: f64,
    pub contingency_spread: i64,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            critical_gap: defaults::CRITICAL_GAP,
            release_gap: defaults::RELEASE_GAP,
            release_min_consecutive_months: defaults::RELEASE_MIN_CONSECUTIVE_MONTHS,
            over_utilization: defaults::OVER_UTILIZATION,
            under_utilization: defaults::UNDER_UTILIZATION,
            contingency_spread: defaults::CONTINGENCY_SPREAD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BudgetConfig {
    pub max_scenarios: usize,
    pub max_horizon_months: u32,
    pub max_cells: usize,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_scenarios: defaults::MAX_SCENARIOS,
            max_horizon_months: defaults::MAX_HORIZON_MONTHS,
            max_cells: defaults::MAX_CELLS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Scenario whose gaps drive recommendations
    pub base_scenario: String,
    /// Compute scenarios concurrently
    pub parallel_scenarios: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            base_scenario: defaults::BASE_SCENARIO_ID.to_string(),
            parallel_scenarios: true,
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            Self::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            Self::Serialize(e) => write!(f, "Config serialization error: {e}"),
            Self::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {e}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ForecastConfig::default().validate().is_ok());
    }

    #[test]
    fn default_round_trips_through_toml() {
        let config = ForecastConfig::default();
        let toml_str = config.to_toml().unwrap();
        let back = ForecastConfig::from_toml_str(&toml_str).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn inverted_utilization_thresholds_rejected() {
        let mut config = ForecastConfig::default();
        config.recommendations.under_utilization = 0.95;
        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.contains("under_utilization")));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn nan_rejected() {
        let mut config = ForecastConfig::default();
        config.baseline.day_rates.spot = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_scenarios_fall_back_to_predefined() {
        let config = ForecastConfig::default();
        let scenarios = config.scenarios_or_predefined(&[]);
        assert_eq!(scenarios.len(), 3);
        assert_eq!(scenarios[0].horizon_months, defaults::DEFAULT_HORIZON_MONTHS);
    }
}
