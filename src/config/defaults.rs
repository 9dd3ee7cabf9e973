//! System-wide default constants.
//!
//! Every tunable in `ForecastConfig` defaults to one of these values.
//! Grouped by subsystem for easy discovery.

// ============================================================================
// Config Loading
// ============================================================================

/// Environment variable holding an explicit config path.
pub const CONFIG_ENV_VAR: &str = "FLEET_FORECAST_CONFIG";

/// Config file looked up in the working directory when the env var is unset.
pub const LOCAL_CONFIG_FILE: &str = "forecast_config.toml";

// ============================================================================
// Demand Forecasting
// ============================================================================

/// Horizon used for the predefined scenarios (months).
pub const DEFAULT_HORIZON_MONTHS: u32 = 12;

/// Lower bound on trend confidence, applied when r² is poor or data is sparse.
pub const CONFIDENCE_FLOOR: f64 = 0.3;

/// Distance factor reached at the last forecast month.
///
/// Decays linearly from 1.0 at month 1.
pub const DISTANCE_DECAY_FLOOR: f64 = 0.6;

/// Absolute slope (deliveries per month) above which a trend is not `stable`.
pub const TREND_SLOPE_THRESHOLD: f64 = 0.1;

// ============================================================================
// Seasonality (Gulf of Mexico weather)
// ============================================================================

pub const SEASONAL_Q1: f64 = 1.10;
pub const SEASONAL_Q2: f64 = 1.00;
pub const SEASONAL_Q3: f64 = 0.90;
pub const SEASONAL_Q4: f64 = 1.05;

// ============================================================================
// Vessel Capability
// ============================================================================

/// Every Nth forecast month carries a planned-maintenance derate.
pub const MAINTENANCE_INTERVAL_MONTHS: u32 = 6;

/// Share of a month's predicted capability lost to planned maintenance.
pub const MAINTENANCE_DERATE: f64 = 0.20;

/// Target utilization per vessel.
pub const OPTIMAL_UTILIZATION: f64 = 0.75;

// ============================================================================
// Gap Analysis
// ============================================================================

/// Baseline gap above which a base-case month is high risk (vessels).
pub const HIGH_RISK_GAP: i64 = 2;

/// Fleet utilization below which a month is flagged as under-used.
pub const LOW_UTILIZATION: f64 = 0.50;

// ============================================================================
// Recommendations
// ============================================================================

/// Peak gap above which an acquisition is `critical` rather than `high`.
pub const CRITICAL_GAP: i64 = 2;

/// A month counts toward a release run when its gap is below this value.
pub const RELEASE_GAP: i64 = -1;

/// Consecutive surplus months required before recommending a release.
///
/// 4 = "more than 3", so a single dip never flaps the fleet size.
pub const RELEASE_MIN_CONSECUTIVE_MONTHS: usize = 4;

/// Average utilization above which the fleet is over-utilized.
pub const OVER_UTILIZATION: f64 = 0.90;

/// Average utilization below which the fleet is under-utilized.
pub const UNDER_UTILIZATION: f64 = 0.50;

/// Vessel spread between a downside scenario and the base case that warrants
/// a contingency charter option.
pub const CONTINGENCY_SPREAD: i64 = 2;

// ============================================================================
// Computation Budget
// ============================================================================

pub const MAX_SCENARIOS: usize = 16;

pub const MAX_HORIZON_MONTHS: u32 = 36;

/// Σ over scenarios of horizon × (locations + vessels).
pub const MAX_CELLS: usize = 2_000_000;

// ============================================================================
// Run
// ============================================================================

pub const BASE_SCENARIO_ID: &str = "base_case";
