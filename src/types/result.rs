//! Aggregate forecast output handed to reporting collaborators

use serde::{Deserialize, Serialize};

use super::{
    ForecastDemand, GapAnalysis, ManagementRecommendation, MonthKey, ScenarioResult,
    VesselCapabilityForecast,
};

/// Data-quality issue found in the inputs.
///
/// Irregular data never aborts a run; it is skipped and reported here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCode {
    EmptySeries,
    NonContiguousSeries,
    DuplicateSeries,
    DuplicateInject,
    InvertedInjectWindow,
    InvalidInjectWeight,
    UnknownInjectReference,
    LowConfidence,
    /// No vessel history, or none with positive deliveries
    NoFleetCapability,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputWarning {
    pub code: WarningCode,
    /// Id of the offending location, vessel, inject or scenario
    pub subject: String,
    pub message: String,
}

impl InputWarning {
    pub fn new(code: WarningCode, subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for InputWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.subject, self.message)
    }
}

/// Spread of one month across all scenarios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthRange {
    pub month: MonthKey,
    pub min_demand: f64,
    pub max_demand: f64,
    pub min_required_vessels: u32,
    pub max_required_vessels: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CrossScenarioSummary {
    pub months: Vec<MonthRange>,
    pub min_fleet_size: u32,
    pub max_fleet_size: u32,
}

/// Flat, presentation-ready row: one per scenario per month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    pub scenario_id: String,
    pub month: MonthKey,
    pub total_demand: f64,
    pub drilling_demand: f64,
    pub production_demand: f64,
    pub capability: f64,
    pub required_vessels: u32,
    pub baseline_vessels: u32,
    pub baseline_gap: i64,
    pub utilization: f64,
    pub confidence: f64,
    pub inject_demand_delta: f64,
    pub inject_capability_delta: f64,
}

/// Everything one forecast run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselForecastResult {
    /// First forecast month
    pub generated_for: MonthKey,
    pub base_scenario_id: String,
    pub scenarios: Vec<ScenarioResult>,
    /// Per-location projections at the base scenario horizon
    pub location_forecasts: Vec<ForecastDemand>,
    /// Per-vessel projections at the base scenario horizon
    pub vessel_forecasts: Vec<VesselCapabilityForecast>,
    pub gap_analyses: Vec<GapAnalysis>,
    pub cross_scenario: CrossScenarioSummary,
    pub recommendations: Vec<ManagementRecommendation>,
    pub high_risk_months: Vec<MonthKey>,
    pub low_utilization_months: Vec<MonthKey>,
    pub warnings: Vec<InputWarning>,
    pub export_data: Vec<ExportRow>,
}

impl VesselForecastResult {
    pub fn scenario(&self, id: &str) -> Option<&ScenarioResult> {
        self.scenarios.iter().find(|s| s.scenario_id == id)
    }

    pub fn base_scenario(&self) -> Option<&ScenarioResult> {
        self.scenario(&self.base_scenario_id)
    }

    pub fn gap_analysis(&self, id: &str) -> Option<&GapAnalysis> {
        self.gap_analyses.iter().find(|g| g.scenario_id == id)
    }
}
