//! Scenario definitions and per-scenario results

use serde::{Deserialize, Serialize};

use super::{InjectImpact, MonthKey};

pub const BASE_CASE: &str = "base_case";
pub const OPTIMISTIC: &str = "optimistic";
pub const PESSIMISTIC: &str = "pessimistic";

/// A named set of growth assumptions plus the injects it activates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForecastScenario {
    pub id: String,
    pub name: String,
    /// Linear monthly growth applied to aggregate demand
    #[serde(default)]
    pub demand_growth_rate: f64,
    /// Linear monthly growth applied to aggregate capability
    #[serde(default)]
    pub capability_growth_rate: f64,
    /// Inject ids applied in this scenario
    #[serde(default)]
    pub active_injects: Vec<String>,
    /// Forecast horizon in months
    pub horizon_months: u32,
    /// Aggregate confidence below which the scenario is flagged
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
}

const fn default_confidence_threshold() -> f64 {
    0.5
}

impl ForecastScenario {
    /// The three standard scenarios: base case, optimistic, pessimistic.
    ///
    /// Base case and pessimistic activate every supplied inject; optimistic
    /// assumes none of the scheduled events materialise.
    pub fn predefined(horizon_months: u32, inject_ids: &[String]) -> Vec<Self> {
        vec![
            Self {
                id: BASE_CASE.to_string(),
                name: "Base Case".to_string(),
                demand_growth_rate: 0.0,
                capability_growth_rate: 0.0,
                active_injects: inject_ids.to_vec(),
                horizon_months,
                confidence_threshold: 0.6,
            },
            Self {
                id: OPTIMISTIC.to_string(),
                name: "Optimistic".to_string(),
                demand_growth_rate: -0.01,
                capability_growth_rate: 0.01,
                active_injects: Vec::new(),
                horizon_months,
                confidence_threshold: 0.5,
            },
            Self {
                id: PESSIMISTIC.to_string(),
                name: "Pessimistic".to_string(),
                demand_growth_rate: 0.02,
                capability_growth_rate: -0.01,
                active_injects: inject_ids.to_vec(),
                horizon_months,
                confidence_threshold: 0.5,
            },
        ]
    }
}

/// One forecast month of a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioMonth {
    pub month: MonthKey,
    /// Aggregate demand after growth and injects
    pub total_demand: f64,
    /// Drilling share after growth, before injects
    pub drilling_demand: f64,
    /// Production share after growth, before injects
    pub production_demand: f64,
    /// Aggregate fleet capability after growth and capability injects
    pub capability: f64,
    /// Capability withheld for planned maintenance
    pub maintenance_derate: f64,
    /// ceil(total_demand / average vessel capability)
    pub required_vessels: u32,
    /// ceil(capability / average vessel capability)
    pub implied_vessels: u32,
    /// required − implied
    pub gap: i64,
    /// total_demand / capability
    pub utilization: f64,
    pub confidence: f64,
    pub inject_impact: InjectImpact,
}

/// Full forecast for one scenario. Rebuilt on every run, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_id: String,
    pub scenario_name: String,
    pub horizon_months: u32,
    pub average_vessel_capability: f64,
    pub months: Vec<ScenarioMonth>,
    pub average_utilization: f64,
    pub peak_demand_month: Option<MonthKey>,
    pub peak_demand: f64,
    /// Largest capability-relative gap
    pub max_gap: i64,
    /// Vessels needed to cover the peak month
    pub recommended_fleet_size: u32,
    /// Mean of the monthly confidences
    pub confidence_score: f64,
    pub meets_confidence_threshold: bool,
}

impl ScenarioResult {
    pub fn month(&self, month: MonthKey) -> Option<&ScenarioMonth> {
        self.months.iter().find(|m| m.month == month)
    }

    pub fn required_vessels(&self) -> Vec<u32> {
        self.months.iter().map(|m| m.required_vessels).collect()
    }

    pub fn total_demand(&self) -> Vec<f64> {
        self.months.iter().map(|m| m.total_demand).collect()
    }
}
