//! Management recommendation types

use serde::{Deserialize, Serialize};

use super::MonthKey;

/// Kind of management action being recommended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    /// Charter additional vessels
    VesselAcquisition,
    /// Release surplus vessels
    CapacityOptimization,
    /// Fleet running outside healthy utilization
    UtilizationWarning,
    /// Downside scenario diverges from the base case
    ScenarioContingency,
}

impl std::fmt::Display for RecommendationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VesselAcquisition => write!(f, "vessel_acquisition"),
            Self::CapacityOptimization => write!(f, "capacity_optimization"),
            Self::UtilizationWarning => write!(f, "utilization_warning"),
            Self::ScenarioContingency => write!(f, "scenario_contingency"),
        }
    }
}

/// Recommendation urgency. Ordered most urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "CRITICAL"),
            Self::High => write!(f, "HIGH"),
            Self::Medium => write!(f, "MEDIUM"),
            Self::Low => write!(f, "LOW"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

/// Quantified effect of acting on a recommendation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RecommendationImpact {
    /// Vessels added (positive) or released (negative)
    pub vessel_impact: i64,
    /// Charter cost added (positive) or saved (negative), USD
    pub cost_impact: f64,
    /// Change in average utilization after acting
    pub utilization_impact: f64,
}

/// A measured value that caused a rule to fire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerCondition {
    pub metric: String,
    pub value: f64,
    pub threshold: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<MonthKey>,
}

/// A ranked, justified fleet action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagementRecommendation {
    pub id: String,
    pub rec_type: RecommendationType,
    pub priority: Priority,
    pub scenario_id: String,
    pub target_month: Option<MonthKey>,
    pub title: String,
    pub rationale: String,
    pub impact: RecommendationImpact,
    pub triggers: Vec<TriggerCondition>,
    pub alternatives: Vec<String>,
    pub confidence: f64,
    pub status: RecommendationStatus,
}
