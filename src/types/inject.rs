//! Injects: time-bounded, probability-weighted schedule events

use serde::{Deserialize, Serialize};

use super::MonthKey;

/// What an inject adjusts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InjectKind {
    DemandIncrease,
    DemandDecrease,
    CapabilityReduction,
}

impl InjectKind {
    /// Whether the inject is applied to the demand series.
    pub const fn affects_demand(self) -> bool {
        matches!(self, Self::DemandIncrease | Self::DemandDecrease)
    }
}

impl std::fmt::Display for InjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DemandIncrease => write!(f, "demand increase"),
            Self::DemandDecrease => write!(f, "demand decrease"),
            Self::CapabilityReduction => write!(f, "capability reduction"),
        }
    }
}

/// A known future event (drilling campaign, dry-dock window, field shut-in).
///
/// Externally authored; the engine reads injects and never modifies them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inject {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub start: MonthKey,
    /// Inclusive
    pub end: MonthKey,
    /// Vessel-count delta
    pub magnitude: f64,
    pub kind: InjectKind,
    /// Probability weight in [0, 1]
    pub probability: f64,
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

impl Inject {
    pub fn new(
        id: impl Into<String>,
        kind: InjectKind,
        start: MonthKey,
        end: MonthKey,
        magnitude: f64,
        probability: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: None,
            start,
            end,
            magnitude,
            kind,
            probability,
            active: true,
        }
    }

    /// Whether `month` falls inside the inclusive `[start, end]` window.
    pub fn covers(&self, month: MonthKey) -> bool {
        self.start <= month && month <= self.end
    }

    /// Probability-weighted vessel delta.
    pub fn weighted_magnitude(&self) -> f64 {
        self.magnitude * self.probability
    }
}

/// Inject contribution to one month
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InjectImpact {
    /// Net signed change applied to demand
    pub demand_delta: f64,
    /// Capability removed (reported as a negative number)
    pub capability_delta: f64,
    /// Ids of the injects active in the month, sorted
    pub inject_ids: Vec<String>,
}

impl InjectImpact {
    pub fn is_empty(&self) -> bool {
        self.inject_ids.is_empty()
    }
}
