//! Core fleet baseline and gap analysis output

use serde::{Deserialize, Serialize};

use super::MonthKey;

/// Acceptable fleet utilization range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UtilizationBand {
    pub min: f64,
    pub max: f64,
}

impl Default for UtilizationBand {
    fn default() -> Self {
        Self { min: 0.65, max: 0.85 }
    }
}

impl UtilizationBand {
    pub fn contains(&self, utilization: f64) -> bool {
        (self.min..=self.max).contains(&utilization)
    }
}

/// Charter day rates (USD/day)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DayRates {
    /// Rate paid for contracted core vessels
    pub core: f64,
    /// Rate paid for short-term spot charters
    pub spot: f64,
}

impl Default for DayRates {
    fn default() -> Self {
        Self {
            core: 18_000.0,
            spot: 25_000.0,
        }
    }
}

/// Contractually held fleet that forecast requirements are measured against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreFleetBaseline {
    pub vessel_count: u32,
    pub utilization_band: UtilizationBand,
    pub day_rates: DayRates,
}

impl Default for CoreFleetBaseline {
    fn default() -> Self {
        Self {
            vessel_count: 6,
            utilization_band: UtilizationBand::default(),
            day_rates: DayRates::default(),
        }
    }
}

/// Baseline-relative view of one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyGap {
    pub month: MonthKey,
    pub demand: f64,
    pub required_vessels: u32,
    /// required − baseline: positive = charter more, negative = can release
    pub gap: i64,
    /// demand / (baseline × average vessel capability)
    pub utilization: f64,
}

/// GapAnalyzer output for one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapAnalysis {
    pub scenario_id: String,
    pub baseline_vessels: u32,
    pub average_vessel_capability: f64,
    pub months: Vec<MonthlyGap>,
    pub average_utilization: f64,
    /// Largest gap and the first month it occurs
    pub peak_gap: i64,
    pub peak_gap_month: Option<MonthKey>,
    /// Months with gap above the high-risk threshold
    pub high_risk_months: Vec<MonthKey>,
    /// Months with utilization below the low-utilization threshold
    pub low_utilization_months: Vec<MonthKey>,
    /// Months below / above the baseline utilization band
    pub months_below_band: Vec<MonthKey>,
    pub months_above_band: Vec<MonthKey>,
    /// Σ positive gaps
    pub vessel_months_short: i64,
    /// Σ |negative gaps|
    pub vessel_months_surplus: i64,
}

impl GapAnalysis {
    pub fn gap_for(&self, month: MonthKey) -> Option<i64> {
        self.months.iter().find(|m| m.month == month).map(|m| m.gap)
    }

    /// Whether baseline utilization and surplus are real measurements.
    ///
    /// With no baseline fleet or no known vessel capability every
    /// utilization is a placeholder 0 and every requirement is 0, so
    /// neither can justify a release or an under-utilization flag.
    pub fn has_capacity(&self) -> bool {
        self.baseline_vessels > 0
            && self.average_vessel_capability > 0.0
            && self.average_vessel_capability.is_finite()
    }
}
