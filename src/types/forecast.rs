//! Derived per-location and per-vessel forecast types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{DemandCategory, MonthKey, Quarter};

/// Ordinary least-squares fit over index positions `1..=n`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendFit {
    pub slope: f64,
    pub intercept: f64,
    /// Goodness of fit, clamped to [0, 1]
    pub r_squared: f64,
    /// Number of observations the fit was computed from
    pub observations: usize,
}

impl TrendFit {
    /// Value of the fitted line at index position `x`.
    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Direction of a location's demand trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

/// Direction of a vessel's delivery performance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTrend {
    Improving,
    Declining,
    Stable,
}

/// Quarter-level multiplicative factors, always exactly Q1..Q4.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeasonalFactors {
    #[serde(rename = "Q1")]
    pub q1: f64,
    #[serde(rename = "Q2")]
    pub q2: f64,
    #[serde(rename = "Q3")]
    pub q3: f64,
    #[serde(rename = "Q4")]
    pub q4: f64,
}

impl SeasonalFactors {
    /// No seasonal adjustment.
    pub const fn neutral() -> Self {
        Self { q1: 1.0, q2: 1.0, q3: 1.0, q4: 1.0 }
    }

    pub const fn factor(&self, quarter: Quarter) -> f64 {
        match quarter {
            Quarter::Q1 => self.q1,
            Quarter::Q2 => self.q2,
            Quarter::Q3 => self.q3,
            Quarter::Q4 => self.q4,
        }
    }

    pub fn set(&mut self, quarter: Quarter, value: f64) {
        match quarter {
            Quarter::Q1 => self.q1 = value,
            Quarter::Q2 => self.q2 = value,
            Quarter::Q3 => self.q3 = value,
            Quarter::Q4 => self.q4 = value,
        }
    }
}

impl Default for SeasonalFactors {
    /// Gulf of Mexico weather seasonality.
    fn default() -> Self {
        Self { q1: 1.10, q2: 1.00, q3: 0.90, q4: 1.05 }
    }
}

/// Forward demand projection for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDemand {
    pub location_id: String,
    pub category: DemandCategory,
    /// Future month → predicted deliveries (never negative)
    pub monthly: BTreeMap<MonthKey, f64>,
    /// Future month → confidence in [0, 1], non-increasing with distance
    pub confidence: BTreeMap<MonthKey, f64>,
    pub trend: TrendDirection,
    pub trend_fit: TrendFit,
    pub seasonal_factors: SeasonalFactors,
    /// Relative monthly growth: slope / historical average
    pub growth_rate: f64,
    pub historical_average: f64,
}

/// Forward capability projection for one vessel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselCapabilityForecast {
    pub vessel_id: String,
    /// Future month → deliveries the vessel can complete, after maintenance derate
    pub monthly: BTreeMap<MonthKey, f64>,
    /// Future month → target utilization
    pub utilization_target: BTreeMap<MonthKey, f64>,
    /// Future month → capability withheld for planned maintenance
    pub maintenance_derate: BTreeMap<MonthKey, f64>,
    pub performance_trend: PerformanceTrend,
    pub trend_fit: TrendFit,
    /// Mean historical monthly deliveries
    pub average_capability: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seasonal_factors_serialize_with_quarter_keys() {
        let json = serde_json::to_value(SeasonalFactors::default()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        assert_eq!(obj["Q1"], 1.10);
        assert_eq!(obj["Q3"], 0.90);
    }

    #[test]
    fn factor_lookup_by_quarter() {
        let mut f = SeasonalFactors::neutral();
        f.set(Quarter::Q4, 1.3);
        assert_eq!(f.factor(Quarter::Q4), 1.3);
        assert_eq!(f.factor(Quarter::Q1), 1.0);
    }
}
