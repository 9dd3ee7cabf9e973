//! Historical input series consumed by the forecasting engine

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::MonthKey;

/// Which side of the operation a field location's deliveries support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandCategory {
    #[default]
    Drilling,
    Production,
}

/// Monthly delivery counts for one field location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationDemandSeries {
    pub location_id: String,
    #[serde(default)]
    pub category: DemandCategory,
    /// Month → deliveries made to the location
    #[serde(default)]
    pub monthly: BTreeMap<MonthKey, f64>,
}

impl LocationDemandSeries {
    pub fn new(location_id: impl Into<String>, category: DemandCategory) -> Self {
        Self {
            location_id: location_id.into(),
            category,
            monthly: BTreeMap::new(),
        }
    }

    /// Build a series from consecutive values starting at `start`.
    pub fn from_values(
        location_id: impl Into<String>,
        category: DemandCategory,
        start: MonthKey,
        values: &[f64],
    ) -> Self {
        Self {
            location_id: location_id.into(),
            category,
            monthly: consecutive(start, values),
        }
    }

    /// Observations in chronological order.
    pub fn values(&self) -> Vec<f64> {
        self.monthly.values().copied().collect()
    }

    pub fn last_month(&self) -> Option<MonthKey> {
        self.monthly.keys().next_back().copied()
    }
}

/// Monthly completed deliveries for one vessel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselCapabilitySeries {
    pub vessel_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Month → deliveries completed by the vessel
    #[serde(default)]
    pub monthly: BTreeMap<MonthKey, f64>,
}

impl VesselCapabilitySeries {
    pub fn new(vessel_id: impl Into<String>) -> Self {
        Self {
            vessel_id: vessel_id.into(),
            name: None,
            monthly: BTreeMap::new(),
        }
    }

    /// Build a series from consecutive values starting at `start`.
    pub fn from_values(vessel_id: impl Into<String>, start: MonthKey, values: &[f64]) -> Self {
        Self {
            vessel_id: vessel_id.into(),
            name: None,
            monthly: consecutive(start, values),
        }
    }

    pub fn values(&self) -> Vec<f64> {
        self.monthly.values().copied().collect()
    }

    pub fn last_month(&self) -> Option<MonthKey> {
        self.monthly.keys().next_back().copied()
    }
}

fn consecutive(start: MonthKey, values: &[f64]) -> BTreeMap<MonthKey, f64> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| (start.offset(i as i32), *v))
        .collect()
}

/// First month-key gap in an ordered monthly mapping, as `(before, after)`.
///
/// Keys in a `BTreeMap` are already unique and ordered, so contiguity is the
/// only invariant left to check.
pub fn first_gap(monthly: &BTreeMap<MonthKey, f64>) -> Option<(MonthKey, MonthKey)> {
    monthly
        .keys()
        .zip(monthly.keys().skip(1))
        .find(|(a, b)| a.months_until(b) != 1)
        .map(|(a, b)| (*a, *b))
}
