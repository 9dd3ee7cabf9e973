//! Quarter-level seasonal multipliers

use statrs::statistics::Statistics;
use std::collections::BTreeMap;

use crate::types::{MonthKey, Quarter, SeasonalFactors};

/// Derives quarter multipliers as each quarter's mean relative to the overall mean.
#[derive(Debug, Clone, Copy)]
pub struct SeasonalAdjuster {
    fallback: SeasonalFactors,
}

impl Default for SeasonalAdjuster {
    fn default() -> Self {
        Self::new(SeasonalFactors::default())
    }
}

impl SeasonalAdjuster {
    /// `fallback` supplies the factor for any quarter without observations.
    pub const fn new(fallback: SeasonalFactors) -> Self {
        Self { fallback }
    }

    /// Compute Q1..Q4 factors for a monthly mapping.
    ///
    /// A quarter with no finite observations keeps its fallback factor. When
    /// the overall mean is not positive there is nothing to scale against and
    /// all four fallbacks are returned.
    pub fn factors(&self, monthly: &BTreeMap<MonthKey, f64>) -> SeasonalFactors {
        let mut buckets: [Vec<f64>; 4] = Default::default();
        for (month, value) in monthly {
            if value.is_finite() {
                buckets[month.quarter().index()].push(*value);
            }
        }

        let all: Vec<f64> = buckets.iter().flatten().copied().collect();
        if all.is_empty() {
            return self.fallback;
        }
        let overall = all.iter().mean();
        if overall <= 0.0 {
            return self.fallback;
        }

        let mut factors = self.fallback;
        for quarter in Quarter::ALL {
            let bucket = &buckets[quarter.index()];
            if !bucket.is_empty() {
                factors.set(quarter, bucket.iter().mean() / overall);
            }
        }
        factors
    }
}
