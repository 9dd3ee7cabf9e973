//! Per-vessel capability projection with planned-maintenance derates

use std::collections::BTreeMap;
use tracing::debug;

use super::demand::finite_mean;
use super::trend::TrendEstimator;
use crate::config::ForecastConfig;
use crate::types::{MonthKey, PerformanceTrend, TrendFit, VesselCapabilityForecast, VesselCapabilitySeries};

/// Projects vessel deliveries forward and takes a fixed share of every
/// `maintenance_interval`-th month out for dry-dock.
#[derive(Debug, Clone)]
pub struct CapabilityForecaster {
    maintenance_interval: usize,
    maintenance_derate: f64,
    optimal_utilization: f64,
    slope_threshold: f64,
}

impl CapabilityForecaster {
    pub fn new(config: &ForecastConfig) -> Self {
        Self {
            maintenance_interval: config.capability.maintenance_interval_months.max(1) as usize,
            maintenance_derate: config.capability.maintenance_derate,
            optimal_utilization: config.capability.optimal_utilization,
            slope_threshold: config.forecast.trend_slope_threshold,
        }
    }

    pub fn forecast_all(
        &self,
        series: &[VesselCapabilitySeries],
        start: MonthKey,
        horizon: usize,
    ) -> Vec<VesselCapabilityForecast> {
        series
            .iter()
            .map(|s| self.forecast(s, start, horizon))
            .collect()
    }

    /// Forecast one vessel.
    ///
    /// Month `i` predicts `intercept + slope × (n + i)` floored at 0, the same
    /// index convention as demand. When `i` is a multiple of the maintenance
    /// interval the derate is subtracted from the month and recorded in
    /// `maintenance_derate`; other months record 0.
    pub fn forecast(
        &self,
        series: &VesselCapabilitySeries,
        start: MonthKey,
        horizon: usize,
    ) -> VesselCapabilityForecast {
        let history = series.values();
        let fit = TrendEstimator::fit(&history);

        let mut monthly = BTreeMap::new();
        let mut utilization_target = BTreeMap::new();
        let mut maintenance_derate = BTreeMap::new();

        for (offset, month) in start.range(horizon).into_iter().enumerate() {
            let i = offset + 1;
            let projected = TrendEstimator::project(&fit, fit.observations, i);
            let predicted = if projected.is_finite() { projected.max(0.0) } else { 0.0 };

            let derate = if i % self.maintenance_interval == 0 {
                predicted * self.maintenance_derate
            } else {
                0.0
            };

            monthly.insert(month, predicted - derate);
            maintenance_derate.insert(month, derate);
            utilization_target.insert(month, self.optimal_utilization);
        }

        debug!(
            vessel = %series.vessel_id,
            slope = fit.slope,
            observations = fit.observations,
            "Capability trend fitted"
        );

        VesselCapabilityForecast {
            vessel_id: series.vessel_id.clone(),
            monthly,
            utilization_target,
            maintenance_derate,
            performance_trend: self.performance(&fit),
            trend_fit: fit,
            average_capability: finite_mean(&history),
        }
    }

    fn performance(&self, fit: &TrendFit) -> PerformanceTrend {
        if fit.slope > self.slope_threshold {
            PerformanceTrend::Improving
        } else if fit.slope < -self.slope_threshold {
            PerformanceTrend::Declining
        } else {
            PerformanceTrend::Stable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> MonthKey {
        s.parse().unwrap()
    }

    fn forecaster() -> CapabilityForecaster {
        CapabilityForecaster::new(&ForecastConfig::default())
    }

    #[test]
    fn sixth_month_is_derated_and_recorded() {
        let series = VesselCapabilitySeries::from_values("PSV-01", key("2024-01"), &[20.0; 12]);
        let fc = forecaster().forecast(&series, key("2025-01"), 12);

        assert_eq!(fc.monthly.len(), 12);
        assert!((fc.monthly[&key("2025-01")] - 20.0).abs() < 1e-9);
        assert!((fc.monthly[&key("2025-06")] - 16.0).abs() < 1e-9);
        assert!((fc.maintenance_derate[&key("2025-06")] - 4.0).abs() < 1e-9);
        assert!((fc.monthly[&key("2025-12")] - 16.0).abs() < 1e-9);
        assert_eq!(fc.maintenance_derate[&key("2025-05")], 0.0);

        let derated = fc.maintenance_derate.values().filter(|d| **d > 0.0).count();
        assert_eq!(derated, 2);
    }

    #[test]
    fn targets_and_average() {
        let series = VesselCapabilitySeries::from_values("PSV-02", key("2024-01"), &[10.0, 20.0, 30.0]);
        let fc = forecaster().forecast(&series, key("2024-04"), 3);
        assert!(fc.utilization_target.values().all(|t| (*t - 0.75).abs() < 1e-12));
        assert!((fc.average_capability - 20.0).abs() < 1e-9);
        assert_eq!(fc.performance_trend, PerformanceTrend::Improving);
        // x = 4 → 0 + 10 × 4
        assert!((fc.monthly[&key("2024-04")] - 40.0).abs() < 1e-9);
    }

    #[test]
    fn declining_vessel() {
        let series = VesselCapabilitySeries::from_values("OLD", key("2024-01"), &[30.0, 25.0, 20.0]);
        let fc = forecaster().forecast(&series, key("2024-04"), 12);
        assert_eq!(fc.performance_trend, PerformanceTrend::Declining);
        assert!(fc.monthly.values().all(|v| *v >= 0.0));
    }

    #[test]
    fn empty_vessel_history() {
        let series = VesselCapabilitySeries::new("NEW");
        let fc = forecaster().forecast(&series, key("2025-01"), 6);
        assert_eq!(fc.average_capability, 0.0);
        assert!(fc.monthly.values().all(|v| *v == 0.0));
        assert_eq!(fc.performance_trend, PerformanceTrend::Stable);
    }
}
