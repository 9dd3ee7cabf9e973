//! Per-location demand projection

use std::collections::BTreeMap;
use tracing::debug;

use super::seasonal::SeasonalAdjuster;
use super::trend::TrendEstimator;
use crate::config::ForecastConfig;
use crate::types::{
    ForecastDemand, LocationDemandSeries, MonthKey, SeasonalFactors, TrendDirection, TrendFit,
};

/// Projects each location's monthly deliveries forward with a linear trend
/// scaled by quarter seasonality.
#[derive(Debug, Clone)]
pub struct DemandForecaster {
    seasonal: SeasonalAdjuster,
    confidence_floor: f64,
    decay_floor: f64,
    slope_threshold: f64,
}

impl DemandForecaster {
    pub fn new(config: &ForecastConfig) -> Self {
        Self {
            seasonal: SeasonalAdjuster::new(config.seasonal.factors()),
            confidence_floor: config.forecast.confidence_floor,
            decay_floor: config.forecast.distance_decay_floor,
            slope_threshold: config.forecast.trend_slope_threshold,
        }
    }

    /// Forecast every location over `horizon` months starting at `start`.
    pub fn forecast_all(
        &self,
        series: &[LocationDemandSeries],
        start: MonthKey,
        horizon: usize,
    ) -> Vec<ForecastDemand> {
        series
            .iter()
            .map(|s| self.forecast(s, start, horizon))
            .collect()
    }

    /// Forecast one location using seasonal factors derived from its history.
    pub fn forecast(
        &self,
        series: &LocationDemandSeries,
        start: MonthKey,
        horizon: usize,
    ) -> ForecastDemand {
        let factors = self.seasonal.factors(&series.monthly);
        self.forecast_with_factors(series, start, horizon, factors)
    }

    /// Forecast one location with explicit seasonal factors.
    ///
    /// Month `i` (1-based) predicts
    /// `(intercept + slope × (n + i)) × factor(quarter)`, floored at 0, with
    /// confidence `max(floor, r²) × distance_factor(i)`.
    pub fn forecast_with_factors(
        &self,
        series: &LocationDemandSeries,
        start: MonthKey,
        horizon: usize,
        factors: SeasonalFactors,
    ) -> ForecastDemand {
        let history = series.values();
        let fit = TrendEstimator::fit(&history);
        let historical_average = finite_mean(&history);
        let trend_confidence = fit.r_squared.max(self.confidence_floor);

        let mut monthly = BTreeMap::new();
        let mut confidence = BTreeMap::new();
        for (offset, month) in start.range(horizon).into_iter().enumerate() {
            let i = offset + 1;
            let base = TrendEstimator::project(&fit, fit.observations, i);
            let predicted = (base * factors.factor(month.quarter())).max(0.0);
            monthly.insert(month, if predicted.is_finite() { predicted } else { 0.0 });
            let c = trend_confidence * distance_factor(i, horizon, self.decay_floor);
            confidence.insert(month, c.clamp(0.0, 1.0));
        }

        let growth_rate = if historical_average > 0.0 {
            fit.slope / historical_average
        } else {
            0.0
        };

        debug!(
            location = %series.location_id,
            slope = fit.slope,
            r_squared = fit.r_squared,
            observations = fit.observations,
            "Demand trend fitted"
        );

        ForecastDemand {
            location_id: series.location_id.clone(),
            category: series.category,
            monthly,
            confidence,
            trend: self.direction(&fit),
            trend_fit: fit,
            seasonal_factors: factors,
            growth_rate,
            historical_average,
        }
    }

    fn direction(&self, fit: &TrendFit) -> TrendDirection {
        if fit.slope > self.slope_threshold {
            TrendDirection::Increasing
        } else if fit.slope < -self.slope_threshold {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        }
    }
}

/// Confidence multiplier for forecast month `i` of `horizon`.
///
/// Decays linearly from 1.0 at month 1 to `floor` at the final month and
/// never increases with distance.
pub fn distance_factor(i: usize, horizon: usize, floor: f64) -> f64 {
    if horizon <= 1 || i <= 1 {
        return 1.0;
    }
    let progress = ((i - 1) as f64 / (horizon - 1) as f64).min(1.0);
    1.0 - (1.0 - floor) * progress
}

/// Mean of the finite values, 0 when there are none.
pub(crate) fn finite_mean(values: &[f64]) -> f64 {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        0.0
    } else {
        finite.iter().sum::<f64>() / finite.len() as f64
    }
}
