//! Scenario composition: growth multipliers, injects, vessel requirement

use std::collections::BTreeMap;
use tracing::debug;

use super::demand::{distance_factor, finite_mean};
use super::injects::InjectEngine;
use crate::config::ForecastConfig;
use crate::types::{
    DemandCategory, ForecastDemand, ForecastScenario, Inject, InjectImpact, MonthKey,
    ScenarioMonth, ScenarioResult, VesselCapabilityForecast,
};

/// Turns per-location and per-vessel forecasts into one `ScenarioResult`.
///
/// Holds only tuning constants; every call is independent, so one engine can
/// serve all scenarios of a run from any number of threads.
#[derive(Debug, Clone)]
pub struct ScenarioEngine {
    confidence_floor: f64,
    decay_floor: f64,
}

impl ScenarioEngine {
    pub fn new(config: &ForecastConfig) -> Self {
        Self {
            confidence_floor: config.forecast.confidence_floor,
            decay_floor: config.forecast.distance_decay_floor,
        }
    }

    /// Compose one scenario over `start .. start + horizon`.
    ///
    /// `injects` must already be resolved to the scenario's active set; any
    /// inject whose id is not in `scenario.active_injects` is ignored anyway.
    pub fn run(
        &self,
        scenario: &ForecastScenario,
        start: MonthKey,
        demand: &[ForecastDemand],
        capability: &[VesselCapabilityForecast],
        injects: &[Inject],
    ) -> ScenarioResult {
        let horizon = scenario.horizon_months as usize;
        let months = start.range(horizon);

        let average_vessel_capability = finite_mean(
            &capability
                .iter()
                .map(|v| v.average_capability)
                .collect::<Vec<_>>(),
        );

        // Without capability the requirement is unmeasured, not zero
        let fleet_known = average_vessel_capability > 0.0;

        // Growth is linear in the month offset and never drives a value negative
        let growth = |rate: f64, i: usize| (1.0 + rate * i as f64).max(0.0);

        let mut drilling = BTreeMap::new();
        let mut production = BTreeMap::new();
        let mut total = BTreeMap::new();
        let mut base_capability = BTreeMap::new();
        let mut derate = BTreeMap::new();

        for (offset, month) in months.iter().enumerate() {
            let i = offset + 1;
            let dg = growth(scenario.demand_growth_rate, i);
            let cg = growth(scenario.capability_growth_rate, i);

            let (mut d, mut p) = (0.0, 0.0);
            for location in demand {
                let value = location.monthly.get(month).copied().unwrap_or(0.0);
                match location.category {
                    DemandCategory::Drilling => d += value,
                    DemandCategory::Production => p += value,
                }
            }
            drilling.insert(*month, d * dg);
            production.insert(*month, p * dg);
            total.insert(*month, (d + p) * dg);

            let cap: f64 = capability
                .iter()
                .map(|v| v.monthly.get(month).copied().unwrap_or(0.0))
                .sum();
            let der: f64 = capability
                .iter()
                .map(|v| v.maintenance_derate.get(month).copied().unwrap_or(0.0))
                .sum();
            base_capability.insert(*month, cap * cg);
            derate.insert(*month, der * cg);
        }

        let active: Vec<Inject> = injects
            .iter()
            .filter(|inj| scenario.active_injects.contains(&inj.id))
            .cloned()
            .collect();
        let demand_applied = InjectEngine::apply_scaled(&total, &active, average_vessel_capability);
        let capability_applied =
            InjectEngine::reduce_capability(&base_capability, &active, average_vessel_capability);

        let mut result_months = Vec::with_capacity(horizon);
        for (offset, month) in months.iter().enumerate() {
            let i = offset + 1;
            let total_demand = demand_applied.adjusted.get(month).copied().unwrap_or(0.0);
            let month_capability = capability_applied.adjusted.get(month).copied().unwrap_or(0.0);

            let required_vessels = vessels_for(total_demand, average_vessel_capability);
            let implied_vessels = vessels_for(month_capability, average_vessel_capability);
            let utilization = if month_capability > 0.0 {
                total_demand / month_capability
            } else {
                0.0
            };

            result_months.push(ScenarioMonth {
                month: *month,
                total_demand,
                drilling_demand: drilling.get(month).copied().unwrap_or(0.0),
                production_demand: production.get(month).copied().unwrap_or(0.0),
                capability: month_capability,
                maintenance_derate: derate.get(month).copied().unwrap_or(0.0),
                required_vessels,
                implied_vessels,
                gap: i64::from(required_vessels) - i64::from(implied_vessels),
                utilization,
                confidence: if fleet_known {
                    self.month_confidence(demand, *month, i, horizon)
                } else {
                    self.floor_confidence(i, horizon)
                },
                inject_impact: merge_impact(
                    demand_applied.impact_by_month.get(month),
                    capability_applied.impact_by_month.get(month),
                ),
            });
        }

        let result = summarize(scenario, average_vessel_capability, result_months);
        debug!(
            scenario = %result.scenario_id,
            months = result.months.len(),
            recommended_fleet = result.recommended_fleet_size,
            confidence = result.confidence_score,
            "Scenario composed"
        );
        result
    }

    fn floor_confidence(&self, i: usize, horizon: usize) -> f64 {
        self.confidence_floor * distance_factor(i, horizon, self.decay_floor)
    }

    /// Demand-weighted mean of the location confidences for one month.
    fn month_confidence(&self, demand: &[ForecastDemand], month: MonthKey, i: usize, horizon: usize) -> f64 {
        let points: Vec<(f64, f64)> = demand
            .iter()
            .filter_map(|loc| {
                let c = loc.confidence.get(&month)?;
                let w = loc.monthly.get(&month).copied().unwrap_or(0.0);
                Some((w.max(0.0), *c))
            })
            .collect();

        if points.is_empty() {
            return self.floor_confidence(i, horizon);
        }

        let weight: f64 = points.iter().map(|(w, _)| w).sum();
        let c = if weight > 0.0 {
            points.iter().map(|(w, c)| w * c).sum::<f64>() / weight
        } else {
            points.iter().map(|(_, c)| c).sum::<f64>() / points.len() as f64
        };
        c.clamp(0.0, 1.0)
    }
}

/// `ceil(amount / per_vessel)`, 0 when either side is not positive.
pub(crate) fn vessels_for(amount: f64, per_vessel: f64) -> u32 {
    if per_vessel <= 0.0 || !per_vessel.is_finite() || !amount.is_finite() || amount <= 0.0 {
        return 0;
    }
    // Float-to-int casts saturate
    (amount / per_vessel).ceil() as u32
}

fn merge_impact(demand: Option<&InjectImpact>, capability: Option<&InjectImpact>) -> InjectImpact {
    let mut impact = InjectImpact::default();
    if let Some(d) = demand {
        impact.demand_delta = d.demand_delta;
        impact.inject_ids.extend(d.inject_ids.iter().cloned());
    }
    if let Some(c) = capability {
        impact.capability_delta = c.capability_delta;
        impact.inject_ids.extend(c.inject_ids.iter().cloned());
    }
    impact.inject_ids.sort();
    impact.inject_ids.dedup();
    impact
}

fn summarize(
    scenario: &ForecastScenario,
    average_vessel_capability: f64,
    months: Vec<ScenarioMonth>,
) -> ScenarioResult {
    let n = months.len();
    let average_utilization = if n == 0 {
        0.0
    } else {
        months.iter().map(|m| m.utilization).sum::<f64>() / n as f64
    };
    let confidence_score = if n == 0 {
        0.0
    } else {
        months.iter().map(|m| m.confidence).sum::<f64>() / n as f64
    };

    // First month reaching the maximum wins
    let mut peak: Option<&ScenarioMonth> = None;
    for m in &months {
        if peak.is_none_or(|p| m.total_demand > p.total_demand) {
            peak = Some(m);
        }
    }

    ScenarioResult {
        scenario_id: scenario.id.clone(),
        scenario_name: scenario.name.clone(),
        horizon_months: scenario.horizon_months,
        average_vessel_capability,
        average_utilization,
        peak_demand_month: peak.map(|m| m.month),
        peak_demand: peak.map_or(0.0, |m| m.total_demand),
        max_gap: months.iter().map(|m| m.gap).max().unwrap_or(0),
        recommended_fleet_size: months.iter().map(|m| m.required_vessels).max().unwrap_or(0),
        meets_confidence_threshold: confidence_score >= scenario.confidence_threshold,
        confidence_score,
        months,
    }
}
