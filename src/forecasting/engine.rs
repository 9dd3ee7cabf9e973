//! Fleet Forecast Engine - validates a request and runs every scenario
//!
//! Sequence for one run:
//!
//! 1. Reject call patterns that cannot be interpreted (`ForecastError`)
//! 2. Check the computation budget before any forecasting
//! 3. Screen the data: duplicates, gaps, malformed injects become warnings
//! 4. Forecast locations and vessels once per distinct horizon
//! 5. Compose scenarios (optionally on the rayon pool)
//! 6. Gap analysis, cross-scenario ranges, recommendations, export rows

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{info, warn};

use super::capability::CapabilityForecaster;
use super::demand::{finite_mean, DemandForecaster};
use super::export::export_rows;
use super::gap::GapAnalyzer;
use super::recommendations::RecommendationGenerator;
use super::scenario::ScenarioEngine;
use crate::config::ForecastConfig;
use crate::error::ForecastError;
use crate::types::{
    first_gap, CoreFleetBaseline, CrossScenarioSummary, ForecastDemand, ForecastScenario, Inject,
    InputWarning, LocationDemandSeries, MonthKey, MonthRange, ScenarioResult,
    VesselCapabilityForecast, VesselCapabilitySeries, VesselForecastResult, WarningCode,
};

/// Everything a caller hands the engine for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    /// First forecast month; defaults to the month after the latest history
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_month: Option<MonthKey>,
    #[serde(default)]
    pub locations: Vec<LocationDemandSeries>,
    #[serde(default)]
    pub vessels: Vec<VesselCapabilitySeries>,
    #[serde(default)]
    pub injects: Vec<Inject>,
    /// `None` means the configured (or predefined) scenario set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenarios: Option<Vec<ForecastScenario>>,
    /// Overrides the configured baseline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline: Option<CoreFleetBaseline>,
    /// Scenario whose gaps drive recommendations; defaults to the configured
    /// base when present in the set, else the first scenario
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_scenario: Option<String>,
}

impl ForecastRequest {
    /// Month after the latest observation across all series.
    pub fn inferred_start(&self) -> Option<MonthKey> {
        let locations = self.locations.iter().filter_map(|l| l.last_month());
        let vessels = self.vessels.iter().filter_map(|v| v.last_month());
        locations.chain(vessels).max().map(|m| m.next())
    }
}

/// Screened input: first-wins series, applicable injects, and what was dropped.
struct Screened {
    locations: Vec<LocationDemandSeries>,
    vessels: Vec<VesselCapabilitySeries>,
    injects: Vec<Inject>,
    warnings: Vec<InputWarning>,
}

pub struct FleetForecastEngine {
    config: ForecastConfig,
    demand: DemandForecaster,
    capability: CapabilityForecaster,
    scenarios: ScenarioEngine,
    recommendations: RecommendationGenerator,
}

impl FleetForecastEngine {
    pub fn new(config: ForecastConfig) -> Self {
        Self {
            demand: DemandForecaster::new(&config),
            capability: CapabilityForecaster::new(&config),
            scenarios: ScenarioEngine::new(&config),
            recommendations: RecommendationGenerator::new(&config),
            config,
        }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Run a full forecast.
    ///
    /// Identical requests give identical results: there is no clock, no
    /// randomness and parallel scenario results are collected in input order.
    pub fn run(&self, request: &ForecastRequest) -> Result<VesselForecastResult, ForecastError> {
        let baseline = request.baseline.unwrap_or(self.config.baseline);
        validate_baseline(&baseline)?;

        let mut screened = screen(request);

        let inject_ids: Vec<String> = screened.injects.iter().map(|i| i.id.clone()).collect();
        let scenarios = match &request.scenarios {
            Some(scenarios) => scenarios.clone(),
            None => self.config.scenarios_or_predefined(&inject_ids),
        };
        self.validate_scenarios(&scenarios)?;
        let base_id = self.base_scenario(request, &scenarios)?;
        self.check_budget(&scenarios, &screened)?;

        let start = request
            .start_month
            .or_else(|| request.inferred_start())
            .ok_or(ForecastError::MissingStartMonth)?;

        let known: HashSet<&str> = request.injects.iter().map(|i| i.id.as_str()).collect();
        let scenario_injects: Vec<Vec<Inject>> = scenarios
            .iter()
            .map(|s| resolve_injects(s, &screened.injects, &known, &mut screened.warnings))
            .collect();

        // Forecasts depend on the horizon through confidence decay only
        let mut forecasts: BTreeMap<u32, (Vec<ForecastDemand>, Vec<VesselCapabilityForecast>)> =
            BTreeMap::new();
        for s in &scenarios {
            forecasts.entry(s.horizon_months).or_insert_with(|| {
                let h = s.horizon_months as usize;
                (
                    self.demand.forecast_all(&screened.locations, start, h),
                    self.capability.forecast_all(&screened.vessels, start, h),
                )
            });
        }

        let compose = |(scenario, injects): (&ForecastScenario, &Vec<Inject>)| {
            let (demand, capability) = &forecasts[&scenario.horizon_months];
            self.scenarios.run(scenario, start, demand, capability, injects)
        };
        let results: Vec<ScenarioResult> = if self.config.run.parallel_scenarios {
            scenarios.par_iter().zip(scenario_injects.par_iter()).map(compose).collect()
        } else {
            scenarios.iter().zip(scenario_injects.iter()).map(compose).collect()
        };

        for r in results.iter().filter(|r| !r.meets_confidence_threshold) {
            let threshold = scenarios
                .iter()
                .find(|s| s.id == r.scenario_id)
                .map_or(0.0, |s| s.confidence_threshold);
            screened.warnings.push(InputWarning::new(
                WarningCode::LowConfidence,
                &r.scenario_id,
                format!(
                    "aggregate confidence {:.2} is below the scenario threshold {:.2}",
                    r.confidence_score, threshold
                ),
            ));
        }

        let analyzer = GapAnalyzer::new(&self.config, baseline);
        let gap_analyses: Vec<_> = results.iter().map(|r| analyzer.analyze(r)).collect();

        let base_index = results
            .iter()
            .position(|r| r.scenario_id == base_id)
            .ok_or_else(|| ForecastError::UnknownBaseScenario(base_id.clone()))?;
        let base = &results[base_index];
        let base_gaps = &gap_analyses[base_index];

        let recommendations =
            self.recommendations
                .generate(base, base_gaps, &results, baseline.day_rates);

        let (location_forecasts, vessel_forecasts) = forecasts
            .remove(&base.horizon_months)
            .unwrap_or_default();

        for w in &screened.warnings {
            warn!(code = ?w.code, subject = %w.subject, "{}", w.message);
        }
        info!(
            start = %start,
            scenarios = results.len(),
            locations = location_forecasts.len(),
            vessels = vessel_forecasts.len(),
            recommendations = recommendations.len(),
            warnings = screened.warnings.len(),
            "Fleet forecast complete"
        );

        Ok(VesselForecastResult {
            generated_for: start,
            base_scenario_id: base_id,
            high_risk_months: base_gaps.high_risk_months.clone(),
            low_utilization_months: base_gaps.low_utilization_months.clone(),
            cross_scenario: cross_scenario(&results),
            export_data: export_rows(&results, &gap_analyses),
            scenarios: results,
            location_forecasts,
            vessel_forecasts,
            gap_analyses,
            recommendations,
            warnings: screened.warnings,
        })
    }

    fn validate_scenarios(&self, scenarios: &[ForecastScenario]) -> Result<(), ForecastError> {
        if scenarios.is_empty() {
            return Err(ForecastError::NoScenarios);
        }
        let budget = &self.config.budget;
        if scenarios.len() > budget.max_scenarios {
            return Err(ForecastError::InputTooLarge {
                requested: scenarios.len(),
                limit: budget.max_scenarios,
                unit: "scenarios",
            });
        }

        let mut seen = HashSet::new();
        for s in scenarios {
            if !seen.insert(s.id.as_str()) {
                return Err(ForecastError::DuplicateScenario(s.id.clone()));
            }
            if s.horizon_months == 0 {
                return Err(ForecastError::InvalidHorizon {
                    scenario: s.id.clone(),
                    horizon: s.horizon_months,
                    max: budget.max_horizon_months,
                });
            }
            if s.horizon_months > budget.max_horizon_months {
                return Err(ForecastError::InputTooLarge {
                    requested: s.horizon_months as usize,
                    limit: budget.max_horizon_months as usize,
                    unit: "horizon months",
                });
            }
            if !s.demand_growth_rate.is_finite() || !s.capability_growth_rate.is_finite() {
                return Err(ForecastError::InvalidScenario {
                    scenario: s.id.clone(),
                    reason: "growth rates must be finite".to_string(),
                });
            }
            if !(0.0..=1.0).contains(&s.confidence_threshold) {
                return Err(ForecastError::InvalidScenario {
                    scenario: s.id.clone(),
                    reason: format!(
                        "confidence threshold {} is outside [0, 1]",
                        s.confidence_threshold
                    ),
                });
            }
        }

        Ok(())
    }

    /// Request choice first, then the configured base if it is in the set,
    /// then the first scenario.
    fn base_scenario(
        &self,
        request: &ForecastRequest,
        scenarios: &[ForecastScenario],
    ) -> Result<String, ForecastError> {
        let present = |id: &str| scenarios.iter().any(|s| s.id == id);
        if let Some(id) = &request.base_scenario {
            return if present(id) {
                Ok(id.clone())
            } else {
                Err(ForecastError::UnknownBaseScenario(id.clone()))
            };
        }
        let configured = &self.config.run.base_scenario;
        if present(configured) {
            return Ok(configured.clone());
        }
        scenarios
            .first()
            .map(|s| s.id.clone())
            .ok_or(ForecastError::NoScenarios)
    }

    /// Cells = Σ horizon × (locations + vessels).
    fn check_budget(&self, scenarios: &[ForecastScenario], screened: &Screened) -> Result<(), ForecastError> {
        let series = screened.locations.len() + screened.vessels.len();
        let cells = scenarios.iter().fold(0usize, |acc, s| {
            acc.saturating_add((s.horizon_months as usize).saturating_mul(series))
        });
        let limit = self.config.budget.max_cells;
        if cells > limit {
            return Err(ForecastError::InputTooLarge {
                requested: cells,
                limit,
                unit: "cells",
            });
        }
        Ok(())
    }
}

fn validate_baseline(baseline: &CoreFleetBaseline) -> Result<(), ForecastError> {
    let band = baseline.utilization_band;
    if !band.min.is_finite() || !band.max.is_finite() || band.min < 0.0 || band.min > band.max {
        return Err(ForecastError::InvalidBaseline(format!(
            "utilization band [{}, {}] must be finite, non-negative and ordered",
            band.min, band.max
        )));
    }
    let rates = baseline.day_rates;
    if !rates.core.is_finite() || !rates.spot.is_finite() || rates.core < 0.0 || rates.spot < 0.0 {
        return Err(ForecastError::InvalidBaseline(format!(
            "day rates (core {}, spot {}) must be finite and non-negative",
            rates.core, rates.spot
        )));
    }
    Ok(())
}

/// Data-quality screening. Nothing here fails the run.
fn screen(request: &ForecastRequest) -> Screened {
    let mut warnings = Vec::new();

    let mut seen = HashSet::new();
    let mut locations = Vec::with_capacity(request.locations.len());
    for loc in &request.locations {
        if !seen.insert(loc.location_id.as_str()) {
            warnings.push(InputWarning::new(
                WarningCode::DuplicateSeries,
                &loc.location_id,
                "duplicate location series ignored, first occurrence kept",
            ));
            continue;
        }
        check_series(&loc.location_id, &loc.monthly, &mut warnings);
        locations.push(loc.clone());
    }

    let mut seen = HashSet::new();
    let mut vessels = Vec::with_capacity(request.vessels.len());
    for vessel in &request.vessels {
        if !seen.insert(vessel.vessel_id.as_str()) {
            warnings.push(InputWarning::new(
                WarningCode::DuplicateSeries,
                &vessel.vessel_id,
                "duplicate vessel series ignored, first occurrence kept",
            ));
            continue;
        }
        check_series(&vessel.vessel_id, &vessel.monthly, &mut warnings);
        vessels.push(vessel.clone());
    }
    if vessels.is_empty() {
        warnings.push(InputWarning::new(
            WarningCode::NoFleetCapability,
            "vessels",
            "no vessel history, requirements are unmeasured and confidence drops to the floor",
        ));
    } else if vessels.iter().all(|v| finite_mean(&v.values()) <= 0.0) {
        warnings.push(InputWarning::new(
            WarningCode::NoFleetCapability,
            "vessels",
            "no vessel has positive deliveries, requirements are unmeasured and confidence drops to the floor",
        ));
    }

    let mut seen = HashSet::new();
    let mut injects = Vec::with_capacity(request.injects.len());
    for inject in &request.injects {
        if !seen.insert(inject.id.as_str()) {
            warnings.push(InputWarning::new(
                WarningCode::DuplicateInject,
                &inject.id,
                "duplicate inject id ignored, first occurrence kept",
            ));
            continue;
        }
        if inject.end < inject.start {
            warnings.push(InputWarning::new(
                WarningCode::InvertedInjectWindow,
                &inject.id,
                format!("window ends ({}) before it starts ({}), skipped", inject.end, inject.start),
            ));
            continue;
        }
        let weight_ok = (0.0..=1.0).contains(&inject.probability)
            && inject.magnitude.is_finite()
            && inject.magnitude >= 0.0;
        if !weight_ok {
            warnings.push(InputWarning::new(
                WarningCode::InvalidInjectWeight,
                &inject.id,
                format!(
                    "probability {} must be in [0, 1] and magnitude {} finite and non-negative, skipped",
                    inject.probability, inject.magnitude
                ),
            ));
            continue;
        }
        injects.push(inject.clone());
    }

    Screened {
        locations,
        vessels,
        injects,
        warnings,
    }
}

fn check_series(id: &str, monthly: &BTreeMap<MonthKey, f64>, warnings: &mut Vec<InputWarning>) {
    if monthly.is_empty() {
        warnings.push(InputWarning::new(
            WarningCode::EmptySeries,
            id,
            "no history, forecast falls back to zero at the confidence floor",
        ));
    } else if let Some((before, after)) = first_gap(monthly) {
        warnings.push(InputWarning::new(
            WarningCode::NonContiguousSeries,
            id,
            format!("history jumps from {before} to {after}, trend fitted over positions"),
        ));
    }
}

/// The scenario's active injects in listed order. Ids that were never
/// supplied are reported; ids skipped during screening already were.
fn resolve_injects(
    scenario: &ForecastScenario,
    valid: &[Inject],
    known: &HashSet<&str>,
    warnings: &mut Vec<InputWarning>,
) -> Vec<Inject> {
    let mut resolved: Vec<Inject> = Vec::new();
    for id in &scenario.active_injects {
        if resolved.iter().any(|i| &i.id == id) {
            continue;
        }
        match valid.iter().find(|i| &i.id == id) {
            Some(inject) => resolved.push(inject.clone()),
            None if !known.contains(id.as_str()) => warnings.push(InputWarning::new(
                WarningCode::UnknownInjectReference,
                &scenario.id,
                format!("references unknown inject '{id}', skipped for this scenario"),
            )),
            None => {}
        }
    }
    resolved
}

fn cross_scenario(results: &[ScenarioResult]) -> CrossScenarioSummary {
    let mut ranges: BTreeMap<MonthKey, MonthRange> = BTreeMap::new();
    for r in results {
        for m in &r.months {
            ranges
                .entry(m.month)
                .and_modify(|range| {
                    range.min_demand = range.min_demand.min(m.total_demand);
                    range.max_demand = range.max_demand.max(m.total_demand);
                    range.min_required_vessels = range.min_required_vessels.min(m.required_vessels);
                    range.max_required_vessels = range.max_required_vessels.max(m.required_vessels);
                })
                .or_insert(MonthRange {
                    month: m.month,
                    min_demand: m.total_demand,
                    max_demand: m.total_demand,
                    min_required_vessels: m.required_vessels,
                    max_required_vessels: m.required_vessels,
                });
        }
    }

    CrossScenarioSummary {
        months: ranges.into_values().collect(),
        min_fleet_size: results.iter().map(|r| r.recommended_fleet_size).min().unwrap_or(0),
        max_fleet_size: results.iter().map(|r| r.recommended_fleet_size).max().unwrap_or(0),
    }
}
