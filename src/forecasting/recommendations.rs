//! Rule cascade from fleet gaps to ranked management recommendations
//!
//! Rules run in a fixed order and every match is emitted:
//!
//! 1. Any month short of the core fleet → vessel acquisition
//! 2. Sustained surplus (gap below the release threshold for enough
//!    consecutive months) → capacity optimization, one per run
//! 3. Average baseline utilization above the over-utilization line → warning
//! 4. Average baseline utilization below the under-utilization line → warning
//! 5. A non-base scenario needing materially more vessels than the base → contingency
//!
//! Text is slot-filled from fixed templates so every figure in a rationale
//! is also present in the recommendation's triggers.

use tracing::debug;

use super::gap::baseline_utilization;
use crate::config::{ForecastConfig, RecommendationConfig};
use crate::types::{
    DayRates, GapAnalysis, ManagementRecommendation, MonthKey, MonthlyGap, Priority,
    RecommendationImpact, RecommendationStatus, RecommendationType, ScenarioResult,
    TriggerCondition,
};

#[derive(Debug, Clone)]
pub struct RecommendationGenerator {
    rules: RecommendationConfig,
}

impl RecommendationGenerator {
    pub fn new(config: &ForecastConfig) -> Self {
        Self {
            rules: config.recommendations.clone(),
        }
    }

    /// Evaluate the cascade against the base scenario and rank the output.
    ///
    /// `others` may include the base scenario itself; it is skipped by id.
    pub fn generate(
        &self,
        base: &ScenarioResult,
        gaps: &GapAnalysis,
        others: &[ScenarioResult],
        day_rates: DayRates,
    ) -> Vec<ManagementRecommendation> {
        let mut recs = Vec::new();

        if let Some(rec) = self.acquisition(base, gaps, day_rates) {
            recs.push(rec);
        }
        recs.extend(self.releases(base, gaps, day_rates));
        if let Some(rec) = self.utilization_warning(base, gaps) {
            recs.push(rec);
        }
        if let Some(rec) = self.contingency(base, gaps, others, day_rates) {
            recs.push(rec);
        }

        // Stable: cascade order survives within a priority
        recs.sort_by_key(|r| r.priority);
        for (i, rec) in recs.iter_mut().enumerate() {
            rec.id = format!("REC-{:03}", i + 1);
        }

        debug!(
            scenario = %base.scenario_id,
            count = recs.len(),
            "Recommendations generated"
        );
        recs
    }

    // ------------------------------------------------------------------------
    // Rule 1: acquisition
    // ------------------------------------------------------------------------

    fn acquisition(
        &self,
        base: &ScenarioResult,
        gaps: &GapAnalysis,
        rates: DayRates,
    ) -> Option<ManagementRecommendation> {
        let short: Vec<&MonthlyGap> = gaps.months.iter().filter(|m| m.gap > 0).collect();
        let peak = short.iter().map(|m| m.gap).max()?;
        let target = short.iter().find(|m| m.gap == peak).map(|m| m.month);

        let priority = if peak > self.rules.critical_gap {
            Priority::Critical
        } else {
            Priority::High
        };
        let cost: f64 = short
            .iter()
            .map(|m| m.gap as f64 * rates.spot * f64::from(m.month.days_in_month()))
            .sum();
        let months: Vec<MonthKey> = short.iter().map(|m| m.month).collect();

        Some(ManagementRecommendation {
            id: String::new(),
            rec_type: RecommendationType::VesselAcquisition,
            priority,
            scenario_id: base.scenario_id.clone(),
            target_month: target,
            title: format!("Charter {} additional vessel(s) from {}", peak, fmt_month(target)),
            rationale: format!(
                "Base scenario requires up to {} vessels against a core fleet of {}. \
                 {} month(s) are short, peaking at +{} in {}.",
                i64::from(gaps.baseline_vessels) + peak,
                gaps.baseline_vessels,
                short.len(),
                peak,
                fmt_month(target),
            ),
            impact: RecommendationImpact {
                vessel_impact: peak,
                cost_impact: cost,
                utilization_impact: utilization_shift(gaps, peak),
            },
            triggers: short
                .iter()
                .map(|m| trigger("baseline_gap", m.gap as f64, 0.0, Some(m.month)))
                .collect(),
            alternatives: templated(&[
                "Spot-charter only for the peak months",
                "Re-sequence campaign activity out of the shortfall window",
                "Raise utilization targets on the existing core fleet",
            ]),
            confidence: mean_confidence(base, &months),
            status: RecommendationStatus::Pending,
        })
    }

    // ------------------------------------------------------------------------
    // Rule 2: release
    // ------------------------------------------------------------------------

    fn releases(
        &self,
        base: &ScenarioResult,
        gaps: &GapAnalysis,
        rates: DayRates,
    ) -> Vec<ManagementRecommendation> {
        // Zero requirements from an unknown fleet are not a surplus
        if !gaps.has_capacity() {
            return Vec::new();
        }
        surplus_runs(&gaps.months, self.rules.release_gap, self.rules.release_min_consecutive_months)
            .into_iter()
            .map(|run| {
                let release = run.iter().map(|m| -m.gap).min().unwrap_or(0);
                let start = run.first().map(|m| m.month);
                let end = run.last().map(|m| m.month);
                let days: f64 = run.iter().map(|m| f64::from(m.month.days_in_month())).sum();
                let months: Vec<MonthKey> = run.iter().map(|m| m.month).collect();

                ManagementRecommendation {
                    id: String::new(),
                    rec_type: RecommendationType::CapacityOptimization,
                    priority: Priority::Medium,
                    scenario_id: base.scenario_id.clone(),
                    target_month: start,
                    title: format!(
                        "Consider releasing {} vessel(s) from {} to {}",
                        release,
                        fmt_month(start),
                        fmt_month(end)
                    ),
                    rationale: format!(
                        "Base scenario stays at least {} vessel(s) under the core fleet of {} \
                         for {} consecutive months.",
                        release,
                        gaps.baseline_vessels,
                        run.len(),
                    ),
                    impact: RecommendationImpact {
                        vessel_impact: -release,
                        cost_impact: -(release as f64 * rates.core * days),
                        utilization_impact: utilization_shift(gaps, -release),
                    },
                    triggers: run
                        .iter()
                        .map(|m| {
                            trigger("baseline_gap", m.gap as f64, self.rules.release_gap as f64, Some(m.month))
                        })
                        .collect(),
                    alternatives: templated(&[
                        "Sublet surplus vessels to other operators",
                        "Bring forward planned dry-docks into the surplus window",
                        "Hold the fleet and absorb idle time if demand is expected to recover",
                    ]),
                    confidence: mean_confidence(base, &months),
                    status: RecommendationStatus::Pending,
                }
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // Rules 3 and 4: utilization
    // ------------------------------------------------------------------------

    fn utilization_warning(&self, base: &ScenarioResult, gaps: &GapAnalysis) -> Option<ManagementRecommendation> {
        // Without baseline capacity the ratio is a placeholder 0, not a measurement
        if !gaps.has_capacity() || gaps.months.is_empty() {
            return None;
        }
        let avg = gaps.average_utilization;
        let months: Vec<MonthKey> = gaps.months.iter().map(|m| m.month).collect();

        let (priority, threshold, target, title, alternatives) = if avg > self.rules.over_utilization {
            let target = extreme_month(&gaps.months, |a, b| a > b);
            (
                Priority::High,
                self.rules.over_utilization,
                target,
                format!("Core fleet over-utilized ({:.0}% average)", avg * 100.0),
                [
                    "Add short-term spot capacity ahead of the busiest months",
                    "Consolidate deliveries to raise cargo per voyage",
                    "Review maintenance timing to keep vessels on hire through peaks",
                ],
            )
        } else if avg < self.rules.under_utilization {
            let target = extreme_month(&gaps.months, |a, b| a < b);
            (
                Priority::Medium,
                self.rules.under_utilization,
                target,
                format!("Core fleet under-utilized ({:.0}% average)", avg * 100.0),
                [
                    "Offer spare capacity to partner operators",
                    "Shorten or stagger upcoming contract renewals",
                    "Schedule discretionary maintenance during low-demand months",
                ],
            )
        } else {
            return None;
        };

        Some(ManagementRecommendation {
            id: String::new(),
            rec_type: RecommendationType::UtilizationWarning,
            priority,
            scenario_id: base.scenario_id.clone(),
            target_month: target,
            title,
            rationale: format!(
                "Average utilization of the {}-vessel core fleet is {:.2} against a threshold of {:.2}.",
                gaps.baseline_vessels, avg, threshold,
            ),
            impact: RecommendationImpact::default(),
            triggers: vec![trigger("average_utilization", avg, threshold, None)],
            alternatives: templated(&alternatives),
            confidence: mean_confidence(base, &months),
            status: RecommendationStatus::Pending,
        })
    }

    // ------------------------------------------------------------------------
    // Rule 5: cross-scenario contingency
    // ------------------------------------------------------------------------

    fn contingency(
        &self,
        base: &ScenarioResult,
        gaps: &GapAnalysis,
        others: &[ScenarioResult],
        rates: DayRates,
    ) -> Option<ManagementRecommendation> {
        let mut widest: Option<(&ScenarioResult, MonthKey, i64)> = None;
        for other in others.iter().filter(|s| s.scenario_id != base.scenario_id) {
            for m in &other.months {
                let Some(base_month) = base.month(m.month) else {
                    continue;
                };
                let spread = i64::from(m.required_vessels) - i64::from(base_month.required_vessels);
                if widest.is_none_or(|(_, _, w)| spread > w) {
                    widest = Some((other, m.month, spread));
                }
            }
        }

        let (scenario, month, spread) = widest?;
        if spread < self.rules.contingency_spread {
            return None;
        }

        Some(ManagementRecommendation {
            id: String::new(),
            rec_type: RecommendationType::ScenarioContingency,
            priority: Priority::Medium,
            scenario_id: scenario.scenario_id.clone(),
            target_month: Some(month),
            title: format!(
                "Prepare contingency for {} more vessel(s) under {}",
                spread, scenario.scenario_name
            ),
            rationale: format!(
                "Scenario '{}' requires {} more vessel(s) than the base case in {}.",
                scenario.scenario_id, spread, month,
            ),
            impact: RecommendationImpact {
                vessel_impact: spread,
                cost_impact: spread as f64 * rates.spot * f64::from(month.days_in_month()),
                utilization_impact: utilization_shift(gaps, spread),
            },
            triggers: vec![trigger(
                "scenario_vessel_spread",
                spread as f64,
                self.rules.contingency_spread as f64,
                Some(month),
            )],
            alternatives: templated(&[
                "Negotiate call-off options on spot tonnage for the exposure window",
                "Monitor leading indicators and re-run the forecast monthly",
                "Accept the exposure and rely on spot market availability",
            ]),
            confidence: scenario.month(month).map_or(0.0, |m| m.confidence),
            status: RecommendationStatus::Pending,
        })
    }
}

/// Maximal runs of consecutive months with `gap < threshold` lasting at least
/// `min_len` months.
pub(crate) fn surplus_runs(months: &[MonthlyGap], threshold: i64, min_len: usize) -> Vec<&[MonthlyGap]> {
    let mut runs = Vec::new();
    let mut start = None;
    for (i, m) in months.iter().enumerate() {
        match (m.gap < threshold, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                if i - s >= min_len {
                    runs.push(&months[s..i]);
                }
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        if months.len() - s >= min_len {
            runs.push(&months[s..]);
        }
    }
    runs
}

/// Change in average baseline utilization if the fleet moves by `delta` vessels.
fn utilization_shift(gaps: &GapAnalysis, delta: i64) -> f64 {
    if gaps.months.is_empty() {
        return 0.0;
    }
    let fleet = (i64::from(gaps.baseline_vessels) + delta).max(0) as f64;
    let after = gaps
        .months
        .iter()
        .map(|m| baseline_utilization(m.demand, fleet, gaps.average_vessel_capability))
        .sum::<f64>()
        / gaps.months.len() as f64;
    after - gaps.average_utilization
}

fn mean_confidence(result: &ScenarioResult, months: &[MonthKey]) -> f64 {
    let values: Vec<f64> = months
        .iter()
        .filter_map(|m| result.month(*m).map(|sm| sm.confidence))
        .collect();
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn extreme_month(months: &[MonthlyGap], better: impl Fn(f64, f64) -> bool) -> Option<MonthKey> {
    let mut best: Option<&MonthlyGap> = None;
    for m in months {
        if best.is_none_or(|b| better(m.utilization, b.utilization)) {
            best = Some(m);
        }
    }
    best.map(|m| m.month)
}

fn trigger(metric: &str, value: f64, threshold: f64, month: Option<MonthKey>) -> TriggerCondition {
    TriggerCondition {
        metric: metric.to_string(),
        value,
        threshold,
        month,
    }
}

fn templated(options: &[&str]) -> Vec<String> {
    options.iter().map(|s| (*s).to_string()).collect()
}

fn fmt_month(month: Option<MonthKey>) -> String {
    month.map_or_else(|| "n/a".to_string(), |m| m.to_string())
}
