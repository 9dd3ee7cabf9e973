//! Flat tabular projection of scenario results for reporting

use crate::types::{ExportRow, GapAnalysis, ScenarioResult};

/// One row per scenario-month, scenario order then month order.
///
/// `gaps` is matched to `scenarios` by scenario id; a scenario without an
/// analysis exports a zero baseline.
pub fn export_rows(scenarios: &[ScenarioResult], gaps: &[GapAnalysis]) -> Vec<ExportRow> {
    let mut rows = Vec::with_capacity(scenarios.iter().map(|s| s.months.len()).sum());
    for scenario in scenarios {
        let analysis = gaps.iter().find(|g| g.scenario_id == scenario.scenario_id);
        let baseline_vessels = analysis.map_or(0, |g| g.baseline_vessels);

        for m in &scenario.months {
            rows.push(ExportRow {
                scenario_id: scenario.scenario_id.clone(),
                month: m.month,
                total_demand: m.total_demand,
                drilling_demand: m.drilling_demand,
                production_demand: m.production_demand,
                capability: m.capability,
                required_vessels: m.required_vessels,
                baseline_vessels,
                baseline_gap: analysis
                    .and_then(|g| g.gap_for(m.month))
                    .unwrap_or_else(|| i64::from(m.required_vessels) - i64::from(baseline_vessels)),
                utilization: m.utilization,
                confidence: m.confidence,
                inject_demand_delta: m.inject_impact.demand_delta,
                inject_capability_delta: m.inject_impact.capability_delta,
            });
        }
    }
    rows
}
