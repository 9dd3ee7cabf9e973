//! Baseline-relative fleet gaps

use crate::config::ForecastConfig;
use crate::types::{CoreFleetBaseline, GapAnalysis, MonthlyGap, ScenarioResult};

/// Measures a scenario's vessel requirement against the contracted core fleet.
///
/// The gap here is `required − baseline` and is the one recommendations act
/// on; the capability-relative gap on `ScenarioMonth` is informational.
#[derive(Debug, Clone)]
pub struct GapAnalyzer {
    baseline: CoreFleetBaseline,
    high_risk_gap: i64,
    low_utilization: f64,
}

impl GapAnalyzer {
    pub fn new(config: &ForecastConfig, baseline: CoreFleetBaseline) -> Self {
        Self {
            baseline,
            high_risk_gap: config.gap.high_risk_gap,
            low_utilization: config.gap.low_utilization,
        }
    }

    pub fn analyze(&self, result: &ScenarioResult) -> GapAnalysis {
        let fleet = self.baseline.vessel_count;
        let avg_cap = result.average_vessel_capability;

        let months: Vec<MonthlyGap> = result
            .months
            .iter()
            .map(|m| MonthlyGap {
                month: m.month,
                demand: m.total_demand,
                required_vessels: m.required_vessels,
                gap: i64::from(m.required_vessels) - i64::from(fleet),
                utilization: baseline_utilization(m.total_demand, f64::from(fleet), avg_cap),
            })
            .collect();

        let average_utilization = if months.is_empty() {
            0.0
        } else {
            months.iter().map(|m| m.utilization).sum::<f64>() / months.len() as f64
        };

        let mut peak: Option<&MonthlyGap> = None;
        for m in &months {
            if peak.is_none_or(|p| m.gap > p.gap) {
                peak = Some(m);
            }
        }

        // Placeholder utilizations and zero requirements flag nothing
        let measurable = fleet > 0 && avg_cap > 0.0 && avg_cap.is_finite();
        let band = self.baseline.utilization_band;
        let select = |pred: &dyn Fn(&MonthlyGap) -> bool| {
            months.iter().filter(|m| pred(m)).map(|m| m.month).collect::<Vec<_>>()
        };
        let select_measured = |pred: &dyn Fn(&MonthlyGap) -> bool| {
            if measurable {
                select(pred)
            } else {
                Vec::new()
            }
        };

        GapAnalysis {
            scenario_id: result.scenario_id.clone(),
            baseline_vessels: fleet,
            average_vessel_capability: avg_cap,
            average_utilization,
            peak_gap: peak.map_or(0, |m| m.gap),
            peak_gap_month: peak.map(|m| m.month),
            high_risk_months: select(&|m| m.gap > self.high_risk_gap),
            low_utilization_months: select_measured(&|m| m.utilization < self.low_utilization),
            months_below_band: select_measured(&|m| m.utilization < band.min),
            months_above_band: select_measured(&|m| m.utilization > band.max),
            vessel_months_short: months.iter().map(|m| m.gap.max(0)).sum(),
            vessel_months_surplus: if measurable {
                months.iter().map(|m| (-m.gap).max(0)).sum()
            } else {
                0
            },
            months,
        }
    }
}

/// Demand over the capacity of `fleet` average vessels, 0 when there is no capacity.
pub(crate) fn baseline_utilization(demand: f64, fleet: f64, average_capability: f64) -> f64 {
    let capacity = fleet * average_capability;
    if capacity > 0.0 && capacity.is_finite() {
        demand / capacity
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InjectImpact, MonthKey, ScenarioMonth};

    fn key(s: &str) -> MonthKey {
        s.parse().unwrap()
    }

    fn result(required: &[u32], avg_cap: f64) -> ScenarioResult {
        let months = key("2025-01")
            .range(required.len())
            .into_iter()
            .zip(required)
            .map(|(month, r)| ScenarioMonth {
                month,
                total_demand: f64::from(*r) * avg_cap,
                drilling_demand: f64::from(*r) * avg_cap,
                production_demand: 0.0,
                capability: 0.0,
                maintenance_derate: 0.0,
                required_vessels: *r,
                implied_vessels: 0,
                gap: i64::from(*r),
                utilization: 0.0,
                confidence: 0.7,
                inject_impact: InjectImpact::default(),
            })
            .collect();
        ScenarioResult {
            scenario_id: "base_case".into(),
            scenario_name: "Base Case".into(),
            horizon_months: required.len() as u32,
            average_vessel_capability: avg_cap,
            months,
            average_utilization: 0.0,
            peak_demand_month: None,
            peak_demand: 0.0,
            max_gap: 0,
            recommended_fleet_size: 0,
            confidence_score: 0.7,
            meets_confidence_threshold: true,
        }
    }

    fn analyzer() -> GapAnalyzer {
        let config = ForecastConfig::default();
        GapAnalyzer::new(&config, config.baseline)
    }

    #[test]
    fn gap_against_baseline_of_six() {
        let g = analyzer().analyze(&result(&[8, 6, 2, 9], 20.0));
        let gaps: Vec<i64> = g.months.iter().map(|m| m.gap).collect();
        assert_eq!(gaps, vec![2, 0, -4, 3]);
        assert_eq!(g.peak_gap, 3);
        assert_eq!(g.peak_gap_month, Some(key("2025-04")));
        assert_eq!(g.high_risk_months, vec![key("2025-04")]);
        assert_eq!(g.low_utilization_months, vec![key("2025-03")]);
        assert_eq!(g.vessel_months_short, 5);
        assert_eq!(g.vessel_months_surplus, 4);
        assert!((g.months[0].utilization - 8.0 / 6.0).abs() < 1e-12);
        assert_eq!(g.months_above_band, vec![key("2025-01"), key("2025-02"), key("2025-04")]);
        assert_eq!(g.months_below_band, vec![key("2025-03")]);
    }

    #[test]
    fn zero_capability_is_neutral() {
        let g = analyzer().analyze(&result(&[0, 0], 0.0));
        assert!(g.months.iter().all(|m| m.utilization == 0.0 && m.utilization.is_finite()));
        assert_eq!(g.average_utilization, 0.0);
        assert!(!g.has_capacity());
        // −6 gaps are not a measured surplus
        assert_eq!(g.months[0].gap, -6);
        assert!(g.low_utilization_months.is_empty());
        assert!(g.months_below_band.is_empty());
        assert_eq!(g.vessel_months_surplus, 0);
    }

    #[test]
    fn zero_fleet_baseline_does_not_divide_by_zero() {
        let config = ForecastConfig::default();
        let mut baseline = config.baseline;
        baseline.vessel_count = 0;
        let g = GapAnalyzer::new(&config, baseline).analyze(&result(&[3], 20.0));
        assert_eq!(g.months[0].gap, 3);
        assert_eq!(g.months[0].utilization, 0.0);
        assert_eq!(g.vessel_months_short, 3);
        assert!(g.low_utilization_months.is_empty());
        assert!(g.months_below_band.is_empty());
    }
}
