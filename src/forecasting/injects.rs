//! Applies time-bounded, probability-weighted injects to a monthly forecast

use std::collections::BTreeMap;
use tracing::debug;

use crate::types::{Inject, InjectImpact, InjectKind, MonthKey};

/// Adjusted series plus the per-month ledger of what the injects did.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InjectApplication {
    pub adjusted: BTreeMap<MonthKey, f64>,
    /// Only months touched by at least one applicable inject appear here
    pub impact_by_month: BTreeMap<MonthKey, InjectImpact>,
}

/// Stateless inject accumulator.
///
/// All contributions to a month are netted before touching the series, and
/// the net is computed over a canonical ordering, so the result does not
/// depend on the order injects are supplied in.
pub struct InjectEngine;

impl InjectEngine {
    /// Apply demand injects with magnitudes in the same units as `base`.
    pub fn apply(base: &BTreeMap<MonthKey, f64>, injects: &[Inject]) -> InjectApplication {
        Self::apply_scaled(base, injects, 1.0)
    }

    /// Apply demand injects, converting each vessel-count magnitude into series
    /// units with `units_per_vessel`.
    ///
    /// `demand_increase` adds and `demand_decrease` subtracts
    /// `magnitude × probability × units_per_vessel`; the adjusted value is
    /// floored at 0. Capability reductions are ignored here.
    pub fn apply_scaled(
        base: &BTreeMap<MonthKey, f64>,
        injects: &[Inject],
        units_per_vessel: f64,
    ) -> InjectApplication {
        let net = Self::accumulate(base, injects, units_per_vessel, |kind| match kind {
            InjectKind::DemandIncrease => Some(1.0),
            InjectKind::DemandDecrease => Some(-1.0),
            InjectKind::CapabilityReduction => None,
        });

        let mut application = InjectApplication {
            adjusted: base.clone(),
            impact_by_month: BTreeMap::new(),
        };
        for (month, (delta, ids)) in net {
            if let Some(value) = application.adjusted.get_mut(&month) {
                *value = (*value + delta).max(0.0);
            }
            application.impact_by_month.insert(
                month,
                InjectImpact {
                    demand_delta: delta,
                    capability_delta: 0.0,
                    inject_ids: ids,
                },
            );
        }
        application
    }

    /// Remove capability for every applicable `capability_reduction` inject.
    ///
    /// Each inject takes `magnitude × probability` vessels out of service, worth
    /// `units_per_vessel` deliveries each. Capability is floored at 0 and the
    /// ledger records the removal as a negative `capability_delta`.
    pub fn reduce_capability(
        base: &BTreeMap<MonthKey, f64>,
        injects: &[Inject],
        units_per_vessel: f64,
    ) -> InjectApplication {
        let net = Self::accumulate(base, injects, units_per_vessel, |kind| match kind {
            InjectKind::CapabilityReduction => Some(-1.0),
            InjectKind::DemandIncrease | InjectKind::DemandDecrease => None,
        });

        let mut application = InjectApplication {
            adjusted: base.clone(),
            impact_by_month: BTreeMap::new(),
        };
        for (month, (delta, ids)) in net {
            if let Some(value) = application.adjusted.get_mut(&month) {
                *value = (*value + delta).max(0.0);
            }
            application.impact_by_month.insert(
                month,
                InjectImpact {
                    demand_delta: 0.0,
                    capability_delta: delta,
                    inject_ids: ids,
                },
            );
        }
        application
    }

    /// Whether an inject can be applied at all: active, with an ordered window,
    /// a probability in [0, 1] and a finite non-negative magnitude.
    pub fn is_applicable(inject: &Inject) -> bool {
        inject.active
            && inject.start <= inject.end
            && inject.probability.is_finite()
            && (0.0..=1.0).contains(&inject.probability)
            && inject.magnitude.is_finite()
            && inject.magnitude >= 0.0
    }

    /// Net signed delta and contributing ids per covered month.
    fn accumulate(
        base: &BTreeMap<MonthKey, f64>,
        injects: &[Inject],
        units_per_vessel: f64,
        sign: impl Fn(InjectKind) -> Option<f64>,
    ) -> BTreeMap<MonthKey, (f64, Vec<String>)> {
        let scale = if units_per_vessel.is_finite() { units_per_vessel } else { 0.0 };
        let mut contributions: BTreeMap<MonthKey, Vec<(&str, f64)>> = BTreeMap::new();

        for inject in injects {
            let Some(direction) = sign(inject.kind) else {
                continue;
            };
            if !Self::is_applicable(inject) {
                debug!(inject = %inject.id, "Inject skipped");
                continue;
            }
            let amount = direction * inject.weighted_magnitude() * scale;
            for month in base.keys().filter(|m| inject.covers(**m)) {
                contributions
                    .entry(*month)
                    .or_default()
                    .push((inject.id.as_str(), amount));
            }
        }

        contributions
            .into_iter()
            .map(|(month, mut entries)| {
                entries.sort_by(|a, b| a.0.cmp(b.0).then(a.1.total_cmp(&b.1)));
                let delta = entries.iter().map(|(_, v)| v).sum::<f64>();
                let mut ids: Vec<String> = entries.iter().map(|(id, _)| (*id).to_string()).collect();
                ids.dedup();
                (month, (delta, ids))
            })
            .collect()
    }
}
