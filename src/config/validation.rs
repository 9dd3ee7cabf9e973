//! Config validation: unknown-key detection with Levenshtein suggestions
//! and value range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with strict serde
//! deserialization, which rejects the unknown key with a precise location.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, ", did you mean '{s}'?")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for ForecastConfig.
///
/// Maintained manually to match the struct hierarchy in forecast_config.rs.
/// Keys inside `[[scenarios]]` entries are checked by serde instead.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [forecast]
        "forecast",
        "forecast.confidence_floor",
        "forecast.distance_decay_floor",
        "forecast.trend_slope_threshold",
        "forecast.default_horizon_months",
        // [seasonal]
        "seasonal",
        "seasonal.q1",
        "seasonal.q2",
        "seasonal.q3",
        "seasonal.q4",
        // [capability]
        "capability",
        "capability.maintenance_interval_months",
        "capability.maintenance_derate",
        "capability.optimal_utilization",
        // [gap]
        "gap",
        "gap.high_risk_gap",
        "gap.low_utilization",
        // [recommendations]
        "recommendations",
        "recommendations.critical_gap",
        "recommendations.release_gap",
        "recommendations.release_min_consecutive_months",
        "recommendations.over_utilization",
        "recommendations.under_utilization",
        "recommendations.contingency_spread",
        // [budget]
        "budget",
        "budget.max_scenarios",
        "budget.max_horizon_months",
        "budget.max_cells",
        // [run]
        "run",
        "run.base_scenario",
        "run.parallel_scenarios",
        // [baseline]
        "baseline",
        "baseline.vessel_count",
        "baseline.utilization_band",
        "baseline.utilization_band.min",
        "baseline.utilization_band.max",
        "baseline.day_rates",
        "baseline.day_rates.core",
        "baseline.day_rates.spot",
        // [[scenarios]]
        "scenarios",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
///
/// Ties resolve to the lexicographically smallest key so suggestions are stable.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (levenshtein(unknown, k), k))
        .filter(|(dist, _)| *dist <= 3)
        .min()
        .map(|(_, k)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    let found = walk_toml_keys(&value, "");
    let mut warnings = Vec::new();

    for key in &found {
        if !known.contains(key.as_str()) {
            let suggestion = suggest_correction(key, &known);
            let message = format!("Unknown config key '{key}'");
            warnings.push(ValidationWarning {
                field: key.clone(),
                message,
                suggestion,
            });
        }
    }

    warnings
}

// ============================================================================
// Value Range Validation
// ============================================================================

/// Validate value ranges on a parsed ForecastConfig.
///
/// Returns (errors, warnings). Errors are impossible values that must
/// prevent a run; warnings are suspicious but not fatal.
pub fn validate_value_ranges(
    config: &super::ForecastConfig,
) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // Seasonal multipliers scale demand, so they must be positive
    let s = &config.seasonal;
    for (name, value) in [("q1", s.q1), ("q2", s.q2), ("q3", s.q3), ("q4", s.q4)] {
        if value <= 0.0 {
            errors.push(format!("seasonal.{name} = {value:.2} must be > 0"));
        } else if value > 2.0 {
            warnings.push(ValidationWarning {
                field: format!("seasonal.{name}"),
                message: format!(
                    "seasonal.{name} = {value:.2} doubles demand or more, check the multiplier"
                ),
                suggestion: None,
            });
        }
    }

    let band = &config.baseline.utilization_band;
    if band.min < 0.0 || band.max <= 0.0 || band.min > band.max {
        errors.push(format!(
            "baseline.utilization_band [{:.2}, {:.2}] must satisfy 0 <= min <= max, max > 0",
            band.min, band.max
        ));
    }

    let rates = &config.baseline.day_rates;
    if rates.core < 0.0 || rates.spot < 0.0 {
        errors.push(format!(
            "baseline.day_rates must be >= 0 (core = {:.0}, spot = {:.0})",
            rates.core, rates.spot
        ));
    } else if rates.spot < rates.core {
        warnings.push(ValidationWarning {
            field: "baseline.day_rates.spot".to_string(),
            message: format!(
                "baseline.day_rates.spot ({:.0}) is below the core rate ({:.0})",
                rates.spot, rates.core
            ),
            suggestion: None,
        });
    }

    if config.baseline.vessel_count == 0 {
        warnings.push(ValidationWarning {
            field: "baseline.vessel_count".to_string(),
            message: "baseline.vessel_count is 0, every utilization will report 0".to_string(),
            suggestion: None,
        });
    }

    for scenario in &config.scenarios {
        if scenario.horizon_months == 0 || scenario.horizon_months > config.budget.max_horizon_months {
            errors.push(format!(
                "scenarios.{}.horizon_months ({}) must be in 1..={}",
                scenario.id, scenario.horizon_months, config.budget.max_horizon_months
            ));
        }
        if !(0.0..=1.0).contains(&scenario.confidence_threshold) {
            errors.push(format!(
                "scenarios.{}.confidence_threshold ({:.2}) must be within [0, 1]",
                scenario.id, scenario.confidence_threshold
            ));
        }
        // Growth compounds linearly per month; below -1 demand flips sign in month 1
        if scenario.demand_growth_rate <= -1.0 || scenario.capability_growth_rate <= -1.0 {
            errors.push(format!(
                "scenarios.{}: growth rates must be > -1.0",
                scenario.id
            ));
        }
    }

    let mut seen = HashSet::new();
    for scenario in &config.scenarios {
        if !seen.insert(scenario.id.as_str()) {
            errors.push(format!("scenarios: id '{}' is defined twice", scenario.id));
        }
    }
    if !config.scenarios.is_empty() && !seen.contains(config.run.base_scenario.as_str()) {
        errors.push(format!(
            "run.base_scenario '{}' does not match any configured scenario",
            config.run.base_scenario
        ));
    }

    (errors, warnings)
}
