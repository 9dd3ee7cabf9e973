//! Engine Integration Tests
//!
//! Full runs through `FleetForecastEngine` with hand-built histories whose
//! forecasts are exact: flat series fit with slope 0 and a full year of
//! flat history gives neutral seasonal factors.

use fleet_forecast::config::ForecastConfig;
use fleet_forecast::types::{
    DemandCategory, ForecastScenario, Inject, InjectKind, MonthKey, WarningCode, BASE_CASE,
};
use fleet_forecast::{
    FleetForecastEngine, ForecastError, ForecastRequest, LocationDemandSeries, VesselCapabilitySeries,
};

// ============================================================================
// Fixtures
// ============================================================================

fn key(s: &str) -> MonthKey {
    s.parse().unwrap()
}

fn flat_location(id: &str, category: DemandCategory, value: f64) -> LocationDemandSeries {
    LocationDemandSeries::from_values(id, category, key("2024-01"), &[value; 12])
}

fn flat_vessel(id: &str, value: f64) -> VesselCapabilitySeries {
    VesselCapabilitySeries::from_values(id, key("2024-01"), &[value; 12])
}

fn base_scenario(horizon: u32) -> ForecastScenario {
    ForecastScenario {
        id: BASE_CASE.to_string(),
        name: "Base Case".to_string(),
        demand_growth_rate: 0.0,
        capability_growth_rate: 0.0,
        active_injects: Vec::new(),
        horizon_months: horizon,
        confidence_threshold: 0.5,
    }
}

/// 160 deliveries/month against six 20-delivery vessels: 8 vessels needed.
fn eight_vessel_request() -> ForecastRequest {
    ForecastRequest {
        start_month: None,
        locations: vec![
            flat_location("GC-640", DemandCategory::Drilling, 100.0),
            flat_location("MC-252", DemandCategory::Production, 60.0),
        ],
        vessels: (1..=6).map(|n| flat_vessel(&format!("PSV-{n:02}"), 20.0)).collect(),
        injects: Vec::new(),
        scenarios: Some(vec![base_scenario(12)]),
        baseline: None,
        base_scenario: None,
    }
}

fn engine() -> FleetForecastEngine {
    FleetForecastEngine::new(ForecastConfig::default())
}

// ============================================================================
// Scenario Composition
// ============================================================================

#[test]
fn flat_history_gives_exact_requirement() {
    let result = engine().run(&eight_vessel_request()).unwrap();
    assert_eq!(result.generated_for, key("2025-01"));

    let base = result.base_scenario().unwrap();
    assert_eq!(base.months.len(), 12);
    assert_eq!(base.average_vessel_capability, 20.0);
    for m in &base.months {
        assert!((m.total_demand - 160.0).abs() < 1e-9);
        assert!((m.drilling_demand - 100.0).abs() < 1e-9);
        assert!((m.production_demand - 60.0).abs() < 1e-9);
        assert_eq!(m.required_vessels, 8);
    }
    assert_eq!(base.recommended_fleet_size, 8);
}

#[test]
fn maintenance_months_are_derated() {
    let result = engine().run(&eight_vessel_request()).unwrap();
    let base = result.base_scenario().unwrap();

    let june = base.month(key("2025-06")).unwrap();
    assert!((june.capability - 96.0).abs() < 1e-9);
    assert!((june.maintenance_derate - 24.0).abs() < 1e-9);

    let may = base.month(key("2025-05")).unwrap();
    assert!((may.capability - 120.0).abs() < 1e-9);
    assert_eq!(may.maintenance_derate, 0.0);
}

#[test]
fn required_vessels_is_ceiling_of_demand_over_capability() {
    let mut request = eight_vessel_request();
    request.scenarios = None;
    request.locations.push(flat_location("GB-10", DemandCategory::Drilling, 37.0));
    request.injects = vec![Inject::new(
        "campaign",
        InjectKind::DemandIncrease,
        key("2025-03"),
        key("2025-07"),
        1.5,
        0.7,
    )];

    let result = engine().run(&request).unwrap();
    for scenario in &result.scenarios {
        let avg = scenario.average_vessel_capability;
        assert!(avg > 0.0);
        for m in &scenario.months {
            assert_eq!(m.required_vessels, (m.total_demand / avg).ceil() as u32);
        }
    }
}

#[test]
fn no_vessels_means_zero_requirement() {
    let mut request = eight_vessel_request();
    request.vessels.clear();
    let result = engine().run(&request).unwrap();
    let base = result.base_scenario().unwrap();
    assert_eq!(base.average_vessel_capability, 0.0);
    assert!(base.months.iter().all(|m| m.required_vessels == 0));
    assert!(base.months.iter().all(|m| m.utilization == 0.0));
}

#[test]
fn no_vessel_data_is_flagged_not_released() {
    let mut request = eight_vessel_request();
    request.locations = vec![flat_location("GC-640", DemandCategory::Drilling, 100.0)];
    request.vessels.clear();
    let result = engine().run(&request).unwrap();

    // Requirement is unmeasured: no release of the core fleet
    assert!(
        result.recommendations.is_empty(),
        "{:?}",
        result.recommendations
    );
    assert!(result.low_utilization_months.is_empty());
    let gaps = result.gap_analysis(BASE_CASE).unwrap();
    assert!(gaps.months_below_band.is_empty());
    assert_eq!(gaps.vessel_months_surplus, 0);

    // Confidence falls to floor × decay instead of the 0.8 the demand fit earns
    let base = result.base_scenario().unwrap();
    assert!((base.months[0].confidence - 0.3).abs() < 1e-9);
    assert!((base.months[11].confidence - 0.3 * 0.6).abs() < 1e-9);
    assert!((base.confidence_score - 0.3 * 0.8).abs() < 1e-9);
    assert!(!base.meets_confidence_threshold);

    let warning = result
        .warnings
        .iter()
        .find(|w| w.code == WarningCode::NoFleetCapability)
        .unwrap();
    assert_eq!(warning.subject, "vessels");
}

#[test]
fn idle_vessels_are_flagged_as_no_capability() {
    let mut request = eight_vessel_request();
    request.vessels = vec![flat_vessel("PSV-01", 0.0), flat_vessel("PSV-02", 0.0)];
    let result = engine().run(&request).unwrap();
    assert!(result
        .warnings
        .iter()
        .any(|w| w.code == WarningCode::NoFleetCapability));
    assert!(result
        .recommendations
        .iter()
        .all(|r| r.impact.vessel_impact >= 0));
}

#[test]
fn inject_adds_probability_weighted_vessels() {
    let mut request = eight_vessel_request();
    request.injects = vec![Inject::new(
        "rig-campaign",
        InjectKind::DemandIncrease,
        key("2025-04"),
        key("2025-04"),
        4.0,
        0.5,
    )];
    request.scenarios = Some(vec![ForecastScenario {
        active_injects: vec!["rig-campaign".to_string()],
        ..base_scenario(12)
    }]);

    let result = engine().run(&request).unwrap();
    let base = result.base_scenario().unwrap();
    let april = base.month(key("2025-04")).unwrap();
    // Two vessels' worth of deliveries at 20 each
    assert!((april.inject_impact.demand_delta - 40.0).abs() < 1e-9);
    assert!((april.total_demand - 200.0).abs() < 1e-9);
    assert_eq!(april.required_vessels, 10);
    assert_eq!(april.inject_impact.inject_ids, vec!["rig-campaign"]);

    let march = base.month(key("2025-03")).unwrap();
    assert!(march.inject_impact.is_empty());
    assert_eq!(march.required_vessels, 8);
}

#[test]
fn capability_reduction_removes_a_vessel() {
    let mut request = eight_vessel_request();
    request.injects = vec![Inject::new(
        "dry-dock",
        InjectKind::CapabilityReduction,
        key("2025-02"),
        key("2025-02"),
        1.0,
        1.0,
    )];
    request.scenarios = Some(vec![ForecastScenario {
        active_injects: vec!["dry-dock".to_string()],
        ..base_scenario(12)
    }]);

    let result = engine().run(&request).unwrap();
    let feb = result.base_scenario().unwrap().month(key("2025-02")).unwrap();
    assert!((feb.capability - 100.0).abs() < 1e-9);
    assert!((feb.inject_impact.capability_delta + 20.0).abs() < 1e-9);
    assert_eq!(feb.implied_vessels, 5);
    // Demand side untouched
    assert_eq!(feb.required_vessels, 8);
}

#[test]
fn empty_location_history_still_forecasts() {
    let mut request = eight_vessel_request();
    request
        .locations
        .push(LocationDemandSeries::new("NEW-FIELD", DemandCategory::Drilling));

    let result = engine().run(&request).unwrap();
    let empty = result
        .location_forecasts
        .iter()
        .find(|f| f.location_id == "NEW-FIELD")
        .unwrap();
    assert_eq!(empty.historical_average, 0.0);
    assert_eq!(empty.monthly.len(), 12);
    assert!(result
        .warnings
        .iter()
        .any(|w| w.code == WarningCode::EmptySeries && w.subject == "NEW-FIELD"));
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn identical_runs_are_identical() {
    let mut request = eight_vessel_request();
    request.scenarios = None;
    request.injects = vec![Inject::new(
        "campaign",
        InjectKind::DemandIncrease,
        key("2025-02"),
        key("2025-05"),
        2.0,
        0.35,
    )];
    let engine = engine();
    let first = engine.run(&request).unwrap();
    let second = engine.run(&request).unwrap();
    assert_eq!(first, second);
}

#[test]
fn parallel_matches_sequential() {
    let mut request = eight_vessel_request();
    request.scenarios = None;
    request.locations.push(LocationDemandSeries::from_values(
        "RISING",
        DemandCategory::Drilling,
        key("2024-01"),
        &[10.0, 14.0, 13.0, 19.0, 22.0, 21.0, 27.0, 30.0, 29.0, 35.0, 37.0, 41.0],
    ));
    request.injects = vec![
        Inject::new("a", InjectKind::DemandIncrease, key("2025-02"), key("2025-05"), 2.0, 0.35),
        Inject::new("b", InjectKind::CapabilityReduction, key("2025-07"), key("2025-08"), 1.0, 0.8),
    ];

    let mut config = ForecastConfig::default();
    config.run.parallel_scenarios = true;
    let parallel = FleetForecastEngine::new(config.clone()).run(&request).unwrap();
    config.run.parallel_scenarios = false;
    let sequential = FleetForecastEngine::new(config).run(&request).unwrap();

    assert_eq!(parallel, sequential);
    let ids: Vec<_> = parallel.scenarios.iter().map(|s| s.scenario_id.as_str()).collect();
    assert_eq!(ids, vec!["base_case", "optimistic", "pessimistic"]);
}

// ============================================================================
// Invalid Requests
// ============================================================================

#[test]
fn explicit_empty_scenario_list_is_rejected() {
    let mut request = eight_vessel_request();
    request.scenarios = Some(Vec::new());
    assert_eq!(engine().run(&request).unwrap_err(), ForecastError::NoScenarios);
}

#[test]
fn zero_horizon_is_rejected() {
    let mut request = eight_vessel_request();
    request.scenarios = Some(vec![base_scenario(0)]);
    assert!(matches!(
        engine().run(&request),
        Err(ForecastError::InvalidHorizon { horizon: 0, .. })
    ));
}

#[test]
fn duplicate_scenario_is_rejected() {
    let mut request = eight_vessel_request();
    request.scenarios = Some(vec![base_scenario(12), base_scenario(6)]);
    assert_eq!(
        engine().run(&request).unwrap_err(),
        ForecastError::DuplicateScenario(BASE_CASE.to_string())
    );
}

#[test]
fn requested_base_scenario_must_exist() {
    let mut request = eight_vessel_request();
    request.base_scenario = Some("high_activity".to_string());
    assert_eq!(
        engine().run(&request).unwrap_err(),
        ForecastError::UnknownBaseScenario("high_activity".to_string())
    );
}

#[test]
fn horizon_beyond_budget_is_input_too_large() {
    let mut request = eight_vessel_request();
    request.scenarios = Some(vec![base_scenario(48)]);
    assert_eq!(
        engine().run(&request).unwrap_err(),
        ForecastError::InputTooLarge {
            requested: 48,
            limit: 36,
            unit: "horizon months",
        }
    );
}

#[test]
fn non_finite_growth_is_rejected() {
    let mut request = eight_vessel_request();
    request.scenarios = Some(vec![ForecastScenario {
        demand_growth_rate: f64::NAN,
        ..base_scenario(12)
    }]);
    assert!(matches!(
        engine().run(&request),
        Err(ForecastError::InvalidScenario { .. })
    ));
}

#[test]
fn inverted_baseline_band_is_rejected() {
    let mut request = eight_vessel_request();
    let mut baseline = ForecastConfig::default().baseline;
    baseline.utilization_band.min = 0.9;
    baseline.utilization_band.max = 0.5;
    request.baseline = Some(baseline);
    assert!(matches!(
        engine().run(&request),
        Err(ForecastError::InvalidBaseline(_))
    ));
}

#[test]
fn cell_budget_is_checked_before_running() {
    let mut config = ForecastConfig::default();
    config.budget.max_cells = 50;
    // 12 months × (2 locations + 6 vessels) = 96 cells
    let err = FleetForecastEngine::new(config)
        .run(&eight_vessel_request())
        .unwrap_err();
    assert_eq!(
        err,
        ForecastError::InputTooLarge {
            requested: 96,
            limit: 50,
            unit: "cells",
        }
    );
}

#[test]
fn scenario_budget_is_checked() {
    let mut config = ForecastConfig::default();
    config.budget.max_scenarios = 2;
    let mut request = eight_vessel_request();
    request.scenarios = None;
    assert!(matches!(
        FleetForecastEngine::new(config).run(&request),
        Err(ForecastError::InputTooLarge { unit: "scenarios", requested: 3, .. })
    ));
}

// ============================================================================
// Warnings
// ============================================================================

#[test]
fn unknown_inject_reference_is_reported_per_scenario() {
    let mut request = eight_vessel_request();
    request.scenarios = Some(vec![ForecastScenario {
        active_injects: vec!["ghost".to_string()],
        ..base_scenario(12)
    }]);
    let result = engine().run(&request).unwrap();
    let warning = result
        .warnings
        .iter()
        .find(|w| w.code == WarningCode::UnknownInjectReference)
        .unwrap();
    assert_eq!(warning.subject, BASE_CASE);
    assert!(warning.message.contains("ghost"));
}

#[test]
fn malformed_injects_are_skipped_and_reported() {
    let mut request = eight_vessel_request();
    request.injects = vec![
        Inject::new("backwards", InjectKind::DemandIncrease, key("2025-06"), key("2025-03"), 5.0, 1.0),
        Inject::new("overconfident", InjectKind::DemandIncrease, key("2025-03"), key("2025-06"), 5.0, 1.4),
    ];
    request.scenarios = Some(vec![ForecastScenario {
        active_injects: vec!["backwards".to_string(), "overconfident".to_string()],
        ..base_scenario(12)
    }]);

    let result = engine().run(&request).unwrap();
    let codes: Vec<_> = result.warnings.iter().map(|w| w.code).collect();
    assert!(codes.contains(&WarningCode::InvertedInjectWindow));
    assert!(codes.contains(&WarningCode::InvalidInjectWeight));
    // Skipped injects are not also reported as unknown references
    assert!(!codes.contains(&WarningCode::UnknownInjectReference));
    let base = result.base_scenario().unwrap();
    assert!(base.months.iter().all(|m| m.inject_impact.is_empty()));
}

#[test]
fn non_contiguous_history_is_reported() {
    let mut request = eight_vessel_request();
    let mut gappy = flat_location("GAPPY", DemandCategory::Production, 10.0);
    gappy.monthly.remove(&key("2024-06"));
    request.locations.push(gappy);

    let result = engine().run(&request).unwrap();
    let warning = result
        .warnings
        .iter()
        .find(|w| w.code == WarningCode::NonContiguousSeries)
        .unwrap();
    assert_eq!(warning.subject, "GAPPY");
    assert!(warning.message.contains("2024-05"));
}

#[test]
fn low_confidence_scenario_is_flagged() {
    let mut request = eight_vessel_request();
    request.scenarios = Some(vec![ForecastScenario {
        confidence_threshold: 1.0,
        ..base_scenario(12)
    }]);
    let result = engine().run(&request).unwrap();
    let base = result.base_scenario().unwrap();
    // Perfect fit, linear decay to 0.6 over 12 months: mean 0.8
    assert!((base.confidence_score - 0.8).abs() < 1e-9);
    assert!(!base.meets_confidence_threshold);
    assert!(result.warnings.iter().any(|w| w.code == WarningCode::LowConfidence));
}

// ============================================================================
// Arbitrary Scenario Sets
// ============================================================================

fn custom_scenario(id: &str, demand_growth: f64) -> ForecastScenario {
    ForecastScenario {
        id: id.to_string(),
        name: id.to_string(),
        demand_growth_rate: demand_growth,
        ..base_scenario(12)
    }
}

#[test]
fn custom_set_without_base_case_uses_first_scenario() {
    let mut request = eight_vessel_request();
    request.scenarios = Some(vec![custom_scenario("high", 0.05), custom_scenario("low", -0.02)]);
    let result = engine().run(&request).unwrap();

    assert_eq!(result.base_scenario_id, "high");
    assert_eq!(result.scenarios.len(), 2);
    assert!(result
        .recommendations
        .iter()
        .filter(|r| r.rec_type != fleet_forecast::types::RecommendationType::ScenarioContingency)
        .all(|r| r.scenario_id == "high"));
}

#[test]
fn request_can_pick_the_base_scenario() {
    let mut request = eight_vessel_request();
    request.scenarios = Some(vec![custom_scenario("high", 0.05), custom_scenario("low", -0.02)]);
    request.base_scenario = Some("low".to_string());
    let result = engine().run(&request).unwrap();

    assert_eq!(result.base_scenario_id, "low");
    assert_eq!(result.base_scenario().map(|s| s.scenario_id.as_str()), Some("low"));
    // "high" needs more vessels than "low" late in the year
    assert!(result
        .recommendations
        .iter()
        .any(|r| r.scenario_id == "high"
            && r.rec_type == fleet_forecast::types::RecommendationType::ScenarioContingency));
}

// ============================================================================
// Result Surface
// ============================================================================

#[test]
fn export_rows_follow_scenario_then_month_order() {
    let mut request = eight_vessel_request();
    request.scenarios = None;
    let result = engine().run(&request).unwrap();

    assert_eq!(result.export_data.len(), 36);
    assert_eq!(result.export_data[0].scenario_id, "base_case");
    assert_eq!(result.export_data[0].month, key("2025-01"));
    assert_eq!(result.export_data[12].scenario_id, "optimistic");
    assert_eq!(result.export_data[35].month, key("2025-12"));
    assert!(result.export_data.iter().all(|r| r.baseline_vessels == 6));
    assert_eq!(result.export_data[0].baseline_gap, 2);
}

#[test]
fn cross_scenario_ranges_bound_every_scenario() {
    let mut request = eight_vessel_request();
    request.scenarios = None;
    let result = engine().run(&request).unwrap();

    for range in &result.cross_scenario.months {
        for s in &result.scenarios {
            let m = s.month(range.month).unwrap();
            assert!(range.min_demand <= m.total_demand && m.total_demand <= range.max_demand);
            assert!(range.min_required_vessels <= m.required_vessels);
            assert!(m.required_vessels <= range.max_required_vessels);
        }
    }
    let pessimistic = result.scenario("pessimistic").unwrap();
    assert_eq!(result.cross_scenario.max_fleet_size, pessimistic.recommended_fleet_size);
}

#[test]
fn month_keys_serialize_as_map_keys() {
    let result = engine().run(&eight_vessel_request()).unwrap();
    let json = serde_json::to_value(&result.location_forecasts[0]).unwrap();
    assert!(json["monthly"].get("2025-01").is_some());
    assert!(json["seasonal_factors"].get("Q1").is_some());
    assert_eq!(json["trend"], "stable");
}

#[test]
fn request_parses_from_json() {
    let json = r#"{
        "start_month": "2025-01",
        "locations": [
            {"location_id": "GC-640", "category": "production",
             "monthly": {"2024-11": 30, "2024-12": 32}}
        ],
        "vessels": [
            {"vessel_id": "PSV-01", "monthly": {"2024-11": 20, "2024-12": 21}}
        ],
        "injects": [
            {"id": "campaign", "start": "2025-02", "end": "2025-03",
             "magnitude": 2, "kind": "demand_increase", "probability": 0.5}
        ]
    }"#;
    let request: ForecastRequest = serde_json::from_str(json).unwrap();
    assert_eq!(request.start_month, Some(key("2025-01")));
    assert_eq!(request.locations[0].category, DemandCategory::Production);
    assert!(request.scenarios.is_none());

    let result = engine().run(&request).unwrap();
    assert_eq!(result.generated_for, key("2025-01"));
    assert_eq!(result.scenarios.len(), 3);
    // Predefined base case activates every supplied inject
    let base = result.base_scenario().unwrap();
    assert!(!base.month(key("2025-02")).unwrap().inject_impact.is_empty());
}
