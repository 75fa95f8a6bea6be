//! Counterfactual search: ranking, clamps, idempotence, lever arithmetic.

mod common;

use agririsk_core::explain::counterfactual::{self, MAX_SCENARIOS};
use agririsk_core::features::FeatureVector;

fn percent(s: &str) -> f64 {
    s.trim_end_matches('%').parse().unwrap()
}

#[test]
fn keeps_at_most_five_scenarios_ranked_by_impact() {
    let bundle = common::full_bundle();
    let predictor = common::predictor();
    let features = common::sample_features();
    let original = predictor.predict(&bundle, &features).unwrap();

    let scenarios = counterfactual::generate(&predictor, &bundle, &features, &original);

    // All five levers are eligible here, so the candidate pool overflows the cap.
    assert_eq!(scenarios.len(), MAX_SCENARIOS);
    for pair in scenarios.windows(2) {
        assert!(pair[0].probability_change.abs() >= pair[1].probability_change.abs());
    }
}

#[test]
fn generation_is_idempotent() {
    let bundle = common::full_bundle();
    let predictor = common::predictor();
    let features = common::sample_features();
    let original = predictor.predict(&bundle, &features).unwrap();

    let first = counterfactual::generate(&predictor, &bundle, &features, &original);
    let second = counterfactual::generate(&predictor, &bundle, &features, &original);
    assert_eq!(first, second);
}

#[test]
fn no_eligible_lever_yields_no_scenarios() {
    let bundle = common::full_bundle();
    let predictor = common::predictor();
    let features = common::healthy_features();
    let original = predictor.predict(&bundle, &features).unwrap();

    let scenarios = counterfactual::generate(&predictor, &bundle, &features, &original);
    assert!(scenarios.is_empty());
}

#[test]
fn ndvi_candidates_never_exceed_ceiling() {
    let bundle = common::full_bundle();
    let predictor = common::predictor();
    let mut features = common::sample_features();
    features.ndvi_mean = 0.80;
    let original = predictor.predict(&bundle, &features).unwrap();

    let scenarios = counterfactual::generate(&predictor, &bundle, &features, &original);
    for s in scenarios.iter().filter(|s| s.feature == "NDVI Mean") {
        let new_value: f64 = s.new_value.parse().unwrap();
        assert!(new_value <= 0.85 + 1e-9, "ndvi candidate {} above clamp", s.new_value);
    }
}

#[test]
fn soil_moisture_candidates_never_exceed_ceiling() {
    let bundle = common::full_bundle();
    let predictor = common::predictor();
    let mut features = common::healthy_features();
    features.soil_moisture_index = 0.84;
    let original = predictor.predict(&bundle, &features).unwrap();

    let scenarios = counterfactual::generate(&predictor, &bundle, &features, &original);
    let moisture: Vec<_> = scenarios
        .iter()
        .filter(|s| s.feature == "Soil Moisture Index")
        .collect();
    assert!(!moisture.is_empty());
    for s in moisture {
        assert!(percent(&s.new_value) <= 95.0 + 1e-9);
    }
}

#[test]
fn ndvi_deltas_apply_verbatim_below_the_clamp() {
    let bundle = common::full_bundle();
    let predictor = common::predictor();
    // Only the vegetation lever is eligible here.
    let features = FeatureVector {
        ndvi_mean: 0.40,
        ..common::healthy_features()
    };
    let original = predictor.predict(&bundle, &features).unwrap();

    let scenarios = counterfactual::generate(&predictor, &bundle, &features, &original);
    assert_eq!(scenarios.len(), 3);
    let mut new_values: Vec<String> = scenarios.iter().map(|s| s.new_value.clone()).collect();
    new_values.sort();
    assert_eq!(new_values, vec!["0.450", "0.500", "0.550"]);
    for s in &scenarios {
        assert_eq!(s.current_value, "0.400");
    }
}

#[test]
fn pest_reductions_scale_the_current_value() {
    let bundle = common::full_bundle();
    let predictor = common::predictor();
    // Only the pest lever is eligible here.
    let features = FeatureVector {
        pest_frequency: 0.60,
        ..common::healthy_features()
    };
    let original = predictor.predict(&bundle, &features).unwrap();

    let scenarios = counterfactual::generate(&predictor, &bundle, &features, &original);
    assert_eq!(scenarios.len(), 3);
    let mut new_values: Vec<f64> = scenarios.iter().map(|s| percent(&s.new_value)).collect();
    new_values.sort_by(f64::total_cmp);
    assert_eq!(new_values, vec![15.0, 30.0, 45.0]);
}

#[test]
fn rescore_failures_drop_candidates_silently() {
    let full = common::full_bundle();
    let predictor = common::predictor();
    let features = common::sample_features();
    let original = predictor.predict(&full, &features).unwrap();

    // Every re-score hits the zero-base-models state and fails.
    let crippled = common::bundle_meta_only();
    let scenarios = counterfactual::generate(&predictor, &crippled, &features, &original);
    assert!(scenarios.is_empty());
}

#[test]
fn probability_change_is_relative_to_the_original() {
    let bundle = common::full_bundle();
    let predictor = common::predictor();
    let features = common::sample_features();
    let original = predictor.predict(&bundle, &features).unwrap();

    let scenarios = counterfactual::generate(&predictor, &bundle, &features, &original);
    for s in &scenarios {
        let expected = s.new_probability - original.ensemble_probability;
        assert!((s.probability_change - expected).abs() < 1e-12);
        assert!((0.0..=1.0).contains(&s.new_probability));
    }
}
