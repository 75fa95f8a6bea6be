//! Shared fixtures: in-memory bundles in every availability state the
//! predictor's combination strategy has to handle.

#![allow(dead_code)]

use std::collections::HashMap;

use agririsk_core::config::RiskConfig;
use agririsk_core::features::FeatureVector;
use agririsk_core::model::{
    FeatureImportance, LogisticModel, ModelBundle, ProbabilityModel, StandardScaler, TestMetrics,
};
use agririsk_core::risk::EnsemblePredictor;

pub fn rf_model() -> Box<dyn ProbabilityModel> {
    Box::new(LogisticModel {
        name: "rf".to_string(),
        coefficients: vec![-2.0, -0.5, 0.8, 0.04, 0.3, -1.5, 0.2, 2.5],
        intercept: 0.5,
    })
}

pub fn xgb_model() -> Box<dyn ProbabilityModel> {
    Box::new(LogisticModel {
        name: "xgb".to_string(),
        coefficients: vec![-1.8, -0.4, 0.6, 0.05, 0.25, -1.2, 0.1, 2.2],
        intercept: 0.4,
    })
}

/// Base model whose input dimension is wrong, so every invocation fails.
pub fn broken_model() -> Box<dyn ProbabilityModel> {
    Box::new(LogisticModel {
        name: "broken".to_string(),
        coefficients: vec![1.0, 1.0, 1.0],
        intercept: 0.0,
    })
}

pub fn meta_model() -> Box<dyn ProbabilityModel> {
    Box::new(LogisticModel {
        name: "meta".to_string(),
        coefficients: vec![1.5, 1.5],
        intercept: -1.5,
    })
}

pub fn importance() -> FeatureImportance {
    let rf: HashMap<String, f64> = [
        ("ndvi_mean", 0.30),
        ("ndvi_trend", 0.05),
        ("ndvi_variance", 0.04),
        ("rainfall_deviation", 0.20),
        ("temperature_anomaly", 0.08),
        ("soil_moisture_index", 0.12),
        ("soil_type_encoded", 0.03),
        ("pest_frequency", 0.18),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    let xgb: HashMap<String, f64> = [
        ("ndvi_mean", 0.28),
        ("ndvi_trend", 0.04),
        ("ndvi_variance", 0.04),
        ("rainfall_deviation", 0.22),
        ("temperature_anomaly", 0.09),
        ("soil_moisture_index", 0.14),
        ("soil_type_encoded", 0.03),
        ("pest_frequency", 0.16),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();
    FeatureImportance { rf, xgb }
}

pub fn metrics() -> TestMetrics {
    TestMetrics {
        accuracy: 0.91,
        precision: 0.88,
        recall: 0.86,
        f1: 0.87,
        roc_auc: 0.94,
    }
}

pub fn full_bundle() -> ModelBundle {
    ModelBundle::from_parts(
        Some(rf_model()),
        Some(xgb_model()),
        Some(meta_model()),
        Some(StandardScaler::identity(8)),
        Some(StandardScaler::identity(2)),
        Some(importance()),
        Some(metrics()),
    )
    .unwrap()
}

pub fn bundle_without_meta() -> ModelBundle {
    ModelBundle::from_parts(
        Some(rf_model()),
        Some(xgb_model()),
        None,
        Some(StandardScaler::identity(8)),
        Some(StandardScaler::identity(2)),
        Some(importance()),
        None,
    )
    .unwrap()
}

pub fn bundle_without_meta_scaler() -> ModelBundle {
    ModelBundle::from_parts(
        Some(rf_model()),
        Some(xgb_model()),
        Some(meta_model()),
        Some(StandardScaler::identity(8)),
        None,
        Some(importance()),
        None,
    )
    .unwrap()
}

pub fn bundle_rf_only() -> ModelBundle {
    ModelBundle::from_parts(
        Some(rf_model()),
        None,
        None,
        Some(StandardScaler::identity(8)),
        None,
        Some(importance()),
        None,
    )
    .unwrap()
}

/// Meta-learner loaded but zero base models: legal bundle, fatal per query.
pub fn bundle_meta_only() -> ModelBundle {
    ModelBundle::from_parts(
        None,
        None,
        Some(meta_model()),
        Some(StandardScaler::identity(8)),
        Some(StandardScaler::identity(2)),
        None,
        None,
    )
    .unwrap()
}

pub fn bundle_without_scaler() -> ModelBundle {
    ModelBundle::from_parts(
        Some(rf_model()),
        Some(xgb_model()),
        Some(meta_model()),
        None,
        Some(StandardScaler::identity(2)),
        Some(importance()),
        None,
    )
    .unwrap()
}

pub fn predictor() -> EnsemblePredictor {
    EnsemblePredictor::new(RiskConfig::default())
}

/// Stressed plot: every counterfactual lever is eligible.
pub fn sample_features() -> FeatureVector {
    FeatureVector {
        ndvi_mean: 0.40,
        ndvi_trend: 0.50,
        ndvi_variance: 0.30,
        rainfall_deviation: -20.0,
        temperature_anomaly: 2.5,
        soil_moisture_index: 0.35,
        soil_type_encoded: 0.60,
        pest_frequency: 0.60,
    }
}

/// Healthy plot: no counterfactual lever is eligible.
pub fn healthy_features() -> FeatureVector {
    FeatureVector {
        ndvi_mean: 0.90,
        ndvi_trend: 0.55,
        ndvi_variance: 0.10,
        rainfall_deviation: 0.0,
        temperature_anomaly: 0.0,
        soil_moisture_index: 0.90,
        soil_type_encoded: 0.40,
        pest_frequency: 0.0,
    }
}
