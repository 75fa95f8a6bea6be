//! Counterfactual search: perturb one actionable lever at a time, re-score
//! through the ensemble, and rank the interventions by how far they move
//! the risk probability.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::features::{FeatureName, FeatureVector};
use crate::model::ModelBundle;
use crate::risk::{EnsemblePredictor, PredictionResult, RiskLevel};

/// Most scenarios kept after ranking.
pub const MAX_SCENARIOS: usize = 5;

const NDVI_DELTAS: [f64; 3] = [0.05, 0.10, 0.15];
/// Upper clamp for vegetation-index candidates, matching the eligibility
/// guard so no candidate overshoots a plausible NDVI.
const NDVI_CEILING: f64 = 0.85;
const RAINFALL_IMPROVEMENTS: [f64; 3] = [0.20, 0.35, 0.50];
const RAINFALL_GUARD: f64 = 5.0;
const MOISTURE_DELTAS: [f64; 3] = [0.05, 0.10, 0.15];
const MOISTURE_GUARD: f64 = 0.85;
const MOISTURE_CEILING: f64 = 0.95;
const PEST_REDUCTIONS: [f64; 3] = [0.25, 0.50, 0.75];
const PEST_GUARD: f64 = 0.05;
const TEMPERATURE_GUARD: f64 = 1.0;
const TEMPERATURE_RELIEF: f64 = 0.5;

/// One ranked what-if intervention and its re-scored outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterfactualScenario {
    pub scenario: String,
    pub feature: String,
    pub change_amount: String,
    pub current_value: String,
    pub new_value: String,
    pub new_probability: f64,
    pub new_risk_level: RiskLevel,
    pub probability_change: f64,
    pub impact: String,
    pub actionable: String,
}

/// Generate up to [`MAX_SCENARIOS`] scenarios for one query. A re-score
/// failure drops that candidate only; an empty list means no lever was
/// eligible or every candidate failed.
pub fn generate(
    predictor: &EnsemblePredictor,
    bundle: &ModelBundle,
    features: &FeatureVector,
    original: &PredictionResult,
) -> Vec<CounterfactualScenario> {
    let original_prob = original.ensemble_probability;
    let mut scenarios = Vec::new();

    if features.ndvi_mean < NDVI_CEILING {
        for delta in NDVI_DELTAS {
            let new_ndvi = (features.ndvi_mean + delta).min(NDVI_CEILING);
            let candidate = features.with(FeatureName::NdviMean, new_ndvi);
            let Some((prob, level)) = rescore(predictor, bundle, &candidate) else {
                continue;
            };
            let change = prob - original_prob;
            scenarios.push(CounterfactualScenario {
                scenario: format!("Improve vegetation health by {:.0}%", delta * 100.0),
                feature: FeatureName::NdviMean.display_name().to_string(),
                change_amount: format!("+{:.0}%", delta * 100.0),
                current_value: format!("{:.3}", features.ndvi_mean),
                new_value: format!("{:.3}", new_ndvi),
                new_probability: prob,
                new_risk_level: level,
                probability_change: change,
                impact: impact_text(change),
                actionable: "Improve irrigation, soil health, and pest management to boost vegetation"
                    .to_string(),
            });
        }
    }

    if features.rainfall_deviation.abs() > RAINFALL_GUARD {
        for improvement in RAINFALL_IMPROVEMENTS {
            let new_dev = features.rainfall_deviation * (1.0 - improvement);
            let candidate = features.with(FeatureName::RainfallDeviation, new_dev);
            let Some((prob, level)) = rescore(predictor, bundle, &candidate) else {
                continue;
            };
            let change = prob - original_prob;
            scenarios.push(CounterfactualScenario {
                scenario: format!("Improve rainfall by {:.0}%", improvement * 100.0),
                feature: FeatureName::RainfallDeviation.display_name().to_string(),
                change_amount: format!("{:.0}% normalization", improvement * 100.0),
                current_value: format!("{:.1}%", features.rainfall_deviation),
                new_value: format!("{:.1}%", new_dev),
                new_probability: prob,
                new_risk_level: level,
                probability_change: change,
                impact: impact_text(change),
                actionable: "Use drip irrigation or increase water management during dry season"
                    .to_string(),
            });
        }
    }

    if features.soil_moisture_index < MOISTURE_GUARD {
        for delta in MOISTURE_DELTAS {
            let new_moisture = (features.soil_moisture_index + delta).min(MOISTURE_CEILING);
            let candidate = features.with(FeatureName::SoilMoistureIndex, new_moisture);
            let Some((prob, level)) = rescore(predictor, bundle, &candidate) else {
                continue;
            };
            let change = prob - original_prob;
            scenarios.push(CounterfactualScenario {
                scenario: format!("Increase soil moisture by {:.0}%", delta * 100.0),
                feature: FeatureName::SoilMoistureIndex.display_name().to_string(),
                change_amount: format!("+{:.0}%", delta * 100.0),
                current_value: format!("{:.1}%", features.soil_moisture_index * 100.0),
                new_value: format!("{:.1}%", new_moisture * 100.0),
                new_probability: prob,
                new_risk_level: level,
                probability_change: change,
                impact: impact_text(change),
                actionable: "Increase irrigation frequency or add mulch to retain moisture"
                    .to_string(),
            });
        }
    }

    if features.pest_frequency > PEST_GUARD {
        for reduction in PEST_REDUCTIONS {
            let new_pest = (features.pest_frequency * (1.0 - reduction)).max(0.0);
            let candidate = features.with(FeatureName::PestFrequency, new_pest);
            let Some((prob, level)) = rescore(predictor, bundle, &candidate) else {
                continue;
            };
            let change = prob - original_prob;
            scenarios.push(CounterfactualScenario {
                scenario: format!("Reduce pest activity by {:.0}%", reduction * 100.0),
                feature: FeatureName::PestFrequency.display_name().to_string(),
                change_amount: format!("-{:.0}%", reduction * 100.0),
                current_value: format!("{:.1}%", features.pest_frequency * 100.0),
                new_value: format!("{:.1}%", new_pest * 100.0),
                new_probability: prob,
                new_risk_level: level,
                probability_change: change,
                impact: impact_text(change),
                actionable:
                    "Use integrated pest management (IPM): crop rotation, biocontrols, targeted spraying"
                        .to_string(),
            });
        }
    }

    if features.temperature_anomaly.abs() > TEMPERATURE_GUARD {
        let new_anomaly = features.temperature_anomaly * TEMPERATURE_RELIEF;
        let candidate = features.with(FeatureName::TemperatureAnomaly, new_anomaly);
        if let Some((prob, level)) = rescore(predictor, bundle, &candidate) {
            let change = prob - original_prob;
            scenarios.push(CounterfactualScenario {
                scenario: "Mitigate temperature stress".to_string(),
                feature: FeatureName::TemperatureAnomaly.display_name().to_string(),
                change_amount: "-50%".to_string(),
                current_value: format!("{:.1}°C", features.temperature_anomaly),
                new_value: format!("{:.1}°C", new_anomaly),
                new_probability: prob,
                new_risk_level: level,
                probability_change: change,
                impact: impact_text(change),
                actionable: "Use shade netting, select heat-tolerant varieties, or adjust sowing dates"
                    .to_string(),
            });
        }
    }

    // Stable sort: candidates with equal impact keep generation order, so
    // repeated calls return identical lists.
    scenarios.sort_by(|a, b| {
        b.probability_change
            .abs()
            .total_cmp(&a.probability_change.abs())
    });
    scenarios.truncate(MAX_SCENARIOS);
    debug!(count = scenarios.len(), "counterfactual scenarios ranked");
    scenarios
}

fn rescore(
    predictor: &EnsemblePredictor,
    bundle: &ModelBundle,
    candidate: &FeatureVector,
) -> Option<(f64, RiskLevel)> {
    match predictor.predict(bundle, candidate) {
        Ok(r) => Some((r.ensemble_probability, r.risk_level)),
        Err(e) => {
            warn!(error = %e, "counterfactual re-score failed; dropping candidate");
            None
        }
    }
}

fn impact_text(change: f64) -> String {
    if change < 0.0 {
        format!("Risk reduces by {:.1}%", change.abs() * 100.0)
    } else if change > 0.0 {
        format!("Risk increases by {:.1}%", change * 100.0)
    } else {
        "Risk unchanged".to_string()
    }
}
