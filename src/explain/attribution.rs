//! Feature attribution: ranks features by the base models' combined
//! importances and labels each with a risk direction.
//!
//! The direction label is an explanatory heuristic keyed by feature
//! identity, not a causal claim derived from the trained models. Whether
//! moving a feature the other way actually lowers the score is checked
//! empirically by the counterfactual engine.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::EngineError;
use crate::features::{FeatureName, FeatureVector};
use crate::model::ModelBundle;
use crate::risk::EnsemblePredictor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    IncreasesRisk,
    DecreasesRisk,
}

/// Whether a feature's combined importance sits above the mean importance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpactTier {
    High,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureAttribution {
    pub feature: String,
    pub scaled_value: f64,
    pub contribution: f64,
    pub direction: Direction,
    pub impact: ImpactTier,
    pub interpretation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedImportance {
    pub feature: String,
    pub importance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// Sorted by combined importance, descending
    pub feature_importance: Vec<FeatureAttribution>,
    pub rf_top_features: Vec<RankedImportance>,
    pub xgb_top_features: Vec<RankedImportance>,
    pub prediction_logic: String,
}

/// Rank features for one query. Requires the importance table artifact;
/// scaling degrades the same way prediction does.
pub fn explain(
    predictor: &EnsemblePredictor,
    bundle: &ModelBundle,
    features: &FeatureVector,
) -> Result<Explanation, EngineError> {
    let importance = bundle.importance().ok_or(EngineError::ImportanceUnavailable)?;
    let (scaled, _) = predictor.scale(bundle, features);

    let combined: Vec<f64> = FeatureName::ALL
        .iter()
        .map(|f| importance.combined(*f))
        .collect();
    let mean = combined.iter().sum::<f64>() / combined.len() as f64;

    let mut ranked: Vec<(FeatureName, f64, f64)> = FeatureName::ALL
        .iter()
        .zip(scaled.iter())
        .zip(combined.iter())
        .map(|((name, sv), c)| (*name, *sv, *c))
        .collect();
    // Stable sort keeps the canonical field order among ties, so repeated
    // runs produce identical rankings.
    ranked.sort_by(|a, b| b.2.total_cmp(&a.2));

    let prediction_logic = prediction_logic(&ranked);

    let feature_importance = ranked
        .into_iter()
        .map(|(name, scaled_value, contribution)| FeatureAttribution {
            feature: name.display_name().to_string(),
            scaled_value,
            contribution,
            direction: direction_for(name, scaled_value),
            impact: if contribution > mean {
                ImpactTier::High
            } else {
                ImpactTier::Low
            },
            interpretation: interpret(name, features.get(name)),
        })
        .collect();

    Ok(Explanation {
        feature_importance,
        rf_top_features: top_n(&importance.rf, 3),
        xgb_top_features: top_n(&importance.xgb, 3),
        prediction_logic,
    })
}

/// Risk direction keyed by feature identity over the scaled value.
/// Vegetation and moisture features read as protective while in range;
/// rainfall, temperature and pest features read as threats whenever their
/// scaled magnitude is non-zero.
pub(crate) fn direction_for(feature: FeatureName, scaled_value: f64) -> Direction {
    match feature {
        FeatureName::NdviMean
        | FeatureName::NdviTrend
        | FeatureName::NdviVariance
        | FeatureName::SoilMoistureIndex => {
            if scaled_value > 0.0 {
                Direction::DecreasesRisk
            } else {
                Direction::IncreasesRisk
            }
        }
        FeatureName::RainfallDeviation
        | FeatureName::TemperatureAnomaly
        | FeatureName::PestFrequency => {
            if scaled_value.abs() > 0.0 {
                Direction::IncreasesRisk
            } else {
                Direction::DecreasesRisk
            }
        }
        FeatureName::SoilTypeEncoded => {
            if scaled_value > 0.5 {
                Direction::IncreasesRisk
            } else {
                Direction::DecreasesRisk
            }
        }
    }
}

/// Reading of the normalized field value in agronomic terms.
fn interpret(feature: FeatureName, value: f64) -> String {
    let text = match feature {
        FeatureName::NdviMean => {
            if value > 0.7 {
                "Excellent vegetation health"
            } else if value > 0.5 {
                "Good vegetation health"
            } else if value > 0.3 {
                "Moderate vegetation stress"
            } else {
                "Critical vegetation stress"
            }
        }
        FeatureName::RainfallDeviation => {
            if value.abs() < 10.0 {
                "Normal rainfall pattern"
            } else if value.abs() < 25.0 {
                "Moderate rainfall deviation"
            } else if value < 0.0 {
                "Severe rainfall deficit"
            } else {
                "Excessive rainfall"
            }
        }
        FeatureName::SoilMoistureIndex => {
            if value > 0.6 {
                "Adequate soil moisture"
            } else if value > 0.4 {
                "Moderate soil moisture"
            } else if value > 0.25 {
                "Low soil moisture"
            } else {
                "Critical water deficit"
            }
        }
        FeatureName::TemperatureAnomaly => {
            if value.abs() < 1.5 {
                "Normal temperature range"
            } else if value.abs() < 3.0 {
                "Moderate temperature stress"
            } else if value > 0.0 {
                "Extreme heat stress"
            } else {
                "Extreme cold stress"
            }
        }
        FeatureName::PestFrequency => {
            if value < 0.3 {
                "Low pest pressure"
            } else if value < 0.6 {
                "Moderate pest activity"
            } else {
                "High pest infestation risk"
            }
        }
        FeatureName::NdviTrend | FeatureName::NdviVariance | FeatureName::SoilTypeEncoded => {
            "Within normal range"
        }
    };
    text.to_string()
}

/// Short natural-language summary built from the top increasing and top
/// decreasing factor.
fn prediction_logic(ranked: &[(FeatureName, f64, f64)]) -> String {
    let mut parts: Vec<&'static str> = Vec::new();

    let top_increasing = ranked
        .iter()
        .find(|(name, sv, _)| direction_for(*name, *sv) == Direction::IncreasesRisk);
    if let Some((name, _, _)) = top_increasing {
        let phrase = match name {
            FeatureName::NdviMean | FeatureName::NdviTrend | FeatureName::NdviVariance => {
                Some("Low vegetation health is the primary risk driver")
            }
            FeatureName::RainfallDeviation => Some("Rainfall variability increases failure risk"),
            FeatureName::SoilMoistureIndex => Some("Poor soil conditions elevate risk"),
            FeatureName::PestFrequency => Some("High pest activity threatens the crop"),
            FeatureName::TemperatureAnomaly => Some("Temperature stress is weighing on the crop"),
            FeatureName::SoilTypeEncoded => None,
        };
        if let Some(p) = phrase {
            parts.push(p);
        }
    }

    let top_decreasing = ranked
        .iter()
        .find(|(name, sv, _)| direction_for(*name, *sv) == Direction::DecreasesRisk);
    if let Some((name, _, _)) = top_decreasing {
        let phrase = match name {
            FeatureName::NdviMean | FeatureName::NdviTrend | FeatureName::NdviVariance => {
                Some("Good vegetation health mitigates risk")
            }
            FeatureName::SoilMoistureIndex => Some("Adequate soil moisture provides resilience"),
            _ => None,
        };
        if let Some(p) = phrase {
            parts.push(p);
        }
    }

    if parts.is_empty() {
        "Prediction based on balanced feature interactions".to_string()
    } else {
        parts.join("; ")
    }
}

fn top_n(map: &HashMap<String, f64>, n: usize) -> Vec<RankedImportance> {
    let mut entries: Vec<(String, f64)> = map.iter().map(|(k, v)| (k.clone(), *v)).collect();
    // Alphabetical tie-break keeps the output deterministic.
    entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(n);
    entries
        .into_iter()
        .map(|(key, importance)| RankedImportance {
            feature: FeatureName::from_key(&key)
                .map(|f| f.display_name().to_string())
                .unwrap_or(key),
            importance,
        })
        .collect()
}
