//! Combined assessment: prediction plus both explanation outputs, stamped
//! with an id and timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::EngineError;
use crate::explain::{attribution, counterfactual, CounterfactualScenario, Explanation};
use crate::features::FeatureVector;
use crate::model::{ModelBundle, TestMetrics};
use crate::risk::{EnsemblePredictor, PredictionResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub prediction: PredictionResult,
    /// Absent when the importance table artifact did not load
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<Explanation>,
    pub counterfactuals: Vec<CounterfactualScenario>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_metrics: Option<TestMetrics>,
}

/// Run the full pipeline for one query: score, attribute, search
/// counterfactuals. Only a failed prediction is fatal; a missing importance
/// table degrades to an assessment without attribution.
pub fn assess(
    predictor: &EnsemblePredictor,
    bundle: &ModelBundle,
    features: &FeatureVector,
) -> Result<RiskAssessment, EngineError> {
    let prediction = predictor.predict(bundle, features)?;
    let explanation = match attribution::explain(predictor, bundle, features) {
        Ok(e) => Some(e),
        Err(e) => {
            warn!(error = %e, "attribution skipped");
            None
        }
    };
    let counterfactuals = counterfactual::generate(predictor, bundle, features, &prediction);
    Ok(RiskAssessment {
        id: Uuid::new_v4(),
        generated_at: Utc::now(),
        prediction,
        explanation,
        counterfactuals,
        model_metrics: bundle.metrics().cloned(),
    })
}
