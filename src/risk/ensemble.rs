//! Ensemble predictor: two base classifiers combined by a meta-learner,
//! degrading to mean-of-available or single-model as components go missing.
//! Only the zero-base-models state is fatal for a query.

use ndarray::{arr1, Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::RiskConfig;
use crate::error::EngineError;
use crate::features::FeatureVector;
use crate::model::{ModelBundle, ProbabilityModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_probability(p: f64, config: &RiskConfig) -> Self {
        if p >= config.high_threshold {
            RiskLevel::High
        } else if p >= config.medium_threshold {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// How the ensemble probability was produced. Anything other than
/// `MetaLearner` means the prediction ran degraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinationStrategy {
    MetaLearner,
    BaseAverage,
    SingleModel,
}

/// Risk score for a single query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub risk_level: RiskLevel,
    pub ensemble_probability: f64,
    pub rf_probability: Option<f64>,
    pub xgb_probability: Option<f64>,
    pub confidence: f64,
    /// Base models that returned a probability (0-2)
    pub models_used: u8,
    pub strategy: CombinationStrategy,
    /// False when the primary scaler was missing or failed and raw
    /// normalized features went straight into the base models
    pub scaler_applied: bool,
}

pub struct EnsemblePredictor {
    config: RiskConfig,
}

impl EnsemblePredictor {
    pub fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Score one normalized feature vector against the bundle.
    pub fn predict(
        &self,
        bundle: &ModelBundle,
        features: &FeatureVector,
    ) -> Result<PredictionResult, EngineError> {
        features.validate()?;
        let (scaled, scaler_applied) = self.scale(bundle, features);

        let rf_probability = invoke_base(bundle.rf(), scaled.view());
        let xgb_probability = invoke_base(bundle.xgb(), scaled.view());
        let models_used = rf_probability.is_some() as u8 + xgb_probability.is_some() as u8;

        let (ensemble_probability, strategy) = combine(rf_probability, xgb_probability, bundle)?;
        let confidence = confidence(rf_probability, xgb_probability);
        let risk_level = RiskLevel::from_probability(ensemble_probability, &self.config);

        debug!(
            probability = ensemble_probability,
            ?strategy,
            models_used,
            confidence,
            "ensemble scored"
        );

        Ok(PredictionResult {
            risk_level,
            ensemble_probability,
            rf_probability,
            xgb_probability,
            confidence,
            models_used,
            strategy,
            scaler_applied,
        })
    }

    /// Scaled model input. Falls back to the raw normalized vector when the
    /// primary scaler is missing or rejects the input.
    pub(crate) fn scale(&self, bundle: &ModelBundle, features: &FeatureVector) -> (Array1<f64>, bool) {
        let raw = features.to_array();
        match bundle.scaler() {
            Some(scaler) => match scaler.transform(raw.view()) {
                Ok(scaled) => (scaled, true),
                Err(e) => {
                    warn!(error = %e, "feature scaler failed; using raw normalized features");
                    (raw, false)
                }
            },
            None => {
                warn!("feature scaler not available; using raw normalized features");
                (raw, false)
            }
        }
    }
}

fn invoke_base(model: Option<&dyn ProbabilityModel>, input: ArrayView1<'_, f64>) -> Option<f64> {
    let model = model?;
    match model.predict_proba(input) {
        Ok(p) => {
            debug!(model = model.name(), probability = p, "base model scored");
            Some(p)
        }
        Err(e) => {
            warn!(model = model.name(), error = %e, "base model inference failed");
            None
        }
    }
}

/// Combination state machine over the optional base probabilities.
fn combine(
    rf: Option<f64>,
    xgb: Option<f64>,
    bundle: &ModelBundle,
) -> Result<(f64, CombinationStrategy), EngineError> {
    match (rf, xgb) {
        (Some(a), Some(b)) => {
            if let (Some(meta), Some(scaler)) = (bundle.meta(), bundle.scaler_meta()) {
                let attempt = scaler
                    .transform(arr1(&[a, b]).view())
                    .and_then(|m| meta.predict_proba(m.view()));
                match attempt {
                    Ok(p) => return Ok((p, CombinationStrategy::MetaLearner)),
                    Err(e) => warn!(error = %e, "meta-learner failed; averaging base models"),
                }
            } else {
                warn!("meta-learner or meta scaler not available; averaging base models");
            }
            Ok(((a + b) / 2.0, CombinationStrategy::BaseAverage))
        }
        (Some(p), None) | (None, Some(p)) => Ok((p, CombinationStrategy::SingleModel)),
        (None, None) => Err(EngineError::NoModelsAvailable),
    }
}

/// Agreement between the base models raises confidence, capped at 0.95.
/// A single model fixes it at 0.75.
fn confidence(rf: Option<f64>, xgb: Option<f64>) -> f64 {
    match (rf, xgb) {
        (Some(a), Some(b)) => (0.5 + 0.45 * (1.0 - (a - b).abs())).min(0.95),
        (Some(_), None) | (None, Some(_)) => 0.75,
        (None, None) => 0.5,
    }
}
