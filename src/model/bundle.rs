//! The model bundle: two base classifiers, meta-learner, scalers, importance
//! table and held-out metrics, loaded once from a directory of JSON
//! artifacts. Immutable after construction; concurrent reads need no locking.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::EngineError;
use crate::features::FeatureName;
use super::artifacts::{LogisticModel, ProbabilityModel, StandardScaler, TreeEnsembleModel};

pub const RF_MODEL_FILE: &str = "rf_model.json";
pub const XGB_MODEL_FILE: &str = "xgb_model.json";
pub const META_LEARNER_FILE: &str = "meta_learner.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const SCALER_META_FILE: &str = "scaler_meta.json";
pub const FEATURE_IMPORTANCE_FILE: &str = "feature_importance.json";
pub const TEST_METRICS_FILE: &str = "test_metrics.json";

/// Per-base-model feature importances keyed by feature key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub rf: HashMap<String, f64>,
    pub xgb: HashMap<String, f64>,
}

impl FeatureImportance {
    /// Mean of both models' importance for one feature; absent keys count
    /// as zero.
    pub fn combined(&self, feature: FeatureName) -> f64 {
        let k = feature.key();
        let rf = self.rf.get(k).copied().unwrap_or(0.0);
        let xgb = self.xgb.get(k).copied().unwrap_or(0.0);
        (rf + xgb) / 2.0
    }
}

/// Held-out evaluation metrics exported by the training pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub roc_auc: f64,
}

/// Loaded ensemble components. Any artifact may be missing; the predictor
/// reads the gaps and degrades its combination strategy. Construction fails
/// only when zero of the three learned components are present.
pub struct ModelBundle {
    rf: Option<Box<dyn ProbabilityModel>>,
    xgb: Option<Box<dyn ProbabilityModel>>,
    meta: Option<Box<dyn ProbabilityModel>>,
    scaler: Option<StandardScaler>,
    scaler_meta: Option<StandardScaler>,
    importance: Option<FeatureImportance>,
    metrics: Option<TestMetrics>,
}

impl fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBundle")
            .field("rf", &self.rf.is_some())
            .field("xgb", &self.xgb.is_some())
            .field("meta", &self.meta.is_some())
            .field("scaler", &self.scaler.is_some())
            .field("scaler_meta", &self.scaler_meta.is_some())
            .field("importance", &self.importance.is_some())
            .field("metrics", &self.metrics.is_some())
            .finish()
    }
}

impl ModelBundle {
    /// Assemble a bundle from already-constructed parts. Fails when zero
    /// learned components are present.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        rf: Option<Box<dyn ProbabilityModel>>,
        xgb: Option<Box<dyn ProbabilityModel>>,
        meta: Option<Box<dyn ProbabilityModel>>,
        scaler: Option<StandardScaler>,
        scaler_meta: Option<StandardScaler>,
        importance: Option<FeatureImportance>,
        metrics: Option<TestMetrics>,
    ) -> Result<Self, EngineError> {
        let learned = rf.is_some() as usize + xgb.is_some() as usize + meta.is_some() as usize;
        if learned == 0 {
            return Err(EngineError::BundleUnavailable(
                "no learned components loaded".into(),
            ));
        }
        info!(learned, "model bundle ready ({}/3 learned components)", learned);
        Ok(Self {
            rf,
            xgb,
            meta,
            scaler,
            scaler_meta,
            importance,
            metrics,
        })
    }

    /// Load every artifact best-effort from `dir`. Missing or unparseable
    /// artifacts are logged and left out; only a fully empty bundle is fatal.
    pub fn load(dir: &Path) -> Result<Self, EngineError> {
        if !dir.is_dir() {
            return Err(EngineError::BundleUnavailable(format!(
                "bundle directory {} not found",
                dir.display()
            )));
        }
        let rf: Option<TreeEnsembleModel> = load_artifact(dir, RF_MODEL_FILE);
        let xgb: Option<TreeEnsembleModel> = load_artifact(dir, XGB_MODEL_FILE);
        let meta: Option<LogisticModel> = load_artifact(dir, META_LEARNER_FILE);
        let scaler: Option<StandardScaler> = load_artifact(dir, SCALER_FILE);
        let scaler_meta: Option<StandardScaler> = load_artifact(dir, SCALER_META_FILE);
        let importance: Option<FeatureImportance> = load_artifact(dir, FEATURE_IMPORTANCE_FILE);
        let metrics: Option<TestMetrics> = load_artifact(dir, TEST_METRICS_FILE);

        Self::from_parts(
            rf.map(boxed),
            xgb.map(boxed),
            meta.map(boxed),
            scaler,
            scaler_meta,
            importance,
            metrics,
        )
    }

    pub fn rf(&self) -> Option<&dyn ProbabilityModel> {
        self.rf.as_deref()
    }

    pub fn xgb(&self) -> Option<&dyn ProbabilityModel> {
        self.xgb.as_deref()
    }

    pub fn meta(&self) -> Option<&dyn ProbabilityModel> {
        self.meta.as_deref()
    }

    pub fn scaler(&self) -> Option<&StandardScaler> {
        self.scaler.as_ref()
    }

    pub fn scaler_meta(&self) -> Option<&StandardScaler> {
        self.scaler_meta.as_ref()
    }

    pub fn importance(&self) -> Option<&FeatureImportance> {
        self.importance.as_ref()
    }

    pub fn metrics(&self) -> Option<&TestMetrics> {
        self.metrics.as_ref()
    }

    /// Count of loaded learned components (base models plus meta-learner).
    pub fn learned_components(&self) -> usize {
        self.rf.is_some() as usize + self.xgb.is_some() as usize + self.meta.is_some() as usize
    }
}

fn boxed<M: ProbabilityModel + 'static>(model: M) -> Box<dyn ProbabilityModel> {
    Box::new(model)
}

fn load_artifact<T: DeserializeOwned>(dir: &Path, file: &str) -> Option<T> {
    let path = dir.join(file);
    match fs::read_to_string(&path) {
        Ok(data) => match serde_json::from_str::<T>(&data) {
            Ok(v) => {
                info!(artifact = file, "loaded bundle artifact");
                Some(v)
            }
            Err(e) => {
                warn!(artifact = file, error = %e, "failed to parse bundle artifact");
                None
            }
        },
        Err(e) => {
            warn!(artifact = file, error = %e, "bundle artifact not loaded");
            None
        }
    }
}
