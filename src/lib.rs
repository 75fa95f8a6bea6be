//! AgriRisk core — risk scoring and counterfactual explanation for
//! (location, crop, season) queries.
//!
//! Modular structure:
//! - [`features`] — Fixed-schema normalized feature vector
//! - [`model`] — Inference primitives and the loaded model bundle
//! - [`risk`] — Stacked-ensemble predictor with cascading fallbacks
//! - [`explain`] — Feature attribution and counterfactual search
//! - [`report`] — Combined assessment record
//! - [`logging`] — Structured JSON logging

pub mod config;
pub mod error;
pub mod features;
pub mod model;
pub mod risk;
pub mod explain;
pub mod report;
pub mod logging;

pub use config::EngineConfig;
pub use error::EngineError;
pub use features::{FeatureName, FeatureVector};
pub use model::{ModelBundle, ProbabilityModel};
pub use risk::{EnsemblePredictor, PredictionResult, RiskLevel};
pub use explain::{CounterfactualScenario, Explanation};
pub use report::{assess, RiskAssessment};
