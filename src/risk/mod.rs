//! Stacked-ensemble risk scoring.

mod ensemble;

pub use ensemble::{
    CombinationStrategy, EnsemblePredictor, PredictionResult, RiskLevel,
};
