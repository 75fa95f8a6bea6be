//! Explanation engines: feature attribution and counterfactual search.

pub mod attribution;
pub mod counterfactual;

pub use attribution::{Direction, Explanation, FeatureAttribution, ImpactTier, RankedImportance};
pub use counterfactual::{CounterfactualScenario, MAX_SCENARIOS};
