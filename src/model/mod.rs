//! Model registry: native inference primitives and the loaded artifact
//! bundle shared read-only by every query.

pub mod artifacts;
pub mod bundle;

pub use artifacts::{
    EnsembleKind, LogisticModel, ProbabilityModel, StandardScaler, Tree, TreeEnsembleModel,
    TreeNode,
};
pub use bundle::{FeatureImportance, ModelBundle, TestMetrics};
