//! Error taxonomy. Fatal states stop the query; everything else is absorbed
//! with a documented fallback at the call site.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Zero learned components loaded; no prediction is possible.
    #[error("model bundle unavailable: {0}")]
    BundleUnavailable(String),

    /// Both base models failed for this query. There is no believable score
    /// to return, so the caller must handle this explicitly.
    #[error("no base models available for scoring")]
    NoModelsAvailable,

    /// The importance table artifact is not loaded; attribution cannot run.
    #[error("feature importance table not loaded")]
    ImportanceUnavailable,

    #[error("invalid feature vector: {0}")]
    InvalidFeatures(String),

    #[error("model inference failed: {0}")]
    Inference(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("artifact parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
