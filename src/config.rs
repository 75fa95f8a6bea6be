//! Engine configuration: bundle location, risk thresholds, logging.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory holding the exported model bundle artifacts
    pub bundle_dir: PathBuf,
    /// Risk level thresholds
    pub risk: RiskConfig,
    /// Logging
    pub log: LogConfig,
}

/// Probability bands for Low/Medium/High. The 0.33/0.67 set is authoritative
/// for every scoring path, including counterfactual re-scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Probability at or above this is high risk
    pub high_threshold: f64,
    /// Probability at or above this is medium risk
    pub medium_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bundle_dir: PathBuf::from("models/ensemble"),
            risk: RiskConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            high_threshold: 0.67,
            medium_threshold: 0.33,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl EngineConfig {
    /// Load from JSON file if present; otherwise return default
    pub fn load(path: &std::path::Path) -> Self {
        if path.exists() {
            if let Ok(data) = std::fs::read_to_string(path) {
                if let Ok(c) = serde_json::from_str::<EngineConfig>(&data) {
                    return c;
                }
            }
        }
        Self::default()
    }
}
