//! AgriRisk CLI: load the model bundle, read one normalized feature vector
//! (JSON file argument or stdin), emit the combined assessment as JSON on
//! stdout. Logs go to stderr.

use agririsk_core::{
    config::EngineConfig,
    features::FeatureVector,
    logging::StructuredLogger,
    model::ModelBundle,
    report::assess,
    risk::EnsemblePredictor,
};
use std::io::Read;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config_path = std::env::var("AGRIRISK_CONFIG_PATH")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::path::PathBuf::from("config.json"));
    let config = EngineConfig::load(&config_path);

    StructuredLogger::init(config.log.json, &config.log.level);

    info!(bundle_dir = ?config.bundle_dir, "agririsk starting");

    let bundle = ModelBundle::load(&config.bundle_dir)?;
    let predictor = EnsemblePredictor::new(config.risk.clone());

    let input = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let features: FeatureVector = serde_json::from_str(&input)?;

    let assessment = assess(&predictor, &bundle, &features)?;
    info!(
        id = %assessment.id,
        level = ?assessment.prediction.risk_level,
        probability = assessment.prediction.ensemble_probability,
        "assessment complete"
    );
    println!("{}", serde_json::to_string_pretty(&assessment)?);

    Ok(())
}
