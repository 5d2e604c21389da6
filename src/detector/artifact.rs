//! Artifact loading
//!
//! Reads the fitted forest and scaler from JSON files at fixed paths,
//! exactly once at process start. A failed load either aborts startup or
//! puts the service into its degraded state, depending on configuration.

use std::path::Path;

use thiserror::Error;

use super::forest::IsolationForest;
use super::scaler::Scaler;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact not found: {0}")]
    NotFound(String),

    #[error("failed to read artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid artifact: {0}")]
    Invalid(String),
}

/// Load and validate the forest artifact.
pub fn load_forest(path: &str) -> Result<IsolationForest, ArtifactError> {
    tracing::info!("Loading forest artifact from {}", path);

    if !Path::new(path).exists() {
        return Err(ArtifactError::NotFound(path.to_string()));
    }

    let raw = std::fs::read_to_string(path)?;
    let forest: IsolationForest = serde_json::from_str(&raw)?;
    forest.validate().map_err(ArtifactError::Invalid)?;

    tracing::info!(
        "Forest loaded: {} trees, {} features, max_samples {}",
        forest.trees.len(),
        forest.n_features,
        forest.max_samples
    );
    Ok(forest)
}

/// Load and validate the scaler artifact.
pub fn load_scaler(path: &str) -> Result<Scaler, ArtifactError> {
    tracing::info!("Loading scaler artifact from {}", path);

    if !Path::new(path).exists() {
        return Err(ArtifactError::NotFound(path.to_string()));
    }

    let raw = std::fs::read_to_string(path)?;
    let scaler: Scaler = serde_json::from_str(&raw)?;
    scaler.validate().map_err(ArtifactError::Invalid)?;

    tracing::info!("Scaler loaded: {} features", scaler.n_features());
    Ok(scaler)
}
