//! Anomaly detector
//!
//! Holds the immutable fitted artifacts (forest, optional scaler) and maps a
//! validated feature matrix to per-row predictions. Constructed once at
//! startup and shared read-only; prediction is a pure function of its input.

pub mod artifact;
pub mod forest;
pub mod scaler;

use ndarray::Array2;
use thiserror::Error;

use crate::config::Config;
use artifact::ArtifactError;
use forest::{IsolationForest, OUTLIER_SENTINEL};
use scaler::Scaler;

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("invalid input shape: got {got} features, expected {expected}")]
    ShapeMismatch { got: usize, expected: usize },

    #[error("malformed tree: {0}")]
    MalformedTree(String),
}

/// Canonical classification labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Normal,
    Anomaly,
}

impl Label {
    /// Map the model's raw binary output. The raw label is authoritative:
    /// anomaly iff the output equals the outlier sentinel.
    pub fn from_raw(raw: i8) -> Self {
        if raw == OUTLIER_SENTINEL {
            Label::Anomaly
        } else {
            Label::Normal
        }
    }

    pub fn is_anomaly(self) -> bool {
        matches!(self, Label::Anomaly)
    }
}

/// Prediction for one input row.
#[derive(Debug, Clone, Copy)]
pub struct RowPrediction {
    pub label: Label,
    /// Decision score: negative means anomaly, non-negative means normal.
    pub score: f64,
}

pub struct Detector {
    forest: IsolationForest,
    scaler: Option<Scaler>,
}

impl Detector {
    /// Load artifacts from the configured paths.
    pub fn load(config: &Config) -> Result<Self, ArtifactError> {
        let forest = artifact::load_forest(&config.model_path)?;

        let scaler = match &config.scaler_path {
            Some(path) => {
                let scaler = artifact::load_scaler(path)?;
                if scaler.n_features() != forest.n_features {
                    return Err(ArtifactError::Invalid(format!(
                        "scaler fitted on {} features, forest on {}",
                        scaler.n_features(),
                        forest.n_features
                    )));
                }
                Some(scaler)
            }
            None => None,
        };

        if config.feature_count() != forest.n_features {
            tracing::warn!(
                "configured {} feature columns but forest was fitted on {}; \
                 named-field requests will be rejected",
                config.feature_count(),
                forest.n_features
            );
        }

        Ok(Self { forest, scaler })
    }

    /// Build a detector from already-constructed artifacts.
    pub fn new(forest: IsolationForest, scaler: Option<Scaler>) -> Self {
        Self { forest, scaler }
    }

    pub fn n_features(&self) -> usize {
        self.forest.n_features
    }

    pub fn has_scaler(&self) -> bool {
        self.scaler.is_some()
    }

    /// Scale (if fitted) and classify each row of the feature matrix,
    /// preserving row order.
    pub fn predict(&self, features: &Array2<f64>) -> Result<Vec<RowPrediction>, DetectorError> {
        let scaled;
        let input = match &self.scaler {
            Some(scaler) => {
                scaled = scaler.transform(features)?;
                &scaled
            }
            None => features,
        };

        if input.ncols() != self.forest.n_features {
            return Err(DetectorError::ShapeMismatch {
                got: input.ncols(),
                expected: self.forest.n_features,
            });
        }

        let raw = self.forest.predict(input)?;
        let scores = self.forest.decision_function(input)?;

        Ok(raw
            .into_iter()
            .zip(scores)
            .map(|(raw, score)| RowPrediction {
                label: Label::from_raw(raw),
                score,
            })
            .collect())
    }
}
