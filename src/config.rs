//! Configuration module

use std::env;

/// Application configuration
///
/// One struct describes everything the deployment variants differ on:
/// which feature columns the model was fitted on (and in what order),
/// whether a scaler artifact is applied before inference, and whether
/// anomaly scores are included in responses.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Path to the forest artifact
    pub model_path: String,

    /// Path to the scaler artifact, if the deployment uses one
    pub scaler_path: Option<String>,

    /// Expected feature columns, in the order the model was fitted on
    pub feature_columns: Vec<String>,

    /// Include anomaly scores in prediction responses
    pub report_scores: bool,

    /// Keep serving (in degraded mode) when artifact loading fails,
    /// instead of aborting startup
    pub allow_degraded: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),

            model_path: env::var("MODEL_PATH")
                .unwrap_or_else(|_| "isolation_forest_model.json".to_string()),

            scaler_path: env::var("SCALER_PATH").ok().filter(|p| !p.is_empty()),

            feature_columns: env::var("FEATURE_COLUMNS")
                .unwrap_or_else(|_| "current,temperature,vibration".to_string())
                .split(',')
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),

            report_scores: env::var("REPORT_SCORES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),

            allow_degraded: env::var("ALLOW_DEGRADED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }

    /// Number of features the service expects per vector
    pub fn feature_count(&self) -> usize {
        self.feature_columns.len()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            model_path: "isolation_forest_model.json".to_string(),
            scaler_path: None,
            feature_columns: vec![
                "current".to_string(),
                "temperature".to_string(),
                "vibration".to_string(),
            ],
            report_scores: true,
            allow_degraded: false,
        }
    }
}
