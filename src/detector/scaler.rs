//! Feature scaler
//!
//! Standardization transform fitted alongside the model: `(x - mean) / scale`,
//! applied to the validated feature matrix before inference.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::DetectorError;

/// Fitted standardization parameters, deserialized from the scaler artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl Scaler {
    /// Structural checks run once at load time.
    pub fn validate(&self) -> Result<(), String> {
        if self.mean.is_empty() {
            return Err("scaler has no parameters".to_string());
        }
        if self.mean.len() != self.scale.len() {
            return Err(format!(
                "scaler mean/scale length mismatch: {} vs {}",
                self.mean.len(),
                self.scale.len()
            ));
        }
        if self.mean.iter().chain(&self.scale).any(|v| !v.is_finite()) {
            return Err("scaler contains non-finite parameters".to_string());
        }
        Ok(())
    }

    /// Feature count the scaler was fitted on
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Standardize a feature matrix. The matrix width must match the
    /// fitted feature count.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, DetectorError> {
        if x.ncols() != self.n_features() {
            return Err(DetectorError::ShapeMismatch {
                got: x.ncols(),
                expected: self.n_features(),
            });
        }

        let mut scaled = x.clone();
        for mut row in scaled.rows_mut() {
            for (j, value) in row.iter_mut().enumerate() {
                let scale = self.scale[j].abs().max(1e-12);
                *value = (*value - self.mean[j]) / scale;
            }
        }
        Ok(scaled)
    }
}
