//! Request validation
//!
//! Turns a parsed JSON body into a numeric feature matrix. Two request
//! shapes share the endpoint, dispatched on the presence of a `features`
//! key:
//!
//! - batch mode: `{"features": [[..], [..]]}` — equal-length numeric rows;
//! - named mode: one value per configured feature column, e.g.
//!   `{"current": 2.1, "temperature": 35.0, "vibration": 0.02}`.
//!
//! Missing or non-numeric fields are hard validation errors; nothing is
//! silently defaulted.

use ndarray::Array2;
use serde_json::Value;

use crate::config::Config;
use crate::error::AppError;

/// Which request shape the client used; decides the response shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestShape {
    Named,
    Batch,
}

/// Validate the request body and extract a (batch_size x feature_count)
/// matrix, rows in input order.
pub fn extract_features(
    body: &Value,
    config: &Config,
) -> Result<(Array2<f64>, RequestShape), AppError> {
    let obj = body
        .as_object()
        .ok_or_else(|| AppError::ValidationError("Request body must be a JSON object".to_string()))?;

    if let Some(features) = obj.get("features") {
        extract_batch(features).map(|m| (m, RequestShape::Batch))
    } else {
        extract_named(obj, config).map(|m| (m, RequestShape::Named))
    }
}

fn extract_batch(features: &Value) -> Result<Array2<f64>, AppError> {
    let rows = features
        .as_array()
        .ok_or_else(|| AppError::ValidationError("'features' must be an array of arrays".to_string()))?;

    if rows.is_empty() {
        return Err(AppError::ValidationError("'features' must not be empty".to_string()));
    }

    let mut width = None;
    let mut flat = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        let row = row.as_array().ok_or_else(|| {
            AppError::ValidationError(format!("'features' row {} is not an array", i))
        })?;

        match width {
            None => {
                if row.is_empty() {
                    return Err(AppError::ValidationError(
                        "'features' rows must not be empty".to_string(),
                    ));
                }
                width = Some(row.len());
            }
            Some(w) if w != row.len() => {
                return Err(AppError::ValidationError(format!(
                    "'features' row {} has {} values, expected {}",
                    i,
                    row.len(),
                    w
                )));
            }
            _ => {}
        }

        for (j, value) in row.iter().enumerate() {
            flat.push(numeric(value).ok_or_else(|| {
                AppError::ValidationError(format!(
                    "'features' row {} column {} is not a number",
                    i, j
                ))
            })?);
        }
    }

    let width = width.unwrap_or(0);
    Array2::from_shape_vec((rows.len(), width), flat)
        .map_err(|e| AppError::InferenceError(format!("matrix construction failed: {}", e)))
}

fn extract_named(
    obj: &serde_json::Map<String, Value>,
    config: &Config,
) -> Result<Array2<f64>, AppError> {
    let mut values = Vec::with_capacity(config.feature_count());

    for column in &config.feature_columns {
        let value = obj.get(column).ok_or_else(|| {
            AppError::ValidationError(format!("Missing required field '{}'", column))
        })?;
        values.push(numeric(value).ok_or_else(|| {
            AppError::ValidationError(format!("Field '{}' must be a number", column))
        })?);
    }

    Array2::from_shape_vec((1, values.len()), values)
        .map_err(|e| AppError::InferenceError(format!("matrix construction failed: {}", e)))
}

/// Accept any finite JSON number; booleans, strings and null are rejected.
fn numeric(value: &Value) -> Option<f64> {
    value.as_f64().filter(|v| v.is_finite())
}
