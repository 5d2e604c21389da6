//! Prediction handler
//!
//! Request flow: validate body to a feature matrix, scale (if fitted),
//! infer, shape the response. Every failure maps to the structured error
//! body; a malformed or degraded request never reaches the model.

use axum::extract::rejection::JsonRejection;
use axum::{extract::State, Json};
use serde_json::Value;

use crate::models::{extract_features, PredictResponse, RequestShape};
use crate::{AppError, AppResult, AppState};

pub async fn predict(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<PredictResponse>> {
    let Json(body) = body
        .map_err(|e| AppError::ValidationError(format!("Invalid JSON body: {}", e.body_text())))?;

    let detector = state
        .detector
        .as_ref()
        .ok_or_else(|| AppError::ModelUnavailable("artifact load failed at startup".to_string()))?;

    let (matrix, shape) = extract_features(&body, &state.config)?;

    let rows = detector.predict(&matrix)?;

    tracing::debug!(
        "Scored {} row(s), {} anomalous",
        rows.len(),
        rows.iter().filter(|r| r.label.is_anomaly()).count()
    );

    let response = match shape {
        RequestShape::Named => {
            let row = rows
                .first()
                .ok_or_else(|| AppError::InferenceError("empty prediction result".to_string()))?;
            PredictResponse::single(row, state.config.report_scores)
        }
        RequestShape::Batch => PredictResponse::batch(&rows, state.config.report_scores),
    };
    Ok(Json(response))
}
