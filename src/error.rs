//! Error handling
//!
//! Every failure in the prediction path is converted to the structured
//! `{"status": "error", "message": ...}` body at the request boundary;
//! nothing propagates to the transport layer as an unhandled fault.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    /// Artifacts failed to load at startup; the service is degraded and
    /// fails every prediction fast.
    ModelUnavailable(String),

    /// Client input error: missing field, wrong shape, non-numeric value,
    /// mismatched feature count.
    ValidationError(String),

    /// Unexpected failure during scaling or inference.
    InferenceError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::ModelUnavailable(msg) => {
                tracing::error!("Model unavailable: {}", msg);
                (StatusCode::SERVICE_UNAVAILABLE, "Model artifacts not loaded".to_string())
            }
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InferenceError(msg) => {
                tracing::error!("Inference error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal prediction error".to_string())
            }
        };

        let body = Json(json!({
            "status": "error",
            "message": message
        }));

        (status, body).into_response()
    }
}

impl From<crate::detector::DetectorError> for AppError {
    fn from(err: crate::detector::DetectorError) -> Self {
        use crate::detector::DetectorError;
        match err {
            DetectorError::ShapeMismatch { .. } => AppError::ValidationError(err.to_string()),
            DetectorError::MalformedTree(msg) => AppError::InferenceError(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_maps_to_400() {
        let response = AppError::ValidationError("missing field 'vibration'".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn inference_error_hides_detail() {
        // Internal errors surface a generic message only
        let response = AppError::InferenceError("ndarray shape panic detail".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn model_unavailable_maps_to_503() {
        let response = AppError::ModelUnavailable("no artifact".into()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
