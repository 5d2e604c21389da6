//! Health/info handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct InfoResponse {
    service: &'static str,
    version: &'static str,
    model_loaded: bool,
    timestamp: i64,
}

pub async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        service: "anomaly prediction service",
        version: env!("CARGO_PKG_VERSION"),
        model_loaded: state.detector.is_some(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
