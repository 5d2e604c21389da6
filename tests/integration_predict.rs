//! End-to-end prediction flow tests
//!
//! Artifacts are written to a temp directory and loaded through the same
//! path the binary uses, then requests are driven through the axum handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};
use tempfile::TempDir;

use anomaly_serve::config::Config;
use anomaly_serve::detector::Detector;
use anomaly_serve::handlers::predict::predict;
use anomaly_serve::{AppError, AppState};

/// One tree over (current, temperature, vibration): current above 10
/// isolates immediately, current at or below 5 lands in a populated leaf.
const FOREST_JSON: &str = r#"{
    "n_features": 3,
    "max_samples": 4,
    "offset": -0.5,
    "trees": [{"nodes": [
        {"feature": 0, "threshold": 10.0, "left": 1, "right": 2},
        {"feature": 0, "threshold": 5.0, "left": 3, "right": 4},
        {"n_samples": 1},
        {"n_samples": 2},
        {"n_samples": 1}
    ]}]
}"#;

const IDENTITY_SCALER_JSON: &str = r#"{
    "mean": [0.0, 0.0, 0.0],
    "scale": [1.0, 1.0, 1.0]
}"#;

fn setup(with_scaler: bool) -> (TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap();

    let model_path = dir.path().join("isolation_forest_model.json");
    std::fs::write(&model_path, FOREST_JSON).unwrap();

    let scaler_path = if with_scaler {
        let path = dir.path().join("scaler.json");
        std::fs::write(&path, IDENTITY_SCALER_JSON).unwrap();
        Some(path.to_str().unwrap().to_string())
    } else {
        None
    };

    let config = Config {
        model_path: model_path.to_str().unwrap().to_string(),
        scaler_path,
        ..Config::default()
    };

    let detector = Detector::load(&config).unwrap();
    let state = AppState {
        detector: Some(Arc::new(detector)),
        config,
    };
    (dir, state)
}

async fn call(state: &AppState, body: Value) -> Result<Value, AppError> {
    predict(State(state.clone()), Ok(Json(body)))
        .await
        .map(|Json(response)| serde_json::to_value(response).unwrap())
}

#[tokio::test]
async fn normal_reading_classified_normal() {
    let (_dir, state) = setup(true);

    let response = call(&state, json!({"current": 2.1, "temperature": 35.0, "vibration": 0.02}))
        .await
        .unwrap();

    assert_eq!(response["status"], "success");
    assert_eq!(response["is_anomaly"], false);
    assert!(response["score"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn missing_field_is_client_error_naming_the_field() {
    let (_dir, state) = setup(false);

    let err = call(&state, json!({"current": 2.1, "temperature": 35.0}))
        .await
        .unwrap_err();

    match &err {
        AppError::ValidationError(msg) => assert!(msg.contains("vibration"), "message: {}", msg),
        other => panic!("expected validation error, got {:?}", other),
    }
    assert_eq!(err.into_response().status(), 400);
}

#[tokio::test]
async fn batch_flags_outlier_row_and_preserves_order() {
    let (_dir, state) = setup(false);

    let response = call(&state, json!({"features": [[1, 2, 3], [100, 200, 300]]}))
        .await
        .unwrap();

    assert_eq!(response["status"], "success");
    let results = response["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);

    assert_eq!(results[0]["prediction"], "normal");
    assert_eq!(results[0]["is_anomaly"], 0);
    assert_eq!(results[1]["prediction"], "anomaly");
    assert_eq!(results[1]["is_anomaly"], 1);
    assert!(results[1]["anomaly_score"].as_f64().unwrap() < 0.0);
}

#[tokio::test]
async fn repeated_requests_are_idempotent() {
    let (_dir, state) = setup(true);

    let body = json!({"current": 7.0, "temperature": 40.0, "vibration": 0.5});
    let first = call(&state, body.clone()).await.unwrap();
    let second = call(&state, body).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn wrong_feature_count_is_client_error() {
    let (_dir, state) = setup(false);

    let err = call(&state, json!({"features": [[1, 2, 3, 4]]}))
        .await
        .unwrap_err();

    match &err {
        AppError::ValidationError(msg) => assert!(msg.contains("shape"), "message: {}", msg),
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn degraded_state_fails_fast_with_503() {
    let (_dir, loaded) = setup(false);
    let state = AppState {
        detector: None,
        config: loaded.config,
    };

    let err = call(&state, json!({"current": 1.0, "temperature": 1.0, "vibration": 1.0}))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::ModelUnavailable(_)));
    assert_eq!(err.into_response().status(), 503);
}

#[tokio::test]
async fn scores_omitted_when_reporting_disabled() {
    let (_dir, mut state) = setup(false);
    state.config.report_scores = false;

    let single = call(&state, json!({"current": 2.1, "temperature": 35.0, "vibration": 0.02}))
        .await
        .unwrap();
    assert!(single.get("score").is_none());

    let batch = call(&state, json!({"features": [[1, 2, 3]]})).await.unwrap();
    assert!(batch["results"][0].get("anomaly_score").is_none());
}

#[tokio::test]
async fn scaler_shifts_raw_readings_before_inference() {
    let (_dir, mut state) = setup(false);

    // Re-load with a scaler centered on the anomalous region: the raw
    // reading 102.1 standardizes back into the normal cluster.
    let dir = tempfile::tempdir().unwrap();
    let scaler_path = dir.path().join("scaler.json");
    std::fs::write(&scaler_path, r#"{"mean": [100.0, 0.0, 0.0], "scale": [1.0, 1.0, 1.0]}"#)
        .unwrap();
    state.config.scaler_path = Some(scaler_path.to_str().unwrap().to_string());
    state.detector = Some(Arc::new(Detector::load(&state.config).unwrap()));

    let response = call(&state, json!({"current": 102.1, "temperature": 0.0, "vibration": 0.0}))
        .await
        .unwrap();
    assert_eq!(response["is_anomaly"], false);
}

#[test]
fn load_failure_surfaces_artifact_error() {
    let config = Config {
        model_path: "/nonexistent/model.json".to_string(),
        ..Config::default()
    };
    assert!(Detector::load(&config).is_err());
}
