//! Anomaly prediction service
//!
//! Loads a pre-trained Isolation Forest (and an optional fitted feature
//! scaler) once at startup and exposes a single `POST /predict` endpoint
//! that classifies sensor readings as normal or anomalous.
//!
//! ```text
//! HTTP request -> validation -> (optional) scaling -> inference -> response
//! ```
//!
//! The loaded artifacts are immutable for the lifetime of the process and
//! shared read-only across requests.

pub mod config;
pub mod detector;
pub mod error;
pub mod handlers;
pub mod models;

pub use error::{AppError, AppResult};

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Shared application state
///
/// `detector` is `None` only in the degraded state (artifact load failed
/// and the deployment opted to keep serving); every prediction then fails
/// fast without touching inference.
#[derive(Clone)]
pub struct AppState {
    pub detector: Option<Arc<detector::Detector>>,
    pub config: config::Config,
}

/// Create the router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::info))
        .route("/predict", post(handlers::predict::predict))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
