//! Process entry point
//!
//! Initializes logging, loads configuration and model artifacts, and serves
//! the prediction API. Artifact loading happens exactly once; by default a
//! load failure aborts startup (the service has no other purpose), but a
//! deployment can opt into degraded serving with `ALLOW_DEGRADED=true`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use anomaly_serve::config::Config;
use anomaly_serve::detector::Detector;
use anomaly_serve::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "anomaly_serve=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing::info!("Anomaly prediction service starting...");
    tracing::info!(
        "Model: {} | Scaler: {} | Features: {:?}",
        config.model_path,
        config.scaler_path.as_deref().unwrap_or("none"),
        config.feature_columns
    );

    let detector = match Detector::load(&config) {
        Ok(detector) => Some(Arc::new(detector)),
        Err(e) if config.allow_degraded => {
            tracing::error!("Artifact load failed, serving degraded: {}", e);
            None
        }
        Err(e) => {
            return Err(e).context("failed to load model artifacts");
        }
    };

    let state = AppState {
        detector,
        config: config.clone(),
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind listener")?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
