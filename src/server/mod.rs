pub mod handlers;
mod types;

pub use types::{ErrorResponse, HealthResponse, InfoResponse, PredictionResponse};

use crate::{Result, artifacts::ArtifactSet, config::Config, inference::PricePredictor};
use axum::{
    Router,
    routing::{get, post},
};
use std::{net::SocketAddr, path::Path, sync::Arc};
use tower_http::{cors::CorsLayer, services::ServeFile, trace::TraceLayer};
use tracing::info;

/// Routes of the prediction API, `/ui` served from `ui_dir/index.html`.
pub fn router(predictor: Arc<PricePredictor>, ui_dir: impl AsRef<Path>) -> Router {
    let app_state = handlers::AppState { predictor };

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/artifacts", get(handlers::artifacts))
        .route("/predict", post(handlers::predict))
        .route_service("/ui", ServeFile::new(ui_dir.as_ref().join("index.html")))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

pub async fn run(config: Config) -> Result<()> {
    // All artifacts must load before the listener binds
    let artifacts_dir =
        std::env::var("ARTIFACTS_DIR").unwrap_or_else(|_| config.artifacts.dir.clone());
    let artifacts = ArtifactSet::load(&artifacts_dir)?;
    let predictor = Arc::new(PricePredictor::new(artifacts));

    let app = router(predictor, &config.server.ui_dir);

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
