//! Route configuration and setup.

use crate::handlers::{data, storage};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use datagate_core::Config;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;

    let router = Router::new()
        .route("/healthz", get(health))
        .route("/storage", get(storage::list_roots))
        .route(
            "/storage/{dir}",
            get(storage::list_dir)
                .post(storage::create_dir)
                .delete(storage::delete_dir),
        )
        .route(
            "/storage/{dir}/{file}",
            get(storage::download_file)
                .post(storage::upload_file)
                .delete(storage::delete_file),
        )
        .route("/data", get(data::dataset_files))
        .route("/data/files", get(data::dataset_listing))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(router)
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    if config.cors_origins.iter().any(|o| o == "*") {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }

    let origins = config
        .cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|_| anyhow::anyhow!("Invalid CORS origin: {}", origin))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new().allow_origin(origins))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
