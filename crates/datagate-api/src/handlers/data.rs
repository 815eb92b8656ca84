//! Dataset endpoints.
//!
//! A request for a dataset's files resolves the DID to a physical location
//! through the metadata catalog first, then lists or walks that location.
//! Traversals are synchronous filesystem work and run on the blocking
//! pool.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use datagate_catalog::Locator;
use datagate_core::AppError;
use datagate_discovery::{find_files, list_dir};
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

fn locator(state: &AppState) -> Result<&Locator, HttpAppError> {
    state.locator.as_ref().ok_or_else(|| {
        HttpAppError(AppError::Internal(
            "metadata catalog not configured".to_string(),
        ))
    })
}

fn default_pattern() -> String {
    "all".to_string()
}

#[derive(Debug, Deserialize)]
pub struct DataParams {
    pub did: String,
    /// Regex matched against file base names, or the "all" sentinel.
    #[serde(default = "default_pattern")]
    pub pattern: String,
}

/// GET /data: resolve a DID and recursively collect matching files.
///
/// The walk is best-effort: per-entry failures come back as `warnings`
/// next to the files that were found.
#[tracing::instrument(skip(state), fields(did = %params.did, pattern = %params.pattern))]
pub async fn dataset_files(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DataParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    let location = locator(&state)?.locate(&params.did).await?;

    let pattern = params.pattern.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        find_files(Path::new(&location), &pattern)
    })
    .await
    .map_err(|e| AppError::Internal(format!("walk task failed: {}", e)))??;

    let files: Vec<String> = outcome
        .files
        .iter()
        .map(|p| p.display().to_string())
        .collect();

    Ok(Json(json!({
        "status": "ok",
        "files": files,
        "warnings": outcome.warnings,
    })))
}

#[derive(Debug, Deserialize)]
pub struct FilesParams {
    pub did: String,
    /// Optional sub-path within the dataset's raw location.
    #[serde(default)]
    pub sub: String,
}

/// GET /data/files: resolve a DID and list one level of its tree.
#[tracing::instrument(skip(state), fields(did = %params.did, sub = %params.sub))]
pub async fn dataset_listing(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FilesParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    let location = locator(&state)?.locate(&params.did).await?;

    // the sub-path is caller-controlled; keep it inside the dataset root
    let path = datagate_storage::paths::resolve(Path::new(&location), &params.sub, None)?;

    let did = params.did.clone();
    let sub = params.sub.clone();
    let entries = tokio::task::spawn_blocking(move || list_dir(&did, &path, &sub))
        .await
        .map_err(|e| AppError::Internal(format!("listing task failed: {}", e)))??;

    Ok(Json(json!({ "status": "ok", "data": entries })))
}
