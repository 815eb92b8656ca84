//! Storage endpoints.
//!
//! Thin glue over the `FsClient` capability set. The same handlers serve
//! both backends; nothing in here branches on the backend type.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use datagate_core::AppError;
use futures::channel::mpsc;
use futures::SinkExt;
use serde::Deserialize;
use serde_json::json;
use std::pin::Pin;
use std::sync::Arc;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;

/// GET /storage: list storage roots (top-level directories or buckets).
pub async fn list_roots(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let listing = state.fs.list("").await?;
    Ok(Json(json!({ "status": "ok", "data": listing })))
}

/// GET /storage/{dir}: list one directory or bucket.
pub async fn list_dir(
    State(state): State<Arc<AppState>>,
    Path(dir): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let listing = state.fs.list(&dir).await?;
    Ok(Json(json!({ "status": "ok", "data": listing })))
}

/// GET /storage/{dir}/{file}: download raw content as an attachment.
#[tracing::instrument(skip(state), fields(operation = "download"))]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path((dir, file)): Path<(String, String)>,
) -> Result<impl IntoResponse, HttpAppError> {
    let data = state.fs.get(&dir, &file).await?;

    let disposition = format!("attachment; filename={}", file);
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    ))
}

/// POST /storage/{dir}: create a directory or bucket (idempotent).
pub async fn create_dir(
    State(state): State<Arc<AppState>>,
    Path(dir): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.fs.create(&dir).await?;
    Ok(Json(json!({
        "status": "ok",
        "msg": format!("{} created successfully", dir)
    })))
}

/// POST /storage/{dir}/{file}: multipart upload, streamed to the backend.
///
/// Expects a single `file` form field; its bytes are never buffered in
/// full, they stream straight through to the backend.
#[tracing::instrument(skip(state, multipart), fields(operation = "upload"))]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    Path((dir, file)): Path<(String, String)>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        // The field borrows the request body and cannot outlive this scope,
        // so its chunks are pumped through a bounded channel and both sides
        // are driven concurrently. Memory stays bounded by the channel
        // capacity times the chunk size.
        let (mut tx, rx) = mpsc::channel::<std::io::Result<Bytes>>(8);
        let reader: Pin<Box<dyn AsyncRead + Send + Unpin>> = Box::pin(StreamReader::new(rx));

        let pump = async move {
            loop {
                match field.chunk().await {
                    Ok(Some(chunk)) => {
                        if tx.send(Ok(chunk)).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        let _ = tx
                            .send(Err(std::io::Error::new(std::io::ErrorKind::Other, e)))
                            .await;
                        break;
                    }
                }
            }
        };

        // multipart fields don't carry a reliable length, so the backend
        // decides its own streaming strategy
        let upload = state.fs.upload(&dir, &file, &content_type, reader, None);
        let ((), uploaded) = tokio::join!(pump, upload);
        uploaded?;

        return Ok(Json(json!({
            "status": "ok",
            "msg": format!("File {}/{} uploaded successfully", dir, file)
        })));
    }

    Err(HttpAppError(AppError::InvalidInput(
        "missing 'file' form field".to_string(),
    )))
}

/// DELETE /storage/{dir}: delete a directory or bucket recursively.
pub async fn delete_dir(
    State(state): State<Arc<AppState>>,
    Path(dir): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.fs.delete(&dir, "").await?;
    Ok(Json(json!({
        "status": "ok",
        "msg": format!("{} deleted successfully", dir)
    })))
}

#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    /// Version identifier for versioned object deletes; pass-through only.
    pub version_id: Option<String>,
}

/// DELETE /storage/{dir}/{file}: delete a single file or object.
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path((dir, file)): Path<(String, String)>,
    Query(params): Query<DeleteParams>,
) -> Result<impl IntoResponse, HttpAppError> {
    state
        .fs
        .delete_versioned(&dir, &file, params.version_id.as_deref())
        .await?;
    Ok(Json(json!({
        "status": "ok",
        "msg": format!("File {}/{} deleted successfully", dir, file)
    })))
}
