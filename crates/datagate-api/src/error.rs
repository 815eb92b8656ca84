//! HTTP error response conversion
//!
//! Component errors (storage, catalog, discovery) are mapped into the core
//! `AppError` taxonomy here, at the edge, and rendered through one JSON
//! shape. Handlers return `Result<impl IntoResponse, HttpAppError>` and
//! use `?` throughout.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use datagate_catalog::CatalogError;
use datagate_core::{AppError, ErrorMetadata, LogLevel};
use datagate_discovery::DiscoveryError;
use datagate_storage::StorageError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: String,
    pub error: String,
    /// Machine-readable error code for programmatic handling
    pub code: String,
}

/// Wrapper type for AppError to implement IntoResponse.
/// Needed because of the orphan rule: IntoResponse is axum's trait and
/// AppError lives in datagate-core.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app_error = match err {
            StorageError::NotFound(msg) => AppError::NotFound(msg),
            StorageError::InvalidPath(msg) => AppError::InvalidInput(msg),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
            other => AppError::Storage(other.to_string()),
        };
        HttpAppError(app_error)
    }
}

impl From<CatalogError> for HttpAppError {
    fn from(err: CatalogError) -> Self {
        let app_error = match err {
            CatalogError::ConfigError(msg) => AppError::Internal(msg),
            other => AppError::Catalog(other.to_string()),
        };
        HttpAppError(app_error)
    }
}

impl From<DiscoveryError> for HttpAppError {
    fn from(err: DiscoveryError) -> Self {
        let app_error = match err {
            DiscoveryError::InvalidPattern(msg) => {
                AppError::InvalidInput(format!("invalid regex pattern: {}", msg))
            }
            DiscoveryError::NotFound(msg) => AppError::NotFound(msg),
            DiscoveryError::IoError(e) => AppError::Internal(e.to_string()),
        };
        HttpAppError(app_error)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

fn log_error(error: &AppError) {
    let error_code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, code = error_code, "Request failed");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, code = error_code, "Request failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, code = error_code, "Request failed");
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        log_error(&self.0);

        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse {
            status: "fail".to_string(),
            error: self.0.client_message(),
            code: self.0.error_code().to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_not_found_maps_to_404() {
        let err = HttpAppError::from(StorageError::NotFound("projects/a.txt".to_string()));
        assert_eq!(err.0.http_status_code(), 404);
    }

    #[test]
    fn invalid_path_and_pattern_map_to_400() {
        let err = HttpAppError::from(StorageError::InvalidPath("..".to_string()));
        assert_eq!(err.0.http_status_code(), 400);

        let err = HttpAppError::from(DiscoveryError::InvalidPattern("(".to_string()));
        assert_eq!(err.0.http_status_code(), 400);
    }

    #[test]
    fn catalog_contract_failures_map_to_502() {
        let err = HttpAppError::from(CatalogError::AmbiguousOrMissingRecord {
            did: "x".to_string(),
            found: 0,
        });
        assert_eq!(err.0.http_status_code(), 502);
    }
}
