use crate::{FsClient, LocalFsClient, S3FsClient, StorageError, StorageResult};
use datagate_core::{Config, StorageBackend};
use std::sync::Arc;

/// Create a storage backend based on configuration.
///
/// The selection happens exactly once at startup; the returned handle is
/// immutable and shared by reference for the lifetime of the process.
pub async fn create_fs_client(config: &Config) -> StorageResult<Arc<dyn FsClient>> {
    match config.backend() {
        StorageBackend::Local => {
            let root = config.storage_root.clone().ok_or_else(|| {
                StorageError::ConfigError("STORAGE_ROOT not configured".to_string())
            })?;

            let client = LocalFsClient::new(root).await?;
            Ok(Arc::new(client))
        }

        StorageBackend::S3 => {
            let endpoint = config.s3_endpoint.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_ENDPOINT not configured".to_string())
            })?;
            let access_key = config.s3_access_key.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_ACCESS_KEY not configured".to_string())
            })?;
            let access_secret = config.s3_access_secret.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_ACCESS_SECRET not configured".to_string())
            })?;

            let client = S3FsClient::new(
                endpoint,
                config.s3_region.clone(),
                access_key,
                access_secret,
                config.s3_use_ssl,
            )
            .await?;
            Ok(Arc::new(client))
        }
    }
}
