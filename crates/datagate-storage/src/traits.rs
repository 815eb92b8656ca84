//! Storage abstraction trait
//!
//! This module defines the FsClient trait that all storage backends must
//! implement, together with the listing types they produce.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use datagate_core::StorageBackend;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Immutable snapshot of one directory entry at listing time.
///
/// No locking is performed; staleness between listing and a subsequent
/// operation is expected and acceptable.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Metadata {
    pub name: String,
    pub size: i64,
    pub modified_time: DateTime<Utc>,
    pub is_directory: bool,
}

/// One object in a bucket listing.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ObjectInfo {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
    pub etag: Option<String>,
}

/// Full content of a bucket: the flat object namespace under one bucket.
#[derive(Debug, Clone, serde::Serialize)]
pub struct BucketObject {
    pub bucket: String,
    pub objects: Vec<ObjectInfo>,
}

/// Result of a `list` call.
///
/// The local backend enumerates immediate children only; the object
/// backend lists every object under a bucket because the namespace is
/// flat. That asymmetry is intrinsic to the two paradigms and is kept
/// visible here rather than papered over.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(untagged)]
pub enum Listing {
    /// Immediate children of a local directory.
    Entries(Vec<Metadata>),
    /// Bucket names (object backend, empty dir).
    Buckets(Vec<String>),
    /// All objects under one bucket (object backend).
    Objects(BucketObject),
}

/// Unified storage capability set.
///
/// Both backends (local filesystem, S3-compatible object store) implement
/// this trait; the backend is selected once at startup and carried as an
/// immutable `Arc<dyn FsClient>` for the lifetime of the process.
///
/// Errors propagate unwrapped to the caller; no retries happen at this
/// layer. The only error recovered internally is "already exists" during
/// `create`, which is treated as success.
#[async_trait]
pub trait FsClient: Send + Sync {
    /// Fetch raw content of `dir/file`. An empty `file` returns the
    /// serialized listing of `dir` instead.
    async fn get(&self, dir: &str, file: &str) -> StorageResult<Bytes>;

    /// Enumerate `dir`. An empty `dir` lists the storage roots (top-level
    /// directories or buckets).
    async fn list(&self, dir: &str) -> StorageResult<Listing>;

    /// Create a directory (with intermediates) or a bucket. Idempotent.
    async fn create(&self, dir: &str) -> StorageResult<()>;

    /// Stream `reader` into `dir/file` using bounded memory regardless of
    /// payload size. `size` is a hint when the caller knows it; backends
    /// must not rely on it to buffer the whole payload.
    async fn upload(
        &self,
        dir: &str,
        file: &str,
        content_type: &str,
        reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
        size: Option<i64>,
    ) -> StorageResult<()>;

    /// Delete `dir/file`. An empty `file` deletes the whole directory or
    /// bucket recursively.
    async fn delete(&self, dir: &str, file: &str) -> StorageResult<()>;

    /// Delete a single object at a specific version. Pass-through only;
    /// the local backend ignores `version_id`.
    async fn delete_versioned(
        &self,
        dir: &str,
        file: &str,
        version_id: Option<&str>,
    ) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
