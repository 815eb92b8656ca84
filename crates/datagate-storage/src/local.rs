use crate::paths;
use crate::traits::{FsClient, Listing, Metadata, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use datagate_core::StorageBackend;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::fs;
use tokio::io::AsyncRead;

/// Local filesystem storage backend rooted at a configured directory.
#[derive(Clone)]
pub struct LocalFsClient {
    root: PathBuf,
}

impl LocalFsClient {
    /// Create a new LocalFsClient rooted at `root`, creating the root
    /// directory if it does not exist yet.
    pub async fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();

        fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage root {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(LocalFsClient { root })
    }

    fn resolve(&self, dir: &str, file: Option<&str>) -> StorageResult<PathBuf> {
        paths::resolve(&self.root, dir, file)
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    async fn read_entries(&self, path: &Path) -> StorageResult<Vec<Metadata>> {
        if !fs::try_exists(path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(path.display().to_string()));
        }

        let mut dir = fs::read_dir(path).await?;
        let mut entries = Vec::new();

        while let Some(entry) = dir.next_entry().await? {
            let meta = entry.metadata().await?;
            let modified_time = meta
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            entries.push(Metadata {
                name: entry.file_name().to_string_lossy().into_owned(),
                size: meta.len() as i64,
                modified_time,
                is_directory: meta.is_dir(),
            });
        }

        Ok(entries)
    }
}

#[async_trait]
impl FsClient for LocalFsClient {
    async fn get(&self, dir: &str, file: &str) -> StorageResult<Bytes> {
        if file.is_empty() {
            let listing = self.list(dir).await?;
            let data = serde_json::to_vec(&listing)
                .map_err(|e| StorageError::BackendError(e.to_string()))?;
            return Ok(Bytes::from(data));
        }

        let path = self.resolve(dir, Some(file))?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(format!("{}/{}", dir, file)));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage get successful"
        );

        Ok(Bytes::from(data))
    }

    async fn list(&self, dir: &str) -> StorageResult<Listing> {
        let path = self.resolve(dir, None)?;
        let entries = self.read_entries(&path).await?;

        tracing::debug!(
            path = %path.display(),
            entries = entries.len(),
            "Local storage list"
        );

        Ok(Listing::Entries(entries))
    }

    async fn create(&self, dir: &str) -> StorageResult<()> {
        let path = self.resolve(dir, None)?;

        // create_dir_all succeeds when the directory already exists
        fs::create_dir_all(&path).await.map_err(|e| {
            StorageError::BackendError(format!(
                "Failed to create directory {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::info!(path = %path.display(), "Local storage directory created");

        Ok(())
    }

    async fn upload(
        &self,
        dir: &str,
        file: &str,
        _content_type: &str,
        mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
        _size: Option<i64>,
    ) -> StorageResult<()> {
        let path = self.resolve(dir, Some(file))?;
        let start = std::time::Instant::now();

        self.ensure_parent_dir(&path).await?;

        let mut dest = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        // copy streams through a fixed-size buffer, so memory stays bounded
        // no matter how large the payload is
        let bytes_copied = tokio::io::copy(&mut reader, &mut dest).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to write stream to file {}: {}",
                path.display(),
                e
            ))
        })?;

        dest.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(())
    }

    async fn delete(&self, dir: &str, file: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();

        if file.is_empty() {
            let path = self.resolve(dir, None)?;
            if !fs::try_exists(&path).await.unwrap_or(false) {
                return Err(StorageError::NotFound(dir.to_string()));
            }
            fs::remove_dir_all(&path).await.map_err(|e| {
                StorageError::DeleteFailed(format!(
                    "Failed to delete directory {}: {}",
                    path.display(),
                    e
                ))
            })?;
            tracing::info!(
                path = %path.display(),
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Local storage directory deleted"
            );
            return Ok(());
        }

        let path = self.resolve(dir, Some(file))?;
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(format!("{}/{}", dir, file)));
        }
        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage file deleted"
        );

        Ok(())
    }

    async fn delete_versioned(
        &self,
        dir: &str,
        file: &str,
        version_id: Option<&str>,
    ) -> StorageResult<()> {
        if version_id.is_some() {
            tracing::debug!(dir = %dir, file = %file, "version_id ignored by local backend");
        }
        self.delete(dir, file).await
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
