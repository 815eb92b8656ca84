use crate::traits::{
    BucketObject, FsClient, Listing, ObjectInfo, StorageError, StorageResult,
};
use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::operation::create_bucket::CreateBucketError;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Error;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_sdk_s3::Client;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use datagate_core::StorageBackend;
use std::pin::Pin;
use tokio::io::{AsyncRead, AsyncReadExt};

const DEFAULT_REGION: &str = "us-east-1";

// Multipart parts must be at least 5MB except the last one
const MULTIPART_THRESHOLD: i64 = 5 * 1024 * 1024;
const PART_SIZE: usize = 5 * 1024 * 1024;

/// S3-compatible object storage backend.
///
/// A "dir" maps to a bucket and a "file" to an object key; the object
/// namespace under a bucket is flat, so listings cover every object in
/// the bucket rather than one hierarchy level.
#[derive(Clone)]
pub struct S3FsClient {
    client: Client,
}

/// Normalize a configured endpoint (possibly just `host:port`) into a URL,
/// using the TLS flag when no scheme is present.
fn endpoint_url(endpoint: &str, use_ssl: bool) -> String {
    if endpoint.contains("://") {
        endpoint.trim_end_matches('/').to_string()
    } else {
        let scheme = if use_ssl { "https" } else { "http" };
        format!("{}://{}", scheme, endpoint.trim_end_matches('/'))
    }
}

/// Both a missing key and a missing bucket mean the object is absent.
/// NoSuchBucket is not a modeled `GetObjectError` variant, so it is
/// matched through the error metadata code.
fn not_found_from_get(dir: &str, file: &str, err: &GetObjectError) -> Option<StorageError> {
    if matches!(err, GetObjectError::NoSuchKey(_)) {
        return Some(StorageError::NotFound(format!("{}/{}", dir, file)));
    }
    if err.meta().code() == Some("NoSuchBucket") {
        return Some(StorageError::NotFound(dir.to_string()));
    }
    None
}

/// Fill `buffer` from `reader`, stopping at EOF or a full buffer. Short
/// reads are accumulated so a part is only short at end of stream.
async fn fill_part<R: AsyncRead + Unpin>(
    reader: &mut R,
    buffer: &mut [u8],
) -> StorageResult<usize> {
    let mut filled = 0usize;
    while filled < buffer.len() {
        let bytes_read = reader.read(&mut buffer[filled..]).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to read from stream: {}", e))
        })?;
        if bytes_read == 0 {
            break;
        }
        filled += bytes_read;
    }
    Ok(filled)
}

impl S3FsClient {
    /// Create a new S3FsClient for an S3-compatible endpoint (MinIO, Ceph
    /// RGW, AWS itself). Path-style addressing is forced so bucket names
    /// never have to resolve through DNS.
    pub async fn new(
        endpoint: String,
        region: Option<String>,
        access_key: String,
        access_secret: String,
        use_ssl: bool,
    ) -> StorageResult<Self> {
        let region = region.unwrap_or_else(|| DEFAULT_REGION.to_string());
        let region_provider =
            RegionProviderChain::first_try(aws_config::Region::new(region)).or_else(DEFAULT_REGION);

        let shared_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .load()
            .await;

        let credentials = Credentials::new(access_key, access_secret, None, None, "datagate");

        let s3_config = aws_sdk_s3::config::Builder::from(&shared_config)
            .endpoint_url(endpoint_url(&endpoint, use_ssl))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Ok(S3FsClient {
            client: Client::from_conf(s3_config),
        })
    }

    async fn list_buckets(&self) -> StorageResult<Vec<String>> {
        let output = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        Ok(output
            .buckets()
            .iter()
            .filter_map(|b| b.name().map(str::to_string))
            .collect())
    }

    async fn bucket_content(&self, bucket: &str) -> StorageResult<BucketObject> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .into_paginator()
            .send();

        let mut objects = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| match e.as_service_error() {
                Some(ListObjectsV2Error::NoSuchBucket(_)) => {
                    StorageError::NotFound(bucket.to_string())
                }
                _ => StorageError::BackendError(e.to_string()),
            })?;

            for obj in page.contents() {
                objects.push(ObjectInfo {
                    key: obj.key().unwrap_or_default().to_string(),
                    size: obj.size().unwrap_or(0),
                    last_modified: obj
                        .last_modified()
                        .and_then(|t| t.to_millis().ok())
                        .and_then(DateTime::<Utc>::from_timestamp_millis),
                    etag: obj.e_tag().map(str::to_string),
                });
            }
        }

        Ok(BucketObject {
            bucket: bucket.to_string(),
            objects,
        })
    }

    async fn upload_multipart(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<u64> {
        let mut part_buffer = vec![0u8; PART_SIZE];
        let first_part = fill_part(&mut reader, &mut part_buffer).await?;

        // Multipart completion requires at least one part, so payloads
        // that fit in a single part (including empty ones) go through a
        // plain PUT instead.
        if first_part < PART_SIZE {
            self.client
                .put_object()
                .bucket(bucket)
                .key(key)
                .content_type(content_type)
                .body(ByteStream::from(Bytes::copy_from_slice(
                    &part_buffer[..first_part],
                )))
                .send()
                .await
                .map_err(|e| {
                    tracing::error!(
                        error = %e,
                        bucket = %bucket,
                        key = %key,
                        "S3 upload failed"
                    );
                    StorageError::UploadFailed(e.to_string())
                })?;
            return Ok(first_part as u64);
        }

        let create_result = self
            .client
            .create_multipart_upload()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %bucket,
                    key = %key,
                    "Failed to create multipart upload"
                );
                StorageError::UploadFailed(e.to_string())
            })?;

        let upload_id = create_result
            .upload_id()
            .ok_or_else(|| {
                StorageError::UploadFailed("No upload ID returned from S3".to_string())
            })?
            .to_string();

        // A failed upload must not leave incomplete-upload storage behind
        match self
            .upload_parts(bucket, key, &upload_id, reader, part_buffer, first_part)
            .await
        {
            Ok(total_size) => Ok(total_size),
            Err(e) => {
                self.abort_upload(bucket, key, &upload_id).await;
                Err(e)
            }
        }
    }

    async fn upload_parts(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
        mut part_buffer: Vec<u8>,
        first_part: usize,
    ) -> StorageResult<u64> {
        let mut part_number = 1i32;
        let mut parts = Vec::new();
        let mut total_size = 0u64;
        let mut bytes_in_part = first_part;

        loop {
            if bytes_in_part == 0 {
                break;
            }

            total_size += bytes_in_part as u64;

            let part_body = ByteStream::from(Bytes::copy_from_slice(&part_buffer[..bytes_in_part]));

            let upload_part_result = self
                .client
                .upload_part()
                .bucket(bucket)
                .key(key)
                .upload_id(upload_id)
                .part_number(part_number)
                .body(part_body)
                .send()
                .await
                .map_err(|e| {
                    tracing::error!(
                        error = %e,
                        bucket = %bucket,
                        key = %key,
                        part_number = part_number,
                        "Failed to upload part"
                    );
                    StorageError::UploadFailed(e.to_string())
                })?;

            let etag = upload_part_result
                .e_tag()
                .ok_or_else(|| {
                    StorageError::UploadFailed(format!(
                        "No ETag returned for part {}",
                        part_number
                    ))
                })?
                .to_string();

            parts.push(
                CompletedPart::builder()
                    .part_number(part_number)
                    .e_tag(etag)
                    .build(),
            );

            part_number += 1;

            if bytes_in_part < PART_SIZE {
                break; // short part means EOF
            }

            bytes_in_part = fill_part(&mut reader, &mut part_buffer).await?;
        }

        let completed_parts = CompletedMultipartUpload::builder()
            .set_parts(Some(parts))
            .build();

        self.client
            .complete_multipart_upload()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(completed_parts)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %bucket,
                    key = %key,
                    "Failed to complete multipart upload"
                );
                StorageError::UploadFailed(e.to_string())
            })?;

        Ok(total_size)
    }

    async fn abort_upload(&self, bucket: &str, key: &str, upload_id: &str) {
        if let Err(e) = self
            .client
            .abort_multipart_upload()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .send()
            .await
        {
            tracing::warn!(
                error = %e,
                bucket = %bucket,
                key = %key,
                "Failed to abort multipart upload"
            );
        }
    }
}

#[async_trait]
impl FsClient for S3FsClient {
    async fn get(&self, dir: &str, file: &str) -> StorageResult<Bytes> {
        if file.is_empty() {
            let listing = self.list(dir).await?;
            let data = serde_json::to_vec(&listing)
                .map_err(|e| StorageError::BackendError(e.to_string()))?;
            return Ok(Bytes::from(data));
        }

        let start = std::time::Instant::now();

        let response = self
            .client
            .get_object()
            .bucket(dir)
            .key(file)
            .send()
            .await
            .map_err(|e| {
                if let Some(not_found) = e
                    .as_service_error()
                    .and_then(|se| not_found_from_get(dir, file, se))
                {
                    return not_found;
                }
                tracing::error!(
                    error = %e,
                    bucket = %dir,
                    key = %file,
                    "S3 download failed"
                );
                StorageError::DownloadFailed(e.to_string())
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?
            .into_bytes();

        tracing::info!(
            bucket = %dir,
            key = %file,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 download successful"
        );

        Ok(data)
    }

    async fn list(&self, dir: &str) -> StorageResult<Listing> {
        if dir.is_empty() {
            let buckets = self.list_buckets().await?;
            tracing::debug!(buckets = buckets.len(), "S3 bucket listing");
            return Ok(Listing::Buckets(buckets));
        }

        let content = self.bucket_content(dir).await?;
        tracing::debug!(
            bucket = %dir,
            objects = content.objects.len(),
            "S3 object listing"
        );
        Ok(Listing::Objects(content))
    }

    async fn create(&self, dir: &str) -> StorageResult<()> {
        let result = self.client.create_bucket().bucket(dir).send().await;

        match result {
            Ok(_) => {
                tracing::info!(bucket = %dir, "S3 bucket created");
                Ok(())
            }
            Err(e) => match e.as_service_error() {
                // Re-creating a bucket we already own is success, not failure
                Some(CreateBucketError::BucketAlreadyOwnedByYou(_))
                | Some(CreateBucketError::BucketAlreadyExists(_)) => {
                    tracing::warn!(bucket = %dir, "S3 bucket already exists");
                    Ok(())
                }
                _ => {
                    tracing::error!(error = %e, bucket = %dir, "Failed to create S3 bucket");
                    Err(StorageError::BackendError(e.to_string()))
                }
            },
        }
    }

    async fn upload(
        &self,
        dir: &str,
        file: &str,
        content_type: &str,
        mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
        size: Option<i64>,
    ) -> StorageResult<()> {
        let start = std::time::Instant::now();

        // Payloads known to be small go through a buffered single PUT;
        // everything else streams in bounded parts, falling back to a
        // single PUT when the stream turns out to fit in one part.
        let use_multipart = size.map(|len| len > MULTIPART_THRESHOLD).unwrap_or(true);

        let total_size = if use_multipart {
            self.upload_multipart(dir, file, content_type, reader).await?
        } else {
            let mut buffer = Vec::with_capacity(size.unwrap_or(0).max(0) as usize);
            reader.read_to_end(&mut buffer).await.map_err(|e| {
                StorageError::UploadFailed(format!("Failed to read from stream: {}", e))
            })?;
            let total = buffer.len() as u64;

            self.client
                .put_object()
                .bucket(dir)
                .key(file)
                .content_type(content_type)
                .body(ByteStream::from(Bytes::from(buffer)))
                .send()
                .await
                .map_err(|e| {
                    tracing::error!(
                        error = %e,
                        bucket = %dir,
                        key = %file,
                        "S3 upload failed"
                    );
                    StorageError::UploadFailed(e.to_string())
                })?;
            total
        };

        tracing::info!(
            bucket = %dir,
            key = %file,
            size_bytes = total_size,
            multipart = use_multipart,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }

    async fn delete(&self, dir: &str, file: &str) -> StorageResult<()> {
        if !file.is_empty() {
            return self.delete_versioned(dir, file, None).await;
        }

        // Buckets must be empty before removal, so drain the objects first
        let content = self.bucket_content(dir).await?;
        for obj in &content.objects {
            self.client
                .delete_object()
                .bucket(dir)
                .key(&obj.key)
                .send()
                .await
                .map_err(|e| StorageError::DeleteFailed(e.to_string()))?;
        }

        self.client
            .delete_bucket()
            .bucket(dir)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, bucket = %dir, "Failed to delete S3 bucket");
                StorageError::DeleteFailed(e.to_string())
            })?;

        tracing::info!(
            bucket = %dir,
            drained_objects = content.objects.len(),
            "S3 bucket deleted"
        );

        Ok(())
    }

    async fn delete_versioned(
        &self,
        dir: &str,
        file: &str,
        version_id: Option<&str>,
    ) -> StorageResult<()> {
        let start = std::time::Instant::now();

        let mut request = self.client.delete_object().bucket(dir).key(file);
        if let Some(version_id) = version_id {
            request = request.version_id(version_id);
        }

        request.send().await.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %dir,
                key = %file,
                version_id = ?version_id,
                "S3 delete failed"
            );
            StorageError::DeleteFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %dir,
            key = %file,
            version_id = ?version_id,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::error::ErrorMetadata;

    #[test]
    fn endpoint_url_adds_scheme_from_tls_flag() {
        assert_eq!(endpoint_url("minio:9000", false), "http://minio:9000");
        assert_eq!(endpoint_url("minio:9000", true), "https://minio:9000");
    }

    #[test]
    fn endpoint_url_keeps_explicit_scheme() {
        assert_eq!(
            endpoint_url("https://s3.example.com/", false),
            "https://s3.example.com"
        );
        assert_eq!(
            endpoint_url("http://localhost:9000", true),
            "http://localhost:9000"
        );
    }

    #[tokio::test]
    async fn fill_part_reports_zero_bytes_on_empty_stream() {
        let mut reader = std::io::Cursor::new(Vec::new());
        let mut buffer = vec![0u8; 8];

        // An empty payload must yield a zero-length first part so the
        // upload takes the single PUT path instead of completing a
        // multipart upload with no parts.
        assert_eq!(fill_part(&mut reader, &mut buffer).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn fill_part_accumulates_short_reads() {
        let mut reader =
            std::io::Cursor::new(b"abc".to_vec()).chain(std::io::Cursor::new(b"defgh".to_vec()));
        let mut buffer = vec![0u8; 6];

        assert_eq!(fill_part(&mut reader, &mut buffer).await.unwrap(), 6);
        assert_eq!(&buffer[..6], b"abcdef");

        let mut buffer = vec![0u8; 8];
        assert_eq!(fill_part(&mut reader, &mut buffer).await.unwrap(), 2);
        assert_eq!(&buffer[..2], b"gh");
    }

    #[test]
    fn missing_key_and_missing_bucket_both_map_to_not_found() {
        let no_key =
            GetObjectError::NoSuchKey(aws_sdk_s3::types::error::NoSuchKey::builder().build());
        assert!(matches!(
            not_found_from_get("bucket", "a.txt", &no_key),
            Some(StorageError::NotFound(_))
        ));

        let no_bucket =
            GetObjectError::generic(ErrorMetadata::builder().code("NoSuchBucket").build());
        assert!(matches!(
            not_found_from_get("bucket", "a.txt", &no_bucket),
            Some(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn other_get_errors_are_not_treated_as_not_found() {
        let throttled =
            GetObjectError::generic(ErrorMetadata::builder().code("SlowDown").build());
        assert!(not_found_from_get("bucket", "a.txt", &throttled).is_none());
    }
}
