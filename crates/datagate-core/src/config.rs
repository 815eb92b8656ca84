//! Configuration module
//!
//! Environment-derived configuration for the gateway: server settings, the
//! storage backend selection (local filesystem or S3-compatible store), and
//! the metadata catalog connection used for dataset location lookups.

use std::env;
use std::str::FromStr;

use crate::storage_types::StorageBackend;

const DEFAULT_PORT: u16 = 8340;
const DEFAULT_MAX_UPLOAD_MB: usize = 1024;
const DEFAULT_LOCATION_ATTRIBUTES: &str = "data_location_raw,location";
const DEFAULT_FILE_EXTENSIONS: &str = "png,jpg,tiff";

/// Application configuration for the storage gateway.
///
/// Built once at startup via [`Config::from_env`] and passed down by
/// reference; nothing here is mutated after construction.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    /// Backend selected at startup; `None` falls back to `local`.
    pub storage_backend: Option<StorageBackend>,
    /// Root directory for the local filesystem backend.
    pub storage_root: Option<String>,
    // S3-compatible store settings
    pub s3_endpoint: Option<String>,
    pub s3_region: Option<String>,
    pub s3_access_key: Option<String>,
    pub s3_access_secret: Option<String>,
    pub s3_use_ssl: bool,
    // Metadata catalog settings
    pub catalog_url: Option<String>,
    pub catalog_token: Option<String>,
    /// Ordered candidate attribute names probed for a dataset's raw
    /// data location in catalog records.
    pub location_attributes: Vec<String>,
    /// Default file-extension allowlist used upstream for presentation
    /// filtering only; the core does not enforce it.
    pub file_extensions: Vec<String>,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => Some(StorageBackend::from_str(&value)?),
            Err(_) => None,
        };

        let location_attributes = env::var("LOCATION_ATTRIBUTES")
            .unwrap_or_else(|_| DEFAULT_LOCATION_ATTRIBUTES.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let file_extensions = env::var("FILE_EXTENSIONS")
            .unwrap_or_else(|_| DEFAULT_FILE_EXTENSIONS.to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let max_upload_mb = env::var("MAX_UPLOAD_MB")
            .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_MB.to_string())
            .parse::<usize>()
            .unwrap_or(DEFAULT_MAX_UPLOAD_MB);

        Ok(Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            storage_backend,
            storage_root: env::var("STORAGE_ROOT").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_access_key: env::var("S3_ACCESS_KEY").ok(),
            s3_access_secret: env::var("S3_ACCESS_SECRET").ok(),
            s3_use_ssl: env::var("S3_USE_SSL")
                .unwrap_or_else(|_| "false".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(false),
            catalog_url: env::var("CATALOG_URL").ok(),
            catalog_token: env::var("CATALOG_TOKEN").ok(),
            location_attributes,
            file_extensions,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Backend selection with the documented `local` fallback.
    pub fn backend(&self) -> StorageBackend {
        self.storage_backend.unwrap_or(StorageBackend::Local)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_port: DEFAULT_PORT,
            cors_origins: vec!["*".to_string()],
            environment: "development".to_string(),
            storage_backend: None,
            storage_root: None,
            s3_endpoint: None,
            s3_region: None,
            s3_access_key: None,
            s3_access_secret: None,
            s3_use_ssl: false,
            catalog_url: None,
            catalog_token: None,
            location_attributes: DEFAULT_LOCATION_ATTRIBUTES
                .split(',')
                .map(String::from)
                .collect(),
            file_extensions: DEFAULT_FILE_EXTENSIONS.split(',').map(String::from).collect(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_backend_is_local() {
        let config = Config::default();
        assert_eq!(config.backend(), StorageBackend::Local);
    }

    #[test]
    fn default_extension_allowlist_matches_fallback() {
        let config = Config::default();
        assert_eq!(config.file_extensions, vec!["png", "jpg", "tiff"]);
    }
}
