//! HTTP client for the external metadata catalog.

use crate::CatalogError;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Opaque metadata record: a mapping from field name to value. Only the
/// configured location attribute is ever read from it.
pub type MetadataRecord = serde_json::Map<String, Value>;

/// Query seam over the metadata catalog.
///
/// The locator depends on this trait instead of a concrete HTTP client so
/// it can be unit-tested against an in-memory source.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Return at most `limit` records matching `query`.
    async fn records(&self, query: &Value, limit: usize) -> Result<Vec<MetadataRecord>, CatalogError>;
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a Value,
    idx: usize,
    limit: usize,
}

/// Catalog client issuing JSON search queries over HTTP.
#[derive(Clone)]
pub struct CatalogClient {
    http_client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl CatalogClient {
    pub fn new(base_url: String, token: Option<String>) -> Result<Self, CatalogError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(CatalogError::Http)?;

        Ok(CatalogClient {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }
}

#[async_trait]
impl MetadataSource for CatalogClient {
    async fn records(
        &self,
        query: &Value,
        limit: usize,
    ) -> Result<Vec<MetadataRecord>, CatalogError> {
        let url = format!("{}/search", self.base_url);
        let body = SearchRequest {
            query,
            idx: 0,
            limit,
        };

        let mut request = self.http_client.post(&url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                url = %url,
                "catalog search request failed"
            );
            return Err(CatalogError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let records: Vec<MetadataRecord> = response.json().await?;
        tracing::debug!(url = %url, records = records.len(), "catalog search");
        Ok(records)
    }
}
