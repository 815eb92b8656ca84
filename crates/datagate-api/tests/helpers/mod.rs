//! Test helpers: build the application router over a temp-dir local backend.
//!
//! Run with: `cargo test -p datagate-api`. The catalog, when a test needs
//! one, is served from memory; no external services are required.

#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use datagate_api::setup::routes;
use datagate_api::state::AppState;
use datagate_catalog::{CatalogError, Locator, MetadataRecord, MetadataSource};
use datagate_core::Config;
use datagate_storage::{FsClient, LocalFsClient};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;

/// Test application: server plus the owned storage root.
pub struct TestApp {
    pub server: TestServer,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

/// Setup a test app with local storage and no catalog configured.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with_records(None).await
}

/// Setup a test app whose catalog locator resolves DIDs against the given
/// in-memory records.
pub async fn setup_test_app_with_records(records: Option<Vec<MetadataRecord>>) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

    let fs: Arc<dyn FsClient> = Arc::new(
        LocalFsClient::new(temp_dir.path())
            .await
            .expect("Failed to create local storage"),
    );

    let config = Config::default();

    let locator = records.map(|records| {
        Locator::new(
            Arc::new(InMemorySource { records }),
            config.location_attributes.clone(),
        )
    });

    let state = Arc::new(AppState {
        config: config.clone(),
        fs,
        locator,
    });

    let router = routes::setup_routes(&config, state).expect("Failed to build routes");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        _temp_dir: temp_dir,
    }
}

/// Build a metadata record from a JSON object literal.
pub fn record(fields: Value) -> MetadataRecord {
    fields.as_object().expect("record must be an object").clone()
}

struct InMemorySource {
    records: Vec<MetadataRecord>,
}

#[async_trait]
impl MetadataSource for InMemorySource {
    // Ignores `limit` so that duplicate records stay observable to the
    // caller's uniqueness check.
    async fn records(
        &self,
        query: &Value,
        _limit: usize,
    ) -> Result<Vec<MetadataRecord>, CatalogError> {
        let did = query.get("did").and_then(Value::as_str);
        Ok(self
            .records
            .iter()
            .filter(|r| r.get("did").and_then(Value::as_str) == did)
            .cloned()
            .collect())
    }
}
