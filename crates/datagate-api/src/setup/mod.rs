//! Application setup and initialization
//!
//! Initialization logic extracted from main.rs: backend selection, catalog
//! wiring, and route construction.

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use datagate_catalog::{CatalogClient, Locator};
use datagate_core::Config;
use datagate_storage::create_fs_client;
use std::sync::Arc;

/// Initialize the entire application: select the storage backend once,
/// wire the catalog locator if configured, and build the router.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    let fs = create_fs_client(&config)
        .await
        .context("Failed to initialize storage backend")?;

    tracing::info!(backend = %fs.backend_type(), "Storage backend selected");

    let locator = match &config.catalog_url {
        Some(url) => {
            let client = CatalogClient::new(url.clone(), config.catalog_token.clone())
                .context("Failed to initialize catalog client")?;
            tracing::info!(catalog_url = %url, "Metadata catalog configured");
            Some(Locator::new(
                Arc::new(client),
                config.location_attributes.clone(),
            ))
        }
        None => {
            tracing::warn!("No metadata catalog configured; /data endpoints disabled");
            None
        }
    };

    let state = Arc::new(AppState {
        config: config.clone(),
        fs,
        locator,
    });

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
