//! Application state.
//!
//! Everything in here is constructed once at startup and immutable for the
//! lifetime of the process; the backend handle in particular is selected
//! exactly once from configuration and shared by `Arc`, never swapped.

use datagate_catalog::Locator;
use datagate_core::Config;
use datagate_storage::FsClient;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub fs: Arc<dyn FsClient>,
    /// Present only when a metadata catalog is configured; the `/data`
    /// endpoints require it.
    pub locator: Option<Locator>,
}
