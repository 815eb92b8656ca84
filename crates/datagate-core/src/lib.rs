//! Datagate Core Library
//!
//! This crate provides configuration, the unified error taxonomy, and the
//! storage backend tag shared across all datagate components.

pub mod config;
pub mod error;
pub mod storage_types;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
