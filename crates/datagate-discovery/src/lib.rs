//! Datagate Discovery Library
//!
//! File discovery over a resolved dataset location: shallow listing of
//! immediate directory entries, and a best-effort recursive walk that
//! collects files matching a pattern.
//!
//! All functions here are synchronous `std::fs` traversals; they are
//! request-scoped and bounded by the dataset tree, and callers on the
//! async runtime run them through `tokio::task::spawn_blocking`.
//!
//! Path convention: [`FileEntry::path`] is relative to the dataset's
//! logical sub-path, never the absolute filesystem path, so results can be
//! rendered without leaking the storage-root layout. The recursive walk,
//! by contrast, reports absolute paths of the matched files.

pub mod listing;
pub mod walk;

use thiserror::Error;

/// Discovery operation errors
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("invalid regex pattern: {0}")]
    InvalidPattern(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub use listing::{list_dir, FileEntry};
pub use walk::{find_files, FilePattern, WalkOutcome, WalkWarning};
