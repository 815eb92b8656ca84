//! Datagate Storage Library
//!
//! This crate provides the unified storage capability set and its two
//! backends: a local filesystem rooted at a configured directory, and an
//! S3-compatible object store where a "dir" is a bucket and a "file" is an
//! object key.
//!
//! Both backends satisfy the same [`FsClient`] trait; callers never branch
//! on the backend type. The structural asymmetry between the two worlds is
//! preserved in the [`Listing`] type: local listings enumerate immediate
//! children only, while object listings cover everything under a bucket,
//! since the object namespace is flat.

pub mod factory;
pub mod local;
pub mod paths;
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use datagate_core::StorageBackend;
pub use factory::create_fs_client;
pub use local::LocalFsClient;
pub use s3::S3FsClient;
pub use traits::{
    BucketObject, FsClient, Listing, Metadata, ObjectInfo, StorageError, StorageResult,
};
