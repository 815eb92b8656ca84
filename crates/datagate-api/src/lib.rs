//! Datagate API
//!
//! HTTP surface of the storage gateway: storage endpoints served by the
//! configured backend, and dataset endpoints that resolve a DID through
//! the metadata catalog before listing or matching files.

pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;
