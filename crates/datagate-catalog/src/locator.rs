//! Dataset location resolution.
//!
//! Looks up a single metadata record for a dataset identifier and extracts
//! the dataset's physical data location from it.

use crate::client::{MetadataRecord, MetadataSource};
use crate::CatalogError;
use serde_json::{json, Value};
use std::sync::Arc;

/// Resolves dataset identifiers to filesystem locations through the
/// metadata catalog.
///
/// The "exactly one matching record" invariant is this component's own
/// contract: the catalog service is only asked for `limit` records and is
/// not trusted to enforce uniqueness.
#[derive(Clone)]
pub struct Locator {
    source: Arc<dyn MetadataSource>,
    /// Ordered candidate attribute names; the first one present in the
    /// record wins.
    location_attributes: Vec<String>,
}

impl Locator {
    pub fn new(source: Arc<dyn MetadataSource>, location_attributes: Vec<String>) -> Self {
        Locator {
            source,
            location_attributes,
        }
    }

    /// Resolve `did` to the dataset's raw data location.
    ///
    /// Fails with `AmbiguousOrMissingRecord` unless exactly one record
    /// matches, and with `LocationAttributeMissing` when none of the
    /// configured candidate attributes is present in the record.
    pub async fn locate(&self, did: &str) -> Result<String, CatalogError> {
        let query = json!({ "did": did });
        let records = self.source.records(&query, 1).await?;

        if records.len() != 1 {
            tracing::warn!(did = %did, found = records.len(), "dataset record lookup ambiguous");
            return Err(CatalogError::AmbiguousOrMissingRecord {
                did: did.to_string(),
                found: records.len(),
            });
        }

        let location = location_attribute(&records[0], &self.location_attributes)?;
        tracing::debug!(did = %did, location = %location, "dataset location resolved");
        Ok(location)
    }
}

/// Typed accessor for the location attribute: probes `candidates` in order
/// and returns the first present value, requiring it to be textual.
fn location_attribute(
    record: &MetadataRecord,
    candidates: &[String],
) -> Result<String, CatalogError> {
    for attribute in candidates {
        match record.get(attribute) {
            Some(Value::String(value)) => return Ok(value.clone()),
            Some(_) => {
                return Err(CatalogError::AttributeNotText {
                    attribute: attribute.clone(),
                })
            }
            None => continue,
        }
    }
    Err(CatalogError::LocationAttributeMissing(
        candidates.join(","),
    ))
}
