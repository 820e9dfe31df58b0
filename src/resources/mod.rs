//! Resource Stores Module
//!
//! Per-resource read/write coordination between the remote document API,
//! the two-tier cache, and the query coordinator. Reads go cache-first and
//! fall back to the network; mutations hit the network first and only
//! invalidate locally once the remote write is confirmed; invalidating
//! earlier could let a racing read repopulate the cache with pre-write
//! data.

mod alerts;
mod calls;
mod companies;
mod team;

// Re-export public types
pub use alerts::AlertStore;
pub use calls::CallStore;
pub use companies::CompanyStore;
pub use team::TeamStore;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiResult;

/// Decodes a page of raw documents into typed records.
pub(crate) fn decode_records<T: DeserializeOwned>(documents: Vec<Value>) -> ApiResult<Vec<T>> {
    documents
        .into_iter()
        .map(|document| Ok(serde_json::from_value(document)?))
        .collect()
}
