//! API Module
//!
//! The remote document database boundary: typed list queries, the
//! object-safe [`Documents`] protocol, its HTTP client, and an in-memory
//! mock for tests.

mod client;
mod mock;
pub mod query;

// Re-export public types
pub use client::{Documents, DocumentsClient};
pub use mock::MockDocuments;
pub use query::{Filter, ListQuery, Order, Sort};
