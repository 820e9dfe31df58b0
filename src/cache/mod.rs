//! Cache Module
//!
//! Two-tier client-side cache: an in-process entry store mirrored into
//! durable storage, with lazy TTL expiration and pattern-based
//! invalidation.

mod debug;
mod entry;
pub mod keys;
mod mirror;
mod service;
mod stats;
mod store;
mod ttl;


// Re-export public types
pub use debug::{CacheDebug, CacheMetrics};
pub use entry::CacheEntry;
pub use keys::KeyPattern;
pub use mirror::DiskMirror;
pub use service::{CacheService, SetOptions};
pub use stats::{CacheStats, EntrySnapshot};
pub use store::EntryStore;
pub use ttl::TtlClass;

// == Public Constants ==
/// Prefix applied to every cache item in the durable medium.
///
/// Guarantees `clear()` and pattern scans never touch unrelated items the
/// application keeps in the same storage.
pub const STORAGE_PREFIX: &str = "calldeck.cache.";
