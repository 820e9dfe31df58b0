//! CallDeck - client-side data layer for a cold-call tracking dashboard
//!
//! Sits between the dashboard UI and the remote document database, serving
//! previously fetched records from a two-tier TTL cache (in-process map
//! mirrored into a durable file) until they expire or a mutation
//! invalidates them.

pub mod api;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod models;
pub mod resources;
pub mod storage;
pub mod tasks;

pub use cache::{CacheService, KeyPattern, SetOptions, TtlClass};
pub use config::Config;
pub use coordinator::{QueryCoordinator, StaleTracker};
pub use error::{ApiError, ApiResult};
pub use storage::FileStore;
pub use tasks::spawn_prune_task;
