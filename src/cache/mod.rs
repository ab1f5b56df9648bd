//! Cache Module
//!
//! Provides an in-memory cache with per-entry TTL expiration.

mod entry;
mod stats;
mod store;


use std::sync::Arc;

use tokio::sync::RwLock;

// Re-export public types
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::{CacheOptions, TtlCache};

/// Cache handle shared between the data service and its reaper.
pub type SharedCache<V> = Arc<RwLock<TtlCache<V>>>;
