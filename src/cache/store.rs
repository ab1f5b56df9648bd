//! Cache Store Module
//!
//! Generic TTL cache keyed by namespaced strings.

use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::{CacheEntry, CacheStats};
use crate::clock::Clock;

// == Cache Options ==
/// Defaults applied by a `TtlCache`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheOptions {
    /// TTL in seconds used when `set` is called without one
    pub default_ttl: u64,
    /// Prepended to every logical key to form the storage key
    pub key_prefix: String,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            default_ttl: 300,
            key_prefix: "mcp:".to_string(),
        }
    }
}

// == TTL Cache ==
/// In-memory key/value store where every entry carries its own expiry.
///
/// Expired entries are treated as absent by `get` whether or not they have
/// been physically removed yet. Removal happens lazily on `get` and in bulk
/// on `sweep`.
#[derive(Debug)]
pub struct TtlCache<V> {
    /// Storage keyed by prefixed key
    entries: HashMap<String, CacheEntry<V>>,
    /// Performance statistics
    stats: CacheStats,
    options: CacheOptions,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    // == Constructor ==
    /// Creates an empty cache.
    ///
    /// # Arguments
    /// * `options` - Default TTL and key prefix
    /// * `clock` - Time source used for every expiry decision
    pub fn new(options: CacheOptions, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            options,
            clock,
        }
    }

    // == Configure ==
    /// Replaces the default TTL and key prefix.
    ///
    /// Existing entries keep their storage keys and expiry; only later calls
    /// see the new options.
    pub fn configure(&mut self, options: CacheOptions) {
        self.options = options;
    }

    // == Storage Key ==
    /// Returns the namespaced key a logical key is stored under.
    pub fn storage_key(&self, key: &str) -> String {
        format!("{}{}", self.options.key_prefix, key)
    }

    // == Set ==
    /// Stores a value, replacing any existing entry for the key.
    ///
    /// # Arguments
    /// * `key` - Logical key (the prefix is added here)
    /// * `value` - The value to store
    /// * `ttl` - Optional TTL in seconds (uses the default TTL if None)
    pub fn set(&mut self, key: &str, value: V, ttl: Option<u64>) {
        let ttl = ttl.unwrap_or(self.options.default_ttl);
        let entry = CacheEntry::new(value, self.clock.now_ms(), ttl);

        self.entries.insert(self.storage_key(key), entry);
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Retrieves a clone of the value stored under `key`.
    ///
    /// Returns `None` if the key is absent or expired. An expired entry is
    /// removed as part of the same call.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let storage_key = self.storage_key(key);
        let now = self.clock.now_ms();

        match self.entries.get(&storage_key) {
            Some(entry) if !entry.is_expired_at(now) => {
                self.stats.record_hit();
                Some(entry.value.clone())
            }
            Some(_) => {
                self.entries.remove(&storage_key);
                self.stats.record_expired(1);
                self.stats.set_total_entries(self.entries.len());
                self.stats.record_miss();
                None
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Delete ==
    /// Removes the entry for `key`, returning whether one was present.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(&self.storage_key(key)).is_some();
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Clear ==
    /// Removes every entry unconditionally.
    ///
    /// Returns the number of entries dropped.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.stats.set_total_entries(0);
        count
    }

    // == Sweep ==
    /// Removes all expired entries in one pass.
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&mut self) -> usize {
        let now = self.clock.now_ms();
        let before = self.entries.len();

        self.entries.retain(|_, entry| !entry.is_expired_at(now));

        let removed = before - self.entries.len();
        self.stats.record_expired(removed);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Returns the number of physically stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
