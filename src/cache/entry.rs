//! Cache Entry Module
//!
//! Defines a single cache entry with an absolute expiry timestamp.

// == Cache Entry ==
/// A stored value together with its lifetime metadata.
///
/// Entries are never mutated in place; a `set` on an existing key replaces
/// the whole entry.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry that expires `ttl_seconds` after `now_ms`.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `now_ms` - Current Unix time in milliseconds
    /// * `ttl_seconds` - Lifetime in seconds
    pub fn new(value: V, now_ms: u64, ttl_seconds: u64) -> Self {
        Self {
            value,
            created_at: now_ms,
            expires_at: now_ms.saturating_add(ttl_seconds.saturating_mul(1000)),
        }
    }

    // == Is Expired ==
    /// Checks whether the entry is logically absent at `now_ms`.
    ///
    /// Boundary condition: the entry stays valid up to and including its
    /// expiration instant and is expired once the current time exceeds it.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        now_ms > self.expires_at
    }
}
