//! Rate Limit Entry Module
//!
//! Per-client request counter for the current fixed window.

// == Rate Limit Entry ==
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitEntry {
    /// Requests observed in the current window, capped at max + 1
    pub count: u32,
    /// When the current window began (Unix milliseconds)
    pub window_start: u64,
    /// Most recent request from this client (Unix milliseconds)
    pub last_seen: u64,
}

impl RateLimitEntry {
    /// Opens a fresh window holding a single request.
    pub fn new(now_ms: u64) -> Self {
        Self {
            count: 1,
            window_start: now_ms,
            last_seen: now_ms,
        }
    }

    /// Returns true once more than `window_ms` has passed since the window
    /// opened.
    pub fn window_elapsed(&self, now_ms: u64, window_ms: u64) -> bool {
        now_ms.saturating_sub(self.window_start) > window_ms
    }

    /// Returns true once the client has been silent for more than
    /// `window_ms`.
    pub fn is_idle(&self, now_ms: u64, window_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_seen) > window_ms
    }

    /// Milliseconds until the current window rolls over.
    pub fn resets_in(&self, now_ms: u64, window_ms: u64) -> u64 {
        self.window_start
            .saturating_add(window_ms)
            .saturating_add(1)
            .saturating_sub(now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry() {
        let entry = RateLimitEntry::new(500);
        assert_eq!(entry.count, 1);
        assert_eq!(entry.window_start, 500);
        assert_eq!(entry.last_seen, 500);
    }

    #[test]
    fn test_window_boundary_is_exclusive() {
        let entry = RateLimitEntry::new(0);
        assert!(!entry.window_elapsed(60_000, 60_000));
        assert!(entry.window_elapsed(60_001, 60_000));
    }

    #[test]
    fn test_resets_in() {
        let entry = RateLimitEntry::new(1_000);
        assert_eq!(entry.resets_in(1_000, 60_000), 60_001);
        assert_eq!(entry.resets_in(61_000, 60_000), 1);
        assert_eq!(entry.resets_in(70_000, 60_000), 0);
    }

    #[test]
    fn test_resets_in_saturates_for_huge_window() {
        let entry = RateLimitEntry::new(1_000);
        assert_eq!(entry.resets_in(1_000, u64::MAX), u64::MAX - 1_000);
        assert!(!entry.window_elapsed(u64::MAX, u64::MAX));
    }
}
