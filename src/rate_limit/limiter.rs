//! Rate Limiter Module
//!
//! Fixed window request counting per client.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::clock::Clock;
use crate::rate_limit::{ClientId, RateLimitEntry};

// == Rate Limit Config ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Window length in milliseconds
    pub window_ms: u64,
    /// Requests allowed per client per window
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_ms: 60_000,
            max_requests: 60,
        }
    }
}

// == Decision ==
/// Outcome of `RateLimiter::check_and_record`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// The request may proceed.
    Allowed {
        /// Requests left in the current window
        remaining: u32,
    },
    /// The client is over its quota until the window rolls over.
    Denied {
        /// Milliseconds until a request can succeed again
        retry_after_ms: u64,
    },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

// == Rate Limiter ==
/// Counts requests per client in fixed windows.
///
/// A request arriving more than one window after the client's window opened
/// starts a new window with a count of 1. Denied requests still count, but
/// the stored count never exceeds `max_requests + 1`.
#[derive(Debug)]
pub struct RateLimiter {
    entries: HashMap<ClientId, RateLimitEntry>,
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            config,
            clock,
        }
    }

    // == Check And Record ==
    /// Records one request from `client` and decides whether it may proceed.
    ///
    /// Must be called exactly once per inbound request, before any cache
    /// lookup or upstream fetch.
    pub fn check_and_record(&mut self, client: &ClientId) -> RateLimitDecision {
        let now = self.clock.now_ms();
        let RateLimitConfig {
            window_ms,
            max_requests,
        } = self.config;

        let entry = self
            .entries
            .entry(client.clone())
            .and_modify(|entry| {
                if entry.window_elapsed(now, window_ms) {
                    *entry = RateLimitEntry::new(now);
                } else {
                    entry.count = entry
                        .count
                        .saturating_add(1)
                        .min(max_requests.saturating_add(1));
                    entry.last_seen = now;
                }
            })
            .or_insert_with(|| RateLimitEntry::new(now));

        if entry.count > max_requests {
            let retry_after_ms = entry.resets_in(now, window_ms);
            warn!(
                "Rate limit exceeded for client {} (retry in {}ms)",
                client, retry_after_ms
            );
            RateLimitDecision::Denied { retry_after_ms }
        } else {
            RateLimitDecision::Allowed {
                remaining: max_requests - entry.count,
            }
        }
    }

    // == Count ==
    /// Returns the stored request count for `client`, if tracked.
    pub fn count(&self, client: &ClientId) -> Option<u32> {
        self.entries.get(client).map(|entry| entry.count)
    }

    // == Sweep ==
    /// Forgets clients that have been idle for longer than one window.
    ///
    /// Returns the number of clients removed.
    pub fn sweep(&mut self) -> usize {
        let now = self.clock.now_ms();
        let window_ms = self.config.window_ms;
        let before = self.entries.len();

        self.entries.retain(|_, entry| !entry.is_idle(now, window_ms));
        before - self.entries.len()
    }

    /// Number of tracked clients.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use proptest::prelude::*;

    fn limiter(window_ms: u64, max_requests: u32) -> (RateLimiter, ManualClock) {
        let clock = ManualClock::new(0);
        let config = RateLimitConfig {
            window_ms,
            max_requests,
        };
        (RateLimiter::new(config, Arc::new(clock.clone())), clock)
    }

    fn client(id: &str) -> ClientId {
        ClientId::parse(Some(id)).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert_eq!(config.window_ms, 60_000);
        assert_eq!(config.max_requests, 60);
    }

    #[test]
    fn test_admits_up_to_limit_then_denies() {
        let (mut limiter, clock) = limiter(60_000, 60);
        let c1 = client("c1");

        for i in 0..60 {
            let decision = limiter.check_and_record(&c1);
            assert!(decision.is_allowed(), "request {} should pass", i + 1);
            clock.advance_ms(10);
        }

        assert!(!limiter.check_and_record(&c1).is_allowed());
        assert_eq!(limiter.count(&c1), Some(61));
    }

    #[test]
    fn test_remaining_counts_down() {
        let (mut limiter, _) = limiter(60_000, 3);
        let c = client("c");

        assert_eq!(
            limiter.check_and_record(&c),
            RateLimitDecision::Allowed { remaining: 2 }
        );
        assert_eq!(
            limiter.check_and_record(&c),
            RateLimitDecision::Allowed { remaining: 1 }
        );
        assert_eq!(
            limiter.check_and_record(&c),
            RateLimitDecision::Allowed { remaining: 0 }
        );
    }

    #[test]
    fn test_denied_count_is_capped() {
        let (mut limiter, _) = limiter(60_000, 2);
        let c = client("c");

        for _ in 0..10 {
            limiter.check_and_record(&c);
        }
        assert_eq!(limiter.count(&c), Some(3));
    }

    #[test]
    fn test_two_per_window_scenario() {
        let (mut limiter, clock) = limiter(60_000, 2);
        let x = client("x");

        assert!(limiter.check_and_record(&x).is_allowed());
        assert_eq!(limiter.count(&x), Some(1));

        clock.set(10);
        assert!(limiter.check_and_record(&x).is_allowed());
        assert_eq!(limiter.count(&x), Some(2));

        clock.set(20);
        assert_eq!(
            limiter.check_and_record(&x),
            RateLimitDecision::Denied {
                retry_after_ms: 59_981
            }
        );
        assert_eq!(limiter.count(&x), Some(3));

        clock.set(61_000);
        assert!(limiter.check_and_record(&x).is_allowed());
        assert_eq!(limiter.count(&x), Some(1));
    }

    #[test]
    fn test_denial_with_huge_window_does_not_overflow() {
        let (mut limiter, clock) = limiter(u64::MAX, 1);
        let c = client("c");

        assert!(limiter.check_and_record(&c).is_allowed());
        clock.advance_ms(5);
        assert_eq!(
            limiter.check_and_record(&c),
            RateLimitDecision::Denied {
                retry_after_ms: u64::MAX - 5
            }
        );
    }

    #[test]
    fn test_window_is_fixed_not_sliding() {
        let (mut limiter, clock) = limiter(60_000, 2);
        let c = client("c");

        limiter.check_and_record(&c);
        clock.set(59_000);
        limiter.check_and_record(&c);

        // Still inside the window opened at t=0, despite recent traffic
        clock.set(60_000);
        assert!(!limiter.check_and_record(&c).is_allowed());

        clock.set(60_001);
        assert!(limiter.check_and_record(&c).is_allowed());
        assert_eq!(limiter.count(&c), Some(1));
    }

    #[test]
    fn test_clients_are_independent() {
        let (mut limiter, _) = limiter(60_000, 1);
        let a = client("a");
        let b = client("b");

        assert!(limiter.check_and_record(&a).is_allowed());
        assert!(!limiter.check_and_record(&a).is_allowed());
        assert!(limiter.check_and_record(&b).is_allowed());
        assert_eq!(limiter.len(), 2);
    }

    #[test]
    fn test_sweep_removes_idle_clients() {
        let (mut limiter, clock) = limiter(60_000, 60);
        let idle = client("idle");
        let busy = client("busy");

        limiter.check_and_record(&idle);
        clock.set(30_000);
        limiter.check_and_record(&busy);

        clock.set(60_001);
        assert_eq!(limiter.sweep(), 1);
        assert_eq!(limiter.count(&idle), None);
        assert_eq!(limiter.count(&busy), Some(1));

        clock.set(90_001);
        assert_eq!(limiter.sweep(), 1);
        assert!(limiter.is_empty());
    }

    proptest! {
        // Within one window exactly `max` requests pass, whatever the pacing.
        #[test]
        fn prop_exactly_max_allowed_per_window(
            max in 1u32..100,
            extra in 1u32..50,
            gaps in prop::collection::vec(0u64..400, 150),
        ) {
            let (mut limiter, clock) = limiter(60_000, max);
            let c = client("c");
            let mut allowed = 0;

            for gap in gaps.iter().take((max + extra) as usize) {
                if limiter.check_and_record(&c).is_allowed() {
                    allowed += 1;
                }
                clock.advance_ms(*gap);
            }

            // Fewer than 150 gaps of at most 399ms stay inside a 60s window
            prop_assert_eq!(allowed, max);
            prop_assert!(limiter.count(&c).unwrap() <= max + 1);
        }
    }
}
