//! Rate Limit Module
//!
//! Per-client fixed window rate limiting.

mod client;
mod entry;
mod limiter;

use std::sync::Arc;

use tokio::sync::RwLock;

pub use client::ClientId;
pub use entry::RateLimitEntry;
pub use limiter::{RateLimitConfig, RateLimitDecision, RateLimiter};

/// Limiter handle shared between the HTTP middleware and its reaper.
pub type SharedLimiter = Arc<RwLock<RateLimiter>>;
