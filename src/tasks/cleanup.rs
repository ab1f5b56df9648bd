//! Reaper Task
//!
//! Background task that periodically removes expired state from a store.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::TtlCache;
use crate::rate_limit::RateLimiter;

// == Sweep Trait ==
/// A store whose expired state can be removed in one pass.
pub trait Sweep: Send + Sync + 'static {
    /// Label used in log lines.
    const NAME: &'static str;

    /// Removes expired state, returning how many items were dropped.
    fn sweep(&mut self) -> usize;
}

impl<V> Sweep for TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    const NAME: &'static str = "cache";

    fn sweep(&mut self) -> usize {
        TtlCache::sweep(self)
    }
}

impl Sweep for RateLimiter {
    const NAME: &'static str = "rate limiter";

    fn sweep(&mut self) -> usize {
        RateLimiter::sweep(self)
    }
}

// == Reaper Handle ==
/// Owner of a running reaper task.
///
/// Dropping the handle does not stop the task; call `stop` or `shutdown`.
#[derive(Debug)]
pub struct ReaperHandle {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl ReaperHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Requests cancellation without waiting for it to take effect.
    pub fn stop(&self) {
        self.handle.abort();
    }

    /// Cancels the task and waits until it has finished.
    pub async fn shutdown(self) {
        self.handle.abort();
        // A cancelled JoinError is the expected outcome here.
        let _ = self.handle.await;
        debug!("{} reaper stopped", self.name);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Spawns a task that sweeps `store` every `interval`.
///
/// The write lock is held only for the duration of one sweep pass.
///
/// # Example
/// ```ignore
/// let reaper = spawn_reaper(cache.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// reaper.shutdown().await;
/// ```
pub fn spawn_reaper<S: Sweep>(store: Arc<RwLock<S>>, interval: Duration) -> ReaperHandle {
    let handle = tokio::spawn(async move {
        info!(
            "Starting {} reaper with interval of {}ms",
            S::NAME,
            interval.as_millis()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut guard = store.write().await;
                guard.sweep()
            };

            if removed > 0 {
                info!("{} reaper: removed {} expired entries", S::NAME, removed);
            } else {
                debug!("{} reaper: nothing to remove", S::NAME);
            }
        }
    });

    ReaperHandle {
        name: S::NAME,
        handle,
    }
}
