//! Idle conversation sweeper.
//!
//! Periodically asks the session store to drop callers that have been quiet
//! for longer than the configured TTL. A caller evicted this way simply
//! starts over with a greeting on their next message.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::ports::SessionStore;

/// Sweeps idle conversations out of a [`SessionStore`].
pub struct IdleSessionSweeper {
    store: Arc<dyn SessionStore>,
    idle_ttl: Duration,
    interval: Duration,
}

impl IdleSessionSweeper {
    pub fn new(store: Arc<dyn SessionStore>, idle_ttl: Duration, interval: Duration) -> Self {
        Self {
            store,
            idle_ttl,
            // tokio intervals reject a zero period.
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    /// Run one sweep. Returns how many conversations were removed.
    pub async fn sweep_once(&self) -> usize {
        let evicted = self.store.evict_idle(self.idle_ttl).await;
        if evicted > 0 {
            let remaining = self.store.len().await;
            tracing::info!(evicted, remaining, "Idle conversations evicted");
        }
        evicted
    }

    /// Sweep on every tick until the shutdown flag flips to `true`.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::debug!("Idle session sweeper stopped");
                        return;
                    }
                }
                _ = interval.tick() => {
                    self.sweep_once().await;
                }
            }
        }
    }
}

/// Spawns an [`IdleSessionSweeper`] on the current runtime.
pub fn spawn_idle_eviction(
    store: Arc<dyn SessionStore>,
    idle_ttl: Duration,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let sweeper = IdleSessionSweeper::new(store, idle_ttl, interval);
    tokio::spawn(async move { sweeper.run(shutdown).await })
}
