//! Periodic refresh driver.
//!
//! # Responsibilities
//! - Call [`ConfigStore::refresh`] on a fixed interval
//! - Refresh on SIGHUP (Unix)
//! - Stop when shutdown is signalled
//!
//! The store itself coalesces overlapping refreshes, so a tick landing while
//! an HTTP-triggered refresh is running simply joins it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::lifecycle::signals::Hangup;
use crate::remote_config::store::ConfigStore;

pub struct RefreshScheduler {
    store: Arc<ConfigStore>,
    interval: Duration,
}

impl RefreshScheduler {
    pub fn new(store: Arc<ConfigStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Run until `shutdown` fires. The first tick is one interval from now;
    /// the initial load is done by the caller at startup.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Refresh scheduler starting");

        let mut ticker = time::interval_at(time::Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut hangup = Hangup::new();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    tracing::info!("Running scheduled configuration refresh");
                    self.refresh().await;
                }
                _ = hangup.recv() => {
                    tracing::info!("SIGHUP received, refreshing configuration");
                    self.refresh().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Refresh scheduler received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    async fn refresh(&self) {
        // Failures are logged by the store; the next tick tries again.
        let _ = self.store.refresh().await;
    }
}
