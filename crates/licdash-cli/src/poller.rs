//! Periodic refresh of the license listing.

use licdash_core::ports::LicenseSource;
use licdash_core::{LicenseRecord, Result};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{debug, info, warn};

pub type FetchResult = Result<Vec<LicenseRecord>>;

/// Shortest period the poller will run with.
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Background task that re-fetches the listing on a fixed interval.
pub struct Poller {
    source: Arc<dyn LicenseSource>,
    interval: Duration,
}

impl Poller {
    /// Intervals shorter than [`MIN_INTERVAL`] are raised to it.
    pub fn new(source: Arc<dyn LicenseSource>, interval: Duration) -> Self {
        if interval < MIN_INTERVAL {
            warn!(
                interval_ms = interval.as_millis() as u64,
                "Poll interval too short, using the minimum"
            );
        }
        Self {
            source,
            interval: interval.max(MIN_INTERVAL),
        }
    }

    /// Start polling. The first fetch happens immediately.
    ///
    /// The task lives as long as the returned handle.
    pub fn spawn(self) -> PollHandle {
        let (tx, rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(tx, shutdown_rx));

        PollHandle {
            results: rx,
            shutdown: shutdown_tx,
            task: Some(task),
        }
    }

    async fn run(self, results: mpsc::Sender<FetchResult>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_secs = self.interval.as_secs(),
            "Starting license poller"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let result = tokio::select! {
                        result = self.source.list_licenses() => result,
                        _ = shutdown.changed() => {
                            info!("License poller shutting down during fetch");
                            break;
                        }
                    };
                    match &result {
                        Ok(records) => debug!(count = records.len(), "Poll fetched licenses"),
                        Err(e) => warn!(error = %e, "Poll failed"),
                    }
                    if results.send(result).await.is_err() {
                        debug!("Poll receiver dropped");
                        break;
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("License poller shutting down");
                        break;
                    }
                }
            }
        }
    }
}

/// Owner of a running poller. Dropping it cancels the task.
pub struct PollHandle {
    results: mpsc::Receiver<FetchResult>,
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Next fetch result; `None` once the poller has stopped.
    pub async fn next(&mut self) -> Option<FetchResult> {
        self.results.recv().await
    }

    /// Stop the poller and wait for the task to finish.
    pub async fn stop(&mut self) {
        let _ = self.shutdown.send(true);
        self.results.close();
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            warn!(error = %e, "Poller task ended abnormally");
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
