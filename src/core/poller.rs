use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::MissedTickBehavior;

use crate::core::fetch::{fetch_snapshot, Endpoints, FetchError, JsonFetcher};
use crate::core::models::snapshot::Snapshot;
use crate::core::store::{SnapshotStore, StoreError};

#[derive(Error, Debug)]
pub enum CycleError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Fetches a snapshot on a fixed interval and writes it to the store.
///
/// A failed cycle leaves the previous file in place.
pub struct Poller<F> {
    fetcher: F,
    store: SnapshotStore,
    endpoints: Endpoints,
    interval: Duration,
}

impl<F: JsonFetcher> Poller<F> {
    pub fn new(fetcher: F, store: SnapshotStore, endpoints: Endpoints, interval: Duration) -> Self {
        Self {
            fetcher,
            store,
            endpoints,
            interval,
        }
    }

    pub async fn poll_once(&self) -> Result<Snapshot, CycleError> {
        let snapshot = fetch_snapshot(&self.fetcher, &self.endpoints).await?;
        self.store.write(&snapshot)?;
        Ok(snapshot)
    }

    /// One logged cycle. Returns whether the snapshot was written.
    pub async fn run_cycle(&self) -> bool {
        match self.poll_once().await {
            Ok(_) => {
                tracing::info!("Data updated");
                true
            }
            Err(e) => {
                tracing::error!("Fetch error: {:#}", anyhow::Error::new(e));
                false
            }
        }
    }

    /// Poll until `shutdown` resolves. The first cycle runs immediately and
    /// cycles never overlap; the signal is observed between cycles.
    pub async fn run_until<S>(&self, shutdown: S)
    where
        S: Future<Output = ()>,
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutting down poller");
                    break;
                }
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
            }
        }
    }

    /// Hand the fetcher back, e.g. to shut a browser down.
    pub fn into_fetcher(self) -> F {
        self.fetcher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fetch::tests::{MockFetcher, RATE_LIMITS_BODY, USAGE_BODY};

    fn poller(dir: &std::path::Path, fetcher: MockFetcher) -> Poller<MockFetcher> {
        Poller::new(
            fetcher,
            SnapshotStore::new(dir.join("data.json")),
            Endpoints::new("https://claude.ai", "org-1").unwrap(),
            Duration::from_secs(25),
        )
    }

    #[tokio::test]
    async fn successful_cycle_writes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let poller = poller(dir.path(), MockFetcher::new(USAGE_BODY, RATE_LIMITS_BODY));

        assert!(poller.run_cycle().await);
        let stored = SnapshotStore::new(dir.path().join("data.json")).read().unwrap();
        assert_eq!(stored.rate_limits["rate_limit_tier"], "default_pro");
        assert_eq!(stored.usage["five_hour"]["utilization"], 42.0);
    }

    #[tokio::test]
    async fn failed_cycle_keeps_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, b"{\"previous\":true}").unwrap();

        let poller = poller(dir.path(), MockFetcher::new("Just a moment...", RATE_LIMITS_BODY));
        assert!(!poller.run_cycle().await);
        assert!(matches!(
            poller.poll_once().await,
            Err(CycleError::Fetch(FetchError::Challenge(_)))
        ));
        assert_eq!(std::fs::read(&path).unwrap(), b"{\"previous\":true}");
    }

    #[tokio::test]
    async fn run_until_runs_first_cycle_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let poller = poller(dir.path(), MockFetcher::new(USAGE_BODY, RATE_LIMITS_BODY));
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let path = dir.path().join("data.json");
        let stop = async move {
            // Stop once the immediate first cycle has landed.
            while !path.exists() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            let _ = tx.send(());
        };
        tokio::join!(
            poller.run_until(async {
                let _ = rx.await;
            }),
            stop
        );

        let fetcher = poller.into_fetcher();
        assert_eq!(fetcher.requests.lock().unwrap().len(), 2);
    }
}
