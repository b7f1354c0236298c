use thiserror::Error;

use crate::core::fetch::{fetch_snapshot, Endpoints, FetchError, JsonFetcher};
use crate::core::models::snapshot::Snapshot;
use crate::core::store::{SnapshotStore, StoreError};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Where the server gets its snapshot from on each request.
pub enum SnapshotSource {
    /// The file the poller writes.
    File(SnapshotStore),
    /// Fetch upstream on every request, bypassing the poller.
    Direct {
        fetcher: Box<dyn JsonFetcher>,
        endpoints: Endpoints,
    },
}

impl SnapshotSource {
    /// JSON bytes for `/api/usage`. File mode returns the file unchanged.
    pub async fn load_raw(&self) -> Result<Vec<u8>, SourceError> {
        match self {
            SnapshotSource::File(store) => Ok(store.read_raw()?),
            SnapshotSource::Direct { .. } => Ok(serde_json::to_vec(&self.load().await?)?),
        }
    }

    pub async fn load(&self) -> Result<Snapshot, SourceError> {
        match self {
            SnapshotSource::File(store) => Ok(store.read()?),
            SnapshotSource::Direct { fetcher, endpoints } => {
                Ok(fetch_snapshot(fetcher.as_ref(), endpoints).await?)
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            SnapshotSource::File(store) => format!("file {}", store.path().display()),
            SnapshotSource::Direct { endpoints, .. } => format!("direct {}", endpoints.usage_url()),
        }
    }
}
