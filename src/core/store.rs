use serde::de::IgnoredAny;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::models::snapshot::Snapshot;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No data yet. Is the poller running?")]
    Missing(PathBuf),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("snapshot at {path} is not valid JSON: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The single snapshot file shared between the poller and the server.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the file. Readers see either the old or the new document,
    /// never a partial one.
    pub fn write(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let json = serde_json::to_vec(snapshot)?;
        let write_err = |source: std::io::Error| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(write_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
        tmp.write_all(&json).map_err(write_err)?;
        tmp.flush().map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        Ok(())
    }

    /// The file's bytes, untouched, once they are known to be JSON.
    pub fn read_raw(&self) -> Result<Vec<u8>, StoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::Missing(self.path.clone()))
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_slice::<IgnoredAny>(&bytes).map_err(|source| StoreError::Invalid {
            path: self.path.clone(),
            source,
        })?;
        Ok(bytes)
    }

    pub fn read(&self) -> Result<Snapshot, StoreError> {
        let bytes = self.read_raw()?;
        Snapshot::from_slice(&bytes).map_err(|source| StoreError::Invalid {
            path: self.path.clone(),
            source,
        })
    }
}
