//! HTTP server: the JSON API and the live dashboard page.

mod api;
mod page;
mod server;
pub mod source;

use std::sync::Arc;

pub use server::WebServer;
pub use source::SnapshotSource;

/// Shared by every handler.
pub struct WebState {
    pub source: SnapshotSource,
    pub refresh_secs: u64,
}

impl WebState {
    pub fn new(source: SnapshotSource, refresh_secs: u64) -> Arc<Self> {
        Arc::new(Self {
            source,
            refresh_secs,
        })
    }
}
