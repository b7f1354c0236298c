use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;

use crate::cli::shutdown_signal;
use crate::core::config::AppConfig;
use crate::core::env_file::load_credentials;
use crate::core::fetch::direct::DirectFetcher;
use crate::core::fetch::Endpoints;
use crate::core::store::SnapshotStore;
use crate::web::{SnapshotSource, WebServer, WebState};

pub async fn run(config: &AppConfig, port: Option<u16>, direct: bool, env_path: &Path) -> Result<()> {
    let source = if direct {
        // Credentials are only required when the server talks upstream itself.
        let credentials = load_credentials(env_path)
            .with_context(|| format!("Direct mode needs credentials in {}", env_path.display()))?;
        let fetcher = DirectFetcher::new(
            &credentials.session,
            &config.poller.user_agent,
            Duration::from_secs(config.poller.navigation_timeout_secs),
        )?;
        SnapshotSource::Direct {
            fetcher: Box::new(fetcher),
            endpoints: Endpoints::new(&config.poller.base_url, &credentials.org_id)?,
        }
    } else {
        SnapshotSource::File(SnapshotStore::new(&config.paths.snapshot_file))
    };

    let state = WebState::new(source, config.server.refresh_secs);
    let port = port.unwrap_or(config.server.port);
    WebServer::new(&config.server.bind, port, state)?
        .run(shutdown_signal())
        .await
}
