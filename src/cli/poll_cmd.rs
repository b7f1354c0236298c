use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;

use crate::cli::shutdown_signal;
use crate::core::config::AppConfig;
use crate::core::env_file::load_credentials;
use crate::core::fetch::browser::{BrowserFetcher, BrowserOptions};
use crate::core::fetch::Endpoints;
use crate::core::poller::Poller;
use crate::core::store::SnapshotStore;

pub async fn run(config: &AppConfig, env_path: &Path) -> Result<()> {
    let credentials = load_credentials(env_path)
        .with_context(|| format!("Cannot start poller with {}", env_path.display()))?;
    let endpoints = Endpoints::new(&config.poller.base_url, &credentials.org_id)?;

    let options = BrowserOptions {
        user_agent: config.poller.user_agent.clone(),
        navigation_timeout: Duration::from_secs(config.poller.navigation_timeout_secs),
        challenge_timeout: Duration::from_secs(config.poller.challenge_timeout_secs),
        executable: config.browser.chrome_executable.clone(),
    };
    tracing::info!("Launching headless browser");
    let fetcher = BrowserFetcher::launch(&credentials.session, &options)
        .await
        .context("Failed to launch headless browser")?;

    let store = SnapshotStore::new(&config.paths.snapshot_file);
    tracing::info!(
        "Polling every {}s, writing {}",
        config.poller.interval_secs,
        store.path().display()
    );
    let poller = Poller::new(
        fetcher,
        store,
        endpoints,
        Duration::from_secs(config.poller.interval_secs),
    );
    poller.run_until(shutdown_signal()).await;

    poller
        .into_fetcher()
        .shutdown()
        .await
        .context("Failed to close browser")?;
    Ok(())
}
