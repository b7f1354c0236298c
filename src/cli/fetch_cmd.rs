use anyhow::{Context, Result};
use chrono::Local;
use std::path::Path;
use std::time::Duration;

use crate::cli::output::OutputOptions;
use crate::cli::renderer;
use crate::core::config::AppConfig;
use crate::core::dashboard::DashboardView;
use crate::core::env_file::load_credentials;
use crate::core::fetch::direct::DirectFetcher;
use crate::core::fetch::{fetch_snapshot, Endpoints};

/// Fetch both endpoints once over plain HTTPS and print the result.
pub async fn run(config: &AppConfig, env_path: &Path, opts: &OutputOptions) -> Result<()> {
    let credentials = load_credentials(env_path)?;
    let endpoints = Endpoints::new(&config.poller.base_url, &credentials.org_id)?;
    let fetcher = DirectFetcher::new(
        &credentials.session,
        &config.poller.user_agent,
        Duration::from_secs(config.poller.navigation_timeout_secs),
    )?;

    let snapshot = fetch_snapshot(&fetcher, &endpoints)
        .await
        .context("Failed to fetch usage")?;

    if opts.is_json() {
        return opts.print_json(&snapshot);
    }
    let view = DashboardView::new(&snapshot, Local::now());
    println!("{}", renderer::render_dashboard(&view, opts.use_color));
    Ok(())
}
