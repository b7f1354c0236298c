//! Logging setup using tracing

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber. Logs go to stderr so `--json` command
/// output on stdout stays clean.
pub fn init(verbose: bool, json: bool) -> anyhow::Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug,chromiumoxide=info,hyper=info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,chromiumoxide=warn"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };
    result.map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))
}
