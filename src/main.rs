mod cli;
mod core;
mod logging;
mod web;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::config::AppConfig;

#[derive(Parser)]
#[command(name = "cud", about = "Live dashboard for claude.ai usage limits", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Shorthand for JSON output (and JSON logs for long-running commands)
    #[arg(short = 'j', long = "json", global = true)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    /// Verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Env file holding CLAUDE_SESSION_COOKIE and CLAUDE_ORG_ID
    #[arg(long, global = true, default_value = ".env")]
    env_file: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy the claude.ai session cookie from Chrome into the env file
    RefreshCookie {
        /// Chrome profile directory name (overrides `[browser] profile`)
        #[arg(long)]
        profile: Option<String>,
    },
    /// Poll usage with a headless browser and write the snapshot file
    Poll,
    /// Serve the JSON API and the dashboard page
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Fetch upstream on each request instead of reading the snapshot file
        #[arg(long)]
        direct: bool,
    },
    /// Fetch usage once and print it
    Fetch,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Generate default config file
    Init,
    /// Validate config and env file
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let output_opts = cli::output::OutputOptions {
        format: if cli.json {
            cli::output::OutputFormat::Json
        } else {
            cli::output::OutputFormat::Text
        },
        pretty: cli.pretty,
        use_color: cli::output::detect_color(!cli.no_color),
        verbose: cli.verbose,
    };

    let long_running = matches!(cli.command, Commands::Poll | Commands::Serve { .. });
    logging::init(output_opts.verbose, output_opts.is_json() && long_running)?;

    let config = AppConfig::load()?;
    if long_running {
        for issue in config.validate() {
            tracing::warn!("config: {}", issue);
        }
    }

    match cli.command {
        Commands::RefreshCookie { profile } => {
            cli::refresh_cmd::run(profile.as_deref(), &config.browser, &cli.env_file, &output_opts)
                .await?
        }
        Commands::Poll => cli::poll_cmd::run(&config, &cli.env_file).await?,
        Commands::Serve { port, direct } => {
            cli::serve_cmd::run(&config, port, direct, &cli.env_file).await?
        }
        Commands::Fetch => cli::fetch_cmd::run(&config, &cli.env_file, &output_opts).await?,
        Commands::Config { action } => match action {
            ConfigAction::Init => cli::config_cmd::init(&output_opts)?,
            ConfigAction::Check => cli::config_cmd::check(&cli.env_file, &output_opts)?,
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_flags_parse() {
        let cli = Cli::parse_from(["cud", "serve", "--port", "4000", "--direct"]);
        assert!(matches!(
            cli.command,
            Commands::Serve {
                port: Some(4000),
                direct: true
            }
        ));
        assert_eq!(cli.env_file, PathBuf::from(".env"));
    }

    #[test]
    fn refresh_cookie_profile_is_optional() {
        let cli = Cli::parse_from(["cud", "refresh-cookie"]);
        assert!(matches!(cli.command, Commands::RefreshCookie { profile: None }));

        let cli = Cli::parse_from(["cud", "refresh-cookie", "--profile", "Profile 1"]);
        match cli.command {
            Commands::RefreshCookie { profile } => assert_eq!(profile.as_deref(), Some("Profile 1")),
            _ => panic!("expected refresh-cookie"),
        }
    }
}
