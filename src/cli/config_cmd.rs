use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::cli::output::OutputOptions;
use crate::core::config::AppConfig;
use crate::core::env_file::load_credentials;

pub fn init(_opts: &OutputOptions) -> Result<()> {
    let path = AppConfig::config_path();
    if path.exists() {
        eprintln!("Config file already exists at {}", path.display());
        eprintln!("Remove it first if you want to regenerate.");
        return Ok(());
    }

    match AppConfig::default().save() {
        Ok(path) => {
            println!("Generated config at {}", path.display());
            println!("  Poll every 25s, dashboard on http://127.0.0.1:3000");
        }
        Err(e) => {
            eprintln!("Failed to generate config: {}", e);
            std::process::exit(1);
        }
    }
    Ok(())
}

pub fn check(env_path: &Path, opts: &OutputOptions) -> Result<()> {
    let path = AppConfig::config_path();
    if !path.exists() {
        println!("No config file at {}, using defaults.", path.display());
    }

    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    let mut issues = config.validate();
    let credentials = load_credentials(env_path);
    if let Err(e) = &credentials {
        issues.push(format!("{}: {}", env_path.display(), e));
    }

    if opts.is_json() {
        opts.print_json(&serde_json::json!({
            "config_path": path,
            "env_file": env_path,
            "valid": issues.is_empty(),
            "issues": issues,
        }))?;
        if !issues.is_empty() {
            std::process::exit(1);
        }
        return Ok(());
    }

    if issues.is_empty() {
        println!("{} {}", "Config is valid:".green(), path.display());
        println!("  Snapshot file  {}", config.paths.snapshot_file.display());
        println!("  Chrome profile {}", config.browser.profile);
        if let Ok(creds) = credentials {
            println!("  Organization   {}", creds.org_id);
            println!("  Session key    {}", creds.session.session_key_preview(25));
        }
    } else {
        eprintln!("{}", "Config issues found:".red());
        for issue in &issues {
            eprintln!("  - {}", issue);
        }
        std::process::exit(1);
    }
    Ok(())
}
