use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use crate::cli::output::OutputOptions;
use crate::core::config::BrowserSettings;
use crate::core::cookies::CookieExtractor;
use crate::core::env_file::update_session_cookie;

const PREVIEW_LEN: usize = 25;

/// The `--profile` flag wins over `[browser] profile`.
fn extractor_for(profile: Option<&str>, browser: &BrowserSettings) -> CookieExtractor {
    let extractor = CookieExtractor::new(profile.unwrap_or(browser.profile.as_str()));
    match &browser.user_data_dir {
        Some(root) => extractor.with_profile_root(root),
        None => extractor,
    }
}

/// Copy the claude.ai session from a Chrome profile into the env file.
pub async fn run(
    profile: Option<&str>,
    browser: &BrowserSettings,
    env_path: &Path,
    opts: &OutputOptions,
) -> Result<()> {
    let mut extractor = extractor_for(profile, browser);
    let profile = extractor.profile().to_string();
    let credential = extractor
        .extract()
        .await
        .with_context(|| format!("Failed to read claude.ai cookies from Chrome profile '{}'", profile))?;

    update_session_cookie(env_path, &credential.header_value())
        .with_context(|| format!("Failed to update {}", env_path.display()))?;

    let has_clearance = credential.cf_clearance.is_some();
    if opts.is_json() {
        return opts.print_json(&serde_json::json!({
            "env_file": env_path,
            "profile": profile,
            "session_key": credential.session_key_preview(PREVIEW_LEN),
            "cf_clearance": has_clearance,
        }));
    }

    println!("{} {}", "Updated".green().bold(), env_path.display());
    println!("  {}    {}", "sessionKey".cyan(), credential.session_key_preview(PREVIEW_LEN));
    if has_clearance {
        println!("  {}  {}", "cf_clearance".cyan(), "found".green());
    } else {
        println!("  {}  {}", "cf_clearance".cyan(), "not found".yellow());
        eprintln!(
            "{} without cf_clearance, requests may be stopped by the Cloudflare challenge. \
             Open claude.ai in Chrome and run this again.",
            "warning:".yellow().bold()
        );
    }
    Ok(())
}
