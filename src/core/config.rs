use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::core::fetch::validate_endpoint;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Failed to read env file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
    #[error("Missing {0} in .env")]
    MissingEnv(&'static str),
    #[error("CLAUDE_SESSION_COOKIE has no sessionKey=... pair")]
    InvalidCookie,
}

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerSettings {
    /// Seconds between poll cycles; keep it below `server.refresh_secs`
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,
    #[serde(default = "default_challenge_timeout_secs")]
    pub challenge_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_interval_secs() -> u64 {
    25
}
fn default_navigation_timeout_secs() -> u64 {
    30
}
fn default_challenge_timeout_secs() -> u64 {
    15
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_base_url() -> String {
    "https://claude.ai".to_string()
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            navigation_timeout_secs: default_navigation_timeout_secs(),
            challenge_timeout_secs: default_challenge_timeout_secs(),
            user_agent: default_user_agent(),
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// How often the dashboard page re-requests data
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_refresh_secs() -> u64 {
    30
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            refresh_secs: default_refresh_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    #[serde(default = "default_snapshot_file")]
    pub snapshot_file: PathBuf,
}

fn default_snapshot_file() -> PathBuf {
    PathBuf::from("/tmp/claude-usage-data.json")
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            snapshot_file: default_snapshot_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSettings {
    /// Chrome profile to read cookies from
    #[serde(default = "default_profile")]
    pub profile: String,
    /// Chrome user data directory holding the profiles; platform default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data_dir: Option<PathBuf>,
    /// Chrome/Chromium binary for the poller; auto-detected when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chrome_executable: Option<PathBuf>,
}

fn default_profile() -> String {
    "Default".to_string()
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            user_data_dir: None,
            chrome_executable: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub poller: PollerSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub paths: PathSettings,
    #[serde(default)]
    pub browser: BrowserSettings,
}

impl AppConfig {
    /// Get the config file path, respecting XDG_CONFIG_HOME
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("~"))
                    .join(".config")
            });
        config_dir.join("cud").join("config.toml")
    }

    /// Load config from the default path, falling back to defaults if not found
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Serialize and write this config to the config file path.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Validate the config
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.poller.interval_secs == 0 {
            issues.push("poller.interval_secs must be greater than 0".to_string());
        }
        if self.server.refresh_secs == 0 {
            issues.push("server.refresh_secs must be greater than 0".to_string());
        }
        if self.poller.interval_secs >= self.server.refresh_secs {
            issues.push(format!(
                "poller.interval_secs ({}) should be shorter than server.refresh_secs ({}) so the page never reads data older than one poll",
                self.poller.interval_secs, self.server.refresh_secs
            ));
        }
        if self.poller.navigation_timeout_secs == 0 || self.poller.challenge_timeout_secs == 0 {
            issues.push("poller timeouts must be greater than 0".to_string());
        }
        if let Err(e) = validate_endpoint(&self.poller.base_url) {
            issues.push(format!("poller.base_url: {}", e));
        }
        if self.paths.snapshot_file.as_os_str().is_empty() {
            issues.push("paths.snapshot_file must not be empty".to_string());
        }
        if self.browser.profile.trim().is_empty() {
            issues.push("browser.profile must not be empty".to_string());
        }
        issues
    }
}
