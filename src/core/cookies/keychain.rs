//! Where the cookie encryption password comes from.

use std::time::Duration;

use crate::core::cookies::CookieError;
use crate::core::process::{self, run_command};

const SECRET_TIMEOUT: Duration = Duration::from_secs(10);
/// Password Chromium uses on Linux when no keyring is available (`v10` values).
pub const LINUX_BASIC_PASSWORD: &str = "peanuts";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// macOS login keychain entry "Chrome Safe Storage".
    MacKeychain,
    /// GNOME keyring / KWallet via `secret-tool`.
    SecretTool,
    /// Fixed password, used for Linux `v10` values and in tests.
    Static { password: String, iterations: u32 },
}

impl SecretSource {
    /// The source Chrome uses for a given value version on this platform.
    pub fn for_version(version: &[u8]) -> Self {
        if cfg!(target_os = "macos") {
            return SecretSource::MacKeychain;
        }
        match version {
            b"v11" => SecretSource::SecretTool,
            _ => SecretSource::Static {
                password: LINUX_BASIC_PASSWORD.to_string(),
                iterations: 1,
            },
        }
    }

    pub fn iterations(&self) -> u32 {
        match self {
            SecretSource::MacKeychain => 1003,
            SecretSource::SecretTool => 1,
            SecretSource::Static { iterations, .. } => *iterations,
        }
    }

    pub async fn password(&self) -> Result<String, CookieError> {
        let result = match self {
            SecretSource::Static { password, .. } => return Ok(password.clone()),
            SecretSource::MacKeychain => {
                run_command(
                    "security",
                    &["find-generic-password", "-s", "Chrome Safe Storage", "-w"],
                    SECRET_TIMEOUT,
                )
                .await
            }
            SecretSource::SecretTool => {
                if process::which("secret-tool").is_none() {
                    return Err(CookieError::SecretStore(
                        "secret-tool not found; install libsecret-tools".to_string(),
                    ));
                }
                run_command(
                    "secret-tool",
                    &["lookup", "application", "chrome"],
                    SECRET_TIMEOUT,
                )
                .await
            }
        };

        match result {
            Ok(password) if password.is_empty() => Err(CookieError::SecretStore(
                "secret store returned an empty password".to_string(),
            )),
            Ok(password) => Ok(password),
            Err(e) => Err(CookieError::SecretStore(e.to_string())),
        }
    }
}
