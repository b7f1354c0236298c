//! Extracting the claude.ai session cookie from a local Chrome profile.

pub mod crypto;
pub mod db;
pub mod keychain;

use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::models::credential::{SessionCredential, CF_CLEARANCE, SESSION_KEY};
use crypto::KEY_LEN;
use db::RawCookie;
use keychain::SecretSource;

#[derive(Error, Debug)]
pub enum CookieError {
    #[error("Chrome cookie database not found at {0}")]
    DatabaseNotFound(PathBuf),
    #[error("cannot determine the Chrome profile directory on this platform")]
    NoProfileRoot,
    #[error("failed to copy cookie database: {0}")]
    Io(#[from] std::io::Error),
    #[error("cookie database query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("no claude.ai cookies found. Log in to claude.ai in Chrome first")]
    NoCookies,
    #[error("sessionKey cookie not found. Log in to claude.ai in Chrome first")]
    MissingSessionKey,
    #[error("failed to read Chrome Safe Storage password: {0}")]
    SecretStore(String),
    #[error("failed to decrypt cookie: {0}")]
    Decrypt(String),
}

/// Chrome's user data directory for this platform.
pub fn default_profile_root() -> Option<PathBuf> {
    if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library/Application Support/Google/Chrome"))
    } else {
        dirs::config_dir().map(|c| c.join("google-chrome"))
    }
}

/// Reads and decrypts claude.ai cookies from one Chrome profile.
///
/// Derived keys are cached per value version for the lifetime of the
/// extractor, so the secret store is queried at most once per version.
pub struct CookieExtractor {
    profile: String,
    profile_root: Option<PathBuf>,
    secret_override: Option<SecretSource>,
    keys: HashMap<Vec<u8>, [u8; KEY_LEN]>,
}

impl CookieExtractor {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
            profile_root: None,
            secret_override: None,
            keys: HashMap::new(),
        }
    }

    pub fn with_profile_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.profile_root = Some(root.into());
        self
    }

    /// Use one secret source for every value version.
    #[cfg(test)]
    pub fn with_secret_source(mut self, source: SecretSource) -> Self {
        self.secret_override = Some(source);
        self
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn profile_dir(&self) -> Result<PathBuf, CookieError> {
        let root = match &self.profile_root {
            Some(root) => root.clone(),
            None => default_profile_root().ok_or(CookieError::NoProfileRoot)?,
        };
        Ok(root.join(&self.profile))
    }

    /// Locate, copy, query and decrypt. Fails unless a session key is found.
    pub async fn extract(&mut self) -> Result<SessionCredential, CookieError> {
        let db_path = db::locate_cookie_db(&self.profile_dir()?)?;
        tracing::info!("Reading cookies from {}", db_path.display());
        let rows = db::read_claude_cookies(&db_path)?;
        self.credential_from_rows(&rows).await
    }

    async fn credential_from_rows(
        &mut self,
        rows: &[RawCookie],
    ) -> Result<SessionCredential, CookieError> {
        if rows.is_empty() {
            return Err(CookieError::NoCookies);
        }

        let mut session_key = None;
        let mut cf_clearance = None;
        for row in rows {
            let value = self.cookie_value(row).await?;
            if value.is_empty() {
                continue;
            }
            match row.name.as_str() {
                SESSION_KEY => session_key = Some(value),
                CF_CLEARANCE => cf_clearance = Some(value),
                _ => {}
            }
        }

        let session_key = session_key.ok_or(CookieError::MissingSessionKey)?;
        Ok(SessionCredential::new(session_key, cf_clearance))
    }

    async fn cookie_value(&mut self, row: &RawCookie) -> Result<String, CookieError> {
        if !row.value.is_empty() {
            return Ok(row.value.clone());
        }
        if row.encrypted_value.is_empty() {
            return Ok(String::new());
        }

        let version = crypto::version_prefix(&row.encrypted_value)
            .ok_or_else(|| CookieError::Decrypt(format!("{} has no version prefix", row.name)))?;
        let key = self.key_for(version).await?;
        let plaintext = crypto::decrypt_value(&key, &row.encrypted_value)?;

        Ok(if row.name == SESSION_KEY {
            crypto::recover_session_key(&plaintext)
        } else {
            crypto::strip_non_printable(&plaintext)
        })
    }

    async fn key_for(&mut self, version: &[u8]) -> Result<[u8; KEY_LEN], CookieError> {
        if let Some(key) = self.keys.get(version) {
            return Ok(*key);
        }
        let source = self
            .secret_override
            .clone()
            .unwrap_or_else(|| SecretSource::for_version(version));
        let password = source.password().await?;
        let key = crypto::derive_key(&password, source.iterations());
        self.keys.insert(version.to_vec(), key);
        Ok(key)
    }

    #[cfg(test)]
    fn cached_keys(&self) -> usize {
        self.keys.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crypto::tests::encrypt_value;

    fn fixed_source() -> SecretSource {
        SecretSource::Static {
            password: "test-safe-storage".into(),
            iterations: 1003,
        }
    }

    fn encrypted(plaintext: &[u8]) -> Vec<u8> {
        let key = crypto::derive_key("test-safe-storage", 1003);
        encrypt_value(&key, "v10", plaintext)
    }

    #[tokio::test]
    async fn extracts_and_decrypts_from_fixture_profile() {
        let root = tempfile::tempdir().unwrap();
        let profile = root.path().join("Profile 1");
        std::fs::create_dir_all(&profile).unwrap();

        let mut session_plain = vec![0xde, 0xad, 0xbe, 0xef, 0x01, 0x9f, 0x80, 0x11];
        session_plain.extend_from_slice(&[0xaa; 24]);
        session_plain.extend_from_slice(b"sk-ant-REDACTED");
        let session = encrypted(&session_plain);
        let cf = encrypted(b"cf-token-value");

        db::tests::write_fixture(
            &profile.join("Cookies"),
            &[
                (".claude.ai", "sessionKey", "", session.as_slice()),
                (".claude.ai", "cf_clearance", "", cf.as_slice()),
            ],
        );

        let mut extractor = CookieExtractor::new("Profile 1")
            .with_profile_root(root.path())
            .with_secret_source(fixed_source());
        let credential = extractor.extract().await.unwrap();
        assert_eq!(credential.session_key, "sk-ant-REDACTED");
        assert_eq!(credential.cf_clearance.as_deref(), Some("cf-token-value"));
        assert_eq!(extractor.cached_keys(), 1);
    }

    #[tokio::test]
    async fn plaintext_values_skip_decryption() {
        let rows = vec![RawCookie {
            name: SESSION_KEY.into(),
            value: "sk-ant-sid01-plain".into(),
            encrypted_value: Vec::new(),
        }];
        // A source that would fail if consulted.
        let mut extractor = CookieExtractor::new("Default").with_secret_source(SecretSource::SecretTool);
        let credential = extractor.credential_from_rows(&rows).await.unwrap();
        assert_eq!(credential.session_key, "sk-ant-sid01-plain");
        assert!(credential.cf_clearance.is_none());
        assert_eq!(extractor.cached_keys(), 0);
    }

    #[tokio::test]
    async fn missing_session_key_is_an_error() {
        let rows = vec![RawCookie {
            name: CF_CLEARANCE.into(),
            value: "cf".into(),
            encrypted_value: Vec::new(),
        }];
        let mut extractor = CookieExtractor::new("Default");
        let err = extractor.credential_from_rows(&rows).await.unwrap_err();
        assert!(matches!(err, CookieError::MissingSessionKey));

        let err = extractor.credential_from_rows(&[]).await.unwrap_err();
        assert!(matches!(err, CookieError::NoCookies));
    }

    #[tokio::test]
    async fn missing_database_is_reported() {
        let root = tempfile::tempdir().unwrap();
        let mut extractor = CookieExtractor::new("Default")
            .with_profile_root(root.path())
            .with_secret_source(fixed_source());
        let err = extractor.extract().await.unwrap_err();
        assert!(matches!(err, CookieError::DatabaseNotFound(_)));
    }
}
