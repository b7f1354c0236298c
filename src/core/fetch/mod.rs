//! Fetching the two organization endpoints, either directly or through a
//! headless browser.

pub mod browser;
pub mod direct;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::core::models::snapshot::Snapshot;

/// Text Cloudflare shows on its interstitial challenge page.
pub const CHALLENGE_MARKER: &str = "Just a moment";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("endpoint must use HTTPS, got: {0}")]
    InsecureEndpoint(String),
    #[error("Claude API error: {status} for {url}")]
    Status { status: u16, url: String },
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("blocked by bot challenge at {0}")]
    Challenge(String),
    #[error("invalid JSON from {url}: {source}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("browser error: {0}")]
    Browser(String),
    #[error("timed out after {secs}s waiting for {what}")]
    Timeout { what: String, secs: u64 },
}

/// Validate that a resolved endpoint URL uses HTTPS.
///
/// Every request carries the session cookie, so plain HTTP or other schemes
/// are refused.
pub fn validate_endpoint(url: &str) -> Result<(), FetchError> {
    if !url.starts_with("https://") {
        return Err(FetchError::InsecureEndpoint(url.to_string()));
    }
    Ok(())
}

/// Returns true when a body looks like a challenge page rather than JSON.
pub fn is_challenge(body: &str) -> bool {
    body.trim().is_empty() || body.contains(CHALLENGE_MARKER)
}

pub fn parse_json_body(body: &str, url: &str) -> Result<Value, FetchError> {
    serde_json::from_str(body.trim()).map_err(|source| {
        if body.contains(CHALLENGE_MARKER) {
            FetchError::Challenge(url.to_string())
        } else {
            FetchError::Json {
                url: url.to_string(),
                source,
            }
        }
    })
}

/// Anything that can turn a URL into a parsed JSON document.
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError>;
}

/// The two organization-scoped endpoint URLs.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base_url: String,
    org_id: String,
}

impl Endpoints {
    pub fn new(base_url: &str, org_id: &str) -> Result<Self, FetchError> {
        validate_endpoint(base_url)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            org_id: org_id.to_string(),
        })
    }

    pub fn usage_url(&self) -> String {
        format!("{}/api/organizations/{}/usage", self.base_url, self.org_id)
    }

    pub fn rate_limits_url(&self) -> String {
        format!("{}/api/organizations/{}/rate_limits", self.base_url, self.org_id)
    }
}

/// Fetch both endpoints concurrently and assemble a snapshot.
///
/// Parsing as JSON is the only check; the bodies go into the snapshot as
/// received.
pub async fn fetch_snapshot<F>(fetcher: &F, endpoints: &Endpoints) -> Result<Snapshot, FetchError>
where
    F: JsonFetcher + ?Sized,
{
    let usage_url = endpoints.usage_url();
    let rate_limits_url = endpoints.rate_limits_url();
    let (usage, rate_limits) = tokio::try_join!(
        fetcher.fetch_json(&usage_url),
        fetcher.fetch_json(&rate_limits_url),
    )?;

    Ok(Snapshot::new(usage, rate_limits))
}
