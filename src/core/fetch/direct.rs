use async_trait::async_trait;
use reqwest::header;
use serde_json::Value;
use std::time::Duration;

use crate::core::fetch::{parse_json_body, FetchError, JsonFetcher};
use crate::core::models::credential::SessionCredential;

/// Plain HTTPS fetcher. Works when the endpoints are not behind a bot challenge.
pub struct DirectFetcher {
    client: reqwest::Client,
    cookie_header: String,
    user_agent: String,
}

impl DirectFetcher {
    pub fn new(
        credential: &SessionCredential,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            cookie_header: credential.header_value(),
            user_agent: user_agent.to_string(),
        })
    }
}

#[async_trait]
impl JsonFetcher for DirectFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header(header::COOKIE, &self.cookie_header)
            .header(header::USER_AGENT, &self.user_agent)
            .header(header::ACCEPT, "application/json")
            .header(header::CACHE_CONTROL, "no-store")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        parse_json_body(&body, url)
    }
}
