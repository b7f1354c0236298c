//! Headless Chromium fetcher.
//!
//! Navigating to the JSON endpoints in a real browser inherits its TLS and
//! JavaScript fingerprint, which is what gets past the bot challenge.

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::core::fetch::{is_challenge, parse_json_body, FetchError, JsonFetcher};
use crate::core::models::credential::SessionCredential;

pub const COOKIE_DOMAIN: &str = ".claude.ai";

#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub user_agent: String,
    pub navigation_timeout: Duration,
    pub challenge_timeout: Duration,
    pub executable: Option<PathBuf>,
}

fn browser_err(e: impl std::fmt::Display) -> FetchError {
    FetchError::Browser(e.to_string())
}

/// Cookie parameters for every pair in the credential, scoped to claude.ai.
pub fn cookie_params(credential: &SessionCredential) -> Result<Vec<CookieParam>, FetchError> {
    credential
        .pairs()
        .into_iter()
        .map(|(name, value)| {
            CookieParam::builder()
                .name(name)
                .value(value)
                .domain(COOKIE_DOMAIN)
                .path("/")
                .build()
                .map_err(browser_err)
        })
        .collect()
}

/// The page operations a fetch needs.
#[async_trait]
pub trait JsonPage: Send + Sync {
    async fn goto(&self, url: &str) -> Result<(), FetchError>;
    async fn body_text(&self) -> Result<String, FetchError>;
    async fn wait_for_navigation(&self) -> Result<(), FetchError>;
}

#[async_trait]
impl JsonPage for Page {
    async fn goto(&self, url: &str) -> Result<(), FetchError> {
        Page::goto(self, url).await.map_err(browser_err)?;
        Ok(())
    }

    async fn body_text(&self) -> Result<String, FetchError> {
        let body = self.find_element("body").await.map_err(browser_err)?;
        let text = body.inner_text().await.map_err(browser_err)?;
        Ok(text.unwrap_or_default())
    }

    async fn wait_for_navigation(&self) -> Result<(), FetchError> {
        Page::wait_for_navigation(self).await.map_err(browser_err)?;
        Ok(())
    }
}

/// Navigate to `url` and parse the page body as JSON.
///
/// A challenge page gets up to `challenge_timeout` to navigate away. Whether
/// it did is not checked: the body is read again and the parse decides.
pub async fn read_json<P>(
    page: &P,
    url: &str,
    navigation_timeout: Duration,
    challenge_timeout: Duration,
) -> Result<Value, FetchError>
where
    P: JsonPage + ?Sized,
{
    match tokio::time::timeout(navigation_timeout, page.goto(url)).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(FetchError::Timeout {
                what: url.to_string(),
                secs: navigation_timeout.as_secs(),
            })
        }
    }

    let mut body = page.body_text().await?;
    if is_challenge(&body) {
        tracing::info!("Waiting for Cloudflare challenge at {}", url);
        match tokio::time::timeout(challenge_timeout, page.wait_for_navigation()).await {
            Ok(Err(e)) => tracing::debug!("challenge navigation at {}: {}", url, e),
            Ok(Ok(())) => {}
            Err(_) => tracing::debug!("challenge at {} still up after {:?}", url, challenge_timeout),
        }
        body = page.body_text().await?;
    }

    parse_json_body(&body, url)
}

/// One long-lived browser; each fetch gets its own page.
pub struct BrowserFetcher {
    browser: Browser,
    handler: JoinHandle<()>,
    navigation_timeout: Duration,
    challenge_timeout: Duration,
}

impl BrowserFetcher {
    pub async fn launch(
        credential: &SessionCredential,
        options: &BrowserOptions,
    ) -> Result<Self, FetchError> {
        let mut builder = BrowserConfig::builder()
            .arg(format!("--user-agent={}", options.user_agent))
            .request_timeout(options.navigation_timeout);
        if let Some(path) = &options.executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(FetchError::Browser)?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(browser_err)?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("browser handler: {}", e);
                }
            }
        });

        browser
            .set_cookies(cookie_params(credential)?)
            .await
            .map_err(browser_err)?;

        Ok(Self {
            browser,
            handler,
            navigation_timeout: options.navigation_timeout,
            challenge_timeout: options.challenge_timeout,
        })
    }

    /// Close the browser and wait for its process to exit.
    pub async fn shutdown(mut self) -> Result<(), FetchError> {
        self.browser.close().await.map_err(browser_err)?;
        self.browser.wait().await.map_err(browser_err)?;
        if let Err(e) = self.handler.await {
            tracing::debug!("browser handler task ended abnormally: {}", e);
        }
        Ok(())
    }
}

#[async_trait]
impl JsonFetcher for BrowserFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value, FetchError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(browser_err)?;
        let result = read_json(
            &page,
            url,
            self.navigation_timeout,
            self.challenge_timeout,
        )
        .await;
        if let Err(e) = page.close().await {
            tracing::debug!("failed to close page for {}: {}", url, e);
        }
        result
    }
}
