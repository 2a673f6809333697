// src/crawling/fetcher.rs
//! HTML fetching back ends.
//!
//! The pipeline only sees the [`Fetcher`] trait. `HttpFetcher` is a plain
//! GET client; `RenderServiceFetcher` delegates rendering to a headless
//! browser service that understands wait conditions.

use crate::config::FetchConfig;
use crate::error::PipelineError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Wait conditions passed through to the rendering back end
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    pub wait_for_selector: Option<String>,
    pub wait_for_structured_data: bool,
}

impl FetchOptions {
    pub fn structured_data(wait: bool) -> Self {
        Self {
            wait_for_selector: None,
            wait_for_structured_data: wait,
        }
    }
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Render `url` to HTML. Timeouts and retries belong to the implementation.
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<String>;

    /// Fetch `url`, locate the iframe matching `selector` and return the
    /// frame's own HTML.
    async fn fetch_iframe(&self, url: &str, selector: &str) -> Result<String, PipelineError> {
        let outer = self
            .fetch(url, &FetchOptions::default())
            .await
            .map_err(|source| PipelineError::Fetch {
                url: url.to_string(),
                source,
            })?;
        self.follow_iframe(url, &outer, selector).await
    }

    /// Resolve the iframe in already-fetched `outer` HTML and fetch the frame
    async fn follow_iframe(
        &self,
        url: &str,
        outer: &str,
        selector: &str,
    ) -> Result<String, PipelineError> {
        let frame_url =
            resolve_iframe_src(outer, selector, url).ok_or_else(|| PipelineError::IframeNotFound {
                url: url.to_string(),
                selector: selector.to_string(),
            })?;
        debug!(url = %url, frame = %frame_url, "Following iframe");
        self.fetch(&frame_url, &FetchOptions::default())
            .await
            .map_err(|source| PipelineError::Fetch {
                url: frame_url,
                source,
            })
    }
}

/// Absolute `src` of the first element matching `selector`, if any
pub fn resolve_iframe_src(html: &str, selector: &str, base_url: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let document = Html::parse_document(html);
    let src = document
        .select(&selector)
        .next()?
        .value()
        .attr("src")?
        .trim();
    if src.is_empty() {
        return None;
    }
    match Url::parse(base_url) {
        Ok(base) => base.join(src).ok().map(String::from),
        Err(_) => Url::parse(src).ok().map(String::from),
    }
}

/// Pick the rendering service when configured, plain HTTP otherwise
pub fn build_fetcher(config: &FetchConfig) -> Result<Arc<dyn Fetcher>> {
    match &config.render_service_url {
        Some(base_url) => {
            info!("Fetching through render service at {}", base_url);
            Ok(Arc::new(RenderServiceFetcher::new(base_url, config)?))
        }
        None => Ok(Arc::new(HttpFetcher::new(config)?)),
    }
}

pub struct HttpFetcher {
    client: Client,
    linkedin_cookie: Option<String>,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            linkedin_cookie: config.linkedin_cookie.clone(),
        })
    }

}

fn is_linkedin(url: &str) -> bool {
    url.to_lowercase().contains("linkedin.com")
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<String> {
        if options.wait_for_selector.is_some() || options.wait_for_structured_data {
            debug!(url = %url, "Plain HTTP fetch cannot wait for rendering, fetching as-is");
        }

        let mut request = self.client.get(url);
        if is_linkedin(url) {
            if let Some(cookie) = &self.linkedin_cookie {
                debug!(url = %url, "Using LinkedIn session cookie");
                request = request.header(reqwest::header::COOKIE, format!("li_at={}", cookie));
            }
        }

        let response = request.send().await.context("Failed to fetch page")?;
        if !response.status().is_success() {
            anyhow::bail!("HTTP error: {}", response.status());
        }

        response.text().await.context("Failed to read response body")
    }
}

const JOBPOSTING_READY_FN: &str = r#"() => {
  const script = document.querySelector('script[type="application/ld+json"]');
  return !!script && script.textContent.includes('"@type":"JobPosting"');
}"#;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderRequest<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    wait_for_selector: Option<WaitForSelector<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wait_for_function: Option<WaitForFunction>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    cookies: Vec<RenderCookie<'a>>,
}

#[derive(Debug, Serialize)]
struct RenderCookie<'a> {
    name: &'static str,
    value: &'a str,
    domain: &'static str,
}

#[derive(Debug, Serialize)]
struct WaitForSelector<'a> {
    selector: &'a str,
    timeout: u64,
}

#[derive(Debug, Serialize)]
struct WaitForFunction {
    #[serde(rename = "fn")]
    function: &'static str,
    timeout: u64,
}

/// Client for a headless-browser service exposing `POST /content`
pub struct RenderServiceFetcher {
    client: Client,
    base_url: String,
    wait_timeout_ms: u64,
    linkedin_cookie: Option<String>,
}

impl RenderServiceFetcher {
    pub fn new(base_url: &str, config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            wait_timeout_ms: config.timeout_seconds.saturating_mul(1000),
            linkedin_cookie: config.linkedin_cookie.clone(),
        })
    }

    fn render_request<'a>(&'a self, url: &'a str, options: &'a FetchOptions) -> RenderRequest<'a> {
        RenderRequest {
            url,
            wait_for_selector: options
                .wait_for_selector
                .as_deref()
                .map(|selector| WaitForSelector {
                    selector,
                    timeout: self.wait_timeout_ms,
                }),
            wait_for_function: options.wait_for_structured_data.then(|| WaitForFunction {
                function: JOBPOSTING_READY_FN,
                timeout: self.wait_timeout_ms,
            }),
            cookies: self.session_cookies(url),
        }
    }

    /// LinkedIn session cookie for LinkedIn URLs, nothing otherwise
    fn session_cookies(&self, url: &str) -> Vec<RenderCookie<'_>> {
        match &self.linkedin_cookie {
            Some(cookie) if is_linkedin(url) => vec![RenderCookie {
                name: "li_at",
                value: cookie.as_str(),
                domain: ".linkedin.com",
            }],
            _ => Vec::new(),
        }
    }
}

#[async_trait]
impl Fetcher for RenderServiceFetcher {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<String> {
        let endpoint = format!("{}/content", self.base_url);
        let body = self.render_request(url, options);

        debug!(url = %url, endpoint = %endpoint, "Rendering page");

        let response = self
            .client
            .post(&endpoint)
            .json(&body)
            .send()
            .await
            .context("Failed to call render service")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            anyhow::bail!("Render service returned {}: {}", status, error_text);
        }

        response
            .text()
            .await
            .context("Failed to read rendered HTML")
    }
}
