// Shared HTTP fetcher — one client, one throttle, one retry policy.
//
// Every external call in the pipeline (suggestions and competitor search
// pages) is a plain unauthenticated GET. They all go through this fetcher
// so the inter-request floor holds across sources, not just within one.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER};
use tracing::debug;

use super::retry::{with_retry, RetryPolicy};
use super::throttle::Throttle;

/// Desktop browser user agent; search pages serve reduced markup otherwise.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

/// Accept header for HTML search pages.
pub const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Accept header for JSON endpoints.
pub const ACCEPT_JSON: &str = "application/json,*/*";

/// Tunables for the shared fetcher.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub user_agent: String,
    /// Per-call timeout
    pub timeout: Duration,
    /// Minimum gap between the end of one call and the start of the next
    pub interval: Duration,
    pub retry: RetryPolicy,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(12),
            interval: Duration::from_millis(800),
            retry: RetryPolicy::default(),
        }
    }
}

/// Throttled, retrying GET client.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    throttle: Throttle,
    retry: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(options: &FetchOptions) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("ko-KR,ko;q=0.9,en-US;q=0.8,en;q=0.7"),
        );
        headers.insert(REFERER, HeaderValue::from_static("https://www.naver.com/"));

        let client = reqwest::Client::builder()
            .user_agent(options.user_agent.as_str())
            .default_headers(headers)
            .timeout(options.timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            throttle: Throttle::new(options.interval),
            retry: options.retry,
        })
    }

    /// GET `url` with query `params` and return the body text.
    ///
    /// A transport error, a non-2xx status, or an empty body is a failed
    /// attempt; the error returned after the last attempt names the URL.
    pub async fn get_text(&self, url: &str, params: &[(&str, &str)], accept: &str) -> Result<String> {
        let client = &self.client;
        with_retry(&self.retry, &self.throttle, url, || async move {
            debug!(url = url, "GET");

            let response = client
                .get(url)
                .query(params)
                .header(ACCEPT, accept)
                .send()
                .await
                .with_context(|| format!("Request failed: {url}"))?;

            let status = response.status();
            if !status.is_success() {
                anyhow::bail!("{url} returned {status}");
            }

            let body = response
                .text()
                .await
                .with_context(|| format!("Failed to read body from {url}"))?;
            if body.trim().is_empty() {
                anyhow::bail!("{url} returned an empty body");
            }
            Ok(body)
        })
        .await
    }
}
