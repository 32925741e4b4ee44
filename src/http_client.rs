use crate::error::Result;
use crate::rate_limit::{RateLimit, RateLimiter};
use crate::request::SourceRequest;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// Desktop browser user agent every adapter presents.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/83.0.4103.61 Safari/537.36";

/// Body of a successful response plus the URL it was finally served from.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub url: String,
    pub body: String,
}

/// Executes requests built by sources.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, request: &SourceRequest) -> Result<RawResponse>;
}

/// Configuration for the HTTP client
#[derive(Clone, Debug)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub enable_cookies: bool,
    pub enable_gzip: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: DESKTOP_USER_AGENT.to_string(),
            enable_cookies: true,
            enable_gzip: true,
        }
    }
}

/// reqwest-backed executor with an optional per-source rate limit.
///
/// Requests are sent once. Transport errors and non-2xx statuses are
/// returned to the caller untouched.
pub struct HttpClient {
    client: Client,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    pub fn new() -> std::result::Result<Self, reqwest::Error> {
        Self::with_config(HttpClientConfig::default(), None)
    }

    pub fn with_config(
        config: HttpClientConfig,
        rate_limit: Option<RateLimit>,
    ) -> std::result::Result<Self, reqwest::Error> {
        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .cookie_store(config.enable_cookies)
            .gzip(config.enable_gzip)
            .brotli(config.enable_gzip)
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()?;

        Ok(Self {
            client,
            rate_limiter: rate_limit.map(RateLimiter::new),
        })
    }

    pub fn rate_limit(&self) -> Option<RateLimit> {
        self.rate_limiter.as_ref().map(RateLimiter::limit)
    }

    /// Get the underlying reqwest client for direct access
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Fetch for HttpClient {
    async fn fetch(&self, request: &SourceRequest) -> Result<RawResponse> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.acquire().await;
        }

        let mut builder = self
            .client
            .request(request.method.clone(), request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?.error_for_status()?;
        let url = response.url().to_string();
        let body = response.text().await?;

        log::debug!(
            "{} {} -> {} bytes",
            request.method,
            request.url,
            body.len()
        );
        Ok(RawResponse { url, body })
    }
}
