use crate::http_client::{HttpClient, HttpClientConfig, DESKTOP_USER_AGENT};
use crate::rate_limit::RateLimit;
use crate::source::Source;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// Timeout for HTTP requests in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Enable cookie support
    #[serde(default = "default_true")]
    pub enable_cookies: bool,

    /// Enable gzip/brotli compression
    #[serde(default = "default_true")]
    pub enable_compression: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    /// Honour each source's own request budget
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool { true }
fn default_timeout() -> u64 { 30 }
fn default_user_agent() -> String { DESKTOP_USER_AGENT.to_string() }

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
            enable_cookies: true,
            enable_compression: true,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    /// Read `config.toml` from the working directory, or defaults.
    pub fn load() -> Self {
        Self::load_from(Path::new("config.toml"))
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(cfg) => cfg,
                Err(e) => {
                    log::warn!("ignoring {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("cannot read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// HTTP client for one source, carrying its rate limit when enabled.
    pub fn client_for(&self, source: &dyn Source) -> Result<HttpClient, reqwest::Error> {
        let limit = if self.rate_limit.enabled {
            source.rate_limit()
        } else {
            None
        };
        self.http.create_http_client(limit)
    }
}

impl HttpConfig {
    pub fn client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone(),
            enable_cookies: self.enable_cookies,
            enable_gzip: self.enable_compression,
        }
    }

    pub fn create_http_client(&self, rate_limit: Option<RateLimit>) -> Result<HttpClient, reqwest::Error> {
        HttpClient::with_config(self.client_config(), rate_limit)
    }
}
