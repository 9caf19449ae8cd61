use reqwest::blocking::{Client, ClientBuilder};
use std::time::Duration;

use crate::error::{Result, TumblrError};

/// Tumblr API v2 base URL
pub const API_URL: &str = "http://api.tumblr.com/v2";
/// OAuth request-token URL
pub const REQUEST_TOKEN_URL: &str = "http://www.tumblr.com/oauth/request_token";
/// OAuth authorize URL
pub const AUTHORIZE_URL: &str = "http://www.tumblr.com/oauth/authorize";
/// OAuth access-token URL
pub const ACCESS_TOKEN_URL: &str = "http://www.tumblr.com/oauth/access_token";

/// Meta statuses counted as success by default
pub const DEFAULT_SUCCESS_STATUSES: [i64; 2] = [200, 201];

/// Create the default HTTP client for API requests
/// with settings for connection pooling and timeouts
pub fn create_rest_client(config: &Config) -> Result<Client> {
    ClientBuilder::new()
        .pool_max_idle_per_host(10)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(TumblrError::from)
}

/// Consumer key and secret issued when registering an application.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
}

impl Credentials {
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Credentials {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
        }
    }

    /// Read `TUMBLR_CONSUMER_KEY` and `TUMBLR_CONSUMER_SECRET` from the environment
    pub fn from_env() -> Result<Self> {
        let read = |name: &str| {
            std::env::var(name)
                .ok()
                .filter(|v| !v.is_empty())
                .ok_or_else(|| TumblrError::Config(format!("{} is not set", name)))
        };
        Ok(Credentials::new(
            read("TUMBLR_CONSUMER_KEY")?,
            read("TUMBLR_CONSUMER_SECRET")?,
        ))
    }
}

// Keep the secret out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .finish()
    }
}

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct Config {
    /// Raise an error when `meta.status` is not a success status
    pub throw_response_errors: bool,
    /// Meta statuses counted as success
    pub success_statuses: Vec<i64>,
    /// Whole-request timeout
    pub timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            throw_response_errors: false,
            success_statuses: DEFAULT_SUCCESS_STATUSES.to_vec(),
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    /// Set whether non-success responses are raised as errors
    pub fn with_throw_response_errors(mut self, throw: bool) -> Self {
        self.throw_response_errors = throw;
        self
    }

    /// Replace the set of success statuses
    pub fn with_success_statuses(mut self, statuses: impl IntoIterator<Item = i64>) -> Self {
        self.success_statuses = statuses.into_iter().collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}
