//! Client configuration.

use std::time::Duration;

use crate::error::TimeoutLimits;
use crate::transport::Endpoint;

/// Default backend base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default path of the generate endpoint.
pub const DEFAULT_GENERATE_PATH: &str = "/api/dashboard/generate-stream";

/// Default path of the optimize endpoint.
pub const DEFAULT_OPTIMIZE_PATH: &str = "/api/dashboard/optimize-stream";

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const ENV_BASE_URL: &str = "DASHGEN_BASE_URL";
const ENV_CONNECT_TIMEOUT: &str = "DASHGEN_CONNECT_TIMEOUT_SECS";
const ENV_REQUEST_TIMEOUT: &str = "DASHGEN_REQUEST_TIMEOUT_SECS";

/// Errors from loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable held an unusable value.
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue {
        /// Variable name.
        var: &'static str,
        /// The value found.
        value: String,
    },
}

/// Where the backend lives and how long to wait for it.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use dashgen_stream::ClientConfig;
///
/// let config = ClientConfig::new()
///     .base_url("https://admin.example.com")
///     .request_timeout(Duration::from_secs(300));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash.
    pub base_url: String,
    /// Path of the generate endpoint.
    pub generate_path: String,
    /// Path of the optimize endpoint.
    pub optimize_path: String,
    /// Time allowed to establish a connection.
    pub connect_timeout: Duration,
    /// Time allowed for the whole exchange, body included.
    ///
    /// Unset by default: a generation can legitimately stream for minutes.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            generate_path: DEFAULT_GENERATE_PATH.into(),
            optimize_path: DEFAULT_OPTIMIZE_PATH.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load overrides from `DASHGEN_BASE_URL`, `DASHGEN_CONNECT_TIMEOUT_SECS`
    /// and `DASHGEN_REQUEST_TIMEOUT_SECS`. Unset variables keep defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_BASE_URL).filter(|u| !u.trim().is_empty()) {
            config = config.base_url(url);
        }
        if let Some(secs) = lookup(ENV_CONNECT_TIMEOUT) {
            config.connect_timeout = parse_secs(ENV_CONNECT_TIMEOUT, secs)?;
        }
        if let Some(secs) = lookup(ENV_REQUEST_TIMEOUT) {
            config.request_timeout = Some(parse_secs(ENV_REQUEST_TIMEOUT, secs)?);
        }
        Ok(config)
    }

    /// Override the base URL. A trailing slash is dropped.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Override the generate endpoint path.
    #[must_use]
    pub fn generate_path(mut self, path: impl Into<String>) -> Self {
        self.generate_path = path.into();
        self
    }

    /// Override the optimize endpoint path.
    #[must_use]
    pub fn optimize_path(mut self, path: impl Into<String>) -> Self {
        self.optimize_path = path.into();
        self
    }

    /// Override the connect timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Limit the whole exchange.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Full URL for an endpoint.
    #[must_use]
    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        let path = match endpoint {
            Endpoint::Generate => &self.generate_path,
            Endpoint::Optimize => &self.optimize_path,
        };
        format!("{}{}", self.base_url, path)
    }

    /// Limits reported back when the transport times out.
    pub(crate) fn timeout_limits(&self) -> TimeoutLimits {
        TimeoutLimits {
            connect: self.connect_timeout,
            request: self.request_timeout,
        }
    }
}

fn parse_secs(var: &'static str, value: String) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidValue { var, value }),
    }
}
