//! Configuration types for the search client.

use crate::errors::{SearchError, SearchErrorKind};
use std::time::Duration;

/// Default GitHub API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Default GitHub API version (date-based).
pub const DEFAULT_API_VERSION: &str = "2022-11-28";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default User-Agent header.
pub const DEFAULT_USER_AGENT: &str = "integrations-github-search/0.1.0";

/// How long a fetched page may be served again without a new request.
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(600);

/// Results per page. Fixed for the lifetime of a query session.
pub const PAGE_SIZE: u32 = 10;

/// Last reachable page. The search API only exposes the first 1000 results.
pub const MAX_PAGE: u32 = 100;

/// Caller-side retry configuration.
///
/// Applied around a whole fetch cycle by the pagination layer; the fetcher
/// itself always performs a single request.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum attempts, including the first one.
    pub max_attempts: u32,
    /// Initial backoff delay.
    pub initial_backoff: Duration,
    /// Maximum backoff delay.
    pub max_backoff: Duration,
    /// Backoff multiplier.
    pub multiplier: f64,
    /// Jitter factor (0.0 to 1.0).
    pub jitter: f64,
}

impl RetryConfig {
    /// A single attempt, no retry.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::with_backoff_defaults()
        }
    }

    /// Retries a failed fetch up to `retries` additional times.
    pub fn retries(retries: u32) -> Self {
        Self {
            max_attempts: retries.saturating_add(1),
            ..Self::with_backoff_defaults()
        }
    }

    fn with_backoff_defaults() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            multiplier: 2.0,
            jitter: 0.1,
        }
    }

    /// Returns true if more than one attempt is allowed.
    pub fn is_enabled(&self) -> bool {
        self.max_attempts > 1
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::none()
    }
}

/// Connection pool configuration.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum idle connections per host.
    pub max_idle_per_host: usize,
    /// Idle connection timeout.
    pub idle_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: 4,
            idle_timeout: Duration::from_secs(90),
        }
    }
}

/// Search client configuration.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// API base URL.
    pub base_url: String,
    /// API version header.
    pub api_version: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// User-Agent header.
    pub user_agent: String,
    /// Retry configuration.
    pub retry: RetryConfig,
    /// Staleness window for fetched pages; `None` disables reuse.
    pub stale_time: Option<Duration>,
    /// Connection pool configuration.
    pub pool: PoolConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry: RetryConfig::default(),
            stale_time: Some(DEFAULT_STALE_TIME),
            pool: PoolConfig::default(),
        }
    }
}

impl SearchConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::new()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.base_url.is_empty() {
            return Err(SearchError::new(
                SearchErrorKind::InvalidBaseUrl,
                "Base URL cannot be empty",
            ));
        }

        let parsed = url::Url::parse(&self.base_url).map_err(|e| {
            SearchError::new(
                SearchErrorKind::InvalidBaseUrl,
                format!("Base URL is not a valid URL: {}", e),
            )
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SearchError::new(
                SearchErrorKind::InvalidBaseUrl,
                "Base URL must start with http:// or https://",
            ));
        }

        if self.user_agent.is_empty() {
            return Err(SearchError::configuration("User-Agent is required by GitHub API"));
        }

        if self.retry.max_attempts == 0 {
            return Err(SearchError::configuration("Retry max_attempts must be at least 1"));
        }

        if !(0.0..=1.0).contains(&self.retry.jitter) {
            return Err(SearchError::configuration("Retry jitter must be between 0.0 and 1.0"));
        }

        Ok(())
    }
}

/// Builder for SearchConfig.
#[derive(Debug, Default)]
pub struct SearchConfigBuilder {
    base_url: Option<String>,
    api_version: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
    retry: Option<RetryConfig>,
    stale_time: Option<Option<Duration>>,
    pool: Option<PoolConfig>,
}

impl SearchConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the API version.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the User-Agent header.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the retry configuration.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.retry = Some(config);
        self
    }

    /// Sets the staleness window.
    pub fn stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = Some(Some(stale_time));
        self
    }

    /// Always refetch, never reuse a previously fetched page.
    pub fn no_stale_reuse(mut self) -> Self {
        self.stale_time = Some(None);
        self
    }

    /// Sets the connection pool configuration.
    pub fn pool(mut self, config: PoolConfig) -> Self {
        self.pool = Some(config);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> Result<SearchConfig, SearchError> {
        let config = SearchConfig {
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_version: self.api_version.unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            connect_timeout: self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT),
            user_agent: self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            retry: self.retry.unwrap_or_default(),
            stale_time: self.stale_time.unwrap_or(Some(DEFAULT_STALE_TIME)),
            pool: self.pool.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.retry, RetryConfig::none());
        assert_eq!(config.stale_time, Some(DEFAULT_STALE_TIME));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = SearchConfig::builder()
            .base_url("https://github.example.com/api/v3")
            .user_agent("test-client/1.0")
            .timeout(Duration::from_secs(60))
            .retry(RetryConfig::retries(3))
            .no_stale_reuse()
            .build()
            .unwrap();

        assert_eq!(config.base_url, "https://github.example.com/api/v3");
        assert_eq!(config.user_agent, "test-client/1.0");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.retry.max_attempts, 4);
        assert!(config.stale_time.is_none());
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(SearchConfig::builder().base_url("invalid-url").build().is_err());
        assert!(SearchConfig::builder().base_url("ftp://example.com").build().is_err());
        assert!(SearchConfig::builder().base_url("").build().is_err());
    }

    #[test]
    fn test_empty_user_agent_rejected() {
        let err = SearchConfig::builder().user_agent("").build().unwrap_err();
        assert_eq!(err.kind(), SearchErrorKind::InvalidConfiguration);
    }

    #[test]
    fn test_retry_presets() {
        assert!(!RetryConfig::none().is_enabled());
        assert!(RetryConfig::retries(1).is_enabled());
        assert_eq!(RetryConfig::retries(0), RetryConfig::none());
    }
}
