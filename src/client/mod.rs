//! GitHub API client shared by the search services.

use crate::config::{RetryConfig, SearchConfig, SearchConfigBuilder};
use crate::errors::{RateLimitInfo, SearchError, SearchErrorKind, SearchResult};
use crate::observability::Metrics;
use crate::services::{RateLimitGate, SearchFetcher, UserDetailService};
use chrono::DateTime;
use reqwest::{
    header::{HeaderMap, ACCEPT, USER_AGENT},
    Client, Response, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

/// GitHub error response format.
#[derive(Debug, serde::Deserialize)]
struct GitHubErrorResponse {
    message: String,
}

/// Read-only GitHub API client.
///
/// Cloning is cheap; clones share the connection pool and metrics.
#[derive(Debug, Clone)]
pub struct SearchClient {
    /// HTTP client.
    http: Client,
    /// Configuration.
    config: Arc<SearchConfig>,
    /// Fetch counters.
    metrics: Arc<Metrics>,
}

impl SearchClient {
    /// Creates a new client.
    pub fn new(config: SearchConfig) -> SearchResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool.max_idle_per_host)
            .pool_idle_timeout(config.pool.idle_timeout)
            .build()
            .map_err(|e| {
                SearchError::new(
                    SearchErrorKind::InvalidConfiguration,
                    format!("Failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self {
            http,
            config: Arc::new(config),
            metrics: Arc::new(Metrics::new()),
        })
    }

    /// Creates a new client builder.
    pub fn builder() -> SearchClientBuilder {
        SearchClientBuilder::new()
    }

    /// Gets the base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Gets the configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Gets the shared fetch counters.
    pub fn metrics(&self) -> Arc<Metrics> {
        self.metrics.clone()
    }

    // Service accessors

    /// Gets the rate limit gate.
    pub fn rate_limit_gate(&self) -> RateLimitGate {
        RateLimitGate::new(self.clone())
    }

    /// Gets the search fetcher.
    pub fn search_fetcher(&self) -> SearchFetcher {
        SearchFetcher::new(self.clone())
    }

    /// Gets the user detail service.
    pub fn user_details(&self) -> UserDetailService {
        UserDetailService::new(self.clone())
    }

    // HTTP methods

    /// Makes a GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> SearchResult<T> {
        let url = self.build_url(path);
        self.get_url(&url).await
    }

    /// Makes a GET request with query parameters.
    pub async fn get_with_params<T: DeserializeOwned, P: Serialize>(
        &self,
        path: &str,
        params: &P,
    ) -> SearchResult<T> {
        let url = self.build_url(path);
        let query_string = serde_urlencoded::to_string(params).map_err(|e| {
            SearchError::new(
                SearchErrorKind::InvalidParameter,
                format!("Failed to serialize parameters: {}", e),
            )
            .with_cause(e)
        })?;

        let full_url = if query_string.is_empty() {
            url
        } else {
            format!("{}?{}", url, query_string)
        };

        self.get_url(&full_url).await
    }

    /// Makes a GET request against an absolute URL.
    pub async fn get_url<T: DeserializeOwned>(&self, url: &str) -> SearchResult<T> {
        let response = self.execute_request(url).await?;

        let body = response.bytes().await.map_err(|e| {
            SearchError::transport(format!("Failed to read response body: {}", e)).with_cause(e)
        })?;

        serde_json::from_slice(&body).map_err(|e| {
            SearchError::malformed(format!("Failed to deserialize response: {}", e)).with_cause(e)
        })
    }

    // Internal methods

    async fn execute_request(&self, url: &str) -> SearchResult<Response> {
        let response = self
            .http
            .get(url)
            .header(USER_AGENT, &self.config.user_agent)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", &self.config.api_version)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::timeout(format!("Request timed out: {}", e))
                } else if e.is_connect() {
                    SearchError::new(
                        SearchErrorKind::ConnectionFailed,
                        format!("Connection failed: {}", e),
                    )
                } else {
                    SearchError::transport(format!("Request failed: {}", e))
                }
            })?;

        let rate_limit = Self::extract_rate_limit(response.headers());

        if !response.status().is_success() {
            return Err(Self::handle_error_response(response, rate_limit).await);
        }

        Ok(response)
    }

    fn build_url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    fn extract_rate_limit(headers: &HeaderMap) -> Option<RateLimitInfo> {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

        let limit = header("x-ratelimit-limit")?.parse().ok()?;
        let remaining = header("x-ratelimit-remaining")?.parse().ok()?;
        let reset_timestamp: i64 = header("x-ratelimit-reset")?.parse().ok()?;
        let reset_at = DateTime::from_timestamp(reset_timestamp, 0)?;

        Some(RateLimitInfo {
            limit,
            remaining,
            reset_at,
            retry_after: header("retry-after").and_then(|v| v.parse().ok()),
            resource: header("x-ratelimit-resource").map(String::from),
        })
    }

    async fn handle_error_response(response: Response, rate_limit: Option<RateLimitInfo>) -> SearchError {
        let status = response.status();
        let request_id = response
            .headers()
            .get("x-github-request-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let error_body = response.json::<GitHubErrorResponse>().await.ok();
        let message = error_body
            .map(|e| e.message)
            .unwrap_or_else(|| format!("HTTP {} error", status.as_u16()));

        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            let quota_exhausted = rate_limit.as_ref().map_or(false, |info| info.remaining == 0);
            let secondary_limit = message.to_lowercase().contains("rate limit");

            if quota_exhausted || secondary_limit {
                let mut error = SearchError::rate_limited(message).with_status(status.as_u16());
                if let Some(info) = rate_limit {
                    error = error.with_rate_limit(info);
                }
                if let Some(id) = request_id {
                    error = error.with_request_id(id);
                }
                return error;
            }
        }

        let mut error = SearchError::from_status(status.as_u16(), message, request_id);
        if let Some(info) = rate_limit {
            error = error.with_rate_limit(info);
        }
        error
    }
}

/// Builder for SearchClient.
pub struct SearchClientBuilder {
    config_builder: SearchConfigBuilder,
}

impl SearchClientBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config_builder: SearchConfig::builder(),
        }
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.base_url(url);
        self
    }

    /// Sets the timeout.
    pub fn timeout(mut self, timeout: std::time::Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Sets the User-Agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.user_agent(ua);
        self
    }

    /// Sets the caller-side retry policy.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.config_builder = self.config_builder.retry(config);
        self
    }

    /// Disables reuse of previously fetched pages.
    pub fn no_stale_reuse(mut self) -> Self {
        self.config_builder = self.config_builder.no_stale_reuse();
        self
    }

    /// Builds the client.
    pub fn build(self) -> SearchResult<SearchClient> {
        let config = self.config_builder.build()?;
        SearchClient::new(config)
    }
}

impl Default for SearchClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
