//! Error types for the search client.

use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

/// Result type alias for search operations.
pub type SearchResult<T> = Result<T, SearchError>;

/// Error kinds for categorizing search errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchErrorKind {
    // Configuration errors
    /// Invalid base URL.
    InvalidBaseUrl,
    /// Invalid configuration.
    InvalidConfiguration,

    // Request errors
    /// Empty search text or an out-of-range page.
    ValidationError,
    /// Query parameters could not be encoded.
    InvalidParameter,

    // Quota errors
    /// Search quota exhausted, either reported by the pre-flight check or by
    /// the upstream rejecting the request.
    RateLimited,

    // Network errors
    /// Connection failed.
    ConnectionFailed,
    /// Request timeout.
    Timeout,
    /// Upstream answered with a non-2xx status.
    HttpStatus,
    /// Any other failure of the HTTP layer.
    RequestFailed,

    // Response errors
    /// Response body did not have the expected shape.
    MalformedResponse,
}

impl fmt::Display for SearchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBaseUrl => write!(f, "invalid_base_url"),
            Self::InvalidConfiguration => write!(f, "invalid_configuration"),
            Self::ValidationError => write!(f, "validation_error"),
            Self::InvalidParameter => write!(f, "invalid_parameter"),
            Self::RateLimited => write!(f, "rate_limited"),
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::HttpStatus => write!(f, "http_status"),
            Self::RequestFailed => write!(f, "request_failed"),
            Self::MalformedResponse => write!(f, "malformed_response"),
        }
    }
}

/// User-facing category of an error.
///
/// The presentation layer only ever distinguishes these three cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Input rejected locally; no state change.
    Validation,
    /// Quota exhausted; the page index is reverted.
    RateLimited,
    /// Any other failure of the network or the response.
    Transport,
}

/// Rate limit information extracted from response headers.
#[derive(Debug, Clone)]
pub struct RateLimitInfo {
    /// Maximum requests allowed.
    pub limit: u32,
    /// Remaining requests in current window.
    pub remaining: u32,
    /// Time when the rate limit resets.
    pub reset_at: DateTime<Utc>,
    /// Retry-After header value in seconds (if present).
    pub retry_after: Option<u64>,
    /// Resource category.
    pub resource: Option<String>,
}

impl RateLimitInfo {
    /// Seconds until the window resets, if the reset lies in the future.
    pub fn seconds_until_reset(&self) -> Option<u64> {
        let now = Utc::now();
        if self.reset_at > now {
            u64::try_from((self.reset_at - now).num_seconds()).ok()
        } else {
            None
        }
    }
}

/// Search API error with detailed information.
#[derive(Error, Debug)]
pub struct SearchError {
    /// Error kind.
    kind: SearchErrorKind,
    /// Error message.
    message: String,
    /// HTTP status code.
    status_code: Option<u16>,
    /// GitHub request ID.
    request_id: Option<String>,
    /// Rate limit info (if applicable).
    rate_limit: Option<RateLimitInfo>,
    /// Underlying cause.
    #[source]
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(code) = self.status_code {
            write!(f, " (HTTP {})", code)?;
        }
        if let Some(ref id) = self.request_id {
            write!(f, " [request_id: {}]", id)?;
        }
        Ok(())
    }
}

impl SearchError {
    /// Creates a new search error.
    pub fn new(kind: SearchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
            request_id: None,
            rate_limit: None,
            cause: None,
        }
    }

    /// Sets the HTTP status code.
    pub fn with_status(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    /// Sets the GitHub request ID.
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Sets the rate limit info.
    pub fn with_rate_limit(mut self, info: RateLimitInfo) -> Self {
        self.rate_limit = Some(info);
        self
    }

    /// Sets the underlying cause.
    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Gets the error kind.
    pub fn kind(&self) -> SearchErrorKind {
        self.kind
    }

    /// Gets the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Gets the HTTP status code.
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Gets the request ID.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Gets the rate limit info.
    pub fn rate_limit(&self) -> Option<&RateLimitInfo> {
        self.rate_limit.as_ref()
    }

    /// Maps the kind onto the three categories the UI distinguishes.
    pub fn category(&self) -> ErrorCategory {
        match self.kind {
            SearchErrorKind::ValidationError => ErrorCategory::Validation,
            SearchErrorKind::RateLimited => ErrorCategory::RateLimited,
            _ => ErrorCategory::Transport,
        }
    }

    /// Returns the cool-down in seconds, if known.
    pub fn retry_after(&self) -> Option<u64> {
        self.rate_limit
            .as_ref()
            .and_then(|r| r.retry_after.or_else(|| r.seconds_until_reset()))
    }

    /// Returns true if a caller-side retry may succeed.
    ///
    /// Rate limit errors are never retried automatically, and neither are
    /// malformed bodies since the same bytes would come back.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            SearchErrorKind::ConnectionFailed
                | SearchErrorKind::Timeout
                | SearchErrorKind::RequestFailed
        ) || (self.kind == SearchErrorKind::HttpStatus
            && self.status_code.map_or(false, |s| s >= 500))
    }

    /// Creates an error from a non-2xx HTTP status.
    pub fn from_status(status: u16, message: impl Into<String>, request_id: Option<String>) -> Self {
        let kind = if status == 429 {
            SearchErrorKind::RateLimited
        } else {
            SearchErrorKind::HttpStatus
        };
        let mut error = Self::new(kind, message).with_status(status);
        if let Some(id) = request_id {
            error = error.with_request_id(id);
        }
        error
    }

    // Convenience constructors

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(SearchErrorKind::InvalidConfiguration, message)
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(SearchErrorKind::ValidationError, message)
    }

    /// Creates a rate limit error raised before any search request.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(SearchErrorKind::RateLimited, message)
    }

    /// Creates a rate limit error from upstream rate limit headers.
    pub fn rate_limit_exceeded(info: RateLimitInfo) -> Self {
        Self::new(SearchErrorKind::RateLimited, "Rate limit exceeded")
            .with_status(403)
            .with_rate_limit(info)
    }

    /// Creates a generic transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(SearchErrorKind::RequestFailed, message)
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(SearchErrorKind::Timeout, message)
    }

    /// Creates a malformed response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(SearchErrorKind::MalformedResponse, message)
    }
}

/// Checks if an error is a rate limit error.
pub fn is_rate_limit_error(error: &SearchError) -> bool {
    error.category() == ErrorCategory::RateLimited
}
