//! Pre-flight quota check for the search category.

use crate::client::SearchClient;
use crate::errors::SearchResult;
use crate::observability::TracingHooks;
use crate::types::{RateLimitResponse, RateLimitStatus};

/// Outcome of a quota check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaCheck {
    /// True if a search request should not be sent.
    pub limited: bool,
    /// Quota as reported, `None` if the check itself failed.
    pub status: Option<RateLimitStatus>,
}

/// Consults `GET /rate_limit` before a search is issued.
///
/// Fails closed: if the status cannot be fetched or parsed the search is
/// treated as rate limited, and the failure is only logged.
#[derive(Debug, Clone)]
pub struct RateLimitGate {
    client: SearchClient,
}

impl RateLimitGate {
    /// Creates a new gate.
    pub fn new(client: SearchClient) -> Self {
        Self { client }
    }

    /// Gets the search quota.
    pub async fn status(&self) -> SearchResult<RateLimitStatus> {
        let response: RateLimitResponse = self.client.get("/rate_limit").await?;
        Ok(response.resources.search)
    }

    /// Checks the search quota, keeping the reported numbers.
    pub async fn check(&self) -> QuotaCheck {
        match self.status().await {
            Ok(status) => QuotaCheck {
                limited: status.is_exhausted(),
                status: Some(status),
            },
            Err(e) => {
                TracingHooks::on_rate_limit_check_failed(&e);
                QuotaCheck {
                    limited: true,
                    status: None,
                }
            }
        }
    }

    /// Returns `true` when the search quota is exhausted, or unknown.
    pub async fn check_available(&self) -> bool {
        self.check().await.limited
    }
}
