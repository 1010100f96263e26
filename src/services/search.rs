//! GitHub user search.

use crate::client::SearchClient;
use crate::config::PAGE_SIZE;
use crate::errors::{ErrorCategory, RateLimitInfo, SearchError, SearchResult};
use crate::observability::TracingHooks;
use crate::pagination::SearchPage;
use crate::services::rate_limit::{QuotaCheck, RateLimitGate};
use crate::types::{SearchQuery, SearchUsersResponse};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Instant;

/// Qualifiers restricting matches to user logins.
pub const LOGIN_QUALIFIERS: &str = "in:login type:user";

/// Something that can produce one page of search results.
///
/// [`SearchFetcher`] is the network implementation; the pagination layer
/// only depends on this trait.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Fetches one page for the query.
    async fn fetch(&self, query: &SearchQuery) -> SearchResult<SearchPage>;
}

/// Query string of `GET /search/users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchUsersParams {
    q: String,
    page: u32,
    per_page: u32,
}

impl SearchUsersParams {
    /// Builds the parameters for a query.
    pub fn for_query(query: &SearchQuery) -> Self {
        Self {
            q: format!("{} {}", query.text().trim(), LOGIN_QUALIFIERS),
            page: query.page(),
            per_page: PAGE_SIZE,
        }
    }

    /// The `q` parameter.
    pub fn q(&self) -> &str {
        &self.q
    }
}

/// Issues single-page user searches, gated by the search quota.
///
/// Exactly one search request per call, no retry. Retrying is the caller's
/// decision.
#[derive(Debug, Clone)]
pub struct SearchFetcher {
    client: SearchClient,
    gate: RateLimitGate,
}

impl SearchFetcher {
    /// Creates a new fetcher.
    pub fn new(client: SearchClient) -> Self {
        Self {
            gate: RateLimitGate::new(client.clone()),
            client,
        }
    }

    /// Fetches one page of users matching the query.
    pub async fn fetch(&self, query: &SearchQuery) -> SearchResult<SearchPage> {
        if !query.is_valid() {
            return Err(SearchError::validation(format!(
                "Invalid search query (text: {:?}, page: {})",
                query.text(),
                query.page()
            )));
        }

        let metrics = self.client.metrics();

        let quota = self.gate.check().await;
        if quota.limited {
            TracingHooks::on_rate_limited(query, quota.status.map(|s| s.remaining));
            metrics.record_rate_limited();
            return Err(Self::quota_error(&quota));
        }

        let params = SearchUsersParams::for_query(query);
        TracingHooks::on_fetch_start(query);
        metrics.record_fetch();
        let started = Instant::now();

        let result = self
            .client
            .get_with_params::<SearchUsersResponse, _>("/search/users", &params)
            .await;
        metrics.record_latency(started.elapsed());

        match result {
            Ok(response) => {
                let page = SearchPage::from_response(query.clone(), response);
                metrics.record_success();
                TracingHooks::on_fetch_complete(query, page.len(), page.total_count, started.elapsed());
                Ok(page)
            }
            Err(e) => {
                metrics.record_failure();
                if e.category() == ErrorCategory::RateLimited {
                    metrics.record_rate_limited();
                }
                TracingHooks::on_fetch_error(query, &e);
                Err(e)
            }
        }
    }

    fn quota_error(quota: &QuotaCheck) -> SearchError {
        let error = SearchError::rate_limited("Search rate limit exhausted");
        match quota.status.and_then(|s| s.reset_at().map(|reset_at| (s, reset_at))) {
            Some((status, reset_at)) => error.with_rate_limit(RateLimitInfo {
                limit: status.limit,
                remaining: status.remaining,
                reset_at,
                retry_after: None,
                resource: Some("search".to_string()),
            }),
            None => error,
        }
    }
}

#[async_trait]
impl SearchBackend for SearchFetcher {
    async fn fetch(&self, query: &SearchQuery) -> SearchResult<SearchPage> {
        SearchFetcher::fetch(self, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_include_qualifiers() {
        let params = SearchUsersParams::for_query(&SearchQuery::new("octocat", 3));

        assert_eq!(params.q(), "octocat in:login type:user");
        assert_eq!(params.page, 3);
        assert_eq!(params.per_page, PAGE_SIZE);
    }

    #[test]
    fn test_params_encoding() {
        let params = SearchUsersParams::for_query(&SearchQuery::new(" tom ", 1));
        let encoded = serde_urlencoded::to_string(&params).unwrap();

        assert_eq!(encoded, "q=tom+in%3Alogin+type%3Auser&page=1&per_page=10");
    }
}
