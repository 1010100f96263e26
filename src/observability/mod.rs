//! Observability module providing logging hooks and counters.

use crate::errors::SearchError;
use crate::types::SearchQuery;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Counters for search fetch cycles.
#[derive(Debug, Default)]
pub struct Metrics {
    /// Fetches started.
    fetches_total: AtomicU64,
    /// Fetches that produced a page.
    fetches_success: AtomicU64,
    /// Fetches that failed for any reason.
    fetches_failed: AtomicU64,
    /// Fetches blocked or rejected by quota.
    fetches_rate_limited: AtomicU64,
    /// Results dropped because the query moved on.
    results_discarded: AtomicU64,
    /// Pages served from the staleness window.
    cache_hits: AtomicU64,
    /// Total fetch latency in microseconds.
    latency_total_us: AtomicU64,
    /// Fetch count for latency calculation.
    latency_count: AtomicU64,
}

impl Metrics {
    /// Creates a new metrics collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the start of a fetch.
    pub fn record_fetch(&self) {
        self.fetches_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a successful fetch.
    pub fn record_success(&self) {
        self.fetches_success.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed fetch.
    pub fn record_failure(&self) {
        self.fetches_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a rate-limited fetch.
    pub fn record_rate_limited(&self) {
        self.fetches_rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a discarded result.
    pub fn record_discarded(&self) {
        self.results_discarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a page served without a request.
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Records fetch latency.
    pub fn record_latency(&self, duration: Duration) {
        let us = duration.as_micros() as u64;
        self.latency_total_us.fetch_add(us, Ordering::Relaxed);
        self.latency_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Gets the average latency in microseconds.
    pub fn average_latency_us(&self) -> u64 {
        let total = self.latency_total_us.load(Ordering::Relaxed);
        let count = self.latency_count.load(Ordering::Relaxed);
        if count == 0 {
            0
        } else {
            total / count
        }
    }

    /// Gets a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            fetches_total: self.fetches_total.load(Ordering::Relaxed),
            fetches_success: self.fetches_success.load(Ordering::Relaxed),
            fetches_failed: self.fetches_failed.load(Ordering::Relaxed),
            fetches_rate_limited: self.fetches_rate_limited.load(Ordering::Relaxed),
            results_discarded: self.results_discarded.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            average_latency_us: self.average_latency_us(),
        }
    }
}

/// A snapshot of metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Fetches started.
    pub fetches_total: u64,
    /// Successful fetches.
    pub fetches_success: u64,
    /// Failed fetches.
    pub fetches_failed: u64,
    /// Rate-limited fetches.
    pub fetches_rate_limited: u64,
    /// Discarded results.
    pub results_discarded: u64,
    /// Pages served from the staleness window.
    pub cache_hits: u64,
    /// Average latency in microseconds.
    pub average_latency_us: u64,
}

/// Tracing hooks for search operations.
pub struct TracingHooks;

impl TracingHooks {
    /// Logs the start of a fetch.
    pub fn on_fetch_start(query: &SearchQuery) {
        debug!(
            text = %query.text(),
            page = query.page(),
            "User search started"
        );
    }

    /// Logs the completion of a fetch.
    pub fn on_fetch_complete(query: &SearchQuery, items: usize, total_count: u64, duration: Duration) {
        info!(
            text = %query.text(),
            page = query.page(),
            items = items,
            total_count = total_count,
            duration_ms = duration.as_millis() as u64,
            "User search completed"
        );
    }

    /// Logs a failed fetch.
    pub fn on_fetch_error(query: &SearchQuery, error: &SearchError) {
        warn!(
            text = %query.text(),
            page = query.page(),
            kind = %error.kind(),
            error = %error,
            "User search failed"
        );
    }

    /// Logs a fetch blocked by the quota check.
    pub fn on_rate_limited(query: &SearchQuery, remaining: Option<u32>) {
        warn!(
            text = %query.text(),
            page = query.page(),
            remaining = ?remaining,
            "Search quota exhausted, request not sent"
        );
    }

    /// Logs a quota check that could not be completed.
    pub fn on_rate_limit_check_failed(error: &SearchError) {
        warn!(
            error = %error,
            "Could not check rate limit status, assuming rate limited"
        );
    }

    /// Logs a result dropped because the query moved on.
    pub fn on_result_discarded(query: &SearchQuery, reason: &str) {
        debug!(
            text = %query.text(),
            page = query.page(),
            reason = reason,
            "Discarding stale search result"
        );
    }

    /// Logs a page served from the staleness window.
    pub fn on_cache_hit(query: &SearchQuery) {
        debug!(
            text = %query.text(),
            page = query.page(),
            "Serving cached search page"
        );
    }

    /// Logs a retry attempt.
    pub fn on_retry(attempt: u32, delay: Duration, error: &SearchError) {
        warn!(
            attempt = attempt,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "Retrying user search"
        );
    }
}
