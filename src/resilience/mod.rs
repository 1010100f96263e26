//! Caller-side retry for search fetches.

use crate::config::RetryConfig;
use crate::errors::SearchResult;
use crate::observability::TracingHooks;
use std::time::Duration;
use tokio::time::sleep;

/// Retry executor with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
    multiplier: f64,
    jitter: f64,
}

impl RetryExecutor {
    /// Creates a new retry executor.
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            initial_backoff: config.initial_backoff,
            max_backoff: config.max_backoff,
            multiplier: config.multiplier,
            jitter: config.jitter,
        }
    }

    /// Maximum attempts, including the first one.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Executes an operation with retry logic.
    ///
    /// Only errors reporting `is_retryable()` are retried; rate limit errors
    /// come back after the first attempt.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> SearchResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = SearchResult<T>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    attempt += 1;

                    if !e.is_retryable() || attempt >= self.max_attempts {
                        return Err(e);
                    }

                    let delay = self.calculate_backoff(attempt);
                    TracingHooks::on_retry(attempt, delay, &e);
                    sleep(delay).await;
                }
            }
        }
    }

    /// Calculates backoff duration for an attempt.
    fn calculate_backoff(&self, attempt: u32) -> Duration {
        let base = self.initial_backoff.as_millis() as f64
            * self.multiplier.powi(attempt.saturating_sub(1) as i32);
        let capped = base.min(self.max_backoff.as_millis() as f64);

        let jitter_range = capped * self.jitter;
        let jitter_value = rand_jitter() * jitter_range * 2.0 - jitter_range;
        let final_delay = (capped + jitter_value).max(0.0);

        Duration::from_millis(final_delay as u64)
    }
}

/// Simple random jitter (0.0 to 1.0).
fn rand_jitter() -> f64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    f64::from(nanos) / 1_000_000_000.0
}
