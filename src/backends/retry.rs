//! Retry with exponential backoff for backend API calls
//!
//! Transient failures (connection resets, timeouts, 5xx, rate limits) are
//! retried with exponential backoff and jitter; permanent failures are
//! returned immediately.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Retry classification for errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the operation
    Retry,
    /// Retry after a specific duration (e.g., from a Retry-After header)
    RetryAfter(Duration),
    /// The error is permanent, don't retry
    NoRetry,
}

/// Trait for errors that can classify themselves for retry
pub trait RetryableError {
    fn retry_decision(&self) -> RetryDecision;
}

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not including the initial attempt)
    pub max_retries: u32,

    /// Initial backoff duration
    pub initial_backoff: Duration,

    /// Maximum backoff duration
    pub max_backoff: Duration,

    /// Backoff multiplier
    pub multiplier: f64,

    /// Add random jitter to avoid synchronized retries
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Config with short backoffs, for tests
    pub fn quick() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
            multiplier: 2.0,
            jitter: true,
        }
    }

    /// Backoff duration for a given attempt number (0-based)
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        let exp = self.multiplier.powi(attempt.min(31) as i32);
        let mut backoff = self.initial_backoff.mul_f64(exp);

        if backoff > self.max_backoff {
            backoff = self.max_backoff;
        }
        if self.jitter {
            // 0-25% jitter
            backoff = backoff.mul_f64(1.0 + jitter_factor() * 0.25);
        }

        backoff
    }
}

/// Pseudo-random factor in [0.0, 1.0) without an extra dependency
fn jitter_factor() -> f64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    f64::from(nanos % 1000) / 1000.0
}

/// Execute an async operation, retrying transient failures.
///
/// Returns the first success, or the error once it is classified permanent
/// or the retry budget is exhausted.
pub async fn with_retry<F, Fut, T, E>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryableError + std::fmt::Display,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        let backoff = match err.retry_decision() {
            RetryDecision::NoRetry => {
                debug!(
                    operation = operation_name,
                    attempt = attempt,
                    "Permanent error: {}",
                    err
                );
                return Err(err);
            }
            _ if attempt >= config.max_retries => {
                warn!(
                    operation = operation_name,
                    attempts = attempt + 1,
                    "Giving up: {}",
                    err
                );
                return Err(err);
            }
            RetryDecision::RetryAfter(d) => d.min(config.max_backoff),
            RetryDecision::Retry => config.backoff_duration(attempt),
        };

        warn!(
            operation = operation_name,
            attempt = attempt + 1,
            backoff_secs = backoff.as_secs_f64(),
            "Retrying after error: {}",
            err
        );

        sleep(backoff).await;
        attempt += 1;
    }
}
