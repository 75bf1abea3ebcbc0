//! Exponential backoff for provider calls

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::error::AppResult;

/// Retry policy configuration for exponential backoff
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts (0 means only the initial attempt)
    pub max_retries: u32,

    /// Base delay in milliseconds for the first retry
    pub base_delay_ms: u64,

    /// Maximum delay in milliseconds, also caps `Retry-After`
    pub max_delay_ms: u64,

    /// Whether to add up to 30% random jitter to each delay
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 500,
            max_delay_ms: 8000,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay_ms: u64, max_delay_ms: u64, jitter: bool) -> Self {
        Self {
            max_retries,
            base_delay_ms,
            max_delay_ms,
            jitter,
        }
    }

    /// Policy that never retries
    pub fn none() -> Self {
        Self::new(0, 0, 0, false)
    }

    /// Delay before retry number `attempt` (0-indexed).
    ///
    /// `min(base * 2^attempt, max)`, raised to the provider's hint when one
    /// was given, then jittered.
    pub fn delay_for(&self, attempt: u32, hint: Option<Duration>) -> Duration {
        let exponential = self
            .base_delay_ms
            .saturating_mul(2_u64.saturating_pow(attempt));
        let hinted = hint
            .map(|h| h.as_millis().min(u64::MAX as u128) as u64)
            .unwrap_or(0);
        let capped = exponential.max(hinted).min(self.max_delay_ms);

        let jittered = if self.jitter {
            let range = (capped as f64 * 0.3) as u64;
            if range > 0 {
                capped.saturating_add(rand::thread_rng().gen_range(0..=range))
            } else {
                capped
            }
        } else {
            capped
        };

        Duration::from_millis(jittered)
    }
}

/// Runs `operation` until it succeeds, fails with a non-retryable error, or
/// the policy's retries are spent. The closure receives the attempt number.
pub async fn retry_with_backoff<F, Fut, T>(mut operation: F, policy: &RetryPolicy) -> AppResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempt = 0;

    loop {
        match operation(attempt).await {
            Ok(result) => return Ok(result),
            Err(error) => {
                if !error.is_retryable() {
                    tracing::debug!(attempt, error = %error, "Error is not retryable");
                    return Err(error);
                }

                if attempt >= policy.max_retries {
                    tracing::warn!(
                        attempt,
                        max_retries = policy.max_retries,
                        error = %error,
                        "All retry attempts exhausted"
                    );
                    return Err(error);
                }

                let delay = policy.delay_for(attempt, error.retry_after());
                tracing::debug!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Retrying after delay"
                );

                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
