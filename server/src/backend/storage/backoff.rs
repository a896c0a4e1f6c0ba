//! Bounded exponential backoff for startup-time resource acquisition.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tokio::time::Instant;
use tracing::warn;

/// Retry schedule: each delay is the previous one times `multiplier`, capped
/// at `max_interval_ms`. Retrying stops once the next delay would push the
/// total elapsed time past `max_elapsed_ms`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BackoffPolicy {
    pub initial_interval_ms: u64,
    pub multiplier: f64,
    pub max_interval_ms: u64,
    pub max_elapsed_ms: u64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            initial_interval_ms: 500,
            multiplier: 1.5,
            max_interval_ms: 60_000,
            max_elapsed_ms: 15 * 60 * 1000,
        }
    }
}

impl BackoffPolicy {
    pub fn initial_interval(&self) -> Duration {
        Duration::from_millis(self.initial_interval_ms)
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }

    pub fn max_elapsed(&self) -> Duration {
        Duration::from_millis(self.max_elapsed_ms)
    }

    /// Non-finite or out-of-range growth saturates at `max_interval`
    fn next_interval(&self, current: Duration) -> Duration {
        Duration::try_from_secs_f64(current.as_secs_f64() * self.multiplier.max(1.0))
            .map_or(self.max_interval(), |next| next.min(self.max_interval()))
    }
}

/// The operation never succeeded within the policy's time budget
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub elapsed: Duration,
    pub last_error: E,
}

/// Run `operation` until it succeeds or the backoff budget is spent.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &BackoffPolicy,
    mut operation: F,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let started = Instant::now();
    let mut interval = policy.initial_interval();
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        let elapsed = started.elapsed();
        if elapsed + interval > policy.max_elapsed() {
            return Err(RetryExhausted {
                attempts,
                elapsed,
                last_error: error,
            });
        }

        warn!(attempt = attempts, retry_in = ?interval, "Attempt failed: {}", error);
        tokio::time::sleep(interval).await;
        interval = policy.next_interval(interval);
    }
}
