//! Bounded exponential backoff for network-bound operations.
//!
//! Every call site picks a [`RetryPolicy`] and wraps the operation with
//! [`RetryPolicy::run`] (errors classify themselves through [`Retryable`]) or
//! [`RetryPolicy::run_if`] (caller supplies the predicate). When attempts are
//! exhausted the last error is returned as-is.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Classifies an error as transient (worth another attempt) or fatal.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub min_wait: Duration,
    pub max_wait: Duration,
    pub multiplier: f64,
}

impl RetryPolicy {
    pub const fn new(
        max_attempts: u32,
        min_wait: Duration,
        max_wait: Duration,
        multiplier: f64,
    ) -> Self {
        Self {
            max_attempts,
            min_wait,
            max_wait,
            multiplier,
        }
    }

    /// Tool discovery and invocation.
    pub const fn network() -> Self {
        Self::new(3, Duration::from_secs(1), Duration::from_secs(10), 1.0)
    }

    /// Language-model API calls; backs off harder against rate limits.
    pub const fn model_api() -> Self {
        Self::new(3, Duration::from_secs(2), Duration::from_secs(30), 2.0)
    }

    /// History store round trips.
    pub const fn history_store() -> Self {
        Self::new(3, Duration::from_secs(1), Duration::from_secs(5), 1.0)
    }

    /// Retries without sleeping. Used by tests.
    pub const fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO, Duration::ZERO, 1.0)
    }

    /// Wait before retrying after failed attempt `attempt` (1-based):
    /// `min(max_wait, min_wait * multiplier^(attempt - 1))`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let scaled = self.min_wait.as_secs_f64() * self.multiplier.powi(exponent);
        let capped = scaled.min(self.max_wait.as_secs_f64());
        if capped.is_finite() && capped > 0.0 {
            Duration::from_secs_f64(capped)
        } else {
            Duration::ZERO
        }
    }

    pub async fn run<T, E, F, Fut>(&self, operation: &str, f: F) -> Result<T, E>
    where
        E: Retryable + Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.run_if(operation, E::is_retryable, f).await
    }

    pub async fn run_if<T, E, P, F, Fut>(
        &self,
        operation: &str,
        is_retryable: P,
        mut f: F,
    ) -> Result<T, E>
    where
        E: Display,
        P: Fn(&E) -> bool,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match f().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < max_attempts && is_retryable(&err) => {
                    let wait = self.backoff(attempt);
                    warn!(
                        operation,
                        attempt,
                        max_attempts,
                        wait_ms = wait.as_millis() as u64,
                        error = %err,
                        "Retrying after error"
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::network()
    }
}
