//! # Caller-side Retry
//!
//! Bounded retry with random exponential backoff. The adapter never retries on
//! its own; callers that want it wrap their call in [`retry`].
//!
//! The wait before retry `n` (1-based) is drawn uniformly from
//! `[0, min(max_wait, multiplier * 2^(n-1))]`.

use std::future::Future;
use std::time::Duration;

use log::{debug, warn};
use rand::Rng;

use crate::inference::ProviderError;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_MULTIPLIER: Duration = Duration::from_secs(1);
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(40);

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Zero behaves like one.
    pub max_attempts: u32,
    pub multiplier: Duration,
    pub max_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            multiplier: DEFAULT_MULTIPLIER,
            max_wait: DEFAULT_MAX_WAIT,
        }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Upper bound of the wait before retry number `retry` (1-based).
    pub fn wait_ceiling(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(30) as i32;
        let scaled = self.multiplier.as_secs_f64() * 2f64.powi(exponent);
        Duration::from_secs_f64(scaled.min(self.max_wait.as_secs_f64()))
    }

    fn jittered_wait(&self, retry: u32) -> Duration {
        let ceiling = self.wait_ceiling(retry).as_secs_f64();
        Duration::from_secs_f64(rand::thread_rng().gen_range(0.0..=ceiling))
    }
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or the
/// policy's attempts run out. The last error is returned unchanged.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!("Succeeded on attempt {}/{}", attempt, max_attempts);
                }
                return Ok(value);
            }
            Err(e) if attempt < max_attempts && e.is_retryable() => {
                let wait = policy.jittered_wait(attempt);
                warn!(
                    "Attempt {}/{} failed: {}. Retrying in {:?}",
                    attempt, max_attempts, e, wait
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
