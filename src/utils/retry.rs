//! Retry with capped exponential backoff.

use crate::error::Result;
use std::time::Duration;
use tracing::warn;

/// How often and how patiently to retry an operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first (at least 1).
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Factor applied to the delay after each failure.
    pub multiplier: f64,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::from_secs(2),
            multiplier: 2.0,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Default backoff with the given number of attempts.
    #[must_use]
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Delay to wait after failed attempt number `attempt` (0-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = self
            .multiplier
            .max(1.0)
            .powi(i32::try_from(attempt).unwrap_or(i32::MAX));
        let secs = self.initial_delay.as_secs_f64() * factor;
        if secs.is_finite() {
            Duration::from_secs_f64(secs).min(self.max_delay)
        } else {
            self.max_delay
        }
    }
}

/// Run `op` until it succeeds or the policy's attempts are used up.
///
/// Every failure except the last is logged and followed by a backoff sleep.
/// The last error is returned unchanged.
pub fn retry<T, F>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(e) if attempt + 1 < attempts => {
                let delay = policy.delay_after(attempt);
                warn!(
                    "{label} failed (attempt {}/{attempts}), retrying in {:.1}s: {e}",
                    attempt + 1,
                    delay.as_secs_f64()
                );
                std::thread::sleep(delay);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
