//! Bounded retry with exponential backoff and jitter
//!
//! Only transient provider errors (rate limiting, unavailability, network
//! trouble) are retried; anything else is returned on the spot.

use std::time::{Duration, Instant};

use rand::Rng;

use super::ProviderError;
use crate::config::ProviderConfig;

/// How often a backoff checks for an interrupt
const STOP_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_backoff: Duration,
    /// Ceiling for any single delay, jitter included
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ProviderConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &ProviderConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        }
    }

    /// Delay before retry number `attempt` (1-based): doubled each time,
    /// plus up to 50% jitter, capped at `max_backoff`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(20);
        let base = self.initial_backoff.saturating_mul(1u32 << exp);
        let jitter_ms = (base.as_millis() / 2) as u64;
        let jitter = if jitter_ms > 0 {
            Duration::from_millis(rand::thread_rng().gen_range(0..=jitter_ms))
        } else {
            Duration::ZERO
        };
        (base + jitter).min(self.max_backoff)
    }

    /// Run `operation` until it succeeds, fails permanently, or retries run out
    pub fn run<T>(
        &self,
        operation: impl FnMut() -> Result<T, ProviderError>,
    ) -> Result<T, ProviderError> {
        self.run_until(|| false, operation)
    }

    /// Like [`RetryPolicy::run`], but gives up with the last error as soon
    /// as `stop` returns true, including part way through a backoff.
    pub fn run_until<T>(
        &self,
        stop: impl Fn() -> bool,
        mut operation: impl FnMut() -> Result<T, ProviderError>,
    ) -> Result<T, ProviderError> {
        let mut attempt = 0;
        loop {
            match operation() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_retries && !stop() => {
                    attempt += 1;
                    let delay = self.delay_for(attempt);
                    tracing::warn!(error = %e, attempt, delay_ms = delay.as_millis() as u64, "transient provider error, retrying");
                    if !sleep_unless(delay, &stop) {
                        tracing::debug!(attempt, "retry abandoned on interrupt");
                        return Err(e);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Sleep in short slices; false when `stop` fired first
fn sleep_unless(delay: Duration, stop: &impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + delay;
    loop {
        if stop() {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        std::thread::sleep((deadline - now).min(STOP_POLL));
    }
}
