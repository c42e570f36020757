//! Bounded retry with a fixed delay.

use crate::error::RemoteError;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_DELAY: Duration = Duration::from_secs(60);

/// Blocks the current thread between attempts.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

type RetryPredicate = Arc<dyn Fn(&RemoteError) -> bool + Send + Sync>;

/// Retry policy for a single remote call.
///
/// An attempt failing with an error the predicate accepts is followed by a
/// sleep of `delay` and another attempt, up to `max_attempts` attempts in
/// total. Any other error, or the last attempt's error, is returned as-is.
#[derive(Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
    retryable: RetryPredicate,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_DELAY)
    }
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl RetryPolicy {
    /// Retries rate-limit errors. `max_attempts` of 0 is treated as 1.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            retryable: Arc::new(RemoteError::is_rate_limited),
        }
    }

    /// Replace the retryable-error predicate.
    pub fn retry_if<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&RemoteError) -> bool + Send + Sync + 'static,
    {
        self.retryable = Arc::new(predicate);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    /// `op` receives the 1-based attempt number.
    pub fn run<T, F>(&self, sleeper: &dyn Sleeper, mut op: F) -> Result<T, RemoteError>
    where
        F: FnMut(u32) -> Result<T, RemoteError>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_attempts && (self.retryable)(&err) => {
                    tracing::warn!(
                        "Rate limit hit (attempt {}/{}). Waiting {}s before retrying: {}",
                        attempt,
                        self.max_attempts,
                        self.delay.as_secs(),
                        err
                    );
                    sleeper.sleep(self.delay);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
