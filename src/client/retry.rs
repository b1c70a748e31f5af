use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::error::AttemptError;

/// Errors that know whether another attempt could succeed.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for AttemptError {
    fn is_retryable(&self) -> bool {
        // transport failures, error statuses and truncated bodies are all
        // transient as far as the archive is concerned
        true
    }
}

/// The last error once a policy gives up, with the number of attempts made.
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last: E,
}

/// Fixed-delay retry: at most `max_attempts` calls, `delay` between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// `max_attempts` below one is raised to one.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `operation` until it succeeds, returns a non-retryable error, or
    /// the attempt budget is spent. `operation` receives the 1-based attempt
    /// number.
    pub async fn run<T, E, F, Fut>(&self, mut operation: F) -> Result<T, RetryExhausted<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + Display,
    {
        let mut attempt = 1;
        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %error,
                        "attempt failed"
                    );

                    if attempt >= self.max_attempts || !error.is_retryable() {
                        return Err(RetryExhausted {
                            attempts: attempt,
                            last: error,
                        });
                    }
                }
            }

            tokio::time::sleep(self.delay).await;
            attempt += 1;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            crate::utils::constants::DEFAULT_MAX_ATTEMPTS,
            Duration::from_millis(crate::utils::constants::DEFAULT_RETRY_DELAY_MS),
        )
    }
}
