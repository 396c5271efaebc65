//! # Retry Policy
//!
//! Bounded retries for calls to the order-status endpoint. A policy bundles
//! the attempt budget, the delay between attempts and the predicate deciding
//! which errors are worth another attempt. By default everything except a
//! confirmed "not found" is retried.

use crate::error::OrderApiError;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Delay schedule between attempts
#[derive(Debug, Clone, PartialEq)]
pub enum BackoffStrategy {
    /// Same pause after every failed attempt
    Fixed(Duration),
    /// `base * multiplier^(failures - 1)`, capped at `max`
    Exponential {
        base: Duration,
        multiplier: f64,
        max: Duration,
    },
}

impl BackoffStrategy {
    /// Pause to take after `failures` failed attempts (1-based)
    pub fn delay_for(&self, failures: u32) -> Duration {
        match self {
            BackoffStrategy::Fixed(delay) => *delay,
            BackoffStrategy::Exponential {
                base,
                multiplier,
                max,
            } => {
                let exponent = i32::try_from(failures.saturating_sub(1)).unwrap_or(i32::MAX);
                let scaled = base.as_secs_f64() * multiplier.powi(exponent);
                if !scaled.is_finite() || scaled >= max.as_secs_f64() {
                    *max
                } else {
                    Duration::from_secs_f64(scaled.max(0.0))
                }
            }
        }
    }
}

/// Decides whether an error deserves another attempt
pub type RetryPredicate = fn(&OrderApiError) -> bool;

/// Default predicate: retry everything except a confirmed absence
pub fn retry_unless_not_found(error: &OrderApiError) -> bool {
    !error.is_not_found()
}

/// Stricter predicate: retry only timeouts, connection failures and
/// 5xx/408/429 responses
pub fn retry_recoverable(error: &OrderApiError) -> bool {
    error.is_recoverable()
}

/// How an operation run under a [`RetryPolicy`] ended
#[derive(Debug, Clone, PartialEq)]
pub enum RetryOutcome<T> {
    Succeeded { value: T, attempts: u32 },
    /// A non-retryable error stopped the loop early
    Aborted { error: OrderApiError, attempts: u32 },
    /// Every attempt failed with a retryable error
    Exhausted { last_error: OrderApiError, attempts: u32 },
}

impl<T> RetryOutcome<T> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Succeeded { attempts, .. }
            | RetryOutcome::Aborted { attempts, .. }
            | RetryOutcome::Exhausted { attempts, .. } => *attempts,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: BackoffStrategy,
    retryable: RetryPredicate,
}

impl RetryPolicy {
    /// A budget of zero is treated as a single attempt
    pub fn new(max_attempts: u32, backoff: BackoffStrategy) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
            retryable: retry_unless_not_found,
        }
    }

    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self::new(max_attempts, BackoffStrategy::Fixed(delay))
    }

    pub fn with_predicate(mut self, retryable: RetryPredicate) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> &BackoffStrategy {
        &self.backoff
    }

    pub fn is_retryable(&self, error: &OrderApiError) -> bool {
        (self.retryable)(error)
    }

    /// Run `operation` until it succeeds, hits a non-retryable error, or the
    /// attempt budget is spent. Attempts are strictly sequential.
    pub async fn execute<T, F, Fut>(&self, operation_name: &str, mut operation: F) -> RetryOutcome<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, OrderApiError>>,
    {
        let mut attempt = 1;
        loop {
            match operation(attempt).await {
                Ok(value) => {
                    return RetryOutcome::Succeeded {
                        value,
                        attempts: attempt,
                    }
                }
                Err(error) if !self.is_retryable(&error) => {
                    debug!(
                        operation = operation_name,
                        attempt = attempt,
                        error = %error,
                        "Non-retryable failure"
                    );
                    return RetryOutcome::Aborted {
                        error,
                        attempts: attempt,
                    };
                }
                Err(error) if attempt >= self.max_attempts => {
                    warn!(
                        operation = operation_name,
                        attempts = attempt,
                        error = %error,
                        "Retry budget exhausted"
                    );
                    return RetryOutcome::Exhausted {
                        last_error: error,
                        attempts: attempt,
                    };
                }
                Err(error) => {
                    let delay = self.backoff.delay_for(attempt);
                    debug!(
                        operation = operation_name,
                        attempt = attempt,
                        remaining = self.max_attempts - attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(
            crate::constants::defaults::MAX_ATTEMPTS,
            Duration::from_millis(crate::constants::defaults::INTER_ATTEMPT_DELAY_MS),
        )
    }
}
