//! # Single-Item Resolver
//!
//! Resolves one order identifier: cache first, then the order-status endpoint
//! under a [`RetryPolicy`], then the cache is updated with the outcome.
//!
//! Every outcome reduces to [`Resolution`]. A transient failure that survives
//! every attempt is cached and reported as not found, the same as a confirmed
//! absence; [`NotFoundReason`] keeps the two apart for logging and for
//! single-item callers.

use super::cache::{CacheLookup, ResolutionCache};
use super::client::OrderStatusSource;
use super::retry::{RetryOutcome, RetryPolicy};
use super::types::{NotFoundReason, Resolution};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

#[derive(Clone)]
pub struct OrderResolver {
    source: Arc<dyn OrderStatusSource>,
    cache: Arc<dyn ResolutionCache>,
    retry: RetryPolicy,
    cache_ttl: Duration,
}

impl std::fmt::Debug for OrderResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderResolver")
            .field("cache", &self.cache.provider_name())
            .field("retry", &self.retry)
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

impl OrderResolver {
    pub fn new(
        source: Arc<dyn OrderStatusSource>,
        cache: Arc<dyn ResolutionCache>,
        retry: RetryPolicy,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            source,
            cache,
            retry,
            cache_ttl,
        }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Resolve one identifier; never fails
    #[instrument(skip(self), fields(cache = self.cache.provider_name()))]
    pub async fn resolve(&self, order_id: &str) -> Resolution {
        match self.cache.get(order_id, self.cache_ttl).await {
            CacheLookup::Hit(record) => return Resolution::Found(record),
            CacheLookup::ConfirmedMissing => {
                return Resolution::NotFound(NotFoundReason::Confirmed)
            }
            CacheLookup::Absent => {}
        }

        let source = &self.source;
        let outcome = self
            .retry
            .execute("fetch_order", |attempt| async move {
                debug!(order_id = order_id, attempt = attempt, "Calling order-status endpoint");
                source.fetch_order(order_id).await
            })
            .await;

        match outcome {
            RetryOutcome::Succeeded { value, attempts } => {
                debug!(order_id = order_id, attempts = attempts, status = %value.status, "Order resolved");
                self.cache.set(order_id, Some(value.clone())).await;
                Resolution::Found(value)
            }
            RetryOutcome::Aborted { error, attempts } if error.is_not_found() => {
                debug!(order_id = order_id, attempts = attempts, "Order does not exist");
                self.cache.set(order_id, None).await;
                Resolution::NotFound(NotFoundReason::Confirmed)
            }
            RetryOutcome::Aborted { error, attempts } => {
                warn!(
                    order_id = order_id,
                    attempts = attempts,
                    error = %error,
                    "Order lookup stopped on a non-retryable error, treating as not found"
                );
                self.cache.set(order_id, None).await;
                Resolution::NotFound(NotFoundReason::RetriesExhausted)
            }
            RetryOutcome::Exhausted { last_error, attempts } => {
                warn!(
                    order_id = order_id,
                    attempts = attempts,
                    error = %last_error,
                    "Order lookup failed on every attempt, treating as not found"
                );
                self.cache.set(order_id, None).await;
                Resolution::NotFound(NotFoundReason::RetriesExhausted)
            }
        }
    }
}
