//! # Batch Resolver
//!
//! Drives the single-item resolver over a set of identifiers with bounded
//! concurrency.
//!
//! ## Guardrails
//!
//! - Identifiers are deduplicated by their trimmed string form before any
//!   work is dispatched, so two workers never resolve the same id in one batch.
//! - A deduplicated set larger than `per_request_cap` short-circuits to
//!   [`BatchResolution::rejected`] without touching the network.
//!
//! ## Execution
//!
//! One task per identifier is spawned onto a [`JoinSet`]; each task acquires a
//! permit from a semaphore sized to `concurrency_limit` before resolving, so at
//! most that many lookups are in flight. The call returns once every task has
//! finished. `found` and `not_found` follow completion order, not input order.

use super::cache::{InMemoryResolutionCache, NoOpResolutionCache, ResolutionCache};
use super::client::{HttpOrderStatusClient, OrderStatusSource};
use super::resolver::OrderResolver;
use super::retry::{retry_recoverable, BackoffStrategy, RetryPolicy};
use super::types::{dedup_ids, BatchResolution, NotFoundReason, Resolution};
use crate::config::IntakeConfig;
use crate::constants::defaults;
use crate::error::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

/// Per-call knobs for [`BatchResolver::resolve_batch`]
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    /// Lookups allowed in flight at once; zero is treated as one
    pub concurrency_limit: usize,
    pub max_attempts: u32,
    /// Largest deduplicated batch that is resolved at all
    pub per_request_cap: usize,
    /// Pause after the first failed attempt
    pub inter_attempt_delay: Duration,
    /// Growth factor for later pauses; `1.0` or less keeps them fixed
    pub backoff_multiplier: f64,
    /// Ceiling for grown pauses
    pub max_inter_attempt_delay: Duration,
    /// Retry only errors the remote may answer differently
    /// ([`retry_recoverable`]) instead of everything but a confirmed absence
    pub retry_only_recoverable: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            concurrency_limit: defaults::CONCURRENCY_LIMIT,
            max_attempts: defaults::MAX_ATTEMPTS,
            per_request_cap: defaults::PER_REQUEST_CAP,
            inter_attempt_delay: Duration::from_millis(defaults::INTER_ATTEMPT_DELAY_MS),
            backoff_multiplier: defaults::BACKOFF_MULTIPLIER,
            max_inter_attempt_delay: Duration::from_millis(defaults::MAX_INTER_ATTEMPT_DELAY_MS),
            retry_only_recoverable: false,
        }
    }
}

impl BatchOptions {
    pub fn backoff(&self) -> BackoffStrategy {
        if self.backoff_multiplier > 1.0 {
            BackoffStrategy::Exponential {
                base: self.inter_attempt_delay,
                multiplier: self.backoff_multiplier,
                max: self.max_inter_attempt_delay.max(self.inter_attempt_delay),
            }
        } else {
            BackoffStrategy::Fixed(self.inter_attempt_delay)
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let policy = RetryPolicy::new(self.max_attempts, self.backoff());
        if self.retry_only_recoverable {
            policy.with_predicate(retry_recoverable)
        } else {
            policy
        }
    }
}

/// Shared handle for resolving batches of order identifiers
///
/// Cloning is cheap; clones share the order source and the cache.
#[derive(Clone)]
pub struct BatchResolver {
    source: Arc<dyn OrderStatusSource>,
    cache: Arc<dyn ResolutionCache>,
    cache_ttl: Duration,
}

impl std::fmt::Debug for BatchResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchResolver")
            .field("cache", &self.cache.provider_name())
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

impl BatchResolver {
    pub fn new(
        source: Arc<dyn OrderStatusSource>,
        cache: Arc<dyn ResolutionCache>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            source,
            cache,
            cache_ttl,
        }
    }

    /// Build the HTTP client and cache described by `config`
    pub fn from_config(config: &IntakeConfig) -> Result<Self> {
        let source = Arc::new(HttpOrderStatusClient::new(config.order_api.clone())?);
        let cache_ttl = config.cache.ttl();
        let cache: Arc<dyn ResolutionCache> = if config.cache.enabled {
            Arc::new(InMemoryResolutionCache::new(cache_ttl))
        } else {
            Arc::new(NoOpResolutionCache)
        };
        Ok(Self::new(source, cache, cache_ttl))
    }

    pub fn cache(&self) -> &Arc<dyn ResolutionCache> {
        &self.cache
    }

    /// Single-item resolver sharing this batch resolver's source and cache
    pub fn resolver(&self, options: &BatchOptions) -> OrderResolver {
        OrderResolver::new(
            self.source.clone(),
            self.cache.clone(),
            options.retry_policy(),
            self.cache_ttl,
        )
    }

    /// Resolve `ids` under `options`; never fails
    pub async fn resolve_batch<I, S>(&self, ids: I, options: &BatchOptions) -> BatchResolution
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ids = dedup_ids(ids);
        let batch_id = Uuid::new_v4();
        let span = tracing::info_span!("resolve_batch", batch_id = %batch_id, size = ids.len());

        self.run_batch(ids, options).instrument(span).await
    }

    async fn run_batch(&self, ids: Vec<String>, options: &BatchOptions) -> BatchResolution {
        if ids.len() > options.per_request_cap {
            warn!(
                requested = ids.len(),
                per_request_cap = options.per_request_cap,
                "Batch exceeds per-request cap, rejecting without lookups"
            );
            return BatchResolution::rejected(ids);
        }
        if ids.is_empty() {
            return BatchResolution::default();
        }

        let started = Instant::now();
        let resolver = Arc::new(self.resolver(options));
        let semaphore = Arc::new(Semaphore::new(options.concurrency_limit.max(1)));
        let mut tasks = JoinSet::new();
        let mut in_flight = HashMap::with_capacity(ids.len());

        for order_id in ids {
            let resolver = resolver.clone();
            let semaphore = semaphore.clone();
            let task_order_id = order_id.clone();
            let handle = tasks.spawn(
                async move {
                    let resolution = match semaphore.acquire_owned().await {
                        Ok(_permit) => resolver.resolve(&task_order_id).await,
                        Err(_) => {
                            error!(order_id = %task_order_id, "Semaphore closed before lookup, counting as not found");
                            Resolution::NotFound(NotFoundReason::RetriesExhausted)
                        }
                    };
                    (task_order_id, resolution)
                }
                .in_current_span(),
            );
            in_flight.insert(handle.id(), order_id);
        }

        let mut result = BatchResolution::default();
        let mut exhausted = 0usize;
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((task_id, (_, Resolution::Found(record)))) => {
                    in_flight.remove(&task_id);
                    result.found.push(record);
                }
                Ok((task_id, (order_id, Resolution::NotFound(reason)))) => {
                    in_flight.remove(&task_id);
                    if reason == NotFoundReason::RetriesExhausted {
                        exhausted += 1;
                    }
                    debug!(order_id = %order_id, reason = ?reason, "Order not found");
                    result.not_found.push(order_id);
                }
                Err(join_error) => match in_flight.remove(&join_error.id()) {
                    Some(order_id) => {
                        error!(
                            order_id = %order_id,
                            error = %join_error,
                            "Order lookup task failed, counting as not found"
                        );
                        exhausted += 1;
                        result.not_found.push(order_id);
                    }
                    None => error!(error = %join_error, "Unknown order lookup task failed"),
                },
            }
        }

        info!(
            found = result.found.len(),
            not_found = result.not_found.len(),
            retries_exhausted = exhausted,
            duration_ms = started.elapsed().as_millis() as u64,
            "Batch resolution complete"
        );
        result
    }
}
