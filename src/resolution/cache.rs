//! # Resolution Cache
//!
//! Time-bound store of resolution outcomes keyed by order identifier.
//!
//! A cached `None` means "confirmed not found" and is a real answer, distinct
//! from [`CacheLookup::Absent`] (never queried, or expired). TTL is checked at
//! read time against the entry's insertion instant; expired entries read as
//! absent and are evicted on the next write.
//!
//! ```text
//! ResolutionCache (trait)
//!   ├── InMemoryResolutionCache   <- DashMap, process lifetime
//!   └── NoOpResolutionCache       <- always absent, never stores
//! ```
//!
//! Cache operations are infallible from the resolver's point of view. A
//! provider backed by an external store logs its own failures and degrades to
//! a miss.

use super::types::OrderRecord;
use async_trait::async_trait;
use dashmap::DashMap;
use std::fmt::Debug;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Result of a cache read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Hit(OrderRecord),
    /// The order was looked up recently and does not exist
    ConfirmedMissing,
    Absent,
}

/// One stored outcome
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub value: Option<OrderRecord>,
    pub inserted_at: Instant,
}

impl CacheEntry {
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() >= ttl
    }
}

/// Storage seam used by the single-item resolver
#[async_trait]
pub trait ResolutionCache: Send + Sync + Debug {
    /// Look up `id`, treating entries older than `ttl` as absent
    async fn get(&self, id: &str, ttl: Duration) -> CacheLookup;

    /// Store an outcome; `None` records a confirmed absence
    async fn set(&self, id: &str, value: Option<OrderRecord>);

    fn provider_name(&self) -> &'static str;
}

/// In-process cache shared by every worker of every batch
#[derive(Debug)]
pub struct InMemoryResolutionCache {
    entries: DashMap<String, CacheEntry>,
    eviction_ttl: Duration,
}

impl InMemoryResolutionCache {
    /// `eviction_ttl` decides which entries a write sweeps away
    pub fn new(eviction_ttl: Duration) -> Self {
        debug!(
            ttl_seconds = eviction_ttl.as_secs(),
            "In-memory resolution cache created"
        );
        Self {
            entries: DashMap::new(),
            eviction_ttl,
        }
    }

    /// Number of stored entries, expired ones included until the next write
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    fn evict_expired(&self) {
        let before = self.entries.len();
        let ttl = self.eviction_ttl;
        self.entries.retain(|_, entry| !entry.is_expired(ttl));
        let evicted = before.saturating_sub(self.entries.len());
        if evicted > 0 {
            debug!(evicted = evicted, "Evicted expired resolution cache entries");
        }
    }
}

#[async_trait]
impl ResolutionCache for InMemoryResolutionCache {
    async fn get(&self, id: &str, ttl: Duration) -> CacheLookup {
        let Some(entry) = self.entries.get(id) else {
            debug!(order_id = id, "Cache MISS");
            return CacheLookup::Absent;
        };
        if entry.is_expired(ttl) {
            debug!(order_id = id, "Cache EXPIRED");
            return CacheLookup::Absent;
        }
        debug!(order_id = id, found = entry.value.is_some(), "Cache HIT");
        match &entry.value {
            Some(record) => CacheLookup::Hit(record.clone()),
            None => CacheLookup::ConfirmedMissing,
        }
    }

    async fn set(&self, id: &str, value: Option<OrderRecord>) {
        self.evict_expired();
        self.entries.insert(
            id.to_string(),
            CacheEntry {
                key: id.to_string(),
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    fn provider_name(&self) -> &'static str {
        "in_memory"
    }
}

/// Cache that never remembers anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpResolutionCache;

#[async_trait]
impl ResolutionCache for NoOpResolutionCache {
    async fn get(&self, _id: &str, _ttl: Duration) -> CacheLookup {
        CacheLookup::Absent
    }

    async fn set(&self, _id: &str, _value: Option<OrderRecord>) {}

    fn provider_name(&self) -> &'static str {
        "noop"
    }
}
