//! # Order Resolution
//!
//! Turns candidate order identifiers into order records.
//!
//! ```text
//! resolve_in_waves (chunking)       caller-level wave policy
//!   └── BatchResolver (batch)       dedup, cap, semaphore-bounded tasks
//!         └── OrderResolver          cache -> retry policy -> endpoint
//!               ├── ResolutionCache  TTL store, None = confirmed missing
//!               └── OrderStatusSource  GET /orders/{id}
//! ```
//!
//! Nothing in this module returns an error to its caller. A lookup that never
//! succeeds is reported as not found; a batch over the per-request cap comes
//! back with `too_many` set and no lookups performed.

pub mod batch;
pub mod cache;
pub mod chunking;
pub mod client;
pub mod resolver;
pub mod retry;
pub mod summary;
pub mod types;

pub use batch::{BatchOptions, BatchResolver};
pub use cache::{CacheEntry, CacheLookup, InMemoryResolutionCache, NoOpResolutionCache, ResolutionCache};
pub use chunking::{resolve_in_waves, ChunkingPolicy};
pub use client::{parse_order_body, HttpOrderStatusClient, OrderStatusSource};
pub use resolver::OrderResolver;
pub use retry::{
    retry_recoverable, retry_unless_not_found, BackoffStrategy, RetryOutcome, RetryPolicy,
};
pub use summary::{format_ids, StatusSummary};
pub use types::{dedup_ids, BatchResolution, NotFoundReason, OrderRecord, Resolution};
