//! Caller-level wave policy for large batches.
//!
//! Batches above the chunking threshold are resolved as sequential waves of
//! `chunk_size` ids with a pause between waves, bounding peak load on the
//! order endpoint. The per-request cap is checked against the whole
//! deduplicated set before any wave runs.

use super::batch::{BatchOptions, BatchResolver};
use super::types::{dedup_ids, BatchResolution};
use crate::constants::defaults;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkingPolicy {
    /// Batches strictly larger than this are split into waves
    pub threshold: usize,
    pub chunk_size: usize,
    pub inter_wave_pause: Duration,
}

impl Default for ChunkingPolicy {
    fn default() -> Self {
        Self {
            threshold: defaults::CHUNKING_THRESHOLD,
            chunk_size: defaults::CHUNK_SIZE,
            inter_wave_pause: Duration::from_millis(defaults::INTER_WAVE_PAUSE_MS),
        }
    }
}

impl ChunkingPolicy {
    /// Number of waves needed for `count` ids
    pub fn wave_count(&self, count: usize) -> usize {
        if count == 0 {
            0
        } else if count <= self.threshold {
            1
        } else {
            count.div_ceil(self.chunk_size.max(1))
        }
    }
}

/// Resolve `ids`, splitting into sequential waves when the batch is large
pub async fn resolve_in_waves<I, S>(
    resolver: &BatchResolver,
    ids: I,
    options: &BatchOptions,
    policy: &ChunkingPolicy,
) -> BatchResolution
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let ids = dedup_ids(ids);

    if ids.len() > options.per_request_cap {
        warn!(
            requested = ids.len(),
            per_request_cap = options.per_request_cap,
            "Too many order ids for one request"
        );
        return BatchResolution::rejected(ids);
    }

    if ids.len() <= policy.threshold {
        return resolver.resolve_batch(ids, options).await;
    }

    let chunk_size = policy.chunk_size.max(1);
    let waves = policy.wave_count(ids.len());
    info!(
        total = ids.len(),
        chunk_size = chunk_size,
        waves = waves,
        "Resolving order ids in waves"
    );

    let mut merged = BatchResolution::default();
    for (index, chunk) in ids.chunks(chunk_size).enumerate() {
        if index > 0 && !policy.inter_wave_pause.is_zero() {
            tokio::time::sleep(policy.inter_wave_pause).await;
        }
        debug!(wave = index + 1, of = waves, size = chunk.len(), "Starting wave");
        merged.absorb(resolver.resolve_batch(chunk, options).await);
    }
    merged
}
