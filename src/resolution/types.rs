//! Types produced by order resolution.

use serde::{Deserialize, Serialize};

/// One order as reported by the order-status endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub order_id: String,
    pub external_id: Option<String>,
    pub user: Option<String>,
    pub link: Option<String>,
    pub start_count: Option<i64>,
    pub quantity: Option<i64>,
    /// Formatted charge, when the endpoint reports one
    pub amount: Option<String>,
    pub service_id: Option<String>,
    pub service_name: Option<String>,
    /// Free-form upstream status (pending, completed, canceled, fail, ...)
    pub status: String,
    pub remains: Option<i64>,
    pub created_at: Option<String>,
    pub provider: Option<String>,
}

impl OrderRecord {
    /// Minimal record, mostly useful for tests and fixtures
    pub fn new(order_id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            order_id: order_id.into(),
            external_id: None,
            user: None,
            link: None,
            start_count: None,
            quantity: None,
            amount: None,
            service_id: None,
            service_name: None,
            status: status.into(),
            remains: None,
            created_at: None,
            provider: None,
        }
    }
}

/// Why a single identifier ended up unresolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotFoundReason {
    /// The endpoint answered "does not exist", or a cached absence was hit
    Confirmed,
    /// Every attempt failed with a retryable error
    RetriesExhausted,
}

/// Outcome of resolving one identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(OrderRecord),
    NotFound(NotFoundReason),
}

impl Resolution {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }

    pub fn into_record(self) -> Option<OrderRecord> {
        match self {
            Resolution::Found(record) => Some(record),
            Resolution::NotFound(_) => None,
        }
    }
}

/// Partitioned result of a batch
///
/// `found` and `not_found` are unordered; treat them as sets. Callers must
/// branch on `too_many` before looking at either list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResolution {
    pub found: Vec<OrderRecord>,
    pub not_found: Vec<String>,
    pub too_many: bool,
}

impl BatchResolution {
    /// Short-circuit result for a batch over the per-request cap
    pub fn rejected(ids: Vec<String>) -> Self {
        Self {
            found: Vec::new(),
            not_found: ids,
            too_many: true,
        }
    }

    /// Fold another wave's result into this one
    pub fn absorb(&mut self, other: BatchResolution) {
        self.found.extend(other.found);
        self.not_found.extend(other.not_found);
        self.too_many |= other.too_many;
    }

    pub fn found_ids(&self) -> Vec<&str> {
        self.found.iter().map(|r| r.order_id.as_str()).collect()
    }

    pub fn total(&self) -> usize {
        self.found.len() + self.not_found.len()
    }
}

/// Dedup identifiers by their string form, keeping first-seen order
pub fn dedup_ids<I, S>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    ids.into_iter()
        .map(|id| id.as_ref().trim().to_string())
        .filter(|id| !id.is_empty() && seen.insert(id.clone()))
        .collect()
}
