//! Grouping of resolved orders by status for the reply layer.

use super::types::OrderRecord;
use crate::constants::order_status;
use serde::{Deserialize, Serialize};

/// Order ids grouped by upstream status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub completed: Vec<String>,
    pub canceled: Vec<String>,
    /// Every other non-empty status
    pub pending: Vec<String>,
    /// Records with no status at all
    pub invalid: Vec<String>,
}

impl StatusSummary {
    pub fn from_records(records: &[OrderRecord]) -> Self {
        let mut summary = Self::default();
        for record in records {
            let status = record.status.trim().to_lowercase();
            let id = record.order_id.clone();
            match status.as_str() {
                "" => summary.invalid.push(id),
                order_status::COMPLETED => summary.completed.push(id),
                order_status::CANCELED => summary.canceled.push(id),
                _ => summary.pending.push(id),
            }
        }
        summary
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
            && self.canceled.is_empty()
            && self.pending.is_empty()
            && self.invalid.is_empty()
    }
}

/// Join ids the way replies list them
pub fn format_ids<S: AsRef<str>>(ids: &[S]) -> String {
    ids.iter().map(|id| id.as_ref()).collect::<Vec<&str>>().join(", ")
}
