//! Seams to the services around the engine: the ticket system, the
//! text classifier and the audit log.

use super::types::{AuditRow, Classification, Ticket};
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait TicketSource: Send + Sync {
    /// `Ok(None)` when the ticket does not exist
    async fn fetch_ticket(&self, ticket_id: &str) -> Result<Option<Ticket>>;

    async fn reply(&self, ticket_id: &str, message: &str) -> Result<()>;
}

#[async_trait]
pub trait Classifier: Send + Sync {
    /// Categorize a cleaned client statement
    async fn classify(&self, clean_body: &str) -> Result<Classification>;
}

#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, row: AuditRow) -> Result<()>;
}
