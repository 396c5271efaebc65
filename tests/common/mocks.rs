//! Mock collaborators for integration tests.
//!
//! [`MockOrderSource`] stands in for the order-status endpoint with a
//! per-id queue of scripted responses and per-id call counters. The ticket
//! source, classifier and audit sink mocks record what they were asked.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use ticketdesk_core::error::{IntakeError, OrderApiError, Result};
use ticketdesk_core::intake::{
    AuditRow, AuditSink, Classification, Classifier, RequestCategory, Ticket, TicketMessage,
    TicketSource,
};
use ticketdesk_core::resolution::{
    BatchResolver, InMemoryResolutionCache, OrderRecord, OrderStatusSource,
};

pub type Scripted = std::result::Result<OrderRecord, OrderApiError>;

#[derive(Debug, Default)]
struct MockOrderState {
    /// Responses consumed front to back; the last one repeats
    scripts: HashMap<String, VecDeque<Scripted>>,
    calls: HashMap<String, u32>,
}

/// Scripted order-status endpoint
///
/// Ids without a script answer "not found".
#[derive(Debug, Default)]
pub struct MockOrderSource {
    state: Mutex<MockOrderState>,
    latency: Duration,
}

impl MockOrderSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// Answer `id` with a record carrying `status`
    pub fn order(self, id: &str, status: &str) -> Self {
        self.script(id, vec![Ok(OrderRecord::new(id, status))])
    }

    pub fn script(self, id: &str, responses: Vec<Scripted>) -> Self {
        self.state
            .lock()
            .scripts
            .insert(id.to_string(), responses.into());
        self
    }

    pub fn calls_for(&self, id: &str) -> u32 {
        self.state.lock().calls.get(id).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> u32 {
        self.state.lock().calls.values().sum()
    }

    pub fn distinct_ids_called(&self) -> usize {
        self.state.lock().calls.len()
    }
}

#[async_trait]
impl OrderStatusSource for MockOrderSource {
    async fn fetch_order(&self, order_id: &str) -> std::result::Result<OrderRecord, OrderApiError> {
        let response = {
            let mut state = self.state.lock();
            *state.calls.entry(order_id.to_string()).or_insert(0) += 1;
            match state.scripts.get_mut(order_id) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        response.unwrap_or_else(|| {
            Err(OrderApiError::NotFound {
                order_id: order_id.to_string(),
            })
        })
    }
}

/// Batch resolver over `source` with a fresh five-minute in-memory cache
pub fn batch_resolver(source: Arc<MockOrderSource>) -> BatchResolver {
    let ttl = Duration::from_secs(300);
    BatchResolver::new(source, Arc::new(InMemoryResolutionCache::new(ttl)), ttl)
}

pub fn transient(status: u16) -> Scripted {
    Err(OrderApiError::api_error(status, "upstream unavailable"))
}

#[derive(Debug, Default)]
pub struct MockTicketSource {
    tickets: Mutex<HashMap<String, Ticket>>,
    pub replies: Mutex<Vec<(String, String)>>,
}

impl MockTicketSource {
    pub fn with_ticket(self, ticket: Ticket) -> Self {
        self.tickets.lock().insert(ticket.id.clone(), ticket);
        self
    }
}

#[async_trait]
impl TicketSource for MockTicketSource {
    async fn fetch_ticket(&self, ticket_id: &str) -> Result<Option<Ticket>> {
        Ok(self.tickets.lock().get(ticket_id).cloned())
    }

    async fn reply(&self, ticket_id: &str, message: &str) -> Result<()> {
        self.replies
            .lock()
            .push((ticket_id.to_string(), message.to_string()));
        Ok(())
    }
}

/// Classifier returning a fixed category and remembering its inputs
#[derive(Debug)]
pub struct MockClassifier {
    category: RequestCategory,
    pub inputs: Mutex<Vec<String>>,
}

impl MockClassifier {
    pub fn new(category: RequestCategory) -> Self {
        Self {
            category,
            inputs: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn classify(&self, clean_body: &str) -> Result<Classification> {
        self.inputs.lock().push(clean_body.to_string());
        Ok(Classification {
            category: self.category,
            language: "en".to_string(),
        })
    }
}

#[derive(Debug, Default)]
pub struct MockAuditSink {
    pub rows: Mutex<Vec<AuditRow>>,
    pub fail: bool,
}

#[async_trait]
impl AuditSink for MockAuditSink {
    async fn record(&self, row: AuditRow) -> Result<()> {
        if self.fail {
            return Err(IntakeError::AuditSinkError("sheet unavailable".to_string()));
        }
        self.rows.lock().push(row);
        Ok(())
    }
}

/// Ticket with one client message, updated at `last_update`
pub fn client_ticket(id: &str, body: &str, last_update: DateTime<Utc>) -> Ticket {
    Ticket {
        id: id.to_string(),
        last_update,
        messages: vec![TicketMessage::client(body)],
    }
}
