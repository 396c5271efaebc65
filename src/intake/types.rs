//! Ticket-level data exchanged with the external collaborators.

use crate::parsing::ParsedMessage;
use crate::resolution::{BatchResolution, OrderRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One message in a ticket thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketMessage {
    pub body: String,
    /// Written by support staff rather than the client
    pub is_staff: bool,
}

impl TicketMessage {
    pub fn client(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            is_staff: false,
        }
    }

    pub fn staff(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            is_staff: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub last_update: DateTime<Utc>,
    /// Oldest first
    pub messages: Vec<TicketMessage>,
}

impl Ticket {
    pub fn has_staff_reply(&self) -> bool {
        self.messages.iter().any(|m| m.is_staff)
    }

    pub fn first_client_message(&self) -> Option<&TicketMessage> {
        self.messages.iter().find(|m| !m.is_staff)
    }
}

/// Intent assigned by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestCategory {
    /// Refill, speed-up or cancellation of existing orders
    Order,
    Payment,
    Other,
}

impl fmt::Display for RequestCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestCategory::Order => "order",
            RequestCategory::Payment => "payment",
            RequestCategory::Other => "other",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: RequestCategory,
    /// Language the reply should be written in (e.g. "en", "pt")
    pub language: String,
}

/// One audit-log row: a resolved order mentioned by a ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRow {
    pub ticket_id: String,
    #[serde(flatten)]
    pub order: OrderRecord,
    pub client_message: String,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    TicketNotFound,
    /// Staff already answered; the ticket is no longer automatic
    StaffReplied,
    NoClientMessage,
    NotUpdatedSince,
    /// Only boilerplate was left after cleanup
    EmptyAfterCleanup,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::TicketNotFound => "ticket not found",
            SkipReason::StaffReplied => "staff already replied",
            SkipReason::NoClientMessage => "no client message",
            SkipReason::NotUpdatedSince => "no update since last run",
            SkipReason::EmptyAfterCleanup => "message empty after cleanup",
        };
        f.write_str(reason)
    }
}

/// Result of one ticket cycle, handed to the reply layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum TicketOutcome {
    Skipped {
        reason: SkipReason,
    },
    Processed {
        parsed: ParsedMessage,
        classification: Classification,
        /// Present when order ids were sent to the resolver
        resolution: Option<BatchResolution>,
    },
}

impl TicketOutcome {
    pub fn skipped(reason: SkipReason) -> Self {
        TicketOutcome::Skipped { reason }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, TicketOutcome::Skipped { .. })
    }
}
