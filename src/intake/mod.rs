//! # Ticket Intake
//!
//! Glue between the ticket system and the engine. The ticket source,
//! classifier and audit sink are external services reached through the
//! traits in [`traits`]; [`TicketProcessor`] runs one ticket through parsing,
//! classification and order resolution.

pub mod processor;
pub mod traits;
pub mod types;

pub use processor::{strip_boilerplate, TicketProcessor};
pub use traits::{AuditSink, Classifier, TicketSource};
pub use types::{
    AuditRow, Classification, RequestCategory, SkipReason, Ticket, TicketMessage, TicketOutcome,
};
