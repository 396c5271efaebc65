//! # Ticket Processor
//!
//! One intake cycle for one ticket:
//!
//! 1. fetch the ticket and skip it if staff already replied, it has no client
//!    message, or it has not changed since the last run
//! 2. strip reply-template boilerplate from the first client message
//! 3. parse the message and classify the cleaned body
//! 4. for order requests, resolve the eligible ids in waves and write one
//!    audit row per order found
//!
//! Reply text is not produced here; [`TicketOutcome`] carries what the reply
//! layer needs.

use super::traits::{AuditSink, Classifier, TicketSource};
use super::types::{AuditRow, RequestCategory, SkipReason, TicketOutcome};
use crate::config::{IntakeConfig, IntakeSettings};
use crate::error::{IntakeError, Result};
use crate::logging::{log_error, log_parse_operation, log_resolution_operation};
use crate::parsing::parse_raw_message;
use crate::resolution::{resolve_in_waves, BatchOptions, BatchResolver, ChunkingPolicy};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Remove every configured phrase from `message` and trim the rest
pub fn strip_boilerplate<S: AsRef<str>>(message: &str, phrases: &[S]) -> String {
    phrases
        .iter()
        .map(|phrase| phrase.as_ref())
        .filter(|phrase| !phrase.is_empty())
        .fold(message.to_string(), |text, phrase| text.replace(phrase, ""))
        .trim()
        .to_string()
}

pub struct TicketProcessor {
    tickets: Arc<dyn TicketSource>,
    classifier: Arc<dyn Classifier>,
    audit: Arc<dyn AuditSink>,
    resolver: BatchResolver,
    options: BatchOptions,
    chunking: ChunkingPolicy,
    settings: IntakeSettings,
}

impl std::fmt::Debug for TicketProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TicketProcessor")
            .field("resolver", &self.resolver)
            .field("options", &self.options)
            .field("chunking", &self.chunking)
            .field("settings", &self.settings)
            .finish()
    }
}

impl TicketProcessor {
    pub fn new(
        tickets: Arc<dyn TicketSource>,
        classifier: Arc<dyn Classifier>,
        audit: Arc<dyn AuditSink>,
        resolver: BatchResolver,
        config: &IntakeConfig,
    ) -> Self {
        Self {
            tickets,
            classifier,
            audit,
            resolver,
            options: config.resolver.batch_options(),
            chunking: config.chunking.policy(),
            settings: config.intake.clone(),
        }
    }

    #[instrument(skip(self))]
    pub async fn process(&self, ticket_id: &str, since: DateTime<Utc>) -> Result<TicketOutcome> {
        let Some(ticket) = self.tickets.fetch_ticket(ticket_id).await? else {
            info!(ticket_id = ticket_id, "❌ Ticket not found");
            return Ok(TicketOutcome::skipped(SkipReason::TicketNotFound));
        };

        if ticket.has_staff_reply() {
            debug!(ticket_id = ticket_id, "Ticket already answered by staff");
            return Ok(TicketOutcome::skipped(SkipReason::StaffReplied));
        }
        let Some(first_message) = ticket.first_client_message() else {
            debug!(ticket_id = ticket_id, "Ticket has no client message");
            return Ok(TicketOutcome::skipped(SkipReason::NoClientMessage));
        };
        if ticket.last_update <= since {
            debug!(
                ticket_id = ticket_id,
                last_update = %ticket.last_update,
                "Ticket not updated since last run"
            );
            return Ok(TicketOutcome::skipped(SkipReason::NotUpdatedSince));
        }

        let message = strip_boilerplate(&first_message.body, &self.settings.boilerplate_phrases);
        if message.is_empty() {
            debug!(ticket_id = ticket_id, "Client message was only boilerplate");
            return Ok(TicketOutcome::skipped(SkipReason::EmptyAfterCleanup));
        }

        let parsed = parse_raw_message(&message);
        let order_ids = parsed.resolvable_ids(self.settings.minimum_confidence);
        log_parse_operation(
            Some(ticket_id),
            parsed.subject.as_deref(),
            parsed.order_id_candidates.len(),
            order_ids.len(),
            None,
        );

        let classification = self.classifier.classify(&parsed.clean_body).await?;
        info!(
            ticket_id = ticket_id,
            category = %classification.category,
            language = %classification.language,
            "🏷️ Ticket classified"
        );

        let resolution = if classification.category == RequestCategory::Order && !order_ids.is_empty() {
            let started = Instant::now();
            let resolution =
                resolve_in_waves(&self.resolver, &order_ids, &self.options, &self.chunking).await;
            log_resolution_operation(
                "resolve_in_waves",
                Some(ticket_id),
                order_ids.len(),
                resolution.found.len(),
                resolution.not_found.len(),
                resolution.too_many,
                Some(started.elapsed().as_millis() as u64),
            );

            for order in &resolution.found {
                let row = AuditRow {
                    ticket_id: ticket_id.to_string(),
                    order: order.clone(),
                    client_message: first_message.body.clone(),
                    recorded_at: Utc::now(),
                };
                // The audit log is best-effort; a failed row does not fail the ticket.
                if let Err(error) = self.audit.record(row).await {
                    log_error("audit_sink", "record", &error.to_string(), Some(&order.order_id));
                }
            }
            Some(resolution)
        } else {
            None
        };

        Ok(TicketOutcome::Processed {
            parsed,
            classification,
            resolution,
        })
    }

    /// Post a reply composed by the caller back to the ticket
    pub async fn reply(&self, ticket_id: &str, message: &str) -> Result<()> {
        let message = message.trim();
        if message.is_empty() {
            return Err(IntakeError::InvalidInput(format!(
                "refusing to send an empty reply to ticket {ticket_id}"
            )));
        }
        self.tickets.reply(ticket_id, message).await?;
        info!(ticket_id = ticket_id, chars = message.chars().count(), "📨 Reply sent");
        Ok(())
    }
}
