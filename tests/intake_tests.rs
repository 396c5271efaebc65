//! One ticket cycle through the processor with mocked collaborators.

mod common;

use chrono::{Duration as ChronoDuration, Utc};
use common::{batch_resolver, client_ticket, MockAuditSink, MockClassifier, MockOrderSource, MockTicketSource};
use std::sync::Arc;
use ticketdesk_core::config::IntakeConfig;
use ticketdesk_core::constants::defaults::ORDER_ID_REQUEST_TEMPLATE;
use ticketdesk_core::error::IntakeError;
use ticketdesk_core::intake::{
    RequestCategory, SkipReason, Ticket, TicketMessage, TicketOutcome, TicketProcessor,
};

struct Harness {
    processor: TicketProcessor,
    tickets: Arc<MockTicketSource>,
    orders: Arc<MockOrderSource>,
    classifier: Arc<MockClassifier>,
    audit: Arc<MockAuditSink>,
}

fn harness(ticket: Ticket, category: RequestCategory, orders: MockOrderSource) -> Harness {
    harness_with_audit(ticket, category, orders, MockAuditSink::default())
}

fn harness_with_audit(
    ticket: Ticket,
    category: RequestCategory,
    orders: MockOrderSource,
    audit: MockAuditSink,
) -> Harness {
    let orders = Arc::new(orders);
    let classifier = Arc::new(MockClassifier::new(category));
    let audit = Arc::new(audit);
    let tickets = Arc::new(MockTicketSource::default().with_ticket(ticket));
    let processor = TicketProcessor::new(
        tickets.clone(),
        classifier.clone(),
        audit.clone(),
        batch_resolver(orders.clone()),
        &IntakeConfig::default(),
    );
    Harness {
        processor,
        tickets,
        orders,
        classifier,
        audit,
    }
}

fn an_hour_ago() -> chrono::DateTime<Utc> {
    Utc::now() - ChronoDuration::hours(1)
}

#[tokio::test]
async fn test_order_ticket_is_resolved_and_audited() {
    let ticket = client_ticket(
        "T-100",
        "<div><b>Orders - Refill</b></div><div><b>Order ID</b>: 550039, 550040</div><hr>refill please",
        Utc::now(),
    );
    let h = harness(
        ticket,
        RequestCategory::Order,
        MockOrderSource::new().order("550039", "pending"),
    );

    let outcome = h.processor.process("T-100", an_hour_ago()).await.unwrap();

    let TicketOutcome::Processed {
        parsed,
        classification,
        resolution,
    } = outcome
    else {
        panic!("expected processed outcome");
    };
    assert_eq!(parsed.subject.as_deref(), Some("Orders - Refill"));
    assert_eq!(classification.category, RequestCategory::Order);
    assert_eq!(h.classifier.inputs.lock().as_slice(), ["refill please"]);

    let resolution = resolution.expect("order tickets are resolved");
    assert_eq!(resolution.found_ids(), vec!["550039"]);
    assert_eq!(resolution.not_found, vec!["550040".to_string()]);

    let rows = h.audit.rows.lock();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].ticket_id, "T-100");
    assert_eq!(rows[0].order.order_id, "550039");
}

#[tokio::test]
async fn test_payment_ticket_skips_resolution() {
    let ticket = client_ticket("T-101", "I was charged twice for 550039, 550040", Utc::now());
    let h = harness(ticket, RequestCategory::Payment, MockOrderSource::new());

    let outcome = h.processor.process("T-101", an_hour_ago()).await.unwrap();

    assert!(matches!(
        outcome,
        TicketOutcome::Processed { resolution: None, .. }
    ));
    assert_eq!(h.orders.total_calls(), 0);
    assert!(h.audit.rows.lock().is_empty());
}

#[tokio::test]
async fn test_low_confidence_numbers_are_not_resolved() {
    let ticket = client_ticket("T-102", "call me at 5551234 about my refill", Utc::now());
    let h = harness(ticket, RequestCategory::Order, MockOrderSource::new());

    let outcome = h.processor.process("T-102", an_hour_ago()).await.unwrap();

    assert!(matches!(
        outcome,
        TicketOutcome::Processed { resolution: None, .. }
    ));
    assert_eq!(h.orders.total_calls(), 0);
}

#[tokio::test]
async fn test_staff_reply_skips_ticket() {
    let ticket = Ticket {
        id: "T-103".to_string(),
        last_update: Utc::now(),
        messages: vec![
            TicketMessage::client("Order ID: 550039"),
            TicketMessage::staff("On it"),
        ],
    };
    let h = harness(ticket, RequestCategory::Order, MockOrderSource::new());

    let outcome = h.processor.process("T-103", an_hour_ago()).await.unwrap();
    assert_eq!(outcome, TicketOutcome::skipped(SkipReason::StaffReplied));
    assert!(h.classifier.inputs.lock().is_empty());
}

#[tokio::test]
async fn test_stale_ticket_is_skipped() {
    let ticket = client_ticket("T-104", "Order ID: 550039", an_hour_ago());
    let h = harness(ticket, RequestCategory::Order, MockOrderSource::new());

    let outcome = h.processor.process("T-104", Utc::now()).await.unwrap();
    assert_eq!(outcome, TicketOutcome::skipped(SkipReason::NotUpdatedSince));
}

#[tokio::test]
async fn test_boilerplate_only_message_is_skipped() {
    let ticket = client_ticket("T-105", ORDER_ID_REQUEST_TEMPLATE, Utc::now());
    let h = harness(ticket, RequestCategory::Order, MockOrderSource::new());

    let outcome = h.processor.process("T-105", an_hour_ago()).await.unwrap();
    assert_eq!(outcome, TicketOutcome::skipped(SkipReason::EmptyAfterCleanup));
}

#[tokio::test]
async fn test_boilerplate_is_removed_before_parsing() {
    let body = format!("{ORDER_ID_REQUEST_TEMPLATE}\n550039");
    let ticket = client_ticket("T-106", &body, Utc::now());
    let h = harness(
        ticket,
        RequestCategory::Order,
        MockOrderSource::new().order("550039", "completed"),
    );

    let outcome = h.processor.process("T-106", an_hour_ago()).await.unwrap();
    let TicketOutcome::Processed { parsed, resolution, .. } = outcome else {
        panic!("expected processed outcome");
    };
    assert_eq!(parsed.clean_body, "550039");
    assert_eq!(resolution.map(|r| r.found.len()), Some(1));
}

#[tokio::test]
async fn test_missing_ticket_and_empty_thread() {
    let empty = Ticket {
        id: "T-107".to_string(),
        last_update: Utc::now(),
        messages: Vec::new(),
    };
    let h = harness(empty, RequestCategory::Order, MockOrderSource::new());

    assert_eq!(
        h.processor.process("T-107", an_hour_ago()).await.unwrap(),
        TicketOutcome::skipped(SkipReason::NoClientMessage)
    );
    assert_eq!(
        h.processor.process("T-999", an_hour_ago()).await.unwrap(),
        TicketOutcome::skipped(SkipReason::TicketNotFound)
    );
}

#[tokio::test]
async fn test_audit_failure_does_not_fail_ticket() {
    let ticket = client_ticket("T-108", "Order ID: 550039", Utc::now());
    let h = harness_with_audit(
        ticket,
        RequestCategory::Order,
        MockOrderSource::new().order("550039", "pending"),
        MockAuditSink {
            fail: true,
            ..MockAuditSink::default()
        },
    );

    let outcome = h.processor.process("T-108", an_hour_ago()).await.unwrap();
    assert!(!outcome.is_skipped());
    assert!(h.audit.rows.lock().is_empty());
}

#[tokio::test]
async fn test_reply_is_forwarded_to_ticket_source() {
    let ticket = client_ticket("T-109", "Order ID: 550039", Utc::now());
    let h = harness(ticket, RequestCategory::Order, MockOrderSource::new());

    h.processor
        .reply("T-109", "  Your order 550039 is in progress.\n")
        .await
        .unwrap();
    let result = h.processor.reply("T-109", "   ").await;

    assert!(matches!(result, Err(IntakeError::InvalidInput(_))));
    assert_eq!(
        h.tickets.replies.lock().as_slice(),
        [(
            "T-109".to_string(),
            "Your order 550039 is in progress.".to_string()
        )]
    );
}
