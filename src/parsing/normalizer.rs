//! # Message Normalizer
//!
//! Composes the extractor and splitter into the final [`ParsedMessage`].
//!
//! Parsing is total: any string, including the empty one, produces a
//! `ParsedMessage`. Identifiers are always extracted from the full raw text
//! because labels often live only in the header region.

use super::extractor::extract;
use super::markup::{is_all_digits, split_digit_run, strip_markup};
use super::splitter::split_message;
use super::types::{Confidence, OrderIdCandidate, ParsedMessage};
use regex::Regex;
use std::sync::LazyLock;

static ORDER_ID_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<div>\s*<b>\s*Order\s*ID\s*</b>\s*[:\s]*[^<]*</div>")
        .expect("valid order id block regex")
});

/// Parse one raw ticket message
pub fn parse_raw_message(raw: &str) -> ParsedMessage {
    let extraction = extract(raw);
    let split = split_message(raw);

    let mut body = split.statement().to_string();
    if let Some(subject) = extraction.subject.as_deref() {
        body = remove_subject_block(&body, subject);
    }
    body = ORDER_ID_BLOCK_RE.replace(&body, "").into_owned();

    let clean_body = strip_markup(&body);
    let order_id_candidates = promote_digit_only_body(extraction.candidates, &clean_body);

    ParsedMessage {
        subject: extraction.subject,
        order_id_candidates,
        clean_body,
    }
}

/// Drop a leading `<div><b>subject</b></div>` block that repeats the subject
fn remove_subject_block(body: &str, subject: &str) -> String {
    if !body.trim_start().starts_with("<div") || !body.contains(subject) {
        return body.to_string();
    }
    let pattern = format!(
        r"(?i)<div[^>]*>\s*<b>\s*{}\s*</b>\s*</div>",
        regex::escape(subject)
    );
    match Regex::new(&pattern) {
        Ok(block) => block.replace(body, "").into_owned(),
        Err(_) => body.to_string(),
    }
}

/// A body made only of digits is the client sending nothing but order numbers
///
/// Those ids move to the front with high confidence, replacing any weaker
/// grade they already had.
fn promote_digit_only_body(
    mut candidates: Vec<OrderIdCandidate>,
    clean_body: &str,
) -> Vec<OrderIdCandidate> {
    if !is_all_digits(clean_body) {
        return candidates;
    }
    let promoted = split_digit_run(clean_body);
    if promoted.is_empty() {
        return candidates;
    }

    candidates.retain(|candidate| !promoted.contains(&candidate.id));
    let mut ordered: Vec<OrderIdCandidate> = Vec::with_capacity(candidates.len() + promoted.len());
    for id in promoted {
        if !ordered.iter().any(|c| c.id == id) {
            ordered.push(OrderIdCandidate::new(id, Confidence::High));
        }
    }
    ordered.extend(candidates);
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refill_ticket_scenario() {
        let raw = "<div><b>Orders - Refill</b></div><div><b>Order ID</b>: 550039</div><hr>speed please";
        let parsed = parse_raw_message(raw);

        assert_eq!(parsed.subject.as_deref(), Some("Orders - Refill"));
        assert_eq!(
            parsed.order_id_candidates,
            vec![OrderIdCandidate::new("550039", Confidence::High)]
        );
        assert_eq!(parsed.clean_body, "speed please");
    }

    #[test]
    fn test_header_blocks_are_removed_without_a_break() {
        let raw = "<div><b>Orders - Speed</b></div><div><b>Order ID</b>: 123456</div><div>faster please</div>";
        let parsed = parse_raw_message(raw);
        assert_eq!(parsed.clean_body, "faster please");
        assert_eq!(parsed.order_id_candidates[0].id, "123456");
    }

    #[test]
    fn test_digit_only_body_is_promoted() {
        let parsed = parse_raw_message("550039");
        assert_eq!(
            parsed.order_id_candidates,
            vec![OrderIdCandidate::new("550039", Confidence::High)]
        );
        assert_eq!(parsed.clean_body, "550039");
    }

    #[test]
    fn test_digit_only_body_after_break_goes_first() {
        let raw = "<div><b>Support</b></div><div>ticket 4411 5522</div><hr>778899";
        let parsed = parse_raw_message(raw);
        assert_eq!(parsed.order_id_candidates[0], OrderIdCandidate::new("778899", Confidence::High));
        assert_eq!(parsed.order_id_candidates.len(), 3);
    }

    #[test]
    fn test_concatenated_digit_body_yields_two_ids() {
        let parsed = parse_raw_message("550039550040");
        assert_eq!(
            parsed.order_id_candidates,
            vec![
                OrderIdCandidate::new("550039", Confidence::High),
                OrderIdCandidate::new("550040", Confidence::High),
            ]
        );
    }

    #[test]
    fn test_empty_input_is_an_empty_message() {
        assert!(parse_raw_message("").is_empty());
        assert!(parse_raw_message("   ").is_empty());
    }

    #[test]
    fn test_free_text_is_echoed_as_body() {
        let parsed = parse_raw_message("where is my refund?");
        assert_eq!(parsed.clean_body, "where is my refund?");
        assert!(!parsed.has_candidates());
        assert_eq!(parsed.subject, None);
    }

    #[test]
    fn test_subject_with_regex_metacharacters() {
        let raw = "<div><b>Orders (Speed+)?</b></div><div>go</div>";
        let parsed = parse_raw_message(raw);
        assert_eq!(parsed.subject.as_deref(), Some("Orders (Speed+)?"));
        assert_eq!(parsed.clean_body, "go");
    }
}
