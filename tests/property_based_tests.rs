mod common;

use common::strategies::*;
use proptest::prelude::*;
use std::collections::HashSet;
use ticketdesk_core::parsing::{extract_candidates, parse_raw_message, Confidence};
use ticketdesk_core::resolution::dedup_ids;

proptest! {
    /// Property: parsing never panics and is deterministic
    #[test]
    fn parsing_is_idempotent(raw in raw_message_strategy()) {
        prop_assert_eq!(parse_raw_message(&raw), parse_raw_message(&raw));
    }

    /// Property: candidate ids are digits-only, 3 to 12 digits, and unique
    #[test]
    fn candidates_are_unique_digit_strings(raw in raw_message_strategy()) {
        let parsed = parse_raw_message(&raw);
        let mut seen = HashSet::new();
        for candidate in &parsed.order_id_candidates {
            prop_assert!(candidate.id.chars().all(|c| c.is_ascii_digit()));
            prop_assert!((3..=12).contains(&candidate.id.len()));
            prop_assert!(seen.insert(candidate.id.clone()), "duplicate id {}", candidate.id);
        }
    }

    /// Property: clean bodies never contain markup tags
    #[test]
    fn clean_body_has_no_tags(raw in raw_message_strategy()) {
        let parsed = parse_raw_message(&raw);
        prop_assert!(!parsed.clean_body.contains("<b>"));
        prop_assert!(!parsed.clean_body.contains("<hr>"));
        prop_assert!(!parsed.clean_body.contains("<div>"));
    }

    /// Property: a labelled id is always the first candidate, graded high
    #[test]
    fn labelled_id_comes_first(
        id in order_id_strategy(),
        before in digitless_text_strategy(),
        after in digitless_text_strategy(),
        markup in any::<bool>(),
    ) {
        let label = if markup { "<b>Order ID</b>" } else { "Order ID" };
        let raw = format!("{before}\n{label}: {id}\n{after}");
        let candidates = extract_candidates(&raw);
        prop_assert_eq!(&candidates[0].id, &id);
        prop_assert_eq!(candidates[0].confidence, Confidence::High);
    }

    /// Property: two glued 6-digit ids come back as two candidates
    #[test]
    fn twelve_digit_runs_split_in_two(first in order_id_strategy(), second in order_id_strategy()) {
        let raw = format!("orders {first}{second} missing");
        let ids: Vec<String> = extract_candidates(&raw).into_iter().map(|c| c.id).collect();
        let mut expected = vec![first.clone()];
        if second != first {
            expected.push(second);
        }
        prop_assert_eq!(ids, expected);
    }

    /// Property: a message that is only digits yields that id alone, graded high
    #[test]
    fn digit_only_message_is_promoted(id in "[0-9]{3,11}") {
        let parsed = parse_raw_message(&id);
        prop_assert_eq!(parsed.order_id_candidates.len(), 1);
        prop_assert_eq!(&parsed.order_id_candidates[0].id, &id);
        prop_assert_eq!(parsed.order_id_candidates[0].confidence, Confidence::High);
    }

    /// Property: dedup keeps first-seen order and drops repeats
    #[test]
    fn dedup_preserves_first_seen_order(ids in prop::collection::vec(order_id_strategy(), 0..30)) {
        let deduped = dedup_ids(&ids);
        let unique: HashSet<&String> = ids.iter().collect();
        prop_assert_eq!(deduped.len(), unique.len());
        let mut seen = HashSet::new();
        let expected: Vec<String> = ids.iter().filter(|id| seen.insert(*id)).cloned().collect();
        prop_assert_eq!(deduped, expected);
    }
}
