//! # Candidate Extractor
//!
//! Pulls every plausible order identifier out of raw ticket text and grades it.
//!
//! Extraction runs as an ordered list of named rules, each returning zero or
//! more [`RawCandidate`]s:
//!
//! 1. [`ExtractionRule::LabelMarkup`] - `<b>Order ID</b>: ...`, graded high
//! 2. [`ExtractionRule::LabelPlain`] - `Order ID: ...` without markup, graded high
//! 3. [`ExtractionRule::BareDigits`] - any digit run, graded low
//!
//! A promotion pass then looks at the whole bare set: when the text holds two or
//! more distinct runs it reads as an id list and every bare candidate becomes
//! medium. Finally [`merge_candidates`] collapses duplicates, keeping the first
//! position and the highest grade, so explicit labels always win.

use super::markup::{bold_segments, digit_runs, normalize_digits};
use super::types::{Confidence, OrderIdCandidate};
use crate::constants::extraction::MULTI_ID_THRESHOLD;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

static LABEL_MARKUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<b>\s*Order\s*ID\s*</b>\s*[:\s]*([^<\n\r]*)").expect("valid markup label regex")
});

static LABEL_PLAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bOrder\s*ID[:\s]*([^\n\r<]*)").expect("valid plain label regex")
});

/// Named extraction rules, listed in precedence order by [`ExtractionRule::PRECEDENCE`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionRule {
    LabelMarkup,
    LabelPlain,
    BareDigits,
}

impl ExtractionRule {
    pub const PRECEDENCE: [ExtractionRule; 3] = [
        ExtractionRule::LabelMarkup,
        ExtractionRule::LabelPlain,
        ExtractionRule::BareDigits,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ExtractionRule::LabelMarkup => "label-html",
            ExtractionRule::LabelPlain => "label-plain",
            ExtractionRule::BareDigits => "bare-digits",
        }
    }

    /// Whether candidates from this rule came from an explicit label
    pub fn is_labelled(&self) -> bool {
        !matches!(self, ExtractionRule::BareDigits)
    }

    /// Run the rule over `raw`, returning candidates in order of appearance
    pub fn apply(&self, raw: &str) -> Vec<RawCandidate> {
        match self {
            ExtractionRule::LabelMarkup => labelled_candidates(&LABEL_MARKUP_RE, raw, *self),
            ExtractionRule::LabelPlain => labelled_candidates(&LABEL_PLAIN_RE, raw, *self),
            ExtractionRule::BareDigits => {
                let mut seen = HashSet::new();
                digit_runs(raw)
                    .into_iter()
                    .filter(|id| seen.insert(id.clone()))
                    .map(|id| RawCandidate::new(id, Confidence::Low, *self))
                    .collect()
            }
        }
    }
}

fn labelled_candidates(pattern: &Regex, raw: &str, rule: ExtractionRule) -> Vec<RawCandidate> {
    pattern
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .flat_map(|content| digit_runs(content.as_str()))
        .map(|id| RawCandidate::new(id, Confidence::High, rule))
        .collect()
}

/// A candidate before deduplication, tagged with the rule that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCandidate {
    pub id: String,
    pub confidence: Confidence,
    pub rule: ExtractionRule,
}

impl RawCandidate {
    pub fn new(id: impl AsRef<str>, confidence: Confidence, rule: ExtractionRule) -> Self {
        Self {
            id: normalize_digits(id.as_ref()),
            confidence,
            rule,
        }
    }
}

/// Output of the extractor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub subject: Option<String>,
    pub candidates: Vec<OrderIdCandidate>,
}

/// Run every rule in precedence order without merging
pub fn collect_raw_candidates(raw: &str) -> Vec<RawCandidate> {
    ExtractionRule::PRECEDENCE
        .iter()
        .flat_map(|rule| rule.apply(raw))
        .collect()
}

/// Promote bare candidates to medium when the text holds an id list
pub fn promote_bare_candidates(mut candidates: Vec<RawCandidate>) -> Vec<RawCandidate> {
    let distinct_bare: HashSet<&str> = candidates
        .iter()
        .filter(|c| c.rule == ExtractionRule::BareDigits)
        .map(|c| c.id.as_str())
        .collect();

    if distinct_bare.len() >= MULTI_ID_THRESHOLD {
        for candidate in candidates
            .iter_mut()
            .filter(|c| c.rule == ExtractionRule::BareDigits)
        {
            candidate.confidence = candidate.confidence.max(Confidence::Medium);
        }
    }
    candidates
}

/// Collapse duplicates into the final ordered candidate list
///
/// Labelled candidates are placed before bare ones; each group keeps
/// first-seen order. A repeated id keeps its first position and takes the
/// highest confidence seen for it.
pub fn merge_candidates(candidates: Vec<RawCandidate>) -> Vec<OrderIdCandidate> {
    let (labelled, bare): (Vec<_>, Vec<_>) =
        candidates.into_iter().partition(|c| c.rule.is_labelled());

    let mut merged: Vec<OrderIdCandidate> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for candidate in labelled.into_iter().chain(bare) {
        if candidate.id.is_empty() {
            continue;
        }
        match positions.get(&candidate.id) {
            Some(&index) => {
                let existing = &mut merged[index];
                existing.confidence = existing.confidence.max(candidate.confidence);
            }
            None => {
                positions.insert(candidate.id.clone(), merged.len());
                merged.push(OrderIdCandidate::new(candidate.id, candidate.confidence));
            }
        }
    }
    merged
}

/// Extract the subject and graded order id candidates from raw text
pub fn extract(raw: &str) -> Extraction {
    let subject = bold_segments(raw).into_iter().next();
    let candidates = merge_candidates(promote_bare_candidates(collect_raw_candidates(raw)));
    Extraction {
        subject,
        candidates,
    }
}

/// Just the candidates, for callers that do not need the subject
pub fn extract_candidates(raw: &str) -> Vec<OrderIdCandidate> {
    extract(raw).candidates
}
