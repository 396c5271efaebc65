//! Types produced by the message parser.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Certainty that a candidate identifier is a genuine order reference
///
/// Ordered so that `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Confidence::Low),
            "medium" => Ok(Confidence::Medium),
            "high" => Ok(Confidence::High),
            other => Err(format!("unknown confidence grade '{other}'")),
        }
    }
}

/// A digits-only identifier pulled out of raw text
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderIdCandidate {
    pub id: String,
    pub confidence: Confidence,
}

impl OrderIdCandidate {
    pub fn new(id: impl Into<String>, confidence: Confidence) -> Self {
        Self {
            id: id.into(),
            confidence,
        }
    }
}

/// Structured envelope for one incoming ticket message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedMessage {
    /// First bold label found in the message, usually the ticket subject
    pub subject: Option<String>,
    /// Label-derived entries first, then bare digit runs, each in first-seen order
    pub order_id_candidates: Vec<OrderIdCandidate>,
    /// Markup-free customer statement handed to the classifier
    pub clean_body: String,
}

impl ParsedMessage {
    /// Identifiers eligible for automatic resolution
    ///
    /// Low-confidence bare numbers (phone numbers, quantities) are left out
    /// unless `minimum` is [`Confidence::Low`].
    pub fn resolvable_ids(&self, minimum: Confidence) -> Vec<String> {
        self.order_id_candidates
            .iter()
            .filter(|candidate| candidate.confidence >= minimum)
            .map(|candidate| candidate.id.clone())
            .collect()
    }

    pub fn has_candidates(&self) -> bool {
        !self.order_id_candidates.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.subject.is_none() && self.order_id_candidates.is_empty() && self.clean_body.is_empty()
    }
}
