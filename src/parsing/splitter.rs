//! # Message Splitter
//!
//! Separates the header region of a ticket message (labels, metadata) from the
//! customer's actual statement using the last structural break in the text.

use regex::Regex;
use std::sync::LazyLock;

static RULE_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<hr\s*/?>\s*").expect("valid horizontal rule regex"));

static DASH_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\r?\n[ \t]*-{3,}[ \t]*\r?\n").expect("valid dash separator regex")
});

/// Which structural break split the message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakKind {
    /// An `<hr>` tag
    RuleTag,
    /// Three or more dashes on their own line
    DashLine,
}

/// Header and body segments of one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitMessage {
    /// Everything before the last break, rejoined with the break marker
    pub header: String,
    /// Everything after the last break; the whole text when no break exists
    pub body: String,
    pub break_kind: Option<BreakKind>,
}

impl SplitMessage {
    fn unbroken(raw: &str) -> Self {
        Self {
            header: raw.to_string(),
            body: raw.to_string(),
            break_kind: None,
        }
    }

    /// Body when it holds text, otherwise the header
    pub fn statement(&self) -> &str {
        if self.body.trim().is_empty() {
            &self.header
        } else {
            &self.body
        }
    }
}

/// Split `raw` at its last `<hr>`, falling back to a dashed line
pub fn split_message(raw: &str) -> SplitMessage {
    split_on(raw, &RULE_TAG_RE, "<hr>", BreakKind::RuleTag)
        .or_else(|| split_on(raw, &DASH_LINE_RE, "\n---\n", BreakKind::DashLine))
        .unwrap_or_else(|| SplitMessage::unbroken(raw))
}

fn split_on(raw: &str, pattern: &Regex, joiner: &str, kind: BreakKind) -> Option<SplitMessage> {
    let mut parts: Vec<&str> = pattern.split(raw).collect();
    if parts.len() < 2 {
        return None;
    }
    let body = parts.pop().unwrap_or_default().to_string();
    Some(SplitMessage {
        header: parts.join(joiner),
        body,
        break_kind: Some(kind),
    })
}
