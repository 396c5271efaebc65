//! Markup helpers shared by the extractor, splitter and normalizer.
//!
//! Ticket bodies arrive as HTML-ish fragments (`<div>`, `<b>`, `<hr>`, `<br>`)
//! mixed with free text. These helpers only understand that small subset;
//! they are not an HTML parser.

use crate::constants::extraction::{CONCATENATED_ID_DIGITS, MAX_ID_DIGITS, MIN_ID_DIGITS};
use regex::Regex;
use std::sync::LazyLock;

static BOLD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<b>(.*?)</b>").expect("valid bold regex"));

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

static LINE_BREAK_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid line break regex"));

static DIGIT_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid digit run regex"));

/// Trimmed, non-empty contents of every `<b>...</b>` pair, in order
pub fn bold_segments(raw: &str) -> Vec<String> {
    BOLD_RE
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Remove every tag, keeping `<br>` as a line break, and decode the few
/// named entities ticket editors emit
pub fn strip_markup(raw: &str) -> String {
    let with_breaks = LINE_BREAK_TAG_RE.replace_all(raw, "\n");
    let text = TAG_RE.replace_all(&with_breaks, "").replace('\r', "");
    decode_entities(&text).trim().to_string()
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    // `&amp;` last so `&amp;lt;` stays a literal `&lt;`.
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Keep only ASCII digits
pub fn normalize_digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// True when `value` is non-empty and made only of ASCII digits
pub fn is_all_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Candidate identifiers found in `text`, in order of appearance
///
/// Duplicates are kept; callers decide how to collapse them.
pub fn digit_runs(text: &str) -> Vec<String> {
    DIGIT_RUN_RE
        .find_iter(text)
        .flat_map(|run| split_digit_run(run.as_str()))
        .collect()
}

/// Cut one maximal digit run into candidate identifiers
///
/// The run is consumed in windows of at most [`MAX_ID_DIGITS`]; windows shorter
/// than [`MIN_ID_DIGITS`] are dropped. A full-width window is two
/// [`CONCATENATED_ID_DIGITS`]-digit ids glued together by the ticket system
/// and is split in half.
pub fn split_digit_run(run: &str) -> Vec<String> {
    let mut ids = Vec::new();
    for window in run.as_bytes().chunks(MAX_ID_DIGITS) {
        if window.len() < MIN_ID_DIGITS {
            continue;
        }
        // Windows are ASCII digits, so byte slicing stays on char boundaries.
        let window = String::from_utf8_lossy(window);
        if window.len() == MAX_ID_DIGITS {
            ids.push(window[..CONCATENATED_ID_DIGITS].to_string());
            ids.push(window[CONCATENATED_ID_DIGITS..].to_string());
        } else {
            ids.push(window.into_owned());
        }
    }
    ids
}
