//! # Message Parsing
//!
//! Turns raw, semi-structured ticket text into a [`ParsedMessage`]:
//!
//! - [`extractor`] - graded order id candidates plus the subject
//! - [`splitter`] - header/body separation at the last structural break
//! - [`normalizer`] - composition of both into the final envelope
//! - [`markup`] - the small amount of HTML handling the above need
//!
//! Every function here is pure and total; parsing the same text twice yields
//! identical output.
//!
//! ```rust
//! use ticketdesk_core::parsing::{parse_raw_message, Confidence};
//!
//! let parsed = parse_raw_message(
//!     "<div><b>Orders - Refill</b></div><div><b>Order ID</b>: 550039</div><hr>speed please",
//! );
//! assert_eq!(parsed.subject.as_deref(), Some("Orders - Refill"));
//! assert_eq!(parsed.resolvable_ids(Confidence::Medium), vec!["550039"]);
//! assert_eq!(parsed.clean_body, "speed please");
//! ```

pub mod extractor;
pub mod markup;
pub mod normalizer;
pub mod splitter;
pub mod types;

pub use extractor::{extract, extract_candidates, Extraction, ExtractionRule, RawCandidate};
pub use normalizer::parse_raw_message;
pub use splitter::{split_message, BreakKind, SplitMessage};
pub use types::{Confidence, OrderIdCandidate, ParsedMessage};
