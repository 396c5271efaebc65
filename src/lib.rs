#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Ticketdesk Core
//!
//! Message intake and order resolution engine for an automated support-ticket
//! responder.
//!
//! ## Overview
//!
//! Customers write free-form ticket messages, often pasted from an HTML form,
//! that mention order numbers somewhere in the text. This crate turns such a
//! message into a structured envelope and resolves the order numbers it names
//! against the order-status service, producing a found / not-found / too-many
//! partition the reply and audit layers act on.
//!
//! ## Architecture
//!
//! ```text
//! raw message ──► parsing::parse_raw_message ──► ParsedMessage
//!                                                   │ resolvable_ids(min)
//!                                                   ▼
//!                         resolution::resolve_in_waves ──► BatchResolution
//!                           └── BatchResolver (semaphore-bounded)
//!                                 └── OrderResolver (cache + retry + HTTP)
//! ```
//!
//! ## Module Organization
//!
//! - [`parsing`] - candidate extraction, message splitting and normalization
//! - [`resolution`] - cache, retry policy, order client, single and batch resolvers
//! - [`intake`] - collaborator traits and the per-ticket processor
//! - [`config`] - layered configuration (defaults, TOML, environment)
//! - [`logging`] - structured logging setup and helpers
//! - [`error`] - structured error handling
//! - [`constants`] - extraction limits and resolver defaults
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ticketdesk_core::config::IntakeConfig;
//! use ticketdesk_core::parsing::{parse_raw_message, Confidence};
//! use ticketdesk_core::resolution::{resolve_in_waves, BatchResolver};
//!
//! # async fn example() -> ticketdesk_core::Result<()> {
//! let config = IntakeConfig::load(None)?;
//! let resolver = BatchResolver::from_config(&config)?;
//!
//! let parsed = parse_raw_message("<b>Order ID</b>: 550039, 550040<hr>refill please");
//! let ids = parsed.resolvable_ids(Confidence::Medium);
//!
//! let result = resolve_in_waves(
//!     &resolver,
//!     &ids,
//!     &config.resolver.batch_options(),
//!     &config.chunking.policy(),
//! )
//! .await;
//!
//! if result.too_many {
//!     println!("hand off to a human");
//! } else {
//!     println!("found {}, missing {:?}", result.found.len(), result.not_found);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # Unit, integration and property tests
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod intake;
pub mod logging;
pub mod parsing;
pub mod resolution;
pub mod utils;

pub use config::{
    CacheConfig, ChunkingConfig, IntakeConfig, IntakeSettings, OrderApiConfig, ResolverConfig,
};
pub use error::{IntakeError, OrderApiError, Result};
pub use intake::{TicketOutcome, TicketProcessor};
pub use parsing::{parse_raw_message, Confidence, OrderIdCandidate, ParsedMessage};
pub use resolution::{
    resolve_in_waves, BatchOptions, BatchResolution, BatchResolver, ChunkingPolicy, OrderRecord,
};
