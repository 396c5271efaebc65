//! # Structured Logging Module
//!
//! Environment-aware structured logging for the intake engine. Console output
//! is human-readable by default and JSON when `TICKETDESK_LOG_FORMAT=json`.
//!
//! The filter comes from `TICKETDESK_LOG`, then `RUST_LOG`, then the
//! environment name in `TICKETDESK_ENV` (test/development: debug,
//! production: info).

use crate::constants::env_vars;
use chrono::Utc;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration
///
/// Safe to call more than once; only the first call installs a subscriber,
/// and an already-installed global subscriber is left in place.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let filter = get_log_filter(&environment);
        let json = wants_json_output();

        let console_layer = if json {
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .json()
                .with_filter(EnvFilter::new(filter.clone()))
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(true)
                .with_filter(EnvFilter::new(filter.clone()))
                .boxed()
        };

        if tracing_subscriber::registry()
            .with(console_layer)
            .try_init()
            .is_err()
        {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        }

        tracing::info!(
            pid = std::process::id(),
            environment = %environment,
            filter = %filter,
            json = json,
            "🔧 STRUCTURED LOGGING: Initialized"
        );
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var(env_vars::ENVIRONMENT)
        .unwrap_or_else(|_| "development".to_string())
        .to_lowercase()
}

/// Explicit filter directives win over the environment default
fn get_log_filter(environment: &str) -> String {
    std::env::var(env_vars::LOG_FILTER)
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| get_log_level(environment).to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> &'static str {
    match environment {
        "test" => "debug",
        "development" => "debug",
        "production" => "info",
        _ => "debug",
    }
}

fn wants_json_output() -> bool {
    std::env::var(env_vars::LOG_FORMAT)
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Log structured data for parse operations
pub fn log_parse_operation(
    ticket_id: Option<&str>,
    subject: Option<&str>,
    candidate_count: usize,
    resolvable_count: usize,
    details: Option<&str>,
) {
    tracing::info!(
        ticket_id = ticket_id,
        subject = subject,
        candidate_count = candidate_count,
        resolvable_count = resolvable_count,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "📝 PARSE_OPERATION"
    );
}

/// Log structured data for resolution operations
pub fn log_resolution_operation(
    operation: &str,
    ticket_id: Option<&str>,
    requested: usize,
    found: usize,
    not_found: usize,
    too_many: bool,
    duration_ms: Option<u64>,
) {
    tracing::info!(
        operation = %operation,
        ticket_id = ticket_id,
        requested = requested,
        found = found,
        not_found = not_found,
        too_many = too_many,
        duration_ms = duration_ms,
        timestamp = %Utc::now().to_rfc3339(),
        "🔎 RESOLUTION_OPERATION"
    );
}

/// Log error with full context
pub fn log_error(component: &str, operation: &str, error: &str, context: Option<&str>) {
    tracing::error!(
        component = %component,
        operation = %operation,
        error = %error,
        context = context,
        timestamp = %Utc::now().to_rfc3339(),
        "❌ ERROR"
    );
}
