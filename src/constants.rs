//! # System Constants
//!
//! Operational boundaries of the intake engine: extraction limits, resolver
//! defaults, and the order status vocabulary shared with the reply layer.

/// Limits applied while scanning raw text for order identifiers
pub mod extraction {
    /// Shortest digit run treated as a candidate identifier
    pub const MIN_ID_DIGITS: usize = 3;

    /// Longest digit run treated as a single identifier
    pub const MAX_ID_DIGITS: usize = 12;

    /// Length of each half when a run is two glued identifiers
    pub const CONCATENATED_ID_DIGITS: usize = 6;

    /// Bare runs needed before all of them count as an id list
    pub const MULTI_ID_THRESHOLD: usize = 2;
}

/// Default values for resolution and chunking
pub mod defaults {
    pub const CONCURRENCY_LIMIT: usize = 6;
    pub const MAX_ATTEMPTS: u32 = 3;
    pub const INTER_ATTEMPT_DELAY_MS: u64 = 800;
    pub const BACKOFF_MULTIPLIER: f64 = 1.0;
    pub const MAX_INTER_ATTEMPT_DELAY_MS: u64 = 5_000;
    pub const PER_REQUEST_CAP: usize = 50;

    pub const CHUNKING_THRESHOLD: usize = 20;
    pub const CHUNK_SIZE: usize = 10;
    pub const INTER_WAVE_PAUSE_MS: u64 = 600;

    /// Five minutes
    pub const CACHE_TTL_SECONDS: u64 = 300;

    pub const ORDER_API_TIMEOUT_MS: u64 = 10_000;
    pub const API_KEY_HEADER: &str = "X-Api-Key";

    /// Reply-template sentence some clients paste back into their message
    pub const ORDER_ID_REQUEST_TEMPLATE: &str =
        "Por favor, nos envie o *ID do pedido* para que possamos continuar com a sua solicitação.";
}

/// Order status values reported by the order-status endpoint
pub mod order_status {
    pub const COMPLETED: &str = "completed";
    pub const CANCELED: &str = "canceled";
}

/// Environment variables read at startup
pub mod env_vars {
    pub const ENVIRONMENT: &str = "TICKETDESK_ENV";
    pub const LOG_FILTER: &str = "TICKETDESK_LOG";
    pub const LOG_FORMAT: &str = "TICKETDESK_LOG_FORMAT";
    pub const CONFIG_PREFIX: &str = "TICKETDESK";
    pub const LEGACY_ORDER_API_BASE_URL: &str = "ORDER_API_BASE_URL";
    pub const LEGACY_API_KEY: &str = "API_KEY";
}
