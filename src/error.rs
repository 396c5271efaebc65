//! # Error Types
//!
//! Structured error handling for the intake engine.
//!
//! The parser never fails and the resolvers reduce every failure to data, so
//! [`IntakeError`] only surfaces at the edges: configuration, HTTP client
//! construction and the external collaborators (ticket source, classifier,
//! audit sink). Failures of the order-status endpoint are described by
//! [`OrderApiError`], which the retry policy inspects.

use thiserror::Error;

/// Crate-wide error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntakeError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("HTTP client error: {0}")]
    HttpClientError(String),
    #[error("Ticket source error: {0}")]
    TicketSourceError(String),
    #[error("Classifier error: {0}")]
    ClassifierError(String),
    #[error("Audit sink error: {0}")]
    AuditSinkError(String),
}

impl From<config::ConfigError> for IntakeError {
    fn from(error: config::ConfigError) -> Self {
        IntakeError::ConfigurationError(error.to_string())
    }
}

impl From<serde_json::Error> for IntakeError {
    fn from(error: serde_json::Error) -> Self {
        IntakeError::InvalidInput(format!("JSON serialization error: {error}"))
    }
}

pub type Result<T> = std::result::Result<T, IntakeError>;

/// Failures reported by the order-status endpoint
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrderApiError {
    #[error("Order not found: {order_id}")]
    NotFound { order_id: String },

    #[error("Order API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Order API request timed out: {0}")]
    Timeout(String),

    #[error("Order API connection failed: {0}")]
    Connection(String),

    #[error("Malformed order payload: {0}")]
    MalformedPayload(String),

    #[error("Order API request failed: {0}")]
    Request(String),
}

impl OrderApiError {
    /// Create an API error from an HTTP status
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// The endpoint confirmed the order does not exist
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, OrderApiError::NotFound { .. })
    }

    /// Check if the remote is likely to answer differently on a later attempt
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            OrderApiError::Timeout(_) | OrderApiError::Connection(_) => true,
            OrderApiError::ApiError { status, .. } => {
                *status >= 500 || *status == 408 || *status == 429
            }
            OrderApiError::NotFound { .. } => false,
            OrderApiError::MalformedPayload(_) => false,
            OrderApiError::Request(_) => false,
        }
    }
}

impl From<reqwest::Error> for OrderApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            OrderApiError::Timeout(error.to_string())
        } else if error.is_connect() {
            OrderApiError::Connection(error.to_string())
        } else if error.is_decode() {
            OrderApiError::MalformedPayload(error.to_string())
        } else if let Some(status) = error.status() {
            OrderApiError::api_error(status.as_u16(), error.to_string())
        } else {
            OrderApiError::Request(error.to_string())
        }
    }
}
