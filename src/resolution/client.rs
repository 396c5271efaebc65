//! # Order Status Client
//!
//! HTTP client for the order-status endpoint (`GET /orders/{id}` with an API
//! key header). The [`OrderStatusSource`] trait is the seam the resolver
//! depends on, so tests and alternative transports can stand in for HTTP.

use super::types::OrderRecord;
use crate::config::OrderApiConfig;
use crate::parsing::markup::is_all_digits;
use crate::error::{IntakeError, OrderApiError, Result};
use crate::utils::serde::{deserialize_optional_numeric, deserialize_optional_string};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// Anything that can look up one order by id
#[async_trait]
pub trait OrderStatusSource: Send + Sync {
    async fn fetch_order(&self, order_id: &str) -> std::result::Result<OrderRecord, OrderApiError>;
}

/// Response envelope: `{"data": {...}}`
#[derive(Debug, Deserialize)]
struct OrderEnvelope {
    data: Option<OrderPayload>,
}

#[derive(Debug, Default, Deserialize)]
struct ChargePayload {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    formatted: Option<String>,
}

/// Upstream order fields, snake_case and loosely typed
#[derive(Debug, Default, Deserialize)]
pub(crate) struct OrderPayload {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    external_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    user: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    link: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_numeric")]
    start_count: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_numeric")]
    quantity: Option<i64>,
    #[serde(default)]
    charge: Option<ChargePayload>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    service_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    service_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    status: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_numeric")]
    remains: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    created: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    provider: Option<String>,
}

impl OrderPayload {
    fn into_record(self) -> std::result::Result<OrderRecord, OrderApiError> {
        let order_id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| OrderApiError::MalformedPayload("missing data.id".to_string()))?;

        Ok(OrderRecord {
            order_id,
            external_id: self.external_id,
            user: self.user,
            link: self.link,
            start_count: self.start_count,
            quantity: self.quantity,
            amount: self.charge.and_then(|c| c.formatted),
            service_id: self.service_id,
            service_name: self.service_name,
            status: self.status.unwrap_or_default(),
            remains: self.remains,
            created_at: self.created,
            provider: self.provider,
        })
    }
}

/// Map an order-status response body into an [`OrderRecord`]
pub fn parse_order_body(body: &str) -> std::result::Result<OrderRecord, OrderApiError> {
    let envelope: OrderEnvelope = serde_json::from_str(body)
        .map_err(|e| OrderApiError::MalformedPayload(format!("invalid JSON: {e}")))?;
    envelope
        .data
        .ok_or_else(|| OrderApiError::MalformedPayload("missing data".to_string()))?
        .into_record()
}

/// reqwest-backed [`OrderStatusSource`]
pub struct HttpOrderStatusClient {
    client: Client,
    base_url: Url,
    config: OrderApiConfig,
}

impl std::fmt::Debug for HttpOrderStatusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpOrderStatusClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout_ms", &self.config.timeout_ms)
            .field("api_key_header", &self.config.api_key_header)
            .field("api_key_set", &!self.config.api_key.is_empty())
            .finish()
    }
}

impl HttpOrderStatusClient {
    pub fn new(config: OrderApiConfig) -> Result<Self> {
        let base = config.base_url.trim();
        if base.is_empty() {
            return Err(IntakeError::ConfigurationError(
                "order_api.base_url is not set".to_string(),
            ));
        }
        let base_url = Url::parse(base).map_err(|e| {
            IntakeError::ConfigurationError(format!("Invalid base URL '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(IntakeError::ConfigurationError(format!(
                "Base URL '{}' cannot carry a path",
                config.base_url
            )));
        }

        let mut client_builder = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(format!("ticketdesk-core/{}", env!("CARGO_PKG_VERSION")));

        if !config.api_key.is_empty() {
            let mut default_headers = reqwest::header::HeaderMap::new();
            default_headers.insert(
                reqwest::header::HeaderName::from_bytes(config.api_key_header.as_bytes()).map_err(
                    |e| {
                        IntakeError::ConfigurationError(format!(
                            "Invalid API key header name: {e}"
                        ))
                    },
                )?,
                config.api_key.parse().map_err(|e| {
                    IntakeError::ConfigurationError(format!("Invalid API key: {e}"))
                })?,
            );
            client_builder = client_builder.default_headers(default_headers);
        }

        let client = client_builder.build().map_err(|e| {
            IntakeError::HttpClientError(format!("Failed to create HTTP client: {e}"))
        })?;

        info!(
            base_url = %base_url,
            timeout_ms = config.timeout_ms,
            "Created HttpOrderStatusClient"
        );

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// `{base}/orders/{id}`; anything but a digit string is never sent
    fn order_url(&self, order_id: &str) -> std::result::Result<Url, OrderApiError> {
        if !is_all_digits(order_id) {
            return Err(OrderApiError::NotFound {
                order_id: order_id.to_string(),
            });
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| OrderApiError::Request("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .push("orders")
            .push(order_id);
        Ok(url)
    }
}

#[async_trait]
impl OrderStatusSource for HttpOrderStatusClient {
    async fn fetch_order(&self, order_id: &str) -> std::result::Result<OrderRecord, OrderApiError> {
        let url = self.order_url(order_id).inspect_err(|_| {
            debug!(order_id = order_id, "Rejected non-numeric order id without a request");
        })?;
        debug!(order_id = order_id, url = %url, "Fetching order status");

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(OrderApiError::NotFound {
                order_id: order_id.to_string(),
            });
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(OrderApiError::api_error(status.as_u16(), error_text));
        }

        let body = response.text().await?;
        parse_order_body(&body)
    }
}
