// crates/order-consumer/src/client.rs
// ============================================================================
// Module: Order API Client
// Description: Blocking client for the provider's order listing.
// Purpose: Fetch and decode `GET /orders` for consumer code.
// Dependencies: order-model, reqwest, thiserror
// ============================================================================

//! ## Overview
//! [`OrderApiClient`] resolves `orders` relative to a base URL (a missing
//! trailing slash is added, so `http://host/api` and `http://host/api/` both
//! resolve to `http://host/api/orders`) and issues one synchronous GET per
//! call. There is no retry; the transport's defaults govern timeouts.
//! Invariants:
//! - Only `http` and `https` base URLs are accepted.
//! - Non-success statuses are errors, never an empty order list.

// ============================================================================
// SECTION: Imports
// ============================================================================

use order_model::Order;
use order_model::WireError;
use order_model::decode_orders;
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Path of the order listing, relative to the base URL.
const ORDERS_SEGMENT: &str = "orders";
/// Maximum number of response body bytes kept in status errors.
const MAX_ERROR_BODY_BYTES: usize = 512;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Order client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The base URL could not be parsed or uses an unsupported scheme.
    #[error("invalid base url {url}: {reason}")]
    InvalidUrl {
        /// URL as supplied.
        url: String,
        /// Parse or validation failure.
        reason: String,
    },
    /// The request could not be sent or the response could not be read.
    #[error("transport error: {0}")]
    Transport(String),
    /// The provider answered with a non-success status.
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Leading portion of the response body.
        body: String,
    },
    /// The response body is not a JSON array of orders.
    #[error("response decode error: {0}")]
    Decode(#[source] WireError),
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Client for the order provider.
#[derive(Debug, Clone)]
pub struct OrderApiClient {
    /// Fully resolved order listing URL.
    orders_url: Url,
    /// HTTP client.
    client: Client,
}

impl OrderApiClient {
    /// Creates a client for the provider at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUrl`] when the URL does not parse or is
    /// not `http`/`https`, and [`ClientError::Transport`] when the HTTP client
    /// cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let orders_url = resolve_orders_url(base_url)?;
        let client = Client::builder()
            .build()
            .map_err(|err| ClientError::Transport(format!("http client build failed: {err}")))?;
        Ok(Self {
            orders_url,
            client,
        })
    }

    /// Returns the URL requested by [`Self::fetch_orders`].
    #[must_use]
    pub const fn orders_url(&self) -> &Url {
        &self.orders_url
    }

    /// Fetches every order from the provider.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure, a non-success status, or
    /// an undecodable body.
    pub fn fetch_orders(&self) -> Result<Vec<Order>, ClientError> {
        let response = self
            .client
            .get(self.orders_url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|err| ClientError::Transport(err.to_string()))?;
        let status = response.status();
        let bytes = response.bytes().map_err(|err| ClientError::Transport(err.to_string()))?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: truncate_body(&bytes),
            });
        }
        decode_orders(&bytes).map_err(ClientError::Decode)
    }
}

/// Parses `base_url` and resolves the order listing beneath it.
fn resolve_orders_url(base_url: &str) -> Result<Url, ClientError> {
    let invalid = |reason: String| ClientError::InvalidUrl {
        url: base_url.to_string(),
        reason,
    };
    let mut base = Url::parse(base_url.trim()).map_err(|err| invalid(err.to_string()))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", base.scheme())));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(ORDERS_SEGMENT).map_err(|err| invalid(err.to_string()))
}

/// Returns a lossy UTF-8 prefix of an error body.
fn truncate_body(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let mut end = text.len().min(MAX_ERROR_BODY_BYTES);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[.. end].trim().to_string()
}

#[cfg(test)]
mod tests;
