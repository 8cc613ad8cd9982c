// crates/order-model/src/wire.rs
// ============================================================================
// Module: Order Wire Codec
// Description: JSON array encoding for order lists.
// Purpose: Keep provider and consumer on a single decode path.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! The body of `GET /orders` is a JSON array of [`Order`]. These helpers
//! decode and encode that array and report parser failures unmodified.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::order::Order;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Order list encoding errors.
#[derive(Debug, Error)]
pub enum WireError {
    /// The payload is not a JSON array of orders.
    #[error("invalid order payload: {0}")]
    Decode(#[source] serde_json::Error),
    /// Orders could not be serialized.
    #[error("order serialization failed: {0}")]
    Encode(#[source] serde_json::Error),
}

// ============================================================================
// SECTION: Codec
// ============================================================================

/// Decodes a JSON array of orders.
///
/// # Errors
///
/// Returns [`WireError::Decode`] when the bytes are not a JSON array of orders.
pub fn decode_orders(bytes: &[u8]) -> Result<Vec<Order>, WireError> {
    serde_json::from_slice(bytes).map_err(WireError::Decode)
}

/// Encodes orders as a compact JSON array.
///
/// # Errors
///
/// Returns [`WireError::Encode`] when serialization fails.
pub fn encode_orders(orders: &[Order]) -> Result<Vec<u8>, WireError> {
    serde_json::to_vec(orders).map_err(WireError::Encode)
}
