// crates/order-consumer/src/lib.rs
// ============================================================================
// Module: Order Consumer Library
// Description: Client side of the order listing contract.
// Purpose: Expose the order API client to applications and contract tests.
// Dependencies: order-model, reqwest, thiserror
// ============================================================================

//! ## Overview
//! The consumer depends only on the shared wire model; it never links the
//! provider. Its expectations of `GET /orders` are recorded as pacts by the
//! crate's contract tests.

pub mod client;

pub use client::ClientError;
pub use client::OrderApiClient;
pub use order_model::Item;
pub use order_model::Order;
