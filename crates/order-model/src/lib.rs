// crates/order-model/src/lib.rs
// ============================================================================
// Module: Order Model
// Description: Wire types shared by the order provider and order consumers.
// Purpose: Provide one canonical shape for orders on the wire.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This crate defines the [`Order`] and [`Item`] records exchanged over
//! `GET /orders`, plus helpers to decode and encode the JSON array form.
//! Both the provider and the consumer depend on it; neither depends on the
//! other.
//! Invariants:
//! - Records are immutable once constructed; there are no mutators.
//! - Contents are not validated. Whatever the JSON parser accepts is kept.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod order;
pub mod wire;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use order::Item;
pub use order::Order;
pub use wire::WireError;
pub use wire::decode_orders;
pub use wire::encode_orders;
