// crates/order-provider/src/lib.rs
// ============================================================================
// Module: Order Provider
// Description: HTTP provider for the order listing endpoint.
// Purpose: Serve `GET /orders` from a swappable order repository.
// Dependencies: axum, order-model, serde, tokio, toml
// ============================================================================

//! ## Overview
//! The provider exposes a single read-only endpoint, `GET /orders`, backed
//! by an [`OrderRepository`]. The default repository parses the bundled
//! `orders.json` resource; configuration can point it at a file instead.
//! Invariants:
//! - The endpoint always answers `200` with a JSON array when the store reads.
//! - Store failures propagate unmodified as `500` responses.
//! - The repository is the only data-access seam; tests substitute it.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod server;
pub mod store;
pub mod telemetry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ConfigError;
pub use config::ProviderConfig;
pub use server::ORDERS_PATH;
pub use server::OrderProvider;
pub use server::ProviderError;
pub use server::order_router;
pub use store::BundledOrderRepository;
pub use store::FileOrderRepository;
pub use store::InMemoryOrderRepository;
pub use store::OrderRepository;
pub use store::SharedOrderRepository;
pub use store::StoreError;
pub use telemetry::NoopRequestLog;
pub use telemetry::RequestLogSink;
