// crates/order-pact/src/lib.rs
// ============================================================================
// Module: Order Pact Library
// Description: Consumer-driven contract tooling for HTTP services.
// Purpose: Record consumer expectations and verify providers against them.
// Dependencies: axum, reqwest, serde, serde_json, thiserror, tokio
// ============================================================================

//! ## Overview
//! Consumer tests describe interactions with [`PactBuilder`], run their client
//! against a [`MockServer`], and publish the resulting [`Pact`] to a
//! [`PactRegistry`]. Provider tests load those pacts and replay them with a
//! [`ProviderVerifier`], setting up each named provider state first.
//! Security posture: mock servers bind loopback only; pact files are trusted
//! test inputs.

pub mod builder;
pub mod error;
pub mod matching;
pub mod mock_server;
pub mod model;
pub mod pattern;
pub mod registry;
pub mod verifier;

pub use builder::InteractionBuilder;
pub use builder::PactBuilder;
pub use error::PactError;
pub use matching::Mismatch;
pub use matching::match_body;
pub use matching::match_headers;
pub use mock_server::MockServer;
pub use mock_server::RecordedRequest;
pub use model::Body;
pub use model::Interaction;
pub use model::MatchingRule;
pub use model::Pact;
pub use model::ProviderState;
pub use pattern::JsonPattern;
pub use registry::PactRegistry;
pub use verifier::InteractionResult;
pub use verifier::ProviderVerifier;
pub use verifier::VerificationReport;
