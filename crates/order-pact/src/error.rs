// crates/order-pact/src/error.rs
// ============================================================================
// Module: Pact Errors
// Description: Error type shared by the pact model, registry, and harnesses.
// Purpose: Give every contract-tooling failure a single typed surface.
// Dependencies: thiserror
// ============================================================================

use thiserror::Error;

/// Contract tooling errors.
#[derive(Debug, Error)]
pub enum PactError {
    /// Filesystem access failed.
    #[error("pact io error: {0}")]
    Io(String),
    /// A pact could not be serialized or parsed.
    #[error("pact serialization error: {0}")]
    Serialization(String),
    /// A pact or one of its inputs is structurally invalid.
    #[error("invalid pact: {0}")]
    Invalid(String),
    /// No pact exists for the requested participants.
    #[error("pact not found: {0}")]
    NotFound(String),
    /// The mock server could not be started.
    #[error("mock server error: {0}")]
    MockServer(String),
    /// The mock server saw missing or unexpected requests.
    #[error("mock server expectations not met: {}", .0.join("; "))]
    Expectations(Vec<String>),
    /// The verifier could not build or send an HTTP request.
    #[error("http error: {0}")]
    Http(String),
}
