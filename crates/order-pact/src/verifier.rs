// crates/order-pact/src/verifier.rs
// ============================================================================
// Module: Provider Verifier
// Description: Replays pact interactions against a running provider.
// Purpose: Prove a provider honours every contract its consumers published.
// Dependencies: reqwest, serde, serde_json
// ============================================================================

//! ## Overview
//! [`ProviderVerifier`] walks each interaction of a pact: it runs the
//! registered handler for every provider state, sends the recorded request to
//! the provider, and compares the response status, expected headers, and body
//! (under the interaction's matching rules). Each interaction yields an
//! [`InteractionResult`]; a [`VerificationReport`] passes only when every
//! interaction does.
//!
//! The verifier uses a blocking HTTP client and must not be called from
//! inside an async runtime.
//! Invariants:
//! - An interaction whose provider state has no handler fails without being
//!   sent.
//! - Verification never stops at the first failing interaction.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::Client;
use serde::Serialize;
use serde_json::Value;

use crate::error::PactError;
use crate::matching::Mismatch;
use crate::matching::match_body;
use crate::matching::match_headers;
use crate::mock_server::collect_headers;
use crate::model::Headers;
use crate::model::Interaction;
use crate::model::Pact;
use crate::model::ProviderState;
use crate::registry::PactRegistry;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Timeout applied to every replayed request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Outcome of verifying one interaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionResult {
    /// Consumer that published the interaction.
    pub consumer: String,
    /// Interaction description.
    pub description: String,
    /// Provider state names.
    pub states: Vec<String>,
    /// Differences found; empty when the interaction passed.
    pub mismatches: Vec<Mismatch>,
}

impl InteractionResult {
    /// Returns true when no mismatches were found.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Returns a display label such as `a request for orders [there are orders]`.
    #[must_use]
    pub fn label(&self) -> String {
        if self.states.is_empty() {
            self.description.clone()
        } else {
            format!("{} [{}]", self.description, self.states.join(", "))
        }
    }
}

/// Outcome of verifying one or more pacts.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct VerificationReport {
    /// Per-interaction results in verification order.
    pub results: Vec<InteractionResult>,
}

impl VerificationReport {
    /// Returns true when every interaction passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.results.iter().all(InteractionResult::passed)
    }

    /// Returns the failing interactions.
    #[must_use]
    pub fn failures(&self) -> Vec<&InteractionResult> {
        self.results.iter().filter(|result| !result.passed()).collect()
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.results {
            let verdict = if result.passed() { "PASS" } else { "FAIL" };
            writeln!(f, "{verdict} {} ({})", result.label(), result.consumer)?;
            for mismatch in &result.mismatches {
                writeln!(f, "  - {mismatch}")?;
            }
        }
        write!(
            f,
            "{} interaction(s), {} failed",
            self.results.len(),
            self.failures().len()
        )
    }
}

// ============================================================================
// SECTION: Verifier
// ============================================================================

/// Sets up a provider state before an interaction is replayed.
pub type StateHandler = Box<dyn Fn(&ProviderState) -> Result<(), String> + Send + Sync>;

/// Verifies pacts against a running provider.
pub struct ProviderVerifier {
    /// Provider name pacts must target.
    provider: String,
    /// Provider base URL without a trailing slash.
    base_url: String,
    /// Provider state handlers by state name.
    states: BTreeMap<String, StateHandler>,
    /// HTTP client.
    client: Client,
}

impl ProviderVerifier {
    /// Creates a verifier for `provider` listening at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`PactError::Http`] when the HTTP client cannot be built.
    pub fn new(provider: impl Into<String>, base_url: impl Into<String>) -> Result<Self, PactError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| PactError::Http(format!("http client init failed: {err}")))?;
        Ok(Self {
            provider: provider.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            states: BTreeMap::new(),
            client,
        })
    }

    /// Registers the handler for provider state `name`.
    #[must_use]
    pub fn state(
        mut self,
        name: impl Into<String>,
        handler: impl Fn(&ProviderState) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.states.insert(name.into(), Box::new(handler));
        self
    }

    /// Verifies every interaction of `pact`.
    ///
    /// # Errors
    ///
    /// Returns [`PactError::Invalid`] when the pact targets another provider.
    pub fn verify_pact(&self, pact: &Pact) -> Result<VerificationReport, PactError> {
        if pact.provider.name != self.provider {
            return Err(PactError::Invalid(format!(
                "pact targets provider {} but verifier is for {}",
                pact.provider.name, self.provider
            )));
        }
        let results = pact
            .interactions
            .iter()
            .map(|interaction| self.verify_interaction(&pact.consumer.name, interaction))
            .collect();
        Ok(VerificationReport {
            results,
        })
    }

    /// Verifies every pact published for this provider in `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`PactError::NotFound`] when no pact targets the provider, or
    /// another [`PactError`] when the registry cannot be read.
    pub fn verify_registry(&self, registry: &PactRegistry) -> Result<VerificationReport, PactError> {
        let pacts = registry.pacts_for_provider(&self.provider)?;
        if pacts.is_empty() {
            return Err(PactError::NotFound(format!(
                "no pacts for provider {} in {}",
                self.provider,
                registry.root().display()
            )));
        }
        let mut report = VerificationReport::default();
        for pact in &pacts {
            report.results.extend(self.verify_pact(pact)?.results);
        }
        Ok(report)
    }

    /// Sets up states, replays the request, and compares the response.
    fn verify_interaction(&self, consumer: &str, interaction: &Interaction) -> InteractionResult {
        let mut result = InteractionResult {
            consumer: consumer.to_string(),
            description: interaction.description.clone(),
            states: interaction.provider_states.iter().map(|state| state.name.clone()).collect(),
            mismatches: Vec::new(),
        };
        for state in &interaction.provider_states {
            let outcome = match self.states.get(&state.name) {
                Some(handler) => handler(state),
                None => Err("no handler registered".to_string()),
            };
            if let Err(message) = outcome {
                result.mismatches.push(failure(&format!("state:{}", state.name), message));
            }
        }
        if !result.mismatches.is_empty() {
            return result;
        }
        match self.send(interaction) {
            Ok(actual) => result.mismatches = compare_response(interaction, &actual),
            Err(err) => result.mismatches.push(failure("request", err.to_string())),
        }
        result
    }

    /// Sends the interaction's request to the provider.
    fn send(&self, interaction: &Interaction) -> Result<ActualResponse, PactError> {
        let request = &interaction.request;
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|err| PactError::Http(format!("invalid method {}: {err}", request.method)))?;
        let mut builder = self.client.request(method, format!("{}{}", self.base_url, request.path));
        for (name, values) in &request.headers {
            for value in values {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }
        if let Some(body) = &request.body {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, body.content_type.as_str())
                .body(body.to_bytes()?);
        }
        let response = builder
            .send()
            .map_err(|err| PactError::Http(format!("{} {} failed: {err}", request.method, request.path)))?;
        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let body = response
            .bytes()
            .map_err(|err| PactError::Http(format!("response body read failed: {err}")))?
            .to_vec();
        Ok(ActualResponse {
            status,
            headers,
            body,
        })
    }
}

// ============================================================================
// SECTION: Response Comparison
// ============================================================================

/// Response received from the provider.
struct ActualResponse {
    /// Status code.
    status: u16,
    /// Response headers.
    headers: Headers,
    /// Raw body bytes.
    body: Vec<u8>,
}

/// Compares a provider response with the interaction's expectations.
fn compare_response(interaction: &Interaction, actual: &ActualResponse) -> Vec<Mismatch> {
    let expected = &interaction.response;
    let mut mismatches = Vec::new();
    if expected.status != actual.status {
        mismatches.push(Mismatch {
            path: "status".to_string(),
            message: format!("expected status {} but got {}", expected.status, actual.status),
            expected: Value::from(expected.status),
            actual: Some(Value::from(actual.status)),
        });
    }
    mismatches.extend(match_headers(&expected.headers, &actual.headers));
    let Some(body) = &expected.body else {
        return mismatches;
    };
    if body.is_json() {
        match serde_json::from_slice::<Value>(&actual.body) {
            Ok(actual_body) => {
                mismatches.extend(match_body(&body.content, &actual_body, &expected.matching_rules.body));
            }
            Err(err) => mismatches.push(Mismatch {
                path: "$".to_string(),
                message: format!("response body is not JSON: {err}"),
                expected: body.content.clone(),
                actual: Some(Value::from(String::from_utf8_lossy(&actual.body).into_owned())),
            }),
        }
    } else {
        let actual_text = String::from_utf8_lossy(&actual.body).into_owned();
        if body.content.as_str() != Some(actual_text.as_str()) {
            mismatches.push(Mismatch {
                path: "body".to_string(),
                message: "body text differs".to_string(),
                expected: body.content.clone(),
                actual: Some(Value::from(actual_text)),
            });
        }
    }
    mismatches
}

/// Builds a non-HTTP failure entry.
fn failure(path: &str, message: String) -> Mismatch {
    Mismatch {
        path: path.to_string(),
        message,
        expected: Value::Null,
        actual: None,
    }
}

#[cfg(test)]
mod tests;
