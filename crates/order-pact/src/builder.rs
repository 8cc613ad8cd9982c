// crates/order-pact/src/builder.rs
// ============================================================================
// Module: Pact Builder
// Description: Fluent construction of pacts from consumer tests.
// Purpose: Describe expected interactions without hand-writing pact JSON.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! [`PactBuilder`] collects interactions for one consumer/provider pair. Each
//! interaction is described through an [`InteractionBuilder`] closure:
//!
//! ```
//! use order_pact::PactBuilder;
//! use serde_json::json;
//!
//! let pact = PactBuilder::new("order_consumer", "order_provider")
//!     .interaction("a request for orders", |i| {
//!         i.given("there are no orders")
//!             .with_request("GET", "/orders")
//!             .will_respond_with(200)
//!             .response_header("Content-Type", "application/json")
//!             .json_body(json!([]));
//!     })
//!     .build();
//! assert_eq!(pact.interactions.len(), 1);
//! ```

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::error::PactError;
use crate::mock_server::MockServer;
use crate::model::Body;
use crate::model::Headers;
use crate::model::HttpRequest;
use crate::model::HttpResponse;
use crate::model::Interaction;
use crate::model::MatchingRules;
use crate::model::Pact;
use crate::model::ProviderState;
use crate::model::SYNCHRONOUS_HTTP;
use crate::pattern::JsonPattern;

// ============================================================================
// SECTION: Pact Builder
// ============================================================================

/// Builds a [`Pact`] interaction by interaction.
#[derive(Debug, Clone)]
pub struct PactBuilder {
    /// Pact under construction.
    pact: Pact,
}

impl PactBuilder {
    /// Starts a pact between `consumer` and `provider`.
    #[must_use]
    pub fn new(consumer: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            pact: Pact::new(consumer, provider),
        }
    }

    /// Adds an interaction described by `describe`.
    ///
    /// An interaction with the same description and provider states replaces
    /// the earlier one.
    #[must_use]
    pub fn interaction(
        mut self,
        description: impl Into<String>,
        describe: impl FnOnce(&mut InteractionBuilder),
    ) -> Self {
        let mut builder = InteractionBuilder::new(description.into());
        describe(&mut builder);
        let interaction = builder.build();
        let key = interaction.key();
        match self.pact.interactions.iter_mut().find(|existing| existing.key() == key) {
            Some(existing) => *existing = interaction,
            None => self.pact.interactions.push(interaction),
        }
        self
    }

    /// Returns the finished pact.
    #[must_use]
    pub fn build(self) -> Pact {
        self.pact
    }

    /// Starts a mock server replaying the pact's interactions.
    ///
    /// # Errors
    ///
    /// Returns [`PactError::MockServer`] when the server cannot be started.
    pub fn start_mock_server(self) -> Result<MockServer, PactError> {
        MockServer::start(self.pact)
    }
}

// ============================================================================
// SECTION: Interaction Builder
// ============================================================================

/// Describes one interaction.
#[derive(Debug, Clone)]
pub struct InteractionBuilder {
    /// Interaction description.
    description: String,
    /// Provider states in declaration order.
    states: Vec<ProviderState>,
    /// Expected request.
    request: HttpRequest,
    /// Expected response.
    response: HttpResponse,
}

impl InteractionBuilder {
    /// Creates a builder expecting `GET /` and responding `200`.
    fn new(description: String) -> Self {
        Self {
            description,
            states: Vec::new(),
            request: HttpRequest {
                method: "GET".to_string(),
                path: "/".to_string(),
                headers: Headers::new(),
                body: None,
            },
            response: HttpResponse {
                status: 200,
                headers: Headers::new(),
                body: None,
                matching_rules: MatchingRules::default(),
            },
        }
    }

    /// Adds a provider state.
    pub fn given(&mut self, state: impl Into<String>) -> &mut Self {
        self.states.push(ProviderState::new(state));
        self
    }

    /// Sets the expected request method and path.
    pub fn with_request(&mut self, method: &str, path: impl Into<String>) -> &mut Self {
        self.request.method = method.to_ascii_uppercase();
        self.request.path = path.into();
        self
    }

    /// Adds a header the request must carry.
    pub fn request_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.request.headers.entry(name.into()).or_default().push(value.into());
        self
    }

    /// Sets the response status.
    pub const fn will_respond_with(&mut self, status: u16) -> &mut Self {
        self.response.status = status;
        self
    }

    /// Adds a header the response carries.
    pub fn response_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.response.headers.entry(name.into()).or_default().push(value.into());
        self
    }

    /// Sets a JSON response body from a pattern or a literal value.
    pub fn json_body(&mut self, body: impl Into<JsonPattern>) -> &mut Self {
        let pattern = body.into();
        self.response.body = Some(Body::json(pattern.example()));
        self.response.matching_rules = MatchingRules {
            body: pattern.rules(),
        };
        self
    }

    /// Finishes the interaction.
    fn build(self) -> Interaction {
        Interaction {
            interaction_type: SYNCHRONOUS_HTTP.to_string(),
            description: self.description,
            provider_states: self.states,
            request: self.request,
            response: self.response,
        }
    }
}
