// crates/order-pact/src/model.rs
// ============================================================================
// Module: Pact Model
// Description: Serializable pact documents, interactions, and matching rules.
// Purpose: Define the on-disk contract shared by consumer and provider tests.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`Pact`] records the HTTP interactions one consumer expects from one
//! provider. The JSON form follows the V4 pact layout (`camelCase` keys,
//! `providerStates`, `matchingRules`, and bodies wrapped as
//! `{content, contentType, encoded}`) so the files stay readable by other
//! pact tooling.
//! Invariants:
//! - Interactions are identified by description plus provider state names.
//! - A pact never holds two interactions with the same key.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::error::PactError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Pact specification version written into every pact.
pub const PACT_SPECIFICATION_VERSION: &str = "4.0";
/// Interaction type label for synchronous HTTP interactions.
pub const SYNCHRONOUS_HTTP: &str = "Synchronous/HTTP";
/// JSON content type.
pub const JSON_CONTENT_TYPE: &str = "application/json";

// ============================================================================
// SECTION: Pact Document
// ============================================================================

/// A consumer/provider contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pact {
    /// Consumer participant.
    pub consumer: Pacticipant,
    /// Provider participant.
    pub provider: Pacticipant,
    /// Recorded interactions.
    pub interactions: Vec<Interaction>,
    /// Document metadata.
    #[serde(default)]
    pub metadata: PactMetadata,
}

/// A named pact participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pacticipant {
    /// Participant name.
    pub name: String,
}

/// Pact document metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PactMetadata {
    /// Specification the document conforms to.
    pub pact_specification: PactSpecification,
}

impl Default for PactMetadata {
    fn default() -> Self {
        Self {
            pact_specification: PactSpecification {
                version: PACT_SPECIFICATION_VERSION.to_string(),
            },
        }
    }
}

/// Pact specification version marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PactSpecification {
    /// Version string, e.g. `4.0`.
    pub version: String,
}

impl Pact {
    /// Creates an empty pact between `consumer` and `provider`.
    #[must_use]
    pub fn new(consumer: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            consumer: Pacticipant {
                name: consumer.into(),
            },
            provider: Pacticipant {
                name: provider.into(),
            },
            interactions: Vec::new(),
            metadata: PactMetadata::default(),
        }
    }

    /// Merges `other` into this pact.
    ///
    /// Interactions with a key already present are replaced in place; new keys
    /// are appended in the order they appear in `other`.
    ///
    /// # Errors
    ///
    /// Returns [`PactError::Invalid`] when the participants differ.
    pub fn merge(&mut self, other: &Self) -> Result<(), PactError> {
        if self.consumer != other.consumer || self.provider != other.provider {
            return Err(PactError::Invalid(format!(
                "cannot merge pact {}-{} into {}-{}",
                other.consumer.name, other.provider.name, self.consumer.name, self.provider.name
            )));
        }
        for interaction in &other.interactions {
            let key = interaction.key();
            match self.interactions.iter_mut().find(|existing| existing.key() == key) {
                Some(existing) => existing.clone_from(interaction),
                None => self.interactions.push(interaction.clone()),
            }
        }
        Ok(())
    }

    /// Finds an interaction by description and provider state names.
    #[must_use]
    pub fn interaction(&self, description: &str, states: &[&str]) -> Option<&Interaction> {
        self.interactions.iter().find(|interaction| {
            interaction.description == description
                && interaction.provider_states.iter().map(|state| state.name.as_str()).eq(states.iter().copied())
        })
    }

    /// Checks structural invariants.
    ///
    /// # Errors
    ///
    /// Returns [`PactError::Invalid`] when participant names are empty, the
    /// specification major version is not 4, or interaction keys repeat.
    pub fn validate(&self) -> Result<(), PactError> {
        if self.consumer.name.trim().is_empty() || self.provider.name.trim().is_empty() {
            return Err(PactError::Invalid("participant names must not be empty".to_string()));
        }
        let major = self.metadata.pact_specification.version.split('.').next().unwrap_or_default();
        if major != "4" {
            return Err(PactError::Invalid(format!(
                "unsupported pact specification: {}",
                self.metadata.pact_specification.version
            )));
        }
        let mut seen = BTreeSet::new();
        for interaction in &self.interactions {
            if !seen.insert(interaction.key()) {
                return Err(PactError::Invalid(format!(
                    "duplicate interaction: {}",
                    interaction.label()
                )));
            }
        }
        Ok(())
    }

    /// Parses and validates a pact from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PactError`] when the bytes are not a valid pact.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, PactError> {
        let pact: Self =
            serde_json::from_slice(bytes).map_err(|err| PactError::Serialization(err.to_string()))?;
        pact.validate()?;
        Ok(pact)
    }

    /// Serializes the pact as pretty JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns [`PactError::Serialization`] when serialization fails.
    pub fn to_pretty_json(&self) -> Result<Vec<u8>, PactError> {
        let mut bytes =
            serde_json::to_vec_pretty(self).map_err(|err| PactError::Serialization(err.to_string()))?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

// ============================================================================
// SECTION: Interactions
// ============================================================================

/// One recorded request/response exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    /// Interaction type label.
    #[serde(rename = "type", default = "default_interaction_type")]
    pub interaction_type: String,
    /// Human-readable description.
    pub description: String,
    /// Provider states that must hold before replay.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provider_states: Vec<ProviderState>,
    /// Expected request.
    pub request: HttpRequest,
    /// Expected response.
    pub response: HttpResponse,
}

/// Interaction identity: description plus ordered provider state names.
pub type InteractionKey = (String, Vec<String>);

impl Interaction {
    /// Returns the identity of this interaction.
    #[must_use]
    pub fn key(&self) -> InteractionKey {
        (
            self.description.clone(),
            self.provider_states.iter().map(|state| state.name.clone()).collect(),
        )
    }

    /// Returns a display label such as `a request for orders [there are orders]`.
    #[must_use]
    pub fn label(&self) -> String {
        if self.provider_states.is_empty() {
            return self.description.clone();
        }
        let states: Vec<&str> = self.provider_states.iter().map(|state| state.name.as_str()).collect();
        format!("{} [{}]", self.description, states.join(", "))
    }
}

/// Default interaction type for documents that omit it.
fn default_interaction_type() -> String {
    SYNCHRONOUS_HTTP.to_string()
}

/// A named provider precondition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderState {
    /// State name, e.g. `there are orders`.
    pub name: String,
    /// Optional state parameters.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
}

impl ProviderState {
    /// Creates a state without parameters.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Map::new(),
        }
    }
}

/// Header map: header name to ordered values.
pub type Headers = BTreeMap<String, Vec<String>>;

/// Expected HTTP request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpRequest {
    /// HTTP method, upper case.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Headers the request must carry.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: Headers,
    /// Request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
}

/// Expected HTTP response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Headers the response must carry.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: Headers,
    /// Example response body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
    /// Rules that relax body comparison.
    #[serde(default, skip_serializing_if = "MatchingRules::is_empty")]
    pub matching_rules: MatchingRules,
}

/// Message body with its content type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    /// Body content; JSON bodies are stored inline.
    pub content: Value,
    /// Content type of the body.
    pub content_type: String,
    /// Whether `content` is an encoded string.
    #[serde(default)]
    pub encoded: bool,
}

impl Body {
    /// Creates an inline JSON body.
    #[must_use]
    pub fn json(content: Value) -> Self {
        Self {
            content,
            content_type: JSON_CONTENT_TYPE.to_string(),
            encoded: false,
        }
    }

    /// Returns true when the content type is JSON.
    #[must_use]
    pub fn is_json(&self) -> bool {
        media_type(&self.content_type) == JSON_CONTENT_TYPE
            || media_type(&self.content_type).ends_with("+json")
    }

    /// Returns the bytes sent on the wire for this body.
    ///
    /// # Errors
    ///
    /// Returns [`PactError::Serialization`] when a JSON body cannot be encoded.
    pub fn to_bytes(&self) -> Result<Vec<u8>, PactError> {
        match (&self.content, self.is_json()) {
            (Value::String(text), false) => Ok(text.as_bytes().to_vec()),
            _ => serde_json::to_vec(&self.content)
                .map_err(|err| PactError::Serialization(err.to_string())),
        }
    }
}

/// Returns the lower-cased media type without parameters.
#[must_use]
pub fn media_type(content_type: &str) -> String {
    content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase()
}

// ============================================================================
// SECTION: Matching Rules
// ============================================================================

/// Matching rules by category.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatchingRules {
    /// Body rules keyed by path expression (`$`, `$[*].id`, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub body: BTreeMap<String, RuleList>,
}

impl MatchingRules {
    /// Returns true when no rules are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Rules attached to one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleList {
    /// How multiple matchers combine.
    #[serde(default)]
    pub combine: RuleLogic,
    /// Matchers applied at the path.
    pub matchers: Vec<MatchingRule>,
}

impl RuleList {
    /// Creates a single-matcher list.
    #[must_use]
    pub fn single(rule: MatchingRule) -> Self {
        Self {
            combine: RuleLogic::And,
            matchers: vec![rule],
        }
    }
}

/// Matcher combination logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleLogic {
    /// Every matcher must pass.
    #[default]
    And,
    /// At least one matcher must pass.
    Or,
}

/// A single body matcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "match", rename_all = "lowercase")]
pub enum MatchingRule {
    /// Values must be equal.
    Equality,
    /// Values must share a JSON type; arrays honour optional length bounds.
    Type {
        /// Minimum array length.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<usize>,
        /// Maximum array length.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<usize>,
    },
    /// Value must be a JSON number.
    Number,
    /// Value must be an integer.
    Integer,
    /// Value must be a number with a fractional representation.
    Decimal,
    /// Value must be a boolean.
    Boolean,
    /// Value must be a string containing `value`.
    Include {
        /// Required substring.
        value: String,
    },
}
