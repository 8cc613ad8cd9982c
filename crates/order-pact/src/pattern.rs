// crates/order-pact/src/pattern.rs
// ============================================================================
// Module: Body Patterns
// Description: DSL for example bodies annotated with matching rules.
// Purpose: Let consumer tests describe a response shape instead of exact values.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! A [`JsonPattern`] is an example JSON value plus the matching rules that
//! relax comparison against it. [`JsonPattern::example`] produces the body the
//! mock server returns; [`JsonPattern::rules`] produces the rules recorded in
//! the pact, keyed by path (`$`, `$[*].items`, `$[*].items[*].name`, ...).
//!
//! ```
//! use order_pact::pattern::{array_min_like, each_like, integer_type, number_type, object, string_type};
//!
//! let orders = array_min_like(1, object([
//!     ("id", string_type("1")),
//!     ("items", each_like(object([
//!         ("name", string_type("Pencil")),
//!         ("quantity", integer_type(10)),
//!         ("value", number_type(0.75)),
//!     ]))),
//! ]));
//! assert_eq!(orders.rules().len(), 6);
//! ```

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Map;
use serde_json::Value;

use crate::model::MatchingRule;
use crate::model::RuleList;

// ============================================================================
// SECTION: Pattern Type
// ============================================================================

/// Example JSON value annotated with matching rules.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonPattern {
    /// Literal value compared by equality.
    Literal(Value),
    /// Object whose fields are patterns.
    Object(BTreeMap<String, JsonPattern>),
    /// Fixed-length array whose elements are patterns.
    Array(Vec<JsonPattern>),
    /// Value governed by a single rule.
    Rule {
        /// Rule applied at this path.
        rule: MatchingRule,
        /// Example value.
        example: Box<JsonPattern>,
    },
    /// Array of any length (within bounds) whose elements match `template`.
    ArrayLike {
        /// Minimum length.
        min: Option<usize>,
        /// Maximum length.
        max: Option<usize>,
        /// Element pattern.
        template: Box<JsonPattern>,
        /// Number of example elements to generate.
        examples: usize,
    },
}

impl From<Value> for JsonPattern {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

impl JsonPattern {
    /// Returns the example body described by the pattern.
    #[must_use]
    pub fn example(&self) -> Value {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Object(fields) => {
                let mut map = Map::new();
                for (name, pattern) in fields {
                    map.insert(name.clone(), pattern.example());
                }
                Value::Object(map)
            }
            Self::Array(items) => Value::Array(items.iter().map(Self::example).collect()),
            Self::Rule {
                example, ..
            } => example.example(),
            Self::ArrayLike {
                template,
                examples,
                ..
            } => Value::Array((0 .. *examples).map(|_| template.example()).collect()),
        }
    }

    /// Returns the matching rules described by the pattern, keyed by path.
    #[must_use]
    pub fn rules(&self) -> BTreeMap<String, RuleList> {
        let mut rules = BTreeMap::new();
        self.collect_rules("$", &mut rules);
        rules
    }

    /// Walks the pattern and records rules under `path`.
    fn collect_rules(&self, path: &str, rules: &mut BTreeMap<String, RuleList>) {
        match self {
            Self::Literal(_) => {}
            Self::Object(fields) => {
                for (name, pattern) in fields {
                    pattern.collect_rules(&field_path(path, name), rules);
                }
            }
            Self::Array(items) => {
                for (index, pattern) in items.iter().enumerate() {
                    pattern.collect_rules(&format!("{path}[{index}]"), rules);
                }
            }
            Self::Rule {
                rule,
                example,
            } => {
                rules.insert(path.to_string(), RuleList::single(rule.clone()));
                example.collect_rules(path, rules);
            }
            Self::ArrayLike {
                min,
                max,
                template,
                ..
            } => {
                rules.insert(
                    path.to_string(),
                    RuleList::single(MatchingRule::Type {
                        min: *min,
                        max: *max,
                    }),
                );
                template.collect_rules(&format!("{path}[*]"), rules);
            }
        }
    }
}

/// Appends a field selector, quoting names that are not plain identifiers.
pub(crate) fn field_path(path: &str, name: &str) -> String {
    let plain = !name.is_empty()
        && name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
    if plain { format!("{path}.{name}") } else { format!("{path}['{name}']") }
}

// ============================================================================
// SECTION: Constructors
// ============================================================================

/// Matches any value of the same JSON type as `example`.
#[must_use]
pub fn like(example: impl Into<JsonPattern>) -> JsonPattern {
    JsonPattern::Rule {
        rule: MatchingRule::Type {
            min: None,
            max: None,
        },
        example: Box::new(example.into()),
    }
}

/// Matches any string.
#[must_use]
pub fn string_type(example: &str) -> JsonPattern {
    like(Value::String(example.to_string()))
}

/// Matches any number.
#[must_use]
pub fn number_type(example: impl Into<Value>) -> JsonPattern {
    rule(MatchingRule::Number, example.into())
}

/// Matches any integer.
#[must_use]
pub fn integer_type(example: i64) -> JsonPattern {
    rule(MatchingRule::Integer, Value::from(example))
}

/// Matches any number with a fractional representation.
#[must_use]
pub fn decimal_type(example: f64) -> JsonPattern {
    rule(MatchingRule::Decimal, Value::from(example))
}

/// Matches any boolean.
#[must_use]
pub fn boolean_type(example: bool) -> JsonPattern {
    rule(MatchingRule::Boolean, Value::Bool(example))
}

/// Matches any string containing `value`.
#[must_use]
pub fn includes(value: &str) -> JsonPattern {
    rule(
        MatchingRule::Include {
            value: value.to_string(),
        },
        Value::String(value.to_string()),
    )
}

/// Matches an array with at least one element, each like `template`.
#[must_use]
pub fn each_like(template: impl Into<JsonPattern>) -> JsonPattern {
    array_min_like(1, template)
}

/// Matches an array with at least `min` elements, each like `template`.
#[must_use]
pub fn array_min_like(min: usize, template: impl Into<JsonPattern>) -> JsonPattern {
    JsonPattern::ArrayLike {
        min: Some(min),
        max: None,
        template: Box::new(template.into()),
        examples: min.max(1),
    }
}

/// Matches an array with at most `max` elements, each like `template`.
#[must_use]
pub fn array_max_like(max: usize, template: impl Into<JsonPattern>) -> JsonPattern {
    JsonPattern::ArrayLike {
        min: None,
        max: Some(max),
        template: Box::new(template.into()),
        examples: max.min(1),
    }
}

/// Builds an object pattern from `(name, pattern)` pairs.
#[must_use]
pub fn object<K, I>(fields: I) -> JsonPattern
where
    K: Into<String>,
    I: IntoIterator<Item = (K, JsonPattern)>,
{
    JsonPattern::Object(fields.into_iter().map(|(name, pattern)| (name.into(), pattern)).collect())
}

/// Wraps an example in a single-rule pattern.
fn rule(rule: MatchingRule, example: Value) -> JsonPattern {
    JsonPattern::Rule {
        rule,
        example: Box::new(JsonPattern::Literal(example)),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
