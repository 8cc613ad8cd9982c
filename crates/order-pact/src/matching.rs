// crates/order-pact/src/matching.rs
// ============================================================================
// Module: Body and Header Matching
// Description: Compares actual HTTP messages against pact expectations.
// Purpose: Shared comparison engine for the mock server and the verifier.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Bodies are compared recursively from `$`. At each node the most specific
//! rule whose path expression matches the node applies; when no rule matches
//! directly, a `type` rule on an ancestor cascades so the node is compared by
//! JSON type instead of value. Without any rule, values must be equal.
//!
//! Objects tolerate extra keys in the actual value. Arrays governed by a
//! `type` rule accept any length within the rule's bounds and compare every
//! element against the first expected element; other arrays must match
//! element by element.
//!
//! Headers are matched by case-insensitive name. `Content-Type` compares
//! media types only; other headers compare their comma-joined values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::model::Headers;
use crate::model::MatchingRule;
use crate::model::RuleList;
use crate::model::RuleLogic;
use crate::model::media_type;
use crate::pattern::field_path;

// ============================================================================
// SECTION: Mismatches
// ============================================================================

/// One difference between an expected and an actual message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mismatch {
    /// Location of the difference (`$[0].items`, `header:Content-Type`, ...).
    pub path: String,
    /// Description of the difference.
    pub message: String,
    /// Expected value.
    pub expected: Value,
    /// Actual value, absent when missing.
    pub actual: Option<Value>,
}

impl Mismatch {
    /// Creates a mismatch.
    fn new(path: &str, message: impl Into<String>, expected: &Value, actual: Option<&Value>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
            expected: expected.clone(),
            actual: actual.cloned(),
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

// ============================================================================
// SECTION: Rule Paths
// ============================================================================

/// One component of a rule path expression.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RuleToken {
    /// Named object field.
    Field(String),
    /// Any object field (`.*`).
    AnyField,
    /// Specific array index.
    Index(usize),
    /// Any array index (`[*]`).
    AnyIndex,
}

/// One component of a concrete location inside a body.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Object field.
    Field(String),
    /// Array index.
    Index(usize),
}

/// Parses a rule path such as `$[*].items['unit price']`.
///
/// Returns `None` for expressions that do not start at `$` or are malformed.
fn parse_rule_path(expr: &str) -> Option<Vec<RuleToken>> {
    let mut rest = expr.trim().strip_prefix('$')?;
    let mut tokens = Vec::new();
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("['") {
            let end = after.find("']")?;
            tokens.push(RuleToken::Field(after[.. end].to_string()));
            rest = &after[end + 2 ..];
        } else if let Some(after) = rest.strip_prefix('[') {
            let end = after.find(']')?;
            let inner = after[.. end].trim();
            if inner == "*" {
                tokens.push(RuleToken::AnyIndex);
            } else {
                tokens.push(RuleToken::Index(inner.parse().ok()?));
            }
            rest = &after[end + 1 ..];
        } else if let Some(after) = rest.strip_prefix('.') {
            let end = after.find(['.', '[']).unwrap_or(after.len());
            let name = &after[.. end];
            if name.is_empty() {
                return None;
            }
            tokens.push(if name == "*" {
                RuleToken::AnyField
            } else {
                RuleToken::Field(name.to_string())
            });
            rest = &after[end ..];
        } else {
            return None;
        }
    }
    Some(tokens)
}

/// Returns the specificity of `tokens` against `path`, or `None` when the
/// expression does not address exactly this location.
fn specificity(tokens: &[RuleToken], path: &[Segment]) -> Option<usize> {
    if tokens.len() != path.len() {
        return None;
    }
    let mut weight = 0;
    for (token, segment) in tokens.iter().zip(path) {
        match (token, segment) {
            (RuleToken::Field(name), Segment::Field(actual)) if name == actual => weight += 1,
            (RuleToken::Index(index), Segment::Index(actual)) if index == actual => weight += 1,
            (RuleToken::AnyField, Segment::Field(_)) | (RuleToken::AnyIndex, Segment::Index(_)) => {}
            _ => return None,
        }
    }
    Some(weight)
}

/// Parsed body rules.
struct RuleSet<'a> {
    /// Rule lists with their parsed path expressions.
    entries: Vec<(Vec<RuleToken>, &'a RuleList)>,
}

impl<'a> RuleSet<'a> {
    /// Parses every rule key; unparsable keys never match.
    fn new(rules: &'a BTreeMap<String, RuleList>) -> Self {
        let entries = rules
            .iter()
            .filter_map(|(expr, list)| parse_rule_path(expr).map(|tokens| (tokens, list)))
            .collect();
        Self {
            entries,
        }
    }

    /// Returns the most specific rule list addressing `path`.
    fn direct(&self, path: &[Segment]) -> Option<&'a RuleList> {
        self.entries
            .iter()
            .filter_map(|(tokens, list)| specificity(tokens, path).map(|weight| (weight, *list)))
            .max_by_key(|(weight, _)| *weight)
            .map(|(_, list)| list)
    }
}

/// Renders a concrete location as a path expression.
fn render(path: &[Segment]) -> String {
    let mut out = String::from("$");
    for segment in path {
        match segment {
            Segment::Field(name) => out = field_path(&out, name),
            Segment::Index(index) => out = format!("{out}[{index}]"),
        }
    }
    out
}

// ============================================================================
// SECTION: Body Matching
// ============================================================================

/// Compares `actual` against `expected` under `rules`.
///
/// Returns every mismatch found; an empty list means the bodies match.
#[must_use]
pub fn match_body(
    expected: &Value,
    actual: &Value,
    rules: &BTreeMap<String, RuleList>,
) -> Vec<Mismatch> {
    let rules = RuleSet::new(rules);
    let mut mismatches = Vec::new();
    let mut path = Vec::new();
    compare(&rules, &mut path, expected, actual, false, &mut mismatches);
    mismatches
}

/// Recursive comparison step.
fn compare(
    rules: &RuleSet<'_>,
    path: &mut Vec<Segment>,
    expected: &Value,
    actual: &Value,
    inherited_type: bool,
    mismatches: &mut Vec<Mismatch>,
) {
    let location = render(path);
    let direct = rules.direct(path);
    let by_type = match direct {
        Some(list) => {
            if let Err(message) = apply_rules(list, expected, actual) {
                mismatches.push(Mismatch::new(&location, message, expected, Some(actual)));
                return;
            }
            list.matchers.iter().any(|rule| matches!(rule, MatchingRule::Type { .. }))
                || inherited_type
        }
        None => {
            if inherited_type {
                if !same_kind(expected, actual) {
                    mismatches.push(Mismatch::new(
                        &location,
                        format!("expected {} but got {}", kind(expected), kind(actual)),
                        expected,
                        Some(actual),
                    ));
                    return;
                }
            } else if !expected.is_object() && !expected.is_array() && expected != actual {
                mismatches.push(Mismatch::new(
                    &location,
                    format!("expected {expected} but got {actual}"),
                    expected,
                    Some(actual),
                ));
                return;
            }
            inherited_type
        }
    };

    match (expected, actual) {
        (Value::Object(expected_map), Value::Object(actual_map)) => {
            for (name, expected_value) in expected_map {
                path.push(Segment::Field(name.clone()));
                match actual_map.get(name) {
                    Some(actual_value) => {
                        compare(rules, path, expected_value, actual_value, by_type, mismatches);
                    }
                    None => mismatches.push(Mismatch::new(
                        &render(path),
                        "missing key",
                        expected_value,
                        None,
                    )),
                }
                path.pop();
            }
        }
        (Value::Array(expected_items), Value::Array(actual_items)) => {
            let array_rule = direct
                .is_some_and(|list| list.matchers.iter().any(|rule| matches!(rule, MatchingRule::Type { .. })));
            if array_rule {
                let Some(template) = expected_items.first() else {
                    return;
                };
                for (index, actual_item) in actual_items.iter().enumerate() {
                    path.push(Segment::Index(index));
                    compare(rules, path, template, actual_item, by_type, mismatches);
                    path.pop();
                }
            } else {
                if expected_items.len() != actual_items.len() {
                    mismatches.push(Mismatch::new(
                        &location,
                        format!(
                            "expected array of length {} but got length {}",
                            expected_items.len(),
                            actual_items.len()
                        ),
                        expected,
                        Some(actual),
                    ));
                    return;
                }
                for (index, (expected_item, actual_item)) in
                    expected_items.iter().zip(actual_items).enumerate()
                {
                    path.push(Segment::Index(index));
                    compare(rules, path, expected_item, actual_item, by_type, mismatches);
                    path.pop();
                }
            }
        }
        (Value::Object(_) | Value::Array(_), _) => {
            if direct.is_none() && !inherited_type {
                mismatches.push(Mismatch::new(
                    &location,
                    format!("expected {} but got {}", kind(expected), kind(actual)),
                    expected,
                    Some(actual),
                ));
            }
        }
        _ => {}
    }
}

/// Applies a rule list to one node.
fn apply_rules(list: &RuleList, expected: &Value, actual: &Value) -> Result<(), String> {
    let mut failures = Vec::new();
    for rule in &list.matchers {
        match apply_rule(rule, expected, actual) {
            Ok(()) if list.combine == RuleLogic::Or => return Ok(()),
            Ok(()) => {}
            Err(message) => failures.push(message),
        }
    }
    match list.combine {
        RuleLogic::And if failures.is_empty() => Ok(()),
        RuleLogic::Or if list.matchers.is_empty() => Ok(()),
        _ => Err(failures.join(" and ")),
    }
}

/// Applies a single matcher to one node.
fn apply_rule(rule: &MatchingRule, expected: &Value, actual: &Value) -> Result<(), String> {
    match rule {
        MatchingRule::Equality => {
            if expected == actual {
                Ok(())
            } else {
                Err(format!("expected {expected} but got {actual}"))
            }
        }
        MatchingRule::Type {
            min,
            max,
        } => {
            if !same_kind(expected, actual) {
                return Err(format!("expected {} but got {}", kind(expected), kind(actual)));
            }
            if let Value::Array(items) = actual {
                if let Some(min) = min
                    && items.len() < *min
                {
                    return Err(format!(
                        "expected at least {min} element(s) but got {}",
                        items.len()
                    ));
                }
                if let Some(max) = max
                    && items.len() > *max
                {
                    return Err(format!("expected at most {max} element(s) but got {}", items.len()));
                }
            }
            Ok(())
        }
        MatchingRule::Number => {
            if actual.is_number() {
                Ok(())
            } else {
                Err(format!("expected a number but got {}", kind(actual)))
            }
        }
        MatchingRule::Integer => {
            if actual.is_i64() || actual.is_u64() {
                Ok(())
            } else {
                Err(format!("expected an integer but got {actual}"))
            }
        }
        MatchingRule::Decimal => {
            if actual.is_f64() {
                Ok(())
            } else {
                Err(format!("expected a decimal but got {actual}"))
            }
        }
        MatchingRule::Boolean => {
            if actual.is_boolean() {
                Ok(())
            } else {
                Err(format!("expected a boolean but got {}", kind(actual)))
            }
        }
        MatchingRule::Include {
            value,
        } => match actual {
            Value::String(text) if text.contains(value.as_str()) => Ok(()),
            _ => Err(format!("expected a string containing {value:?} but got {actual}")),
        },
    }
}

/// Returns true when both values share a JSON type.
const fn same_kind(expected: &Value, actual: &Value) -> bool {
    matches!(
        (expected, actual),
        (Value::Null, Value::Null)
            | (Value::Bool(_), Value::Bool(_))
            | (Value::Number(_), Value::Number(_))
            | (Value::String(_), Value::String(_))
            | (Value::Array(_), Value::Array(_))
            | (Value::Object(_), Value::Object(_))
    )
}

/// Returns a JSON type name for messages.
const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// SECTION: Header Matching
// ============================================================================

/// Checks that every expected header is present in `actual`.
///
/// `actual` may carry additional headers.
#[must_use]
pub fn match_headers(expected: &Headers, actual: &Headers) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();
    for (name, expected_values) in expected {
        let path = format!("header:{name}");
        let expected_json = Value::from(expected_values.join(", "));
        let found = actual
            .iter()
            .find(|(actual_name, _)| actual_name.eq_ignore_ascii_case(name))
            .map(|(_, values)| values.join(", "));
        let Some(found) = found else {
            mismatches.push(Mismatch::new(&path, "missing header", &expected_json, None));
            continue;
        };
        let wanted = expected_values.join(", ");
        let equal = if name.eq_ignore_ascii_case("content-type") {
            media_type(&wanted) == media_type(&found)
        } else {
            normalize_header(&wanted) == normalize_header(&found)
        };
        if !equal {
            mismatches.push(Mismatch::new(
                &path,
                format!("expected {wanted:?} but got {found:?}"),
                &expected_json,
                Some(&Value::from(found)),
            ));
        }
    }
    mismatches
}

/// Normalizes comma-separated header values for comparison.
fn normalize_header(value: &str) -> Vec<&str> {
    value.split(',').map(str::trim).collect()
}
