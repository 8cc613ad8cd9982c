// crates/order-pact/src/verifier/tests.rs
// ============================================================================
// Module: Provider Verifier Unit Tests
// Description: Verification against mock servers standing in for providers.
// Purpose: Ensure state setup, status, header, and body checks are reported.
// Dependencies: order-pact, tempfile
// ============================================================================

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use serde_json::json;

use super::ProviderVerifier;
use crate::builder::PactBuilder;
use crate::error::PactError;
use crate::mock_server::MockServer;
use crate::model::Pact;
use crate::pattern::array_min_like;
use crate::pattern::object;
use crate::pattern::string_type;
use crate::registry::PactRegistry;

/// Pact whose single interaction expects at least one order with a string id.
fn contract() -> Pact {
    PactBuilder::new("c", "p")
        .interaction("a request for orders", |i| {
            i.given("there are orders")
                .with_request("GET", "/orders")
                .will_respond_with(200)
                .response_header("Content-Type", "application/json")
                .json_body(array_min_like(1, object([("id", string_type("1"))])));
        })
        .build()
}

/// Mock server standing in for a provider that returns `body`.
fn provider_returning(body: serde_json::Value) -> MockServer {
    PactBuilder::new("c", "p")
        .interaction("stub", |i| {
            i.with_request("GET", "/orders")
                .will_respond_with(200)
                .response_header("Content-Type", "application/json")
                .json_body(body);
        })
        .start_mock_server()
        .unwrap()
}

#[test]
fn conforming_provider_passes_and_runs_state_handler() {
    let provider = provider_returning(json!([{"id": "42"}, {"id": "43", "extra": 1}]));
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);
    let verifier = ProviderVerifier::new("p", format!("{}/", provider.url()))
        .unwrap()
        .state("there are orders", move |state| {
            assert_eq!(state.name, "there are orders");
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
    let report = verifier.verify_pact(&contract()).unwrap();
    assert!(report.passed(), "{report}");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(report.to_string().starts_with("PASS a request for orders [there are orders] (c)"));
}

#[test]
fn nonconforming_body_fails_with_paths() {
    let provider = provider_returning(json!([{"id": 42}]));
    let verifier = ProviderVerifier::new("p", provider.url()).unwrap().state("there are orders", |_| Ok(()));
    let report = verifier.verify_pact(&contract()).unwrap();
    assert!(!report.passed());
    let failures = report.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].mismatches[0].path, "$[0].id");
    assert!(report.to_string().ends_with("1 interaction(s), 1 failed"));
}

#[test]
fn empty_list_violates_minimum_length() {
    let provider = provider_returning(json!([]));
    let verifier = ProviderVerifier::new("p", provider.url()).unwrap().state("there are orders", |_| Ok(()));
    let report = verifier.verify_pact(&contract()).unwrap();
    assert!(!report.passed());
    assert_eq!(report.results[0].mismatches[0].path, "$");
}

#[test]
fn missing_state_handler_fails_without_request() {
    let provider = provider_returning(json!([{"id": "1"}]));
    let verifier = ProviderVerifier::new("p", provider.url()).unwrap();
    let report = verifier.verify_pact(&contract()).unwrap();
    assert!(!report.passed());
    assert_eq!(report.results[0].mismatches[0].path, "state:there are orders");
    assert!(provider.requests().is_empty());
}

#[test]
fn failing_state_handler_is_reported() {
    let provider = provider_returning(json!([{"id": "1"}]));
    let verifier = ProviderVerifier::new("p", provider.url())
        .unwrap()
        .state("there are orders", |_| Err("seed failed".to_string()));
    let report = verifier.verify_pact(&contract()).unwrap();
    assert_eq!(report.results[0].mismatches[0].message, "seed failed");
}

#[test]
fn status_mismatch_is_reported() {
    let provider = PactBuilder::new("c", "p")
        .interaction("stub", |i| {
            i.with_request("GET", "/orders").will_respond_with(503);
        })
        .start_mock_server()
        .unwrap();
    let verifier = ProviderVerifier::new("p", provider.url()).unwrap().state("there are orders", |_| Ok(()));
    let report = verifier.verify_pact(&contract()).unwrap();
    let paths: Vec<&str> =
        report.results[0].mismatches.iter().map(|mismatch| mismatch.path.as_str()).collect();
    assert!(paths.contains(&"status"));
    assert!(paths.contains(&"header:Content-Type"));
}

#[test]
fn unreachable_provider_is_reported_per_interaction() {
    let url = {
        let provider = provider_returning(json!([]));
        provider.url()
    };
    let verifier = ProviderVerifier::new("p", url).unwrap().state("there are orders", |_| Ok(()));
    let report = verifier.verify_pact(&contract()).unwrap();
    assert_eq!(report.results[0].mismatches[0].path, "request");
}

#[test]
fn pact_for_other_provider_is_rejected() {
    let verifier = ProviderVerifier::new("someone_else", "http://127.0.0.1:9").unwrap();
    assert!(matches!(verifier.verify_pact(&contract()), Err(PactError::Invalid(_))));
}

#[test]
fn registry_verification_requires_a_pact() {
    let dir = tempfile::tempdir().unwrap();
    let registry = PactRegistry::new(dir.path());
    let verifier = ProviderVerifier::new("p", "http://127.0.0.1:9").unwrap();
    assert!(matches!(verifier.verify_registry(&registry), Err(PactError::NotFound(_))));

    registry.publish(&contract()).unwrap();
    let provider = provider_returning(json!([{"id": "7"}]));
    let verifier = ProviderVerifier::new("p", provider.url()).unwrap().state("there are orders", |_| Ok(()));
    assert!(verifier.verify_registry(&registry).unwrap().passed());
}
