// crates/order-consumer/src/client/tests.rs
// ============================================================================
// Module: Order API Client Unit Tests
// Description: Base URL resolution and error body handling.
// Purpose: Ensure the client requests the right URL before any I/O happens.
// Dependencies: order-consumer
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

use super::ClientError;
use super::MAX_ERROR_BODY_BYTES;
use super::OrderApiClient;
use super::truncate_body;

#[test]
fn orders_resolve_under_base_url() {
    let cases = [
        ("http://127.0.0.1:8080", "http://127.0.0.1:8080/orders"),
        ("http://127.0.0.1:8080/", "http://127.0.0.1:8080/orders"),
        ("http://localhost/api", "http://localhost/api/orders"),
        ("https://example.test/api/", "https://example.test/api/orders"),
    ];
    for (base, expected) in cases {
        let client = OrderApiClient::new(base).unwrap();
        assert_eq!(client.orders_url().as_str(), expected, "{base}");
    }
}

#[test]
fn malformed_base_url_is_rejected() {
    for base in ["", "not a url", "127.0.0.1:8080/orders"] {
        assert!(matches!(OrderApiClient::new(base), Err(ClientError::InvalidUrl { .. })), "{base}");
    }
}

#[test]
fn non_http_scheme_is_rejected() {
    let err = OrderApiClient::new("ftp://example.test/").unwrap_err();
    assert!(err.to_string().contains("unsupported scheme ftp"));
}

#[test]
fn error_bodies_are_truncated_on_char_boundaries() {
    let long = "é".repeat(MAX_ERROR_BODY_BYTES);
    let truncated = truncate_body(long.as_bytes());
    assert!(truncated.len() <= MAX_ERROR_BODY_BYTES);
    assert!(truncated.chars().all(|ch| ch == 'é'));
    assert_eq!(truncate_body(b"  boom \n"), "boom");
}
