// system-tests/tests/suites/consumer_provider.rs
// ============================================================================
// Module: Consumer Against Provider
// Description: The real consumer client against the real provider.
// Purpose: Check store selection and request logging through the full stack.
// Dependencies: order-consumer, order-model, order-provider, serde_json
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

use order_consumer::OrderApiClient;
use order_model::Item;
use order_model::Order;
use order_model::decode_orders;
use order_model::encode_orders;
use order_provider::store::BUNDLED_ORDERS_JSON;
use serde_json::Value;
use system_tests::config::SystemTestConfig;

use crate::helpers::artifacts::RunRoot;
use crate::helpers::harness::StoreSpec;
use crate::helpers::harness::provider_toml;
use crate::helpers::harness::spawn_from_config;

#[test]
fn consumer_fetches_bundled_orders() {
    if let Some(url) = SystemTestConfig::load().unwrap().provider_url {
        let orders = OrderApiClient::new(&url).unwrap().fetch_orders().unwrap();
        assert!(orders.iter().all(|order| !order.id.is_empty()));
        return;
    }
    let root = RunRoot::new("consumer_fetches_bundled_orders").unwrap();
    let config = root.write("provider.toml", provider_toml(&StoreSpec::Bundled, None).as_bytes()).unwrap();
    let provider = spawn_from_config(&config).unwrap();

    let orders = OrderApiClient::new(provider.base_url()).unwrap().fetch_orders().unwrap();
    assert_eq!(orders, decode_orders(BUNDLED_ORDERS_JSON.as_bytes()).unwrap());
    assert!(!orders.is_empty());
    assert!(!orders[0].items.is_empty());
    provider.stop().unwrap();
}

#[test]
fn file_store_and_file_log_follow_config() {
    let root = RunRoot::new("file_store_and_file_log_follow_config").unwrap();
    let orders = vec![Order::new("77", vec![Item::new("Eraser", 3, 0.5)])];
    let store = root.write("orders.json", &encode_orders(&orders).unwrap()).unwrap();
    let log = root.path().join("provider.log");
    let _ = std::fs::remove_file(&log);
    let config = root
        .write("provider.toml", provider_toml(&StoreSpec::File(&store), Some(&log)).as_bytes())
        .unwrap();
    let provider = spawn_from_config(&config).unwrap();

    let client = OrderApiClient::new(provider.base_url()).unwrap();
    assert_eq!(client.fetch_orders().unwrap(), orders);

    let updated = vec![Order::new("78", Vec::new())];
    root.write("orders.json", &encode_orders(&updated).unwrap()).unwrap();
    assert_eq!(client.fetch_orders().unwrap(), updated);
    provider.stop().unwrap();

    let lines: Vec<Value> = std::fs::read_to_string(&log)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let events: Vec<&str> = lines.iter().map(|line| line["event"].as_str().unwrap()).collect();
    assert_eq!(
        events,
        vec!["provider_lifecycle", "order_request", "order_request", "provider_lifecycle"]
    );
    assert_eq!(lines[0]["phase"], "startup");
    assert_eq!(lines[0]["store"], "file");
    assert_eq!(lines[1]["order_count"], 1);
    assert_eq!(lines[1]["outcome"], "ok");
    assert_eq!(lines[3]["phase"], "shutdown");
}

#[test]
fn missing_store_file_reaches_consumer_as_status_error() {
    let root = RunRoot::new("missing_store_file_reaches_consumer_as_status_error").unwrap();
    let store = root.path().join("absent.json");
    let config =
        root.write("provider.toml", provider_toml(&StoreSpec::File(&store), None).as_bytes()).unwrap();
    let provider = spawn_from_config(&config).unwrap();

    let err = OrderApiClient::new(provider.base_url()).unwrap().fetch_orders().unwrap_err();
    match err {
        order_consumer::ClientError::Status {
            status,
            body,
        } => {
            assert_eq!(status, 500);
            assert!(body.contains("absent.json"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
