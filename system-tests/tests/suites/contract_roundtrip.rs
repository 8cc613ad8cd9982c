// system-tests/tests/suites/contract_roundtrip.rs
// ============================================================================
// Module: Contract Round Trip
// Description: Consumer-generated pacts verified against a live provider.
// Purpose: Run the whole contract workflow without checked-in artifacts.
// Dependencies: order-consumer, order-model, order-pact, order-provider
// ============================================================================

//! The consumer records both interactions against mock servers and publishes
//! them to a fresh registry. A provider configured with a file store is then
//! verified against that registry; provider-state handlers rewrite the store
//! file before each interaction.

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

use std::path::PathBuf;

use order_consumer::OrderApiClient;
use order_model::Item;
use order_model::Order;
use order_model::encode_orders;
use order_pact::PactBuilder;
use order_pact::PactRegistry;
use order_pact::ProviderVerifier;
use order_pact::pattern::array_min_like;
use order_pact::pattern::each_like;
use order_pact::pattern::integer_type;
use order_pact::pattern::number_type;
use order_pact::pattern::object;
use order_pact::pattern::string_type;
use serde_json::json;

use crate::helpers::artifacts::RunRoot;
use crate::helpers::harness::StoreSpec;
use crate::helpers::harness::provider_toml;
use crate::helpers::harness::spawn_from_config;

/// Records both consumer interactions into `registry`.
fn record_consumer_pacts(registry: &PactRegistry) {
    let with_orders = PactBuilder::new("order_consumer", "order_provider")
        .interaction("a request for orders", |i| {
            i.given("there are orders")
                .with_request("GET", "/orders")
                .will_respond_with(200)
                .response_header("Content-Type", "application/json")
                .json_body(array_min_like(
                    1,
                    object([
                        ("id", string_type("1")),
                        (
                            "items",
                            each_like(object([
                                ("name", string_type("Pencil")),
                                ("quantity", integer_type(10)),
                                ("value", number_type(0.75)),
                            ])),
                        ),
                    ]),
                ));
        })
        .start_mock_server()
        .unwrap();
    let orders = OrderApiClient::new(&with_orders.url()).unwrap().fetch_orders().unwrap();
    assert!(!orders.is_empty());
    with_orders.finish(registry).unwrap();

    let without_orders = PactBuilder::new("order_consumer", "order_provider")
        .interaction("a request for orders", |i| {
            i.given("there are no orders")
                .with_request("GET", "/orders")
                .will_respond_with(200)
                .response_header("Content-Type", "application/json")
                .json_body(json!([]));
        })
        .start_mock_server()
        .unwrap();
    let orders = OrderApiClient::new(&without_orders.url()).unwrap().fetch_orders().unwrap();
    assert!(orders.is_empty());
    without_orders.finish(registry).unwrap();
}

/// Returns a state handler that writes `orders` to the store file.
fn seed(store: PathBuf, orders: Vec<Order>) -> impl Fn(&order_pact::ProviderState) -> Result<(), String> {
    move |_| {
        let bytes = encode_orders(&orders).map_err(|err| err.to_string())?;
        std::fs::write(&store, bytes).map_err(|err| err.to_string())
    }
}

#[test]
fn consumer_pacts_verify_against_live_provider() {
    let root = RunRoot::new("consumer_pacts_verify_against_live_provider").unwrap();
    let registry = PactRegistry::new(root.path().join("pacts"));
    record_consumer_pacts(&registry);
    assert_eq!(registry.fetch("order_consumer", "order_provider").unwrap().interactions.len(), 2);

    let store = root.write("orders.json", b"[]").unwrap();
    let config =
        root.write("provider.toml", provider_toml(&StoreSpec::File(&store), None).as_bytes()).unwrap();
    let provider = spawn_from_config(&config).unwrap();

    let stocked = vec![
        Order::new("1", vec![Item::new("Pencil", 10, 0.75), Item::new("Notebook", 2, 3.5)]),
        Order::new("2", vec![Item::new("Stapler", 1, 12.99)]),
    ];
    let verifier = ProviderVerifier::new("order_provider", provider.base_url())
        .unwrap()
        .state("there are orders", seed(store.clone(), stocked))
        .state("there are no orders", seed(store.clone(), Vec::new()));
    let report = verifier.verify_registry(&registry).unwrap();
    assert!(report.passed(), "{report}");
    assert_eq!(report.results.len(), 2);

    let broken = ProviderVerifier::new("order_provider", provider.base_url())
        .unwrap()
        .state("there are orders", seed(store.clone(), vec![Order::new("1", Vec::new())]))
        .state("there are no orders", seed(store, Vec::new()));
    let report = broken.verify_registry(&registry).unwrap();
    assert_eq!(report.failures().len(), 1);
    assert_eq!(report.failures()[0].states, vec!["there are orders".to_string()]);
}
