// crates/order-consumer/src/main.rs
// ============================================================================
// Module: Order Consumer Entry Point
// Description: Command-line client for the order provider.
// Purpose: Fetch orders from a provider and print them as JSON.
// Dependencies: clap, order-consumer, serde_json
// ============================================================================

//! ## Overview
//! `order-consumer --base-url http://127.0.0.1:8080` fetches `GET /orders`
//! and writes the result to stdout as pretty JSON.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use order_consumer::OrderApiClient;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "order-consumer", version, about = "Fetch orders from an order provider")]
struct Cli {
    /// Provider base URL, e.g. `http://127.0.0.1:8080`.
    #[arg(long, value_name = "URL")]
    base_url: String,
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => emit_error(&message),
    }
}

/// Fetches orders and prints them.
fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let client = OrderApiClient::new(&cli.base_url).map_err(|err| err.to_string())?;
    let orders = client.fetch_orders().map_err(|err| err.to_string())?;
    let rendered = serde_json::to_string_pretty(&orders).map_err(|err| err.to_string())?;
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{rendered}").map_err(|err| format!("stdout write failed: {err}"))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let mut stderr = std::io::stderr();
    let _ = writeln!(&mut stderr, "order-consumer: {message}");
    ExitCode::FAILURE
}
