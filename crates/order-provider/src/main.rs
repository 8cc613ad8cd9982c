// crates/order-provider/src/main.rs
// ============================================================================
// Module: Order Provider Entry Point
// Description: Command-line launcher for the order provider.
// Purpose: Load configuration, apply overrides, and serve until Ctrl+C.
// Dependencies: clap, order-provider, tokio
// ============================================================================

//! ## Overview
//! `order-provider` loads its TOML configuration (explicit `--config`, else
//! `ORDER_PROVIDER_CONFIG`, else defaults), applies command-line overrides,
//! and serves `GET /orders` until interrupted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use order_provider::OrderProvider;
use order_provider::ProviderConfig;
use order_provider::config::StoreSource;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "order-provider", version, about = "Serve GET /orders over HTTP")]
struct Cli {
    /// Path to a TOML config file (overrides `ORDER_PROVIDER_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Bind address override, e.g. `127.0.0.1:8080`.
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,
    /// Serve orders from this JSON file instead of the bundled resource.
    #[arg(long, value_name = "PATH")]
    orders: Option<PathBuf>,
}

/// CLI error wrapper with a display message.
#[derive(Debug)]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.message),
    }
}

/// Loads configuration and runs the provider.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    let provider =
        OrderProvider::from_config(config).map_err(|err| CliError::new(err.to_string()))?;
    provider.serve(shutdown_signal()).await.map_err(|err| CliError::new(err.to_string()))?;
    Ok(ExitCode::SUCCESS)
}

/// Loads the config file and applies command-line overrides.
fn resolve_config(cli: &Cli) -> CliResult<ProviderConfig> {
    let mut config =
        ProviderConfig::load(cli.config.as_deref()).map_err(|err| CliError::new(err.to_string()))?;
    if let Some(bind) = &cli.bind {
        config.server.bind.clone_from(bind);
    }
    if let Some(orders) = &cli.orders {
        config.store.source = StoreSource::File;
        config.store.path = Some(orders.clone());
    }
    config.validate().map_err(|err| CliError::new(err.to_string()))?;
    Ok(config)
}

/// Resolves when the process receives Ctrl+C.
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let mut stderr = std::io::stderr();
    let _ = writeln!(&mut stderr, "order-provider: {message}");
    ExitCode::FAILURE
}
