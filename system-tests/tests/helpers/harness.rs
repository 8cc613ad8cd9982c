// system-tests/tests/helpers/harness.rs
// ============================================================================
// Module: Provider Harness
// Description: Runs the order provider from a TOML config on a loopback port.
// Purpose: Exercise config loading, store selection, and logging end to end.
// Dependencies: order-provider, tokio
// ============================================================================

use std::net::TcpListener as StdTcpListener;
use std::path::Path;
use std::thread;

use order_provider::OrderProvider;
use order_provider::ProviderConfig;
use tokio::runtime::Builder;
use tokio::sync::oneshot;

/// Handle for a provider served on a background thread.
pub struct LiveProvider {
    /// Provider base URL.
    base_url: String,
    /// Shutdown trigger.
    shutdown: Option<oneshot::Sender<()>>,
    /// Server thread.
    join: Option<thread::JoinHandle<Result<(), String>>>,
}

impl LiveProvider {
    /// Returns the provider base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Stops the provider and waits for it to exit.
    pub fn stop(mut self) -> Result<(), String> {
        self.shutdown_and_join()
    }

    /// Sends shutdown and joins the server thread.
    fn shutdown_and_join(&mut self) -> Result<(), String> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        match self.join.take() {
            Some(join) => join.join().map_err(|_| "provider thread panicked".to_string())?,
            None => Ok(()),
        }
    }
}

impl Drop for LiveProvider {
    fn drop(&mut self) {
        let _ = self.shutdown_and_join();
    }
}

/// Loads `config_path` and serves the provider on an ephemeral port.
///
/// The configured bind address is validated but not used for the listener.
pub fn spawn_from_config(config_path: &Path) -> Result<LiveProvider, String> {
    let config = ProviderConfig::load(Some(config_path)).map_err(|err| err.to_string())?;
    let provider = OrderProvider::from_config(config).map_err(|err| err.to_string())?;
    let listener = StdTcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("provider bind failed: {err}"))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("provider listener nonblocking failed: {err}"))?;
    let addr = listener.local_addr().map_err(|err| format!("provider local addr failed: {err}"))?;
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("provider runtime failed: {err}"))?;
    let listener = {
        let _guard = runtime.enter();
        tokio::net::TcpListener::from_std(listener)
            .map_err(|err| format!("provider listener init failed: {err}"))?
    };
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let join = thread::spawn(move || {
        runtime.block_on(async move {
            let shutdown = async {
                let _ = shutdown_rx.await;
            };
            provider.serve_listener(listener, shutdown).await.map_err(|err| err.to_string())
        })
    });
    Ok(LiveProvider {
        base_url: format!("http://{addr}"),
        shutdown: Some(shutdown_tx),
        join: Some(join),
    })
}

/// Renders a provider TOML config.
pub fn provider_toml(store: &StoreSpec<'_>, log_path: Option<&Path>) -> String {
    let mut toml = String::from("[server]\nbind = \"127.0.0.1:0\"\n\n[store]\n");
    match store {
        StoreSpec::Bundled => toml.push_str("source = \"bundled\"\n"),
        StoreSpec::File(path) => {
            toml.push_str(&format!("source = \"file\"\npath = {}\n", toml_string(path)));
        }
    }
    toml.push_str("\n[logging]\n");
    match log_path {
        Some(path) => toml.push_str(&format!("sink = \"file\"\npath = {}\n", toml_string(path))),
        None => toml.push_str("sink = \"none\"\n"),
    }
    toml
}

/// Store selection for [`provider_toml`].
pub enum StoreSpec<'a> {
    /// Bundled resource.
    Bundled,
    /// JSON file at the given path.
    File(&'a Path),
}

/// Quotes a path as a TOML basic string.
fn toml_string(path: &Path) -> String {
    let raw = path.display().to_string();
    format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
}
