// crates/order-provider/tests/common/mod.rs
// ============================================================================
// Module: Provider Test Harness
// Description: Background provider servers and swappable repositories.
// Purpose: Run the real router on an ephemeral port for HTTP-level tests.
// Dependencies: order-model, order-provider, tokio
// ============================================================================

#![allow(
    dead_code,
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Shared helpers; not every test binary uses every item."
)]

use std::net::TcpListener as StdTcpListener;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::RwLock;
use std::thread;

use order_model::Order;
use order_provider::OrderProvider;
use order_provider::OrderRepository;
use order_provider::ProviderConfig;
use order_provider::RequestLogSink;
use order_provider::SharedOrderRepository;
use order_provider::StoreError;
use order_provider::telemetry::LifecycleEvent;
use order_provider::telemetry::RequestLogEvent;
use tokio::runtime::Builder;
use tokio::sync::oneshot;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Returns the path of a file under `tests/fixtures`.
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

// ============================================================================
// SECTION: Repositories
// ============================================================================

/// Repository whose contents provider-state handlers replace between
/// interactions.
#[derive(Debug, Default)]
pub struct SwitchableRepository {
    /// Current orders.
    orders: RwLock<Vec<Order>>,
}

impl SwitchableRepository {
    /// Replaces the served orders.
    pub fn set(&self, orders: Vec<Order>) {
        let mut guard = self.orders.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = orders;
    }

    /// Replaces the served orders with the contents of a fixture file.
    pub fn load_fixture(&self, name: &str) -> Result<(), String> {
        let orders = order_provider::FileOrderRepository::new(fixture_path(name))
            .orders()
            .map_err(|err| err.to_string())?;
        self.set(orders);
        Ok(())
    }
}

impl OrderRepository for SwitchableRepository {
    fn orders(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self.orders.read().unwrap_or_else(std::sync::PoisonError::into_inner).clone())
    }
}

// ============================================================================
// SECTION: Log Capture
// ============================================================================

/// Log sink keeping request and lifecycle events in memory.
#[derive(Debug, Default)]
pub struct CapturingLog {
    /// Recorded request events.
    events: Mutex<Vec<RequestLogEvent>>,
    /// Recorded lifecycle events.
    lifecycle: Mutex<Vec<LifecycleEvent>>,
}

impl CapturingLog {
    /// Returns the recorded request events.
    pub fn events(&self) -> Vec<RequestLogEvent> {
        self.events.lock().map_or_else(|_| Vec::new(), |events| events.clone())
    }

    /// Returns the recorded lifecycle events.
    pub fn lifecycle(&self) -> Vec<LifecycleEvent> {
        self.lifecycle.lock().map_or_else(|_| Vec::new(), |events| events.clone())
    }
}

impl RequestLogSink for CapturingLog {
    fn record(&self, event: &RequestLogEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }

    fn record_lifecycle(&self, event: &LifecycleEvent) {
        if let Ok(mut events) = self.lifecycle.lock() {
            events.push(event.clone());
        }
    }
}

// ============================================================================
// SECTION: Server Handle
// ============================================================================

/// Provider running on a background thread.
pub struct ProviderHandle {
    /// Base URL, e.g. `http://127.0.0.1:40123`.
    base_url: String,
    /// Shutdown trigger.
    shutdown: Option<oneshot::Sender<()>>,
    /// Server thread.
    join: Option<thread::JoinHandle<()>>,
}

impl ProviderHandle {
    /// Returns the provider base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Drop for ProviderHandle {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Starts a provider over `repository` on an ephemeral loopback port.
pub fn spawn_provider(
    repository: SharedOrderRepository,
    log: Arc<dyn RequestLogSink>,
) -> ProviderHandle {
    let listener = StdTcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();
    let runtime = Builder::new_current_thread().enable_all().build().unwrap();
    let listener = {
        let _guard = runtime.enter();
        tokio::net::TcpListener::from_std(listener).unwrap()
    };
    let provider = OrderProvider::with_repository(ProviderConfig::default(), repository, log);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let join = thread::spawn(move || {
        runtime.block_on(async move {
            let shutdown = async {
                let _ = shutdown_rx.await;
            };
            let _ = provider.serve_listener(listener, shutdown).await;
        });
    });
    ProviderHandle {
        base_url: format!("http://{addr}"),
        shutdown: Some(shutdown_tx),
        join: Some(join),
    }
}
