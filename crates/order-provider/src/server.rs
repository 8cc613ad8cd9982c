// crates/order-provider/src/server.rs
// ============================================================================
// Module: Order Provider Server
// Description: HTTP surface for the order listing.
// Purpose: Serve `GET /orders` from an injected order repository.
// Dependencies: axum, order-model, serde, tokio
// ============================================================================

//! ## Overview
//! [`OrderProvider`] wires configuration, the order repository, and the
//! request log sink into an axum [`Router`] with a single route:
//! `GET /orders -> 200 application/json` (a JSON array of orders, `[]` when
//! the store is empty). Store failures become `500` with a JSON error body.
//! Invariants:
//! - The handler never mutates the repository.
//! - Every request to `/orders` emits exactly one request log event.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use order_model::Order;
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::LogSinkKind;
use crate::config::LoggingConfig;
use crate::config::ProviderConfig;
use crate::config::StoreConfig;
use crate::config::StoreSource;
use crate::store::BundledOrderRepository;
use crate::store::FileOrderRepository;
use crate::store::SharedOrderRepository;
use crate::store::StoreError;
use crate::telemetry::FileRequestLog;
use crate::telemetry::LifecycleEvent;
use crate::telemetry::NoopRequestLog;
use crate::telemetry::RequestLogEvent;
use crate::telemetry::RequestLogSink;
use crate::telemetry::StderrRequestLog;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Path of the order listing endpoint.
pub const ORDERS_PATH: &str = "/orders";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Provider errors.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
    /// Order store errors surfaced while serving a request.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// JSON body returned for failed requests.
#[derive(Debug, Serialize)]
struct ErrorBody {
    /// Human-readable failure message.
    error: String,
}

impl IntoResponse for ProviderError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

// ============================================================================
// SECTION: Provider
// ============================================================================

/// Order provider service.
pub struct OrderProvider {
    /// Provider configuration.
    config: ProviderConfig,
    /// Order repository seam.
    repository: SharedOrderRepository,
    /// Request log sink.
    log: Arc<dyn RequestLogSink>,
}

impl OrderProvider {
    /// Builds a provider from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the config is invalid or the log sink
    /// cannot be opened.
    pub fn from_config(config: ProviderConfig) -> Result<Self, ProviderError> {
        config.validate().map_err(|err| ProviderError::Config(err.to_string()))?;
        let repository = build_repository(&config.store)?;
        let log = build_log_sink(&config.logging)?;
        Ok(Self {
            config,
            repository,
            log,
        })
    }

    /// Builds a provider over an injected repository and log sink.
    #[must_use]
    pub fn with_repository(
        config: ProviderConfig,
        repository: SharedOrderRepository,
        log: Arc<dyn RequestLogSink>,
    ) -> Self {
        Self {
            config,
            repository,
            log,
        }
    }

    /// Returns the provider configuration.
    #[must_use]
    pub const fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Returns the HTTP router for this provider.
    #[must_use]
    pub fn router(&self) -> Router {
        order_router(Arc::clone(&self.repository), Arc::clone(&self.log))
    }

    /// Binds the configured address and serves until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when binding or serving fails.
    pub async fn serve(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), ProviderError> {
        let addr: SocketAddr =
            self.config.bind_addr().map_err(|err| ProviderError::Config(err.to_string()))?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|err| ProviderError::Transport(format!("http bind failed: {err}")))?;
        self.serve_listener(listener, shutdown).await
    }

    /// Serves on an already-bound listener until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when serving fails.
    pub async fn serve_listener(
        self,
        listener: TcpListener,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), ProviderError> {
        let bound = listener.local_addr().ok().map(|addr| addr.to_string());
        let store = Some(self.repository.source_label().to_string());
        self.log.record_lifecycle(&LifecycleEvent::new("startup", bound.clone(), store.clone()));
        let app = self.router();
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|err| ProviderError::Transport(format!("http server failed: {err}")));
        self.log.record_lifecycle(&LifecycleEvent::new("shutdown", bound, store));
        result
    }
}

/// Builds the order router over a repository and log sink.
#[must_use]
pub fn order_router(repository: SharedOrderRepository, log: Arc<dyn RequestLogSink>) -> Router {
    let state = Arc::new(ServerState {
        repository,
        log,
    });
    Router::new().route(ORDERS_PATH, get(list_orders)).with_state(state)
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

/// Shared state for HTTP handlers.
struct ServerState {
    /// Order repository seam.
    repository: SharedOrderRepository,
    /// Request log sink.
    log: Arc<dyn RequestLogSink>,
}

/// Handles `GET /orders`.
async fn list_orders(
    State(state): State<Arc<ServerState>>,
    method: Method,
    uri: Uri,
) -> Response {
    match load_orders_with_blocking(&state) {
        Ok(orders) => {
            state.log.record(&RequestLogEvent::served(
                method.as_str(),
                uri.path(),
                StatusCode::OK.as_u16(),
                orders.len(),
            ));
            (StatusCode::OK, Json(orders)).into_response()
        }
        Err(err) => {
            let err = ProviderError::from(err);
            state.log.record(&RequestLogEvent::failed(
                method.as_str(),
                uri.path(),
                StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                err.to_string(),
            ));
            err.into_response()
        }
    }
}

/// Reads the repository, shifting to a blocking context when available.
fn load_orders_with_blocking(state: &ServerState) -> Result<Vec<Order>, StoreError> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| state.repository.orders())
        }
        _ => state.repository.orders(),
    }
}

// ============================================================================
// SECTION: Builders
// ============================================================================

/// Builds the configured order repository.
fn build_repository(store: &StoreConfig) -> Result<SharedOrderRepository, ProviderError> {
    let repository: SharedOrderRepository = match store.source {
        StoreSource::Bundled => Arc::new(BundledOrderRepository),
        StoreSource::File => {
            let path = store.path.clone().ok_or_else(|| {
                ProviderError::Config("file store requires store.path".to_string())
            })?;
            Arc::new(FileOrderRepository::new(path))
        }
    };
    Ok(repository)
}

/// Builds the configured request log sink.
fn build_log_sink(logging: &LoggingConfig) -> Result<Arc<dyn RequestLogSink>, ProviderError> {
    let sink: Arc<dyn RequestLogSink> = match logging.sink {
        LogSinkKind::Stderr => Arc::new(StderrRequestLog),
        LogSinkKind::None => Arc::new(NoopRequestLog),
        LogSinkKind::File => {
            let path = logging.path.as_ref().ok_or_else(|| {
                ProviderError::Config("file log sink requires logging.path".to_string())
            })?;
            let sink = FileRequestLog::new(path)
                .map_err(|err| ProviderError::Init(format!("log file open failed: {err}")))?;
            Arc::new(sink)
        }
    };
    Ok(sink)
}
