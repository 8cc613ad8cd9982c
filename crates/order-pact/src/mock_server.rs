// crates/order-pact/src/mock_server.rs
// ============================================================================
// Module: Pact Mock Server
// Description: Local HTTP server replaying a pact's interactions.
// Purpose: Let consumer code run against the responses it declared.
// Dependencies: axum, serde_json, tokio
// ============================================================================

//! ## Overview
//! [`MockServer::start`] binds `127.0.0.1:0`, then serves on a dedicated
//! thread driving a current-thread tokio runtime. Each request is matched
//! against the pact's interactions by method, path, and expected request
//! headers; the first matching interaction answers with its recorded status,
//! headers, and body. Unmatched requests get `500` with a JSON error body and
//! are reported by [`MockServer::verify`].
//! Invariants:
//! - The server is shut down and its thread joined when the handle drops.
//! - Only verified pacts are published.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::net::TcpListener as StdTcpListener;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;

use axum::Router;
use axum::body::Body as HttpBody;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::response::Response;
use serde_json::Value;
use serde_json::json;
use tokio::runtime::Builder;
use tokio::sync::oneshot;

use crate::error::PactError;
use crate::matching::match_body;
use crate::matching::match_headers;
use crate::model::Headers;
use crate::model::Interaction;
use crate::model::Pact;
use crate::registry::PactRegistry;

// ============================================================================
// SECTION: Recorded Requests
// ============================================================================

/// Request received by the mock server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// HTTP method.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Label of the interaction that answered, if any.
    pub matched: Option<String>,
}

/// State shared with the request handler.
struct MockState {
    /// Pact being replayed.
    pact: Pact,
    /// Hit count per interaction, parallel to `pact.interactions`.
    hits: Mutex<Vec<usize>>,
    /// Every received request in arrival order.
    requests: Mutex<Vec<RecordedRequest>>,
}

// ============================================================================
// SECTION: Mock Server
// ============================================================================

/// Handle to a running mock server.
pub struct MockServer {
    /// Bound address.
    addr: SocketAddr,
    /// Shared state.
    state: Arc<MockState>,
    /// Shutdown trigger.
    shutdown: Option<oneshot::Sender<()>>,
    /// Server thread.
    join: Option<thread::JoinHandle<()>>,
}

impl MockServer {
    /// Starts a mock server for `pact`.
    ///
    /// # Errors
    ///
    /// Returns [`PactError`] when the pact is invalid or the listener or
    /// runtime cannot be created.
    pub fn start(pact: Pact) -> Result<Self, PactError> {
        pact.validate()?;
        let listener = StdTcpListener::bind("127.0.0.1:0")
            .map_err(|err| PactError::MockServer(format!("bind failed: {err}")))?;
        listener
            .set_nonblocking(true)
            .map_err(|err| PactError::MockServer(format!("listener nonblocking failed: {err}")))?;
        let addr = listener
            .local_addr()
            .map_err(|err| PactError::MockServer(format!("local addr failed: {err}")))?;
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| PactError::MockServer(format!("runtime init failed: {err}")))?;
        let listener = {
            let _guard = runtime.enter();
            tokio::net::TcpListener::from_std(listener)
                .map_err(|err| PactError::MockServer(format!("listener init failed: {err}")))?
        };

        let state = Arc::new(MockState {
            hits: Mutex::new(vec![0; pact.interactions.len()]),
            requests: Mutex::new(Vec::new()),
            pact,
        });
        let app = Router::new().fallback(handle_request).with_state(Arc::clone(&state));
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let join = thread::spawn(move || {
            runtime.block_on(async move {
                let _ = axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await;
            });
        });
        Ok(Self {
            addr,
            state,
            shutdown: Some(shutdown_tx),
            join: Some(join),
        })
    }

    /// Returns the base URL, e.g. `http://127.0.0.1:40123`.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Returns the pact being replayed.
    #[must_use]
    pub fn pact(&self) -> &Pact {
        &self.state.pact
    }

    /// Returns every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().map_or_else(|_| Vec::new(), |entries| entries.clone())
    }

    /// Checks that every interaction was exercised and nothing unexpected
    /// arrived.
    ///
    /// # Errors
    ///
    /// Returns [`PactError::Expectations`] listing each missing or
    /// unexpected request.
    pub fn verify(&self) -> Result<(), PactError> {
        let hits = self
            .state
            .hits
            .lock()
            .map_err(|_| PactError::MockServer("hit counters poisoned".to_string()))?
            .clone();
        let mut problems: Vec<String> = self
            .state
            .pact
            .interactions
            .iter()
            .zip(hits)
            .filter(|(_, count)| *count == 0)
            .map(|(interaction, _)| format!("missing request: {}", interaction.label()))
            .collect();
        problems.extend(
            self.requests()
                .into_iter()
                .filter(|request| request.matched.is_none())
                .map(|request| format!("unexpected request: {} {}", request.method, request.path)),
        );
        if problems.is_empty() { Ok(()) } else { Err(PactError::Expectations(problems)) }
    }

    /// Verifies the interactions and publishes the pact to `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`PactError`] when verification or publishing fails; nothing
    /// is written when verification fails.
    pub fn finish(&self, registry: &PactRegistry) -> Result<PathBuf, PactError> {
        self.verify()?;
        registry.publish(&self.state.pact)
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

// ============================================================================
// SECTION: Handler
// ============================================================================

/// Answers any request from the matching interaction.
async fn handle_request(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let actual_headers = collect_headers(&headers);
    let found = state.pact.interactions.iter().enumerate().find(|(_, interaction)| {
        request_matches(interaction, method.as_str(), uri.path(), &actual_headers, &body)
    });
    let matched = found.map(|(_, interaction)| interaction.label());
    if let Ok(mut requests) = state.requests.lock() {
        requests.push(RecordedRequest {
            method: method.to_string(),
            path: uri.path().to_string(),
            matched: matched.clone(),
        });
    }
    let Some((index, interaction)) = found else {
        return error_response(format!("no interaction matches {method} {}", uri.path()));
    };
    if let Ok(mut hits) = state.hits.lock()
        && let Some(count) = hits.get_mut(index)
    {
        *count += 1;
    }
    replay(interaction)
}

/// Returns true when the request satisfies the interaction's expectations.
fn request_matches(
    interaction: &Interaction,
    method: &str,
    path: &str,
    headers: &Headers,
    body: &[u8],
) -> bool {
    let expected = &interaction.request;
    if !expected.method.eq_ignore_ascii_case(method) || expected.path != path {
        return false;
    }
    if !match_headers(&expected.headers, headers).is_empty() {
        return false;
    }
    match &expected.body {
        None => true,
        Some(expected_body) => serde_json::from_slice::<Value>(body).is_ok_and(|actual| {
            match_body(&expected_body.content, &actual, &BTreeMap::new())
                .is_empty()
        }),
    }
}

/// Builds the recorded response for an interaction.
fn replay(interaction: &Interaction) -> Response {
    let response = &interaction.response;
    let mut builder = Response::builder().status(response.status);
    for (name, values) in &response.headers {
        builder = builder.header(name.as_str(), values.join(", "));
    }
    let body = match &response.body {
        Some(body) => {
            if !response.headers.keys().any(|name| name.eq_ignore_ascii_case("content-type")) {
                builder = builder.header(CONTENT_TYPE, body.content_type.as_str());
            }
            match body.to_bytes() {
                Ok(bytes) => HttpBody::from(bytes),
                Err(err) => return error_response(err.to_string()),
            }
        }
        None => HttpBody::empty(),
    };
    builder.body(body).unwrap_or_else(|err| error_response(format!("invalid response: {err}")))
}

/// Builds a `500` JSON error response.
fn error_response(message: String) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(json!({ "error": message }))).into_response()
}

/// Converts an HTTP header map into pact headers.
pub(crate) fn collect_headers(headers: &HeaderMap) -> Headers {
    let mut out = Headers::new();
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            out.entry(name.as_str().to_string()).or_default().push(value.to_string());
        }
    }
    out
}
