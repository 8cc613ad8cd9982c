// crates/order-provider/src/telemetry.rs
// ============================================================================
// Module: Provider Request Logging
// Description: Structured request log events and sinks.
// Purpose: Emit JSON-line request logs without a logging framework dependency.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every request served by the provider produces one [`RequestLogEvent`]
//! written as a single JSON line. Sinks write to stderr, append to a file, or
//! discard. Lifecycle notices (startup, shutdown) use [`LifecycleEvent`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Request outcome classification.
///
/// # Invariants
/// - Variants are stable for log labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestOutcome {
    /// Request served successfully.
    Ok,
    /// Request failed.
    Error,
}

/// Request log event payload.
#[derive(Debug, Clone, Serialize)]
pub struct RequestLogEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// HTTP method.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Response status code.
    pub status: u16,
    /// Number of orders returned, when the request succeeded.
    pub order_count: Option<usize>,
    /// Request outcome.
    pub outcome: RequestOutcome,
    /// Error message when the request failed.
    pub error: Option<String>,
}

impl RequestLogEvent {
    /// Creates a success event for a listing that returned `order_count` orders.
    #[must_use]
    pub fn served(method: &str, path: &str, status: u16, order_count: usize) -> Self {
        Self {
            event: "order_request",
            timestamp_ms: now_ms(),
            method: method.to_string(),
            path: path.to_string(),
            status,
            order_count: Some(order_count),
            outcome: RequestOutcome::Ok,
            error: None,
        }
    }

    /// Creates a failure event.
    #[must_use]
    pub fn failed(method: &str, path: &str, status: u16, error: String) -> Self {
        Self {
            event: "order_request",
            timestamp_ms: now_ms(),
            method: method.to_string(),
            path: path.to_string(),
            status,
            order_count: None,
            outcome: RequestOutcome::Error,
            error: Some(error),
        }
    }
}

/// Provider lifecycle event payload.
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Lifecycle phase label.
    pub phase: &'static str,
    /// Bound address when known.
    pub bind: Option<String>,
    /// Store source label.
    pub store: Option<String>,
}

impl LifecycleEvent {
    /// Creates a lifecycle event for the given phase.
    #[must_use]
    pub fn new(phase: &'static str, bind: Option<String>, store: Option<String>) -> Self {
        Self {
            event: "provider_lifecycle",
            timestamp_ms: now_ms(),
            phase,
            bind,
            store,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Sink for provider log events.
pub trait RequestLogSink: Send + Sync {
    /// Records a request event.
    fn record(&self, event: &RequestLogEvent);

    /// Records a lifecycle event.
    fn record_lifecycle(&self, _event: &LifecycleEvent) {}
}

/// Sink that writes JSON lines to stderr.
pub struct StderrRequestLog;

impl RequestLogSink for StderrRequestLog {
    fn record(&self, event: &RequestLogEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }

    fn record_lifecycle(&self, event: &LifecycleEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Sink that appends JSON lines to a file.
pub struct FileRequestLog {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileRequestLog {
    /// Opens the log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Writes one serialized payload line.
    fn write_line(&self, payload: &str) {
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl RequestLogSink for FileRequestLog {
    fn record(&self, event: &RequestLogEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            self.write_line(&payload);
        }
    }

    fn record_lifecycle(&self, event: &LifecycleEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            self.write_line(&payload);
        }
    }
}

/// Sink that discards all events.
pub struct NoopRequestLog;

impl RequestLogSink for NoopRequestLog {
    fn record(&self, _event: &RequestLogEvent) {}
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Milliseconds since the Unix epoch, or zero if the clock is before it.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test-only assertions.")]

    use serde_json::Value;
    use tempfile::tempdir;

    use super::FileRequestLog;
    use super::LifecycleEvent;
    use super::RequestLogEvent;
    use super::RequestLogSink;

    #[test]
    fn file_sink_appends_one_json_line_per_event() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("requests.log");
        let sink = FileRequestLog::new(&path).unwrap();
        sink.record(&RequestLogEvent::served("GET", "/orders", 200, 2));
        sink.record(&RequestLogEvent::failed("GET", "/orders", 500, "boom".to_string()));
        sink.record_lifecycle(&LifecycleEvent::new("startup", None, None));

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<Value> =
            text.lines().map(|line| serde_json::from_str(line).unwrap()).collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["event"], "order_request");
        assert_eq!(lines[0]["outcome"], "ok");
        assert_eq!(lines[0]["order_count"], 2);
        assert_eq!(lines[1]["outcome"], "error");
        assert_eq!(lines[1]["error"], "boom");
        assert_eq!(lines[2]["phase"], "startup");
    }
}
