// crates/order-provider/src/store.rs
// ============================================================================
// Module: Order Store
// Description: Data-access seam and implementations for order listings.
// Purpose: Load orders from the bundled resource, a file, or memory.
// Dependencies: order-model, thiserror
// ============================================================================

//! ## Overview
//! [`OrderRepository`] is the single seam the HTTP layer reads through.
//! Production uses [`BundledOrderRepository`] (the `orders.json` resource
//! compiled into the binary) or [`FileOrderRepository`]; tests and contract
//! verification substitute their own implementation.
//! Invariants:
//! - Reads are pure; repositories never mutate their backing data.
//! - Orders are returned in source-document order.
//! - Failures are surfaced unmodified; there is no retry or partial result.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use order_model::Order;
use order_model::WireError;
use order_model::decode_orders;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Bundled order resource, resolved at compile time.
pub const BUNDLED_ORDERS_JSON: &str = include_str!("../resources/orders.json");

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Order store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing resource could not be read.
    #[error("order resource unreadable: {path}: {source}")]
    Io {
        /// Resource location.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The backing resource is not a JSON array of orders.
    #[error("order resource malformed: {0}")]
    Parse(#[from] WireError),
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Read-only source of orders.
pub trait OrderRepository: Send + Sync {
    /// Returns every order in source order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the backing resource cannot be read or parsed.
    fn orders(&self) -> Result<Vec<Order>, StoreError>;

    /// Short label naming the backing source in lifecycle logs.
    fn source_label(&self) -> &'static str {
        "custom"
    }
}

/// Shared repository handle used by the HTTP layer.
pub type SharedOrderRepository = Arc<dyn OrderRepository>;

// ============================================================================
// SECTION: Implementations
// ============================================================================

/// Repository backed by the compiled-in `orders.json` resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledOrderRepository;

impl OrderRepository for BundledOrderRepository {
    fn orders(&self) -> Result<Vec<Order>, StoreError> {
        Ok(decode_orders(BUNDLED_ORDERS_JSON.as_bytes())?)
    }

    fn source_label(&self) -> &'static str {
        "bundled"
    }
}

/// Repository that reads a JSON file on every call.
///
/// # Invariants
/// - The file is re-read per call; edits on disk are visible to the next request.
#[derive(Debug, Clone)]
pub struct FileOrderRepository {
    /// Path of the order document.
    path: PathBuf,
}

impl FileOrderRepository {
    /// Creates a repository for the given order document.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
        }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OrderRepository for FileOrderRepository {
    fn orders(&self) -> Result<Vec<Order>, StoreError> {
        let bytes = std::fs::read(&self.path).map_err(|source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        Ok(decode_orders(&bytes)?)
    }

    fn source_label(&self) -> &'static str {
        "file"
    }
}

/// Repository holding a fixed set of orders.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderRepository {
    /// Orders returned on every call.
    orders: Vec<Order>,
}

impl InMemoryOrderRepository {
    /// Creates a repository over the given orders.
    #[must_use]
    pub const fn new(orders: Vec<Order>) -> Self {
        Self {
            orders,
        }
    }

    /// Loads a repository from a JSON file once, up front.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, StoreError> {
        FileOrderRepository::new(path).orders().map(Self::new)
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn orders(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self.orders.clone())
    }

    fn source_label(&self) -> &'static str {
        "memory"
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
