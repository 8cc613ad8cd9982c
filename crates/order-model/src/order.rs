// crates/order-model/src/order.rs
// ============================================================================
// Module: Order Records
// Description: Order and line-item records.
// Purpose: Define the JSON shape `{id, items: [{name, quantity, value}]}`.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Orders carry a string identifier and an ordered list of items. Field
//! names on the wire match the Rust field names exactly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A single order as served by `GET /orders`.
///
/// # Invariants
/// - `items` preserves source-document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Order identifier.
    pub id: String,
    /// Line items in source order.
    pub items: Vec<Item>,
}

/// A line item within an [`Order`].
///
/// # Invariants
/// - No range checks: negative quantities and empty names are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Item name.
    pub name: String,
    /// Ordered quantity.
    pub quantity: i64,
    /// Unit value.
    pub value: f64,
}

// ============================================================================
// SECTION: Constructors
// ============================================================================

impl Order {
    /// Creates an order from an identifier and its items.
    #[must_use]
    pub fn new(id: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            id: id.into(),
            items,
        }
    }

    /// Returns the number of line items.
    #[must_use]
    pub const fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the sum of `quantity * value` across all items.
    #[must_use]
    #[allow(clippy::cast_precision_loss, reason = "Display-only total; exactness is not required.")]
    pub fn total_value(&self) -> f64 {
        self.items.iter().map(|item| item.quantity as f64 * item.value).sum()
    }
}

impl Item {
    /// Creates a line item.
    #[must_use]
    pub fn new(name: impl Into<String>, quantity: i64, value: f64) -> Self {
        Self {
            name: name.into(),
            quantity,
            value,
        }
    }
}
