// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for the end-to-end suites.
// Purpose: Provide run roots and live provider harnesses.
// Dependencies: system-tests, order-provider, tempfile, tokio
// ============================================================================

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod artifacts;
pub mod harness;
