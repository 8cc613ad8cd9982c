// system-tests/src/lib.rs
// ============================================================================
// Module: Order System Tests Library
// Description: Shared configuration for end-to-end test binaries.
// Purpose: Give system-test suites typed access to environment overrides.
// Dependencies: std
// ============================================================================

//! ## Overview
//! This crate hosts configuration shared by the end-to-end suites in
//! `system-tests/tests`. The suites only build with the `system-tests`
//! feature: `cargo test -p system-tests --features system-tests`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
