// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for end-to-end tests.
// Purpose: Parse overrides with strict UTF-8 and non-empty checks.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Three overrides are recognised:
//! - `ORDER_SYSTEM_TEST_RUN_ROOT` keeps generated configs, stores, logs, and
//!   pacts under a fixed directory instead of a temp dir.
//! - `ORDER_SYSTEM_TEST_ALLOW_OVERWRITE` permits reusing a non-empty run root.
//! - `ORDER_SYSTEM_TEST_PROVIDER_URL` points the consumer suite at an
//!   already-running provider instead of an in-process one.
//!
//! Invalid UTF-8 or empty values fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for system test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Optional artifact directory override.
    RunRoot,
    /// Allow reusing a non-empty run root (`true`/`false` or `1`/`0`).
    AllowOverwrite,
    /// Optional external provider base URL.
    ProviderUrl,
}

impl SystemTestEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RunRoot => "ORDER_SYSTEM_TEST_RUN_ROOT",
            Self::AllowOverwrite => "ORDER_SYSTEM_TEST_ALLOW_OVERWRITE",
            Self::ProviderUrl => "ORDER_SYSTEM_TEST_PROVIDER_URL",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed system test configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemTestConfig {
    /// Optional artifact directory.
    pub run_root: Option<PathBuf>,
    /// Allow reusing a non-empty run root.
    pub allow_overwrite: bool,
    /// Optional external provider base URL.
    pub provider_url: Option<String>,
}

impl SystemTestConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when a value is not valid UTF-8, is empty, or is not
    /// a recognised boolean literal.
    pub fn load() -> Result<Self, String> {
        let run_root = read_env_nonempty(SystemTestEnv::RunRoot.as_str())?.map(PathBuf::from);
        let allow_overwrite = parse_bool_env(
            SystemTestEnv::AllowOverwrite.as_str(),
            read_env_nonempty(SystemTestEnv::AllowOverwrite.as_str())?,
        )?;
        let provider_url = read_env_nonempty(SystemTestEnv::ProviderUrl.as_str())?
            .map(|value| value.trim().to_string());
        Ok(Self {
            run_root,
            allow_overwrite,
            provider_url,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads an environment variable and rejects empty values.
fn read_env_nonempty(name: &str) -> Result<Option<String>, String> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        other => Ok(other),
    }
}

/// Parses an optional boolean literal, defaulting to `false`.
fn parse_bool_env(name: &str, raw: Option<String>) -> Result<bool, String> {
    let Some(value) = raw else {
        return Ok(false);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(format!("{name} must be 1, 0, true, or false")),
    }
}
