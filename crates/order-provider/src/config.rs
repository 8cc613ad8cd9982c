// crates/order-provider/src/config.rs
// ============================================================================
// Module: Provider Configuration
// Description: TOML configuration model, loading, and validation.
// Purpose: Resolve bind address, store source, and log sink for the provider.
// Dependencies: serde, toml, thiserror
// ============================================================================

//! ## Overview
//! Configuration is read from an explicit path, else the file named by
//! `ORDER_PROVIDER_CONFIG`, else built-in defaults. Loading is strict: the
//! path and file size are bounded, contents must be UTF-8, and unknown keys are
//! rejected. [`ProviderConfig::validate`] runs after every load.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "ORDER_PROVIDER_CONFIG";
/// Default bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
/// Maximum accepted config file size, in bytes.
pub const MAX_CONFIG_FILE_BYTES: u64 = 1024 * 1024;
/// Maximum accepted config path length, in bytes.
pub const MAX_CONFIG_PATH_BYTES: usize = 4096;
/// Maximum accepted length of a single path component, in bytes.
pub const MAX_CONFIG_PATH_COMPONENT_BYTES: usize = 255;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// The config file is not valid TOML for this schema.
    #[error("config parse error: {0}")]
    Parse(String),
    /// The config is well-formed but semantically invalid.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Top-level provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Order store settings.
    pub store: StoreConfig,
    /// Request log settings.
    pub logging: LoggingConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. `127.0.0.1:8080`.
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

/// Where orders are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreSource {
    /// The `orders.json` resource compiled into the binary.
    #[default]
    Bundled,
    /// A JSON file on disk, re-read per request.
    File,
}

impl StoreSource {
    /// Returns a stable label for the source.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bundled => "bundled",
            Self::File => "file",
        }
    }
}

/// Order store settings.
///
/// # Invariants
/// - `path` is required when `source = "file"`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Store source.
    pub source: StoreSource,
    /// Order document path for file sources.
    pub path: Option<PathBuf>,
}

/// Request log sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Discard all events.
    None,
}

/// Request log settings.
///
/// # Invariants
/// - `path` is required when `sink = "file"`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Sink selection.
    pub sink: LogSinkKind,
    /// Log file path for file sinks.
    pub path: Option<PathBuf>,
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl ProviderConfig {
    /// Loads configuration from `path`, else `ORDER_PROVIDER_CONFIG`, else defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, parsed, or validated,
    /// or when the environment variable is not valid UTF-8 or is empty.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = match path {
            Some(path) => Some(path.to_path_buf()),
            None => read_env_nonempty(CONFIG_ENV)?.map(PathBuf::from),
        };
        let config = match resolved {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from TOML text and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a config file with path and size guards.
    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        validate_config_path(path)?;
        let metadata = std::fs::metadata(path)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
        if metadata.len() > MAX_CONFIG_FILE_BYTES {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let bytes = std::fs::read(path)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
        let text = String::from_utf8(bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        toml::from_str(&text).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Validates cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a constraint is violated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        if self.store.source == StoreSource::File && self.store.path.is_none() {
            return Err(ConfigError::Invalid("store.source = \"file\" requires store.path".to_string()));
        }
        if self.logging.sink == LogSinkKind::File && self.logging.path.is_none() {
            return Err(ConfigError::Invalid(
                "logging.sink = \"file\" requires logging.path".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `server.bind` is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .bind
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("invalid bind address: {}", self.server.bind)))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Rejects config paths that exceed length limits.
fn validate_config_path(path: &Path) -> Result<(), ConfigError> {
    let raw = path.as_os_str();
    if raw.len() > MAX_CONFIG_PATH_BYTES {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().len() > MAX_CONFIG_PATH_COMPONENT_BYTES {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
fn read_env_strict(name: &str) -> Result<Option<String>, ConfigError> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(format!("{name} must be valid UTF-8")))
    })
}

/// Reads an environment variable and rejects empty values.
fn read_env_nonempty(name: &str) -> Result<Option<String>, ConfigError> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => {
            Err(ConfigError::Invalid(format!("{name} must not be empty")))
        }
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}
