// crates/order-pact/src/registry.rs
// ============================================================================
// Module: Pact Registry
// Description: Directory-backed store of published pacts.
// Purpose: Hand pacts written by consumer tests to provider verification.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! A [`PactRegistry`] is a directory holding one `<consumer>-<provider>.json`
//! file per participant pair. Publishing merges interactions into any pact
//! already on disk, so consumer tests that each record one interaction build
//! up the full contract. The root defaults to `target/pacts` and can be
//! overridden with `ORDER_PACT_DIR`; an empty or non-UTF-8 override is an
//! error.
//! Invariants:
//! - Participant names contain only `[A-Za-z0-9_.-]`.
//! - Files are replaced atomically via a sibling temp file and rename.
//! - Publishes within one process are serialized.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsString;
use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use crate::error::PactError;
use crate::model::Pact;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable overriding the registry root.
pub const PACT_DIR_ENV: &str = "ORDER_PACT_DIR";
/// Default registry root relative to the working directory.
pub const DEFAULT_PACT_DIR: &str = "target/pacts";
/// Maximum attempts to allocate a temp file name.
const TEMP_ATTEMPTS: usize = 16;

/// Serializes read-merge-write cycles within the process.
static PUBLISH_LOCK: Mutex<()> = Mutex::new(());
/// Counter for unique temp file names.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Directory of published pacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PactRegistry {
    /// Registry root directory.
    root: PathBuf,
}

impl PactRegistry {
    /// Creates a registry rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    /// Creates a registry from `ORDER_PACT_DIR`, falling back to `target/pacts`
    /// when the variable is unset.
    ///
    /// # Errors
    ///
    /// Returns [`PactError::Invalid`] when the variable is set but empty or
    /// not valid UTF-8.
    pub fn from_env() -> Result<Self, PactError> {
        resolve_root(std::env::var_os(PACT_DIR_ENV)).map(Self::new)
    }

    /// Returns the registry root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the file path for a participant pair.
    ///
    /// # Errors
    ///
    /// Returns [`PactError::Invalid`] when a name is empty or contains
    /// characters outside `[A-Za-z0-9_.-]`.
    pub fn path_for(&self, consumer: &str, provider: &str) -> Result<PathBuf, PactError> {
        validate_name(consumer)?;
        validate_name(provider)?;
        Ok(self.root.join(format!("{consumer}-{provider}.json")))
    }

    /// Publishes `pact`, merging it into any pact already stored for the pair.
    ///
    /// # Errors
    ///
    /// Returns [`PactError`] when the pact is invalid, the stored pact cannot
    /// be read, or the file cannot be written.
    pub fn publish(&self, pact: &Pact) -> Result<PathBuf, PactError> {
        pact.validate()?;
        let path = self.path_for(&pact.consumer.name, &pact.provider.name)?;
        let _lock = PUBLISH_LOCK
            .lock()
            .map_err(|_| PactError::Io("pact publish lock poisoned".to_string()))?;
        let merged = match read_pact(&path)? {
            Some(mut existing) => {
                existing.merge(pact)?;
                existing
            }
            None => pact.clone(),
        };
        fs::create_dir_all(&self.root).map_err(|err| {
            PactError::Io(format!("create {} failed: {err}", self.root.display()))
        })?;
        write_atomic(&path, &merged.to_pretty_json()?)?;
        Ok(path)
    }

    /// Loads the pact for a participant pair.
    ///
    /// # Errors
    ///
    /// Returns [`PactError::NotFound`] when nothing was published for the
    /// pair, or another [`PactError`] when the file is unreadable.
    pub fn fetch(&self, consumer: &str, provider: &str) -> Result<Pact, PactError> {
        let path = self.path_for(consumer, provider)?;
        read_pact(&path)?.ok_or_else(|| PactError::NotFound(format!("{consumer}-{provider}")))
    }

    /// Loads every pact naming `provider`, ordered by file name.
    ///
    /// # Errors
    ///
    /// Returns [`PactError`] when the root cannot be listed or a pact file is
    /// invalid. A missing root yields an empty list.
    pub fn pacts_for_provider(&self, provider: &str) -> Result<Vec<Pact>, PactError> {
        validate_name(provider)?;
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(PactError::Io(format!("list {} failed: {err}", self.root.display())));
            }
        };
        let suffix = format!("-{provider}.json");
        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.ends_with(&suffix) && !name.starts_with('.'))
            })
            .collect();
        paths.sort();
        let mut pacts = Vec::new();
        for path in paths {
            if let Some(pact) = read_pact(&path)?
                && pact.provider.name == provider
            {
                pacts.push(pact);
            }
        }
        Ok(pacts)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the registry root from a raw `ORDER_PACT_DIR` value.
fn resolve_root(raw: Option<OsString>) -> Result<PathBuf, PactError> {
    let Some(raw) = raw else {
        return Ok(PathBuf::from(DEFAULT_PACT_DIR));
    };
    let value = raw
        .into_string()
        .map_err(|_| PactError::Invalid(format!("{PACT_DIR_ENV} must be valid UTF-8")))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PactError::Invalid(format!("{PACT_DIR_ENV} must not be empty")));
    }
    Ok(PathBuf::from(trimmed))
}

/// Checks a participant name.
fn validate_name(name: &str) -> Result<(), PactError> {
    let valid = !name.is_empty()
        && name.chars().all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-'))
        && name != "."
        && name != "..";
    if valid {
        Ok(())
    } else {
        Err(PactError::Invalid(format!("invalid participant name: {name:?}")))
    }
}

/// Reads a pact file, returning `None` when it does not exist.
fn read_pact(path: &Path) -> Result<Option<Pact>, PactError> {
    match fs::read(path) {
        Ok(bytes) => Pact::from_slice(&bytes)
            .map(Some)
            .map_err(|err| PactError::Invalid(format!("{}: {err}", path.display()))),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(PactError::Io(format!("read {} failed: {err}", path.display()))),
    }
}

/// Writes `bytes` to a sibling temp file, then renames it over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), PactError> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| PactError::Io("pact path does not include a file name".to_string()))?;
    let mut temp = None;
    for _ in 0 .. TEMP_ATTEMPTS {
        let attempt = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let temp_path = parent.join(format!(".{file_name}.tmp.{}.{attempt}", std::process::id()));
        match OpenOptions::new().write(true).create_new(true).open(&temp_path) {
            Ok(file) => {
                temp = Some((temp_path, file));
                break;
            }
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(err) => return Err(PactError::Io(err.to_string())),
        }
    }
    let (temp_path, mut file) =
        temp.ok_or_else(|| PactError::Io("failed to allocate temporary pact path".to_string()))?;
    if let Err(err) = file.write_all(bytes).and_then(|()| file.sync_all()) {
        let _ = fs::remove_file(&temp_path);
        return Err(PactError::Io(format!("write {} failed: {err}", temp_path.display())));
    }
    drop(file);
    match fs::rename(&temp_path, path) {
        Ok(()) => Ok(()),
        Err(err) => {
            if path.exists() {
                fs::remove_file(path).map_err(|err| PactError::Io(err.to_string()))?;
                fs::rename(&temp_path, path).map_err(|err| PactError::Io(err.to_string()))?;
                return Ok(());
            }
            let _ = fs::remove_file(&temp_path);
            Err(PactError::Io(err.to_string()))
        }
    }
}
