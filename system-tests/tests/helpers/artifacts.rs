// system-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: System Test Artifacts
// Description: Per-test artifact directories.
// Purpose: Keep configs, stores, logs, and pacts inspectable when requested.
// Dependencies: system-tests, tempfile
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use system_tests::config::SystemTestConfig;
use tempfile::TempDir;

/// Directory holding one test's generated files.
///
/// Lives under `ORDER_SYSTEM_TEST_RUN_ROOT/<test>` when that variable is set
/// and in a temp dir removed on drop otherwise.
pub struct RunRoot {
    /// Temp dir kept alive for the run root's lifetime.
    _temp: Option<TempDir>,
    /// Artifact directory.
    path: PathBuf,
}

impl RunRoot {
    /// Creates the artifact directory for `test_name`.
    pub fn new(test_name: &str) -> Result<Self, String> {
        let config = SystemTestConfig::load()?;
        let Some(root) = config.run_root else {
            let temp = tempfile::tempdir().map_err(|err| format!("temp dir failed: {err}"))?;
            let path = temp.path().to_path_buf();
            return Ok(Self {
                _temp: Some(temp),
                path,
            });
        };
        let path = root.join(test_name);
        let occupied = fs::read_dir(&path).is_ok_and(|mut entries| entries.next().is_some());
        if occupied && !config.allow_overwrite {
            return Err(format!(
                "run root {} is not empty; set ORDER_SYSTEM_TEST_ALLOW_OVERWRITE=1 to reuse it",
                path.display()
            ));
        }
        fs::create_dir_all(&path).map_err(|err| format!("create {} failed: {err}", path.display()))?;
        Ok(Self {
            _temp: None,
            path,
        })
    }

    /// Returns the artifact directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `contents` to `name` inside the run root and returns its path.
    pub fn write(&self, name: &str, contents: &[u8]) -> Result<PathBuf, String> {
        let path = self.path.join(name);
        fs::write(&path, contents).map_err(|err| format!("write {} failed: {err}", path.display()))?;
        Ok(path)
    }
}
