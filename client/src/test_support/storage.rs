//! Filesystem fixtures for persistence tests.

use tempfile::TempDir;

/// Fresh directory for a file-backed state store.
pub fn temp_state_dir() -> TempDir {
    tempfile::tempdir().expect("create temporary state directory")
}
