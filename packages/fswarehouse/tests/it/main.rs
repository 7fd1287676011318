use std::path::PathBuf;

use fswarehouse::FileWarehouse;
use tempfile::TempDir;

pub mod warehouse;

/// Create a warehouse rooted in a directory that doesn't exist yet,
/// inside a fresh temporary directory.
#[track_caller]
pub fn temporary_warehouse() -> (TempDir, PathBuf, FileWarehouse) {
    let dir = TempDir::new().expect("create temporary directory");
    let base = dir.path().join("secrets");
    let warehouse = FileWarehouse::new(&base);
    (dir, base, warehouse)
}
