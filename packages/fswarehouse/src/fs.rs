//! Filesystem capabilities consumed by the warehouse.
//!
//! The warehouse never touches `std::fs` directly: every operation goes
//! through a [`Filesystem`] implementation so that tests can substitute
//! [`MemoryFilesystem`] for the real disk.
//!
//! Inside this module and its children, we refer to `std::fs` by its fully
//! qualified path to make it maximally clear what we are using.

use std::path::Path;

use derive_more::Display;

mod memory;
mod os;

pub use memory::*;
pub use os::*;

/// Unix permission bits applied to newly created entries.
///
/// Modes are only applied when an entry is created; existing entries keep
/// whatever permissions they already have. On Windows the mode is ignored.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
#[display("{_0:#o}")]
pub struct Mode(u32);

impl Mode {
    /// The mode used for directories: `rwxr-xr-x`.
    pub const DIR: Mode = Mode(0o755);

    /// The mode used for secret files: `rw-r--r--`.
    pub const FILE: Mode = Mode(0o644);

    /// Create a mode from raw permission bits.
    pub const fn new(bits: u32) -> Self {
        Self(bits)
    }

    /// The raw permission bits.
    pub const fn bits(self) -> u32 {
        self.0
    }
}

/// The narrow set of filesystem operations the warehouse relies on.
///
/// Paths passed to these methods are expected to be absolute,
/// although implementations are not required to enforce this.
pub trait Filesystem {
    /// Report whether anything exists at the path.
    ///
    /// Only a definitive "not found" counts as absent, which includes a path
    /// whose ancestor is a file. If the path cannot be inspected for some
    /// other reason (for example, permissions) this returns `true` so that
    /// the subsequent read reports the real problem.
    fn exists(&self, path: &Path) -> bool;

    /// Report whether the path is a directory.
    ///
    /// Returns `false` if the path doesn't exist or can't be inspected.
    fn is_dir(&self, path: &Path) -> bool;

    /// Create the directory and all its parents with the provided mode.
    ///
    /// Succeeds without changes if the directory already exists.
    fn create_dir(&self, path: &Path, mode: Mode) -> std::io::Result<()>;

    /// Walk the tree rooted at `root` depth first, calling `visit` with each
    /// entry's path and whether it is a directory.
    ///
    /// The root itself is visited first. Siblings are visited in
    /// lexicographic order of their file names. Symbolic links are reported
    /// as they are and never followed. If `visit` returns an error, or an
    /// entry cannot be read, the walk stops and returns that error.
    fn walk(
        &self,
        root: &Path,
        visit: &mut dyn FnMut(&Path, bool) -> std::io::Result<()>,
    ) -> std::io::Result<()>;

    /// Buffer the full file content.
    fn read_file(&self, path: &Path) -> std::io::Result<Vec<u8>>;

    /// Write the content to the file, replacing anything already there.
    ///
    /// The parent directory must already exist.
    fn write_file(&self, path: &Path, content: &[u8], mode: Mode) -> std::io::Result<()>;
}
