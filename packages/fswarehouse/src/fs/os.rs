//! The real, OS backed filesystem.

use std::{io::Write as _, path::Path};

use tap::TapFallible as _;
use tracing::{instrument, trace};

use super::{Filesystem, Mode};

/// Filesystem implementation that delegates to `std::fs`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct OsFilesystem;

impl Filesystem for OsFilesystem {
    #[instrument(name = "OsFilesystem::exists", skip(self))]
    fn exists(&self, path: &Path) -> bool {
        match std::fs::metadata(path) {
            Ok(_) => true,
            // A file in place of an ancestor directory means nothing can be
            // stored at the path, same as a missing ancestor.
            Err(err) => !matches!(
                err.kind(),
                std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
            ),
        }
    }

    #[instrument(name = "OsFilesystem::is_dir", skip(self))]
    fn is_dir(&self, path: &Path) -> bool {
        std::fs::metadata(path).is_ok_and(|m| m.is_dir())
    }

    #[instrument(name = "OsFilesystem::create_dir", skip(self))]
    fn create_dir(&self, path: &Path, mode: Mode) -> std::io::Result<()> {
        let mut builder = std::fs::DirBuilder::new();
        builder.recursive(true);

        #[cfg(not(target_os = "windows"))]
        {
            use std::os::unix::fs::DirBuilderExt as _;
            builder.mode(mode.bits());
        }

        builder
            .create(path)
            .tap_ok(|_| trace!(?path, %mode, "create directory"))
    }

    #[instrument(name = "OsFilesystem::walk", skip(self, visit))]
    fn walk(
        &self,
        root: &Path,
        visit: &mut dyn FnMut(&Path, bool) -> std::io::Result<()>,
    ) -> std::io::Result<()> {
        for entry in walkdir::WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            visit(entry.path(), entry.file_type().is_dir())?;
        }
        Ok(())
    }

    #[instrument(name = "OsFilesystem::read_file", skip(self))]
    fn read_file(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        std::fs::read(path).tap_ok(|buf| trace!(?path, bytes = buf.len(), "read file"))
    }

    #[instrument(name = "OsFilesystem::write_file", skip(self, content))]
    fn write_file(&self, path: &Path, content: &[u8], mode: Mode) -> std::io::Result<()> {
        let mut options = std::fs::OpenOptions::new();
        options.create(true).truncate(true).write(true);

        #[cfg(not(target_os = "windows"))]
        {
            use std::os::unix::fs::OpenOptionsExt as _;
            options.mode(mode.bits());
        }

        let mut file = options.open(path)?;
        file.write_all(content)?;
        file.flush()
            .tap_ok(|_| trace!(?path, %mode, bytes = content.len(), "write file"))
    }
}
