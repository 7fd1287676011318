//! The filesystem backed warehouse.

use std::path::{Path, PathBuf};

use base64::{
    Engine as _, alphabet,
    engine::{GeneralPurpose, GeneralPurposeConfig},
};
use derive_more::Display;
use tap::TapFallible as _;
use tracing::{debug, instrument, trace, warn};

use crate::{
    Error, Warehouse,
    fs::{Filesystem, Mode, OsFilesystem},
    id::SecretId,
};

/// A [`Warehouse`] that keeps each secret in its own file under a base
/// directory.
///
/// Secrets are stored as standard base64 text at `<base_dir>/<id>`. The tree
/// itself is the index: there is no manifest, and enumeration walks the
/// directory to rebuild the list of IDs.
///
/// The base directory is created on demand before every operation, so a
/// warehouse can be pointed at a directory that doesn't exist yet.
///
/// The warehouse performs no locking. Concurrent writers of the same ID, or
/// a reader racing a writer, need to be coordinated by the caller.
#[derive(Clone, derive_more::Debug, Display)]
#[display("{}", base_dir.display())]
pub struct FileWarehouse<F = OsFilesystem> {
    /// The absolute root of the namespace for all secrets.
    base_dir: PathBuf,

    #[debug(skip)]
    fs: F,
}

impl FileWarehouse<OsFilesystem> {
    /// Create a warehouse rooted at `base_dir` on the local filesystem.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self::with_filesystem(base_dir, OsFilesystem)
    }
}

impl<F: Filesystem> FileWarehouse<F> {
    /// Create a warehouse rooted at `base_dir` on the provided filesystem.
    ///
    /// The base directory is made absolute relative to the current working
    /// directory. If that isn't possible the path is used as provided.
    /// Nothing is created on disk until the first operation.
    pub fn with_filesystem(base_dir: impl Into<PathBuf>, fs: F) -> Self {
        let base_dir = base_dir.into();
        let base_dir = match std::path::absolute(&base_dir) {
            Ok(abs) => abs,
            Err(error) => {
                warn!(?base_dir, %error, "could not make base directory absolute");
                base_dir
            }
        };
        Self { base_dir, fs }
    }

    /// The root of the namespace for all secrets.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Report whether a secret is stored under the ID.
    ///
    /// A directory is a namespace for other secrets, never a secret itself.
    #[instrument(name = "FileWarehouse::contains", skip(self))]
    pub fn contains(&self, id: &str) -> Result<bool, Error> {
        let id = parse(id)?;
        self.setup()?;
        let path = id.resolve(&self.base_dir);
        Ok(self.fs.exists(&path) && !self.fs.is_dir(&path))
    }

    /// Ensure the base directory exists.
    fn setup(&self) -> Result<(), Error> {
        if self.fs.is_dir(&self.base_dir) {
            return Ok(());
        }
        self.fs
            .create_dir(&self.base_dir, Mode::DIR)
            .map_err(|source| Error::Setup {
                path: self.base_dir.clone(),
                source,
            })
            .tap_ok(|_| debug!(base_dir = ?self.base_dir, "created base directory"))
    }
}

impl<F: Filesystem> Warehouse for FileWarehouse<F> {
    #[instrument(name = "FileWarehouse::store", skip(self, data), fields(bytes = data.len()))]
    fn store(&self, id: &str, data: &[u8]) -> Result<(), Error> {
        let id = parse(id)?;
        self.setup()?;

        let path = id.resolve(&self.base_dir);
        if let Some(parent) = path.parent() {
            self.fs
                .create_dir(parent, Mode::DIR)
                .map_err(|source| Error::Write {
                    id: id.clone(),
                    source,
                })?;
        }

        let encoded = BASE64.encode(data);
        self.fs
            .write_file(&path, encoded.as_bytes(), Mode::FILE)
            .map_err(|source| Error::Write {
                id: id.clone(),
                source,
            })
            .tap_ok(|_| trace!(%id, ?path, "stored secret"))
    }

    #[instrument(name = "FileWarehouse::retrieve", skip(self))]
    fn retrieve(&self, id: &str) -> Result<Vec<u8>, Error> {
        let id = parse(id)?;
        self.setup()?;

        let path = id.resolve(&self.base_dir);
        if !self.fs.exists(&path) {
            return Err(Error::NotFound { id });
        }

        let content = match self.fs.read_file(&path) {
            Ok(content) => content,
            Err(source) => return Err(Error::Read { id, source }),
        };
        match decode(&content) {
            Ok(data) => {
                trace!(%id, ?path, bytes = data.len(), "retrieved secret");
                Ok(data)
            }
            Err(source) => Err(Error::Decode { id, source }),
        }
    }

    #[instrument(name = "FileWarehouse::ids", skip(self), fields(base_dir = ?self.base_dir))]
    fn ids(&self) -> Result<Vec<String>, Error> {
        self.setup()?;

        let mut ids = Vec::new();
        self.fs
            .walk(&self.base_dir, &mut |path, is_dir| {
                if is_dir {
                    return Ok(());
                }
                match SecretId::from_path(&self.base_dir, path) {
                    Ok(id) => ids.push(id.into_string()),
                    Err(error) => warn!(?path, %error, "skipping file that is not a secret id"),
                }
                Ok(())
            })
            .map_err(|source| Error::Walk {
                path: self.base_dir.clone(),
                source,
            })?;

        debug!(count = ids.len(), "enumerated secrets");
        Ok(ids)
    }
}

/// Standard padded base64 that accepts non-zero trailing bits when decoding.
const BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

fn parse(id: &str) -> Result<SecretId, Error> {
    SecretId::parse(id).map_err(|source| Error::InvalidId {
        id: id.to_string(),
        source,
    })
}

/// Decode stored content, ignoring line breaks so that files edited by hand
/// (which usually gain a trailing newline) still decode.
///
/// Encoders that leave garbage in the unused bits of the final character are
/// tolerated too; the decoded bytes are the same either way.
fn decode(content: &[u8]) -> Result<Vec<u8>, base64::DecodeError> {
    let content = content
        .iter()
        .copied()
        .filter(|&b| b != b'\r' && b != b'\n')
        .collect::<Vec<_>>();
    BASE64.decode(content)
}
