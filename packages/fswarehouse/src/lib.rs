//! Secret storage on the local filesystem.
//!
//! A [`Warehouse`] stores opaque binary secrets under string IDs and can list
//! every ID it holds. [`FileWarehouse`] is the filesystem backed
//! implementation: each secret lives in its own file, base64 encoded, at
//! `<base_dir>/<id>`, and IDs containing `/` become nested directories.
//!
//! Payloads are written as given; callers are expected to encrypt secrets
//! before handing them to the warehouse.
//!
//! ```no_run
//! use fswarehouse::{FileWarehouse, Warehouse};
//!
//! let warehouse = FileWarehouse::new("/var/lib/secrets");
//! warehouse.store("team/db-password", b"ciphertext")?;
//! assert_eq!(warehouse.retrieve("team/db-password")?, b"ciphertext");
//! assert_eq!(warehouse.ids()?, vec!["team/db-password"]);
//! # Ok::<(), fswarehouse::Error>(())
//! ```

pub mod error;
pub mod fs;
pub mod id;
mod warehouse;

pub use error::{Error, ErrorKind};
pub use fs::{Filesystem, MemoryFilesystem, Mode, OsFilesystem};
pub use id::SecretId;
pub use warehouse::FileWarehouse;

/// A store of secrets addressed by ID.
pub trait Warehouse {
    /// Store the data under the ID, replacing anything already stored there.
    fn store(&self, id: &str, data: &[u8]) -> Result<(), Error>;

    /// Retrieve the data stored under the ID.
    ///
    /// Fails with [`ErrorKind::NotFound`] if nothing is stored under the ID.
    fn retrieve(&self, id: &str) -> Result<Vec<u8>, Error>;

    /// List the IDs of every stored secret.
    fn ids(&self) -> Result<Vec<String>, Error>;
}
