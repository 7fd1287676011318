//! Errors reported by the warehouse.

use std::path::PathBuf;

use derive_more::{Display, Error};
use enum_assoc::Assoc;

use crate::id::{self, SecretId};

/// The coarse category of an [`Error`].
///
/// Callers that only care about what went wrong, not why, should match on
/// this rather than on the error itself.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
pub enum ErrorKind {
    /// The base directory could not be created.
    Setup,

    /// The secret ID was rejected before touching the filesystem.
    InvalidId,

    /// The secret could not be written.
    Write,

    /// No secret is stored under the ID.
    NotFound,

    /// The secret exists but could not be read.
    Read,

    /// The stored content is not valid base64.
    Decode,

    /// The directory tree could not be enumerated.
    Walk,
}

/// Errors for warehouse operations.
///
/// Each variant maps to exactly one [`ErrorKind`] and keeps the low level
/// cause, if there is one, as its [`std::error::Error::source`].
#[derive(Debug, Display, Error, Assoc)]
#[func(pub const fn kind(&self) -> ErrorKind)]
pub enum Error {
    #[assoc(kind = ErrorKind::Setup)]
    #[display("could not set up base directory {}", path.display())]
    Setup {
        #[error(not(source))]
        path: PathBuf,
        source: std::io::Error,
    },

    #[assoc(kind = ErrorKind::InvalidId)]
    #[display("invalid secret id {id:?}")]
    InvalidId {
        #[error(not(source))]
        id: String,
        source: id::Error,
    },

    #[assoc(kind = ErrorKind::Write)]
    #[display("could not write: {id}")]
    Write {
        #[error(not(source))]
        id: SecretId,
        source: std::io::Error,
    },

    #[assoc(kind = ErrorKind::NotFound)]
    #[display("not found: {id}")]
    NotFound {
        #[error(not(source))]
        id: SecretId,
    },

    #[assoc(kind = ErrorKind::Read)]
    #[display("could not read file: {id}")]
    Read {
        #[error(not(source))]
        id: SecretId,
        source: std::io::Error,
    },

    #[assoc(kind = ErrorKind::Decode)]
    #[display("could not decode data: {id}")]
    Decode {
        #[error(not(source))]
        id: SecretId,
        source: base64::DecodeError,
    },

    #[assoc(kind = ErrorKind::Walk)]
    #[display("could not walk {}", path.display())]
    Walk {
        #[error(not(source))]
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Error {
    /// Report whether the error means the secret simply doesn't exist.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
