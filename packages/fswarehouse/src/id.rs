//! Secret identifiers and their mapping onto filesystem paths.
//!
//! A secret ID is a `/` separated relative path such as `team/db-password`.
//! Every segment but the last names a directory under the warehouse base
//! directory; the last names the file holding the secret.
//!
//! IDs are validated before they ever reach the filesystem so that a stored
//! secret can never land outside the base directory, and so that every ID
//! read back from the tree is spelled exactly the way it was stored.

use std::path::{Component, Path, PathBuf};

use derive_more::{Display, Error};

/// The separator between the segments of a secret ID.
pub const SEPARATOR: &str = "/";

/// Errors for secret ID validation.
#[derive(Clone, Debug, Display, Error, PartialEq, Eq)]
pub enum Error {
    /// The ID was empty.
    #[display("id is empty")]
    Empty,

    /// The ID started with a separator.
    #[display("id is absolute")]
    Absolute,

    /// The ID contained an empty segment, such as `a//b` or `a/`.
    #[display("id contains an empty segment")]
    EmptySegment,

    /// The ID contained a `.` or `..` segment.
    #[display("id contains relative segment {_0:?}")]
    RelativeSegment(#[error(not(source))] String),

    /// The ID contained a character that is not allowed in a segment.
    #[display("id contains forbidden character {_0:?}")]
    ForbiddenCharacter(#[error(not(source))] char),

    /// A path under the base directory could not be represented as UTF-8.
    #[display("path is not utf8: {_0:?}")]
    NotUtf8(#[error(not(source))] PathBuf),

    /// A path was not inside the base directory.
    #[display("{child:?} is not inside {base:?}")]
    NotChild { base: PathBuf, child: PathBuf },
}

fn forbidden(c: char) -> bool {
    matches!(c, '\\' | '\0') || (cfg!(target_os = "windows") && c == ':')
}

/// A validated secret ID.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Display)]
#[display("{_0}")]
pub struct SecretId(String);

impl SecretId {
    /// Validate the provided string as a secret ID.
    ///
    /// Rejects the empty string, absolute IDs, empty segments, `.` and `..`
    /// segments, and segments containing `\` or NUL. On Windows `:` is
    /// rejected as well, since `C:` would otherwise resolve as a drive.
    pub fn parse(id: impl Into<String>) -> Result<Self, Error> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::Empty);
        }
        if id.starts_with(SEPARATOR) {
            return Err(Error::Absolute);
        }
        for segment in id.split(SEPARATOR) {
            match segment {
                "" => return Err(Error::EmptySegment),
                "." | ".." => return Err(Error::RelativeSegment(segment.to_string())),
                _ => {}
            }
            if let Some(c) = segment.chars().find(|&c| forbidden(c)) {
                return Err(Error::ForbiddenCharacter(c));
            }
        }
        Ok(Self(id))
    }

    /// Reconstruct the ID of the file at `path` under `base`.
    ///
    /// This is the inverse of [`SecretId::resolve`].
    pub fn from_path(base: &Path, path: &Path) -> Result<Self, Error> {
        let rel = path.strip_prefix(base).map_err(|_| Error::NotChild {
            base: base.to_path_buf(),
            child: path.to_path_buf(),
        })?;

        let mut segments = Vec::new();
        for component in rel.components() {
            match component {
                Component::Normal(segment) => match segment.to_str() {
                    Some(segment) => segments.push(segment),
                    None => return Err(Error::NotUtf8(path.to_path_buf())),
                },
                _ => {
                    return Err(Error::NotChild {
                        base: base.to_path_buf(),
                        child: path.to_path_buf(),
                    });
                }
            }
        }

        Self::parse(segments.join(SEPARATOR))
    }

    /// The path of the secret file under `base`.
    pub fn resolve(&self, base: &Path) -> PathBuf {
        self.segments()
            .fold(base.to_path_buf(), |path, segment| path.join(segment))
    }

    /// Iterate over the segments of the ID.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR)
    }

    /// View the ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert the ID into its string form.
    pub fn into_string(self) -> String {
        self.0
    }
}
