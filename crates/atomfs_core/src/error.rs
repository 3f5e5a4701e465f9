//! Store-level error surfaced by `Instance` operations.
//!
//! # Invariants
//! - Catalog not-found conditions stay distinguishable from I/O failures via
//!   `StoreError::is_not_found`.
//! - Integrity findings are never errors; see `service::fsck::FsckProblem`.

use crate::repo::catalog_repo::CatalogError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

pub type StoreResult<T> = Result<T, StoreError>;

/// Filesystem operation that failed, for error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    CreateDir,
    ReadDir,
    ReadFile,
    WriteFile,
    RemoveFile,
    RemoveDir,
}

impl IoOp {
    fn as_str(self) -> &'static str {
        match self {
            Self::CreateDir => "create directory",
            Self::ReadDir => "read directory",
            Self::ReadFile => "read file",
            Self::WriteFile => "write file",
            Self::RemoveFile => "remove file",
            Self::RemoveDir => "remove directory",
        }
    }
}

#[derive(Debug)]
pub enum StoreError {
    Catalog(CatalogError),
    Io {
        op: IoOp,
        path: PathBuf,
        source: io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(op: IoOp, path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// True when the target record does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Catalog(err) => err.is_not_found(),
            Self::Io { .. } => false,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Catalog(err) => write!(f, "{err}"),
            Self::Io { op, path, source } => {
                write!(f, "failed to {} `{}`: {source}", op.as_str(), path.display())
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Catalog(err) => Some(err),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<CatalogError> for StoreError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}
