//! Store configuration and derived on-disk layout.
//!
//! # Invariants
//! - Every path is derived from `Config::path`; nothing else is configurable.
//! - Path helpers are pure and never touch the filesystem.

use crate::model::atom::AtomHash;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Sub-directory of the root holding one content file per atom.
pub const ATOMS_DIR_NAME: &str = "atoms";
/// Catalog file name under the root.
pub const CATALOG_FILE_NAME: &str = "atomfs.db";
/// Mode used when creating the root and atoms directories.
pub const ROOT_DIR_MODE: u32 = 0o755;

/// Location of one atomfs store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Store root; created on open when missing.
    pub path: PathBuf,
}

impl Config {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn root_path(&self) -> &Path {
        &self.path
    }

    /// Content directory.
    pub fn atoms_path(&self) -> PathBuf {
        self.path.join(ATOMS_DIR_NAME)
    }

    /// Content file for one atom.
    pub fn atom_path(&self, hash: &AtomHash) -> PathBuf {
        self.atoms_path().join(hash.as_str())
    }

    pub fn db_path(&self) -> PathBuf {
        self.path.join(CATALOG_FILE_NAME)
    }
}
