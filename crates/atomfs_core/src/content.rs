//! Content directory: one file per atom, named by its SHA-256 hex digest.
//!
//! # Responsibility
//! - Map atom hashes to content file paths.
//! - Stream content through SHA-256 without buffering whole files.
//! - List and remove entries for GC disk reconciliation.
//!
//! # Invariants
//! - The directory is a cache of bytes keyed by hash; the catalog decides
//!   which atoms exist.
//! - Entry names are compared byte-exactly with catalog hashes; a name that
//!   is not valid UTF-8 can never match.

use crate::error::{IoOp, StoreError, StoreResult};
use crate::model::atom::AtomHash;
use std::ffi::{OsStr, OsString};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

const TEMP_PREFIX: &str = ".incoming-";

/// Handle to the atoms directory of one store.
#[derive(Debug, Clone)]
pub struct ContentDir {
    root: PathBuf,
}

impl ContentDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Content file for `hash`.
    pub fn atom_path(&self, hash: &AtomHash) -> PathBuf {
        self.root.join(hash.as_str())
    }

    /// Recomputes the digest of the file stored for `hash`.
    ///
    /// Open and read failures are returned as-is; callers decide whether they
    /// are findings or hard errors.
    pub fn digest_atom(&self, hash: &AtomHash) -> io::Result<AtomHash> {
        let mut file = File::open(self.atom_path(hash))?;
        AtomHash::of_reader(&mut file)
    }

    /// Names of every entry currently in the directory, sorted.
    pub fn list_entries(&self) -> StoreResult<Vec<OsString>> {
        let read_dir =
            fs::read_dir(&self.root).map_err(|err| StoreError::io(IoOp::ReadDir, &self.root, err))?;

        let mut names = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|err| StoreError::io(IoOp::ReadDir, &self.root, err))?;
            names.push(entry.file_name());
        }
        names.sort();
        Ok(names)
    }

    /// Deletes one entry by name.
    ///
    /// A directory is removed only when empty; a non-empty one fails with
    /// `IoOp::RemoveDir`.
    pub fn remove_entry(&self, name: &OsStr) -> StoreResult<()> {
        let path = self.root.join(name);
        let metadata = fs::symlink_metadata(&path)
            .map_err(|err| StoreError::io(IoOp::RemoveFile, &path, err))?;
        if metadata.is_dir() {
            fs::remove_dir(&path).map_err(|err| StoreError::io(IoOp::RemoveDir, &path, err))
        } else {
            fs::remove_file(&path).map_err(|err| StoreError::io(IoOp::RemoveFile, &path, err))
        }
    }

    /// Stores `bytes` under their digest and returns it.
    ///
    /// Writes go to a temporary sibling and are renamed into place, so a
    /// content file is either absent or complete.
    pub fn write_atom(&self, bytes: &[u8]) -> StoreResult<AtomHash> {
        let hash = AtomHash::of_bytes(bytes);
        let target = self.atom_path(&hash);
        let temp = self.root.join(format!("{TEMP_PREFIX}{}", Uuid::new_v4()));

        let written = File::create(&temp).and_then(|mut file| {
            file.write_all(bytes)?;
            file.sync_all()
        });
        if let Err(err) = written {
            let _ = fs::remove_file(&temp);
            return Err(StoreError::io(IoOp::WriteFile, &temp, err));
        }

        if let Err(err) = fs::rename(&temp, &target) {
            let _ = fs::remove_file(&temp);
            return Err(StoreError::io(IoOp::WriteFile, &target, err));
        }
        Ok(hash)
    }
}

/// Creates `path` and its parents if missing; an existing directory is fine.
pub(crate) fn ensure_dir(path: &Path) -> StoreResult<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use crate::config::ROOT_DIR_MODE;
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(ROOT_DIR_MODE);
    }
    builder
        .create(path)
        .map_err(|err| StoreError::io(IoOp::CreateDir, path, err))
}

#[cfg(test)]
mod tests {
    use super::{ensure_dir, ContentDir};
    use crate::error::{IoOp, StoreError};
    use crate::model::atom::AtomHash;
    use std::ffi::{OsStr, OsString};
    use std::fs;

    #[test]
    fn write_atom_names_file_by_digest() {
        let dir = tempfile::tempdir().unwrap();
        let content = ContentDir::new(dir.path());

        let hash = content.write_atom(b"layer one").unwrap();

        assert_eq!(hash, AtomHash::of_bytes(b"layer one"));
        assert_eq!(fs::read(content.atom_path(&hash)).unwrap(), b"layer one");
        assert_eq!(content.digest_atom(&hash).unwrap(), hash);
        assert_eq!(
            content.list_entries().unwrap(),
            vec![OsString::from(hash.as_str())]
        );
    }

    #[test]
    fn list_entries_includes_directories() {
        let dir = tempfile::tempdir().unwrap();
        let content = ContentDir::new(dir.path());
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("stray"), b"x").unwrap();

        assert_eq!(
            content.list_entries().unwrap(),
            vec![OsString::from("nested"), OsString::from("stray")]
        );
    }

    #[test]
    fn remove_entry_removes_only_empty_directories() {
        let dir = tempfile::tempdir().unwrap();
        let content = ContentDir::new(dir.path());
        fs::create_dir(dir.path().join("empty")).unwrap();
        fs::create_dir(dir.path().join("full")).unwrap();
        fs::write(dir.path().join("full").join("inner"), b"x").unwrap();

        content.remove_entry(OsStr::new("empty")).unwrap();
        let err = content.remove_entry(OsStr::new("full")).unwrap_err();

        assert!(!dir.path().join("empty").exists());
        assert!(dir.path().join("full").join("inner").exists());
        assert!(matches!(err, StoreError::Io { op: IoOp::RemoveDir, .. }));
    }

    #[test]
    fn digest_atom_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let content = ContentDir::new(dir.path());
        let err = content
            .digest_atom(&AtomHash::of_bytes(b"absent"))
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn ensure_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
