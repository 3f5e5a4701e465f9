//! Store facade.
//!
//! # Responsibility
//! - Own the catalog handle and configuration of one store for its lifetime.
//! - Expose integrity check, garbage collection and molecule lifecycle.
//!
//! # Invariants
//! - No state beyond the catalog handle and immutable configuration.
//! - Instances are independent; several may run against different roots.
//! - No internal locking: callers serialize `gc`/`fsck` against each other
//!   and against any other writer of the same store.

use crate::config::Config;
use crate::content::{ensure_dir, ContentDir};
use crate::error::StoreResult;
use crate::model::atom::{Atom, AtomHash};
use crate::model::molecule::Molecule;
use crate::repo::catalog_repo::{Catalog, SqliteCatalog};
use crate::service::fsck::{FsckProblem, FsckService};
use crate::service::gc::{GcReport, GcService};
use crate::service::molecule_service::MoleculeService;
use log::info;

/// One open atomfs store.
///
/// Dropping an instance releases the catalog connection; `close` does the
/// same and reports the close error.
pub struct Instance {
    config: Config,
    content: ContentDir,
    catalog: SqliteCatalog,
}

impl Instance {
    /// Ensures the root and atoms directories exist, then opens the catalog.
    pub fn open(config: Config) -> StoreResult<Self> {
        ensure_dir(config.root_path())?;
        let atoms_path = config.atoms_path();
        ensure_dir(&atoms_path)?;

        let catalog = SqliteCatalog::open(config.db_path())?;
        info!(
            "event=instance_open module=instance status=ok root={}",
            config.root_path().display()
        );
        Ok(Self {
            content: ContentDir::new(atoms_path),
            config,
            catalog,
        })
    }

    /// Closes the catalog handle.
    pub fn close(self) -> StoreResult<()> {
        let root = self.config.path;
        self.catalog.close()?;
        info!(
            "event=instance_close module=instance status=ok root={}",
            root.display()
        );
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &SqliteCatalog {
        &self.catalog
    }

    /// Verifies every atom's content against its recorded hash.
    ///
    /// Findings are returned, not raised; only a failing catalog
    /// enumeration is an error.
    pub fn fsck(&self) -> StoreResult<Vec<FsckProblem>> {
        Ok(FsckService::new(&self.catalog, &self.content).check()?)
    }

    /// `fsck` findings as plain problem descriptions.
    pub fn fsck_strings(&self) -> StoreResult<Vec<String>> {
        Ok(self
            .fsck()?
            .iter()
            .map(|problem| problem.to_string())
            .collect())
    }

    /// Prunes unreferenced atoms, then removes content files with no record.
    pub fn gc(&self, dry_run: bool) -> StoreResult<GcReport> {
        GcService::new(&self.catalog, &self.content).collect(dry_run)
    }

    /// Snapshots `src` under the new name `dest`.
    pub fn copy_molecule(&self, dest: &str, src: &str) -> StoreResult<Molecule> {
        Ok(MoleculeService::new(&self.catalog).copy(dest, src)?)
    }

    pub fn delete_molecule(&self, name: &str) -> StoreResult<()> {
        Ok(MoleculeService::new(&self.catalog).delete(name)?)
    }

    pub fn create_molecule(&self, name: &str, atoms: &[AtomHash]) -> StoreResult<Molecule> {
        Ok(MoleculeService::new(&self.catalog).create(name, atoms)?)
    }

    pub fn get_molecule(&self, name: &str) -> StoreResult<Molecule> {
        Ok(MoleculeService::new(&self.catalog).get(name)?)
    }

    pub fn list_molecules(&self) -> StoreResult<Vec<Molecule>> {
        Ok(MoleculeService::new(&self.catalog).list()?)
    }

    pub fn atoms(&self) -> StoreResult<Vec<Atom>> {
        Ok(self.catalog.get_atoms()?)
    }

    /// Writes `bytes` into the content directory and records the atom.
    ///
    /// Storing content that is already recorded returns the existing record.
    pub fn put_atom(&self, bytes: &[u8]) -> StoreResult<Atom> {
        let hash = self.content.write_atom(bytes)?;
        if let Some(existing) = self.catalog.get_atom(&hash)? {
            return Ok(existing);
        }
        Ok(self.catalog.create_atom(&hash)?)
    }
}

/// Opens a store, runs `f`, and closes the store on every exit path.
///
/// An error from `f` takes precedence over a close error.
pub fn with_instance<T, F>(config: Config, f: F) -> StoreResult<T>
where
    F: FnOnce(&Instance) -> StoreResult<T>,
{
    let instance = Instance::open(config)?;
    let result = f(&instance);
    let closed = instance.close();
    let value = result?;
    closed?;
    Ok(value)
}
