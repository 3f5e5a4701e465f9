//! Molecule lifecycle: snapshot-copy and delete.
//!
//! # Invariants
//! - Copy duplicates metadata only; no atom content or atom record is created.
//! - Delete removes the molecule record only. Atoms it used are reclaimed
//!   later by GC, and only if no other molecule lists them.
//! - Name collisions are enforced by the catalog, not pre-checked here.

use crate::model::atom::AtomHash;
use crate::model::molecule::Molecule;
use crate::model::RecordKind;
use crate::repo::catalog_repo::{Catalog, CatalogResult};
use log::info;

pub struct MoleculeService<'a, C: Catalog> {
    catalog: &'a C,
}

impl<'a, C: Catalog> MoleculeService<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// Creates `dest` with exactly the atom sequence of `src`.
    pub fn copy(&self, dest: &str, src: &str) -> CatalogResult<Molecule> {
        let source = self.catalog.get_molecule(src)?;
        let copy = self.catalog.create_molecule(dest, &source.atoms)?;
        info!(
            "event=molecule_copy module=molecule status=ok src={src} dest={dest} atoms={}",
            copy.atoms.len()
        );
        Ok(copy)
    }

    /// Deletes the molecule record registered under `name`.
    pub fn delete(&self, name: &str) -> CatalogResult<()> {
        let molecule = self.catalog.get_molecule(name)?;
        self.catalog.delete(molecule.id, RecordKind::Molecule)?;
        info!("event=molecule_delete module=molecule status=ok name={name}");
        Ok(())
    }

    pub fn create(&self, name: &str, atoms: &[AtomHash]) -> CatalogResult<Molecule> {
        let molecule = self.catalog.create_molecule(name, atoms)?;
        info!(
            "event=molecule_create module=molecule status=ok name={name} atoms={}",
            atoms.len()
        );
        Ok(molecule)
    }

    pub fn get(&self, name: &str) -> CatalogResult<Molecule> {
        self.catalog.get_molecule(name)
    }

    pub fn list(&self) -> CatalogResult<Vec<Molecule>> {
        self.catalog.list_molecules()
    }
}
