//! Molecule model: a named, ordered stack of atoms.

use crate::model::atom::AtomHash;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog-internal molecule identifier.
pub type MoleculeId = Uuid;

/// A composed snapshot. `atoms[0]` is the bottom layer; later entries
/// override earlier ones when materialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Molecule {
    pub id: MoleculeId,
    /// User-facing unique key.
    pub name: String,
    pub atoms: Vec<AtomHash>,
}
