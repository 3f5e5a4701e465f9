//! Catalog domain model.
//!
//! # Responsibility
//! - Define the atom and molecule records shared by catalog, checker and
//!   collector.
//!
//! # Invariants
//! - Atoms are identified on disk by `AtomHash`, in the catalog by `AtomId`.
//! - A molecule's atom order is its layering order and is never re-sorted.

pub mod atom;
pub mod molecule;

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Record kinds the catalog can delete by ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Atom,
    Molecule,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Atom => "atom",
            Self::Molecule => "molecule",
        }
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
