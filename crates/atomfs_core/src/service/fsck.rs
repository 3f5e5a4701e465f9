//! Integrity checker.
//!
//! # Responsibility
//! - Recompute every catalog atom's digest from its content file and compare
//!   it with the recorded hash.
//!
//! # Invariants
//! - Read-only: never repairs, prunes or rewrites anything.
//! - Per-atom failures become findings and never stop the scan.
//! - Only catalog enumeration failure is a hard error.

use crate::content::ContentDir;
use crate::model::atom::AtomHash;
use crate::repo::catalog_repo::{Catalog, CatalogResult};
use log::{info, warn};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// One integrity finding for a catalog atom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FsckProblem {
    /// The content file could not be opened or read to the end.
    Unreadable { hash: AtomHash, detail: String },
    /// The content no longer hashes to the recorded digest.
    HashMismatch { hash: AtomHash, actual: AtomHash },
}

impl FsckProblem {
    /// Atom this finding is about.
    pub fn hash(&self) -> &AtomHash {
        match self {
            Self::Unreadable { hash, .. } | Self::HashMismatch { hash, .. } => hash,
        }
    }
}

impl Display for FsckProblem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreadable { hash, detail } => write!(f, "{hash} is unreadable: {detail}"),
            Self::HashMismatch { hash, actual } => {
                write!(f, "{hash} does not match its hash (content hashes to {actual})")
            }
        }
    }
}

/// Whole-store integrity scan over catalog and content directory.
pub struct FsckService<'a, C: Catalog> {
    catalog: &'a C,
    content: &'a ContentDir,
}

impl<'a, C: Catalog> FsckService<'a, C> {
    pub fn new(catalog: &'a C, content: &'a ContentDir) -> Self {
        Self { catalog, content }
    }

    /// Checks every catalog atom and returns the findings in hash order.
    pub fn check(&self) -> CatalogResult<Vec<FsckProblem>> {
        let started_at = Instant::now();
        let atoms = self.catalog.get_atoms()?;
        info!("event=fsck module=fsck status=start atoms={}", atoms.len());

        let mut problems = Vec::new();
        for atom in &atoms {
            let finding = match self.content.digest_atom(&atom.hash) {
                Err(err) => Some(FsckProblem::Unreadable {
                    hash: atom.hash.clone(),
                    detail: format!("{}: {err}", self.content.atom_path(&atom.hash).display()),
                }),
                Ok(actual) if actual != atom.hash => Some(FsckProblem::HashMismatch {
                    hash: atom.hash.clone(),
                    actual,
                }),
                Ok(_) => None,
            };

            if let Some(problem) = finding {
                warn!("event=fsck_problem module=fsck status=problem problem={problem}");
                problems.push(problem);
            }
        }

        info!(
            "event=fsck module=fsck status=ok atoms={} problems={} duration_ms={}",
            atoms.len(),
            problems.len(),
            started_at.elapsed().as_millis()
        );
        Ok(problems)
    }
}
