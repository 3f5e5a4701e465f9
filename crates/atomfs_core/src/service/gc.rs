//! Garbage collector.
//!
//! # Responsibility
//! - Phase 1: delete catalog records of atoms no molecule references.
//! - Phase 2: delete content files that have no catalog record.
//!
//! # Invariants
//! - Fail-fast: the first catalog or filesystem error aborts the pass.
//! - Dry run performs every read of a real pass and no mutation.
//! - Phase 2 reads the catalog after phase 1, so files of atoms pruned in
//!   phase 1 are removed in the same pass.
//! - The two phases are not atomic: a failure in phase 2 leaves phase 1
//!   applied. Callers serialize GC against every other mutator.

use crate::content::ContentDir;
use crate::error::StoreResult;
use crate::model::atom::AtomHash;
use crate::model::RecordKind;
use crate::repo::catalog_repo::Catalog;
use log::{debug, info};
use serde::Serialize;
use std::collections::HashSet;
use std::time::Instant;

/// Outcome of one collection pass.
///
/// In dry-run mode the lists name what a real pass would have removed,
/// with phase 2 evaluated against the unpruned catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GcReport {
    pub dry_run: bool,
    /// Unreferenced atoms whose catalog records were (or would be) deleted.
    pub pruned_atoms: Vec<AtomHash>,
    /// Content file names with no catalog record, removed (or to remove).
    pub removed_files: Vec<String>,
}

/// Two-phase reclamation over catalog and content directory.
pub struct GcService<'a, C: Catalog> {
    catalog: &'a C,
    content: &'a ContentDir,
}

impl<'a, C: Catalog> GcService<'a, C> {
    pub fn new(catalog: &'a C, content: &'a ContentDir) -> Self {
        Self { catalog, content }
    }

    pub fn collect(&self, dry_run: bool) -> StoreResult<GcReport> {
        let started_at = Instant::now();
        info!("event=gc module=gc status=start dry_run={dry_run}");

        let mut report = GcReport {
            dry_run,
            ..GcReport::default()
        };

        for atom in self.catalog.get_unused_atoms()? {
            if !dry_run {
                self.catalog.delete(atom.id, RecordKind::Atom)?;
            }
            debug!(
                "event=gc_prune module=gc status=ok dry_run={dry_run} hash={}",
                atom.hash
            );
            report.pruned_atoms.push(atom.hash);
        }

        let on_disk = self.content.list_entries()?;
        let in_catalog = self.catalog.get_atoms()?;
        let known: HashSet<&str> = in_catalog.iter().map(|atom| atom.hash.as_str()).collect();

        for name in on_disk {
            if name.to_str().is_some_and(|name| known.contains(name)) {
                continue;
            }
            if !dry_run {
                self.content.remove_entry(&name)?;
            }
            let name = name.to_string_lossy().into_owned();
            debug!("event=gc_remove_file module=gc status=ok dry_run={dry_run} name={name}");
            report.removed_files.push(name);
        }

        info!(
            "event=gc module=gc status=ok dry_run={dry_run} pruned_atoms={} removed_files={} duration_ms={}",
            report.pruned_atoms.len(),
            report.removed_files.len(),
            started_at.elapsed().as_millis()
        );
        Ok(report)
    }
}
