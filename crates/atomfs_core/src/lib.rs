//! Content-addressed atom store with named molecule snapshots.
//!
//! Atoms are immutable content files named by their SHA-256 digest; molecules
//! are named, ordered stacks of atoms recorded in a SQLite catalog. This crate
//! verifies atom integrity, garbage-collects unreferenced atoms and orphaned
//! content files, and copies or deletes molecules without breaking the
//! molecule -> atom references.

pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod instance;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::Config;
pub use content::ContentDir;
pub use error::{IoOp, StoreError, StoreResult};
pub use instance::{with_instance, Instance};
pub use logging::{default_log_level, init_logging, logging_status, LogConfig, LoggingError};
pub use model::atom::{Atom, AtomHash, AtomId, InvalidHashError};
pub use model::molecule::{Molecule, MoleculeId};
pub use model::RecordKind;
pub use repo::catalog_repo::{Catalog, CatalogError, CatalogResult, SqliteCatalog};
pub use service::fsck::{FsckProblem, FsckService};
pub use service::gc::{GcReport, GcService};
pub use service::molecule_service::MoleculeService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
