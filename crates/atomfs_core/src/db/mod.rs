//! Catalog storage bootstrap.
//!
//! # Responsibility
//! - Open the SQLite file backing the catalog.
//! - Install the catalog schema on first open and verify it on every open.
//!
//! # Invariants
//! - A returned connection has foreign keys enforced and the molecule -> atom
//!   delete policies (`CASCADE` from molecules, `RESTRICT` from atoms) in place.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Why a connection cannot serve as a catalog.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a newer atomfs.
    NewerSchema { found: u32, supported: u32 },
    /// The connection never had the catalog schema installed.
    Uninitialized,
    /// A catalog table is absent.
    MissingTable(&'static str),
    /// `PRAGMA foreign_keys` is off, so atom references are not enforced.
    ForeignKeysOff,
    /// A `molecule_atoms` reference deletes with the wrong action.
    ForeignKeyPolicy {
        column: &'static str,
        expected: &'static str,
        found: String,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "catalog storage error: {err}"),
            Self::NewerSchema { found, supported } => write!(
                f,
                "catalog schema {found} was written by a newer atomfs (supported: {supported})"
            ),
            Self::Uninitialized => f.write_str("connection has no catalog schema installed"),
            Self::MissingTable(table) => write!(f, "catalog table `{table}` is missing"),
            Self::ForeignKeysOff => f.write_str("foreign key enforcement is disabled"),
            Self::ForeignKeyPolicy {
                column,
                expected,
                found,
            } => write!(
                f,
                "molecule_atoms.{column} must delete with {expected}, found {found}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
