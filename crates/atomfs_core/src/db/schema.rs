//! Catalog schema installation and verification.
//!
//! The catalog has a single schema version. `install` writes it into an empty
//! database; `verify` checks that a connection really carries it, including
//! the foreign-key actions the collector and lifecycle code depend on.

use crate::db::{DbError, DbResult};
use rusqlite::{Connection, OptionalExtension};

/// Schema version stored in `PRAGMA user_version`.
pub const CATALOG_SCHEMA_VERSION: u32 = 1;

const CATALOG_SQL: &str = include_str!("catalog.sql");
const CATALOG_TABLES: [&str; 3] = ["atoms", "molecules", "molecule_atoms"];

/// `(column, table it references, required ON DELETE action)`.
const USAGE_REFERENCES: [(&str, &str, &str); 2] = [
    ("molecule_id", "molecules", "CASCADE"),
    ("atom_id", "atoms", "RESTRICT"),
];

/// Installs the catalog schema on an empty database; leaves a current one
/// untouched.
pub fn install(conn: &mut Connection) -> DbResult<()> {
    match schema_version(conn)? {
        0 => {
            let tx = conn.transaction()?;
            tx.execute_batch(CATALOG_SQL)?;
            tx.pragma_update(None, "user_version", CATALOG_SCHEMA_VERSION)?;
            tx.commit()?;
            Ok(())
        }
        CATALOG_SCHEMA_VERSION => Ok(()),
        found => Err(DbError::NewerSchema {
            found,
            supported: CATALOG_SCHEMA_VERSION,
        }),
    }
}

/// Checks version, tables, foreign-key enforcement and delete actions.
pub fn verify(conn: &Connection) -> DbResult<()> {
    match schema_version(conn)? {
        0 => return Err(DbError::Uninitialized),
        CATALOG_SCHEMA_VERSION => {}
        found => {
            return Err(DbError::NewerSchema {
                found,
                supported: CATALOG_SCHEMA_VERSION,
            })
        }
    }

    for table in CATALOG_TABLES {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [table],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(DbError::MissingTable(table));
        }
    }

    let enforced: bool = conn.query_row("PRAGMA foreign_keys;", [], |row| row.get(0))?;
    if !enforced {
        return Err(DbError::ForeignKeysOff);
    }

    for (column, parent, expected) in USAGE_REFERENCES {
        let found: Option<String> = conn
            .query_row(
                "SELECT on_delete FROM pragma_foreign_key_list('molecule_atoms')
                 WHERE \"from\" = ?1 AND \"table\" = ?2;",
                [column, parent],
                |row| row.get(0),
            )
            .optional()?;
        match found {
            Some(action) if action.eq_ignore_ascii_case(expected) => {}
            other => {
                return Err(DbError::ForeignKeyPolicy {
                    column,
                    expected,
                    found: other.unwrap_or_else(|| "no reference".to_string()),
                })
            }
        }
    }
    Ok(())
}

fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}
