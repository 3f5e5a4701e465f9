//! Catalog contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist atom and molecule records and the molecule -> atom usage relation.
//! - Answer the liveness query GC relies on (`get_unused_atoms`).
//!
//! # Invariants
//! - Every hash listed by a molecule resolves to an existing atom row.
//! - Molecule names are unique; atom hashes are unique.
//! - Deleting a molecule never deletes atoms.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::{open_db, open_db_in_memory, schema, DbError};
use crate::model::atom::{Atom, AtomHash, AtomId};
use crate::model::molecule::{Molecule, MoleculeId};
use crate::model::RecordKind;
use log::debug;
use rusqlite::{
    params, Connection, ErrorCode, OptionalExtension, Row, Transaction, TransactionBehavior,
};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use uuid::Uuid;

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors from catalog reads and writes.
#[derive(Debug)]
pub enum CatalogError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// No molecule is registered under this name.
    MoleculeNotFound(String),
    /// Delete-by-ID matched no row.
    RecordNotFound { kind: RecordKind, id: Uuid },
    /// A molecule with this name already exists.
    MoleculeExists(String),
    /// An atom record with this hash already exists.
    AtomExists(AtomHash),
    /// A molecule referenced a hash with no atom record.
    UnknownAtom(AtomHash),
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
}

impl CatalogError {
    /// True for "does not exist" conditions, as opposed to storage failures.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::MoleculeNotFound(_) | Self::RecordNotFound { .. })
    }
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MoleculeNotFound(name) => write!(f, "molecule not found: {name}"),
            Self::RecordNotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::MoleculeExists(name) => write!(f, "molecule already exists: {name}"),
            Self::AtomExists(hash) => write!(f, "atom already exists: {hash}"),
            Self::UnknownAtom(hash) => write!(f, "molecule references unknown atom {hash}"),
            Self::InvalidData(message) => write!(f, "invalid catalog data: {message}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for CatalogError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for CatalogError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Record store consumed by the checker, the collector and molecule
/// lifecycle operations.
pub trait Catalog {
    /// All atom records, ordered by hash.
    fn get_atoms(&self) -> CatalogResult<Vec<Atom>>;
    /// Atoms listed by zero molecules, ordered by hash.
    fn get_unused_atoms(&self) -> CatalogResult<Vec<Atom>>;
    /// Looks up one atom record by content hash.
    fn get_atom(&self, hash: &AtomHash) -> CatalogResult<Option<Atom>>;
    /// Registers an atom record for content already placed on disk.
    fn create_atom(&self, hash: &AtomHash) -> CatalogResult<Atom>;
    /// Removes one record by kind and ID.
    fn delete(&self, id: Uuid, kind: RecordKind) -> CatalogResult<()>;
    /// Loads one molecule with its ordered atom list.
    fn get_molecule(&self, name: &str) -> CatalogResult<Molecule>;
    /// Lists all molecules ordered by name.
    fn list_molecules(&self) -> CatalogResult<Vec<Molecule>>;
    /// Creates a molecule referencing `atoms` in the given order.
    fn create_molecule(&self, name: &str, atoms: &[AtomHash]) -> CatalogResult<Molecule>;
}

/// SQLite-backed catalog owning its connection.
pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    /// Opens the catalog file, installing the schema when it is new.
    pub fn open(path: impl AsRef<Path>) -> CatalogResult<Self> {
        Ok(Self {
            conn: open_db(path)?,
        })
    }

    /// Opens an empty in-memory catalog.
    pub fn open_in_memory() -> CatalogResult<Self> {
        Ok(Self {
            conn: open_db_in_memory()?,
        })
    }

    /// Wraps a connection that already carries a verified catalog schema.
    pub fn try_new(conn: Connection) -> CatalogResult<Self> {
        schema::verify(&conn)?;
        Ok(Self { conn })
    }

    /// Raw connection, for inspection in tooling and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Releases the connection, surfacing any close failure.
    pub fn close(self) -> CatalogResult<()> {
        self.conn.close().map_err(|(_, err)| CatalogError::from(err))
    }
}

impl Catalog for SqliteCatalog {
    fn get_atoms(&self) -> CatalogResult<Vec<Atom>> {
        query_atoms(&self.conn, "SELECT id, hash FROM atoms ORDER BY hash ASC;")
    }

    fn get_unused_atoms(&self) -> CatalogResult<Vec<Atom>> {
        query_atoms(
            &self.conn,
            "SELECT a.id AS id, a.hash AS hash
             FROM atoms a
             WHERE NOT EXISTS (
                 SELECT 1 FROM molecule_atoms ma WHERE ma.atom_id = a.id
             )
             ORDER BY a.hash ASC;",
        )
    }

    fn get_atom(&self, hash: &AtomHash) -> CatalogResult<Option<Atom>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, hash FROM atoms WHERE hash = ?1;")?;
        let mut rows = stmt.query([hash.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_atom_row(row)?));
        }
        Ok(None)
    }

    fn create_atom(&self, hash: &AtomHash) -> CatalogResult<Atom> {
        let atom = Atom::new(hash.clone());
        self.conn
            .execute(
                "INSERT INTO atoms (id, hash) VALUES (?1, ?2);",
                params![atom.id.to_string(), atom.hash.as_str()],
            )
            .map_err(|err| {
                if is_constraint_violation(&err) {
                    CatalogError::AtomExists(hash.clone())
                } else {
                    err.into()
                }
            })?;
        debug!("event=catalog_write module=catalog status=ok kind=atom hash={hash}");
        Ok(atom)
    }

    fn delete(&self, id: Uuid, kind: RecordKind) -> CatalogResult<()> {
        let sql = match kind {
            RecordKind::Atom => "DELETE FROM atoms WHERE id = ?1;",
            RecordKind::Molecule => "DELETE FROM molecules WHERE id = ?1;",
        };
        let changed = self.conn.execute(sql, [id.to_string()])?;
        if changed == 0 {
            return Err(CatalogError::RecordNotFound { kind, id });
        }
        debug!("event=catalog_delete module=catalog status=ok kind={kind} id={id}");
        Ok(())
    }

    fn get_molecule(&self, name: &str) -> CatalogResult<Molecule> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM molecules WHERE name = ?1;",
                [name],
                |row| row.get::<_, String>(0),
            )
            .optional()?
            .ok_or_else(|| CatalogError::MoleculeNotFound(name.to_string()))?;
        let id = parse_uuid(&id, "molecules.id")?;
        load_molecule(&self.conn, id, name.to_string())
    }

    fn list_molecules(&self) -> CatalogResult<Vec<Molecule>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM molecules ORDER BY name ASC;")?;
        let heads = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        drop(stmt);

        let mut molecules = Vec::with_capacity(heads.len());
        for (id, name) in heads {
            let id = parse_uuid(&id, "molecules.id")?;
            molecules.push(load_molecule(&self.conn, id, name)?);
        }
        Ok(molecules)
    }

    fn create_molecule(&self, name: &str, atoms: &[AtomHash]) -> CatalogResult<Molecule> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;

        let mut atom_ids = Vec::with_capacity(atoms.len());
        for hash in atoms {
            let atom_id = tx
                .query_row("SELECT id FROM atoms WHERE hash = ?1;", [hash.as_str()], |row| {
                    row.get::<_, String>(0)
                })
                .optional()?
                .ok_or_else(|| CatalogError::UnknownAtom(hash.clone()))?;
            atom_ids.push(atom_id);
        }

        let molecule_id: MoleculeId = Uuid::new_v4();
        tx.execute(
            "INSERT INTO molecules (id, name) VALUES (?1, ?2);",
            params![molecule_id.to_string(), name],
        )
        .map_err(|err| {
            if is_constraint_violation(&err) {
                CatalogError::MoleculeExists(name.to_string())
            } else {
                err.into()
            }
        })?;

        {
            let mut insert = tx.prepare(
                "INSERT INTO molecule_atoms (molecule_id, position, atom_id)
                 VALUES (?1, ?2, ?3);",
            )?;
            for (position, atom_id) in atom_ids.iter().enumerate() {
                insert.execute(params![molecule_id.to_string(), position as i64, atom_id])?;
            }
        }
        tx.commit()?;

        debug!(
            "event=catalog_write module=catalog status=ok kind=molecule name={name} atoms={}",
            atoms.len()
        );
        Ok(Molecule {
            id: molecule_id,
            name: name.to_string(),
            atoms: atoms.to_vec(),
        })
    }
}

fn query_atoms(conn: &Connection, sql: &str) -> CatalogResult<Vec<Atom>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([])?;
    let mut atoms = Vec::new();
    while let Some(row) = rows.next()? {
        atoms.push(parse_atom_row(row)?);
    }
    Ok(atoms)
}

fn load_molecule(conn: &Connection, id: MoleculeId, name: String) -> CatalogResult<Molecule> {
    let mut stmt = conn.prepare(
        "SELECT a.hash
         FROM molecule_atoms ma
         JOIN atoms a ON a.id = ma.atom_id
         WHERE ma.molecule_id = ?1
         ORDER BY ma.position ASC;",
    )?;
    let mut rows = stmt.query([id.to_string()])?;
    let mut atoms = Vec::new();
    while let Some(row) = rows.next()? {
        let hash_text: String = row.get(0)?;
        atoms.push(parse_hash(hash_text)?);
    }
    Ok(Molecule { id, name, atoms })
}

fn parse_atom_row(row: &Row<'_>) -> CatalogResult<Atom> {
    let id_text: String = row.get("id")?;
    let id: AtomId = parse_uuid(&id_text, "atoms.id")?;
    let hash = parse_hash(row.get("hash")?)?;
    Ok(Atom { id, hash })
}

fn parse_uuid(value: &str, column: &str) -> CatalogResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| CatalogError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn parse_hash(value: String) -> CatalogResult<AtomHash> {
    AtomHash::parse(value).map_err(|err| CatalogError::InvalidData(format!("atoms.hash: {err}")))
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _) if inner.code == ErrorCode::ConstraintViolation
    )
}
