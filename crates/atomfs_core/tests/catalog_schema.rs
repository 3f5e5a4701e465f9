use atomfs_core::db::schema::{self, CATALOG_SCHEMA_VERSION};
use atomfs_core::db::{open_db, open_db_in_memory, DbError};
use atomfs_core::{Catalog, CatalogError, SqliteCatalog};
use rusqlite::{params, Connection, ErrorCode};

const ATOM_ID: &str = "00000000-0000-4000-8000-000000000001";
const MOLECULE_ID: &str = "00000000-0000-4000-8000-000000000002";

fn seed_usage(conn: &Connection) {
    conn.execute(
        "INSERT INTO atoms (id, hash) VALUES (?1, ?2);",
        params![ATOM_ID, "a".repeat(64)],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO molecules (id, name) VALUES (?1, 'base');",
        [MOLECULE_ID],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO molecule_atoms (molecule_id, position, atom_id) VALUES (?1, 0, ?2);",
        [MOLECULE_ID, ATOM_ID],
    )
    .unwrap();
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| row.get(0))
        .unwrap()
}

#[test]
fn fresh_catalog_passes_verification() {
    let conn = open_db_in_memory().unwrap();

    schema::verify(&conn).unwrap();
    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, CATALOG_SCHEMA_VERSION);
}

#[test]
fn deleting_molecule_cascades_to_usage_rows_only() {
    let conn = open_db_in_memory().unwrap();
    seed_usage(&conn);

    conn.execute("DELETE FROM molecules WHERE id = ?1;", [MOLECULE_ID])
        .unwrap();

    assert_eq!(count(&conn, "molecule_atoms"), 0);
    assert_eq!(count(&conn, "atoms"), 1);
}

#[test]
fn deleting_used_atom_is_restricted() {
    let conn = open_db_in_memory().unwrap();
    seed_usage(&conn);

    let err = conn
        .execute("DELETE FROM atoms WHERE id = ?1;", [ATOM_ID])
        .unwrap_err();

    assert_eq!(err.sqlite_error_code(), Some(ErrorCode::ConstraintViolation));
    assert_eq!(count(&conn, "atoms"), 1);
    assert_eq!(count(&conn, "molecule_atoms"), 1);
}

#[test]
fn usage_row_cannot_reference_unknown_atom() {
    let conn = open_db_in_memory().unwrap();
    seed_usage(&conn);

    let err = conn
        .execute(
            "INSERT INTO molecule_atoms (molecule_id, position, atom_id) VALUES (?1, 1, 'ghost');",
            [MOLECULE_ID],
        )
        .unwrap_err();

    assert_eq!(err.sqlite_error_code(), Some(ErrorCode::ConstraintViolation));
}

#[test]
fn reopening_catalog_keeps_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("atomfs.db");
    seed_usage(&open_db(&path).unwrap());

    let catalog = SqliteCatalog::open(&path).unwrap();

    assert_eq!(catalog.get_molecule("base").unwrap().atoms.len(), 1);
}

#[test]
fn newer_catalog_schema_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");
    Connection::open(&path)
        .unwrap()
        .execute_batch("PRAGMA user_version = 999;")
        .unwrap();

    match open_db(&path).unwrap_err() {
        DbError::NewerSchema { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, CATALOG_SCHEMA_VERSION);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn catalog_with_wrong_delete_policy_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("loose.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE atoms (id TEXT PRIMARY KEY, hash TEXT NOT NULL UNIQUE);
         CREATE TABLE molecules (id TEXT PRIMARY KEY, name TEXT NOT NULL UNIQUE);
         CREATE TABLE molecule_atoms (
             molecule_id TEXT NOT NULL REFERENCES molecules(id) ON DELETE CASCADE,
             position INTEGER NOT NULL,
             atom_id TEXT NOT NULL REFERENCES atoms(id) ON DELETE CASCADE,
             PRIMARY KEY (molecule_id, position)
         );
         PRAGMA user_version = 1;",
    )
    .unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();

    assert!(matches!(
        err,
        DbError::ForeignKeyPolicy { column: "atom_id", ref found, .. } if found == "CASCADE"
    ));
}

#[test]
fn verification_reports_missing_table() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("DROP TABLE molecule_atoms;").unwrap();

    assert!(matches!(
        schema::verify(&conn),
        Err(DbError::MissingTable("molecule_atoms"))
    ));
}

#[test]
fn verification_requires_foreign_keys() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("PRAGMA foreign_keys = OFF;").unwrap();

    assert!(matches!(schema::verify(&conn), Err(DbError::ForeignKeysOff)));
}

#[test]
fn catalog_rejects_connection_without_schema() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteCatalog::try_new(conn).err().unwrap();

    assert!(matches!(err, CatalogError::Db(DbError::Uninitialized)));
}
