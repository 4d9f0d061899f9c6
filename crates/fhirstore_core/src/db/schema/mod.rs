//! Resource table schema and its idempotent bootstrap.
//!
//! # Responsibility
//! - Create the `resources` table and the `(resource_type, resource_id)`
//!   unique index on a fresh database.
//! - Refuse databases stamped with any other schema version.
//!
//! # Invariants
//! - `PRAGMA user_version` equals `SCHEMA_VERSION` once bootstrap succeeds.
//! - Key uniqueness is enforced by the index, never by application checks.

use crate::db::{DbError, DbResult};
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Schema version written by this binary. There is no upgrade path.
pub const SCHEMA_VERSION: u32 = 1;

const CREATE_RESOURCES_SQL: &str = include_str!("0001_resources.sql");

/// Ensures the resource schema exists on `conn`.
///
/// Calling this on an initialized database is a no-op. Bootstrap runs in an
/// `IMMEDIATE` transaction so concurrent callers on the same file serialize
/// on the write lock and only one of them creates the table.
///
/// # Errors
/// - `DbError::UnsupportedSchemaVersion` when the database carries a schema
///   version other than `0` (fresh) or `SCHEMA_VERSION`.
/// - `DbError::Sqlite` for engine failures.
pub fn ensure_schema(conn: &Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    if current_version == SCHEMA_VERSION {
        return Ok(());
    }
    if current_version != 0 {
        return Err(unsupported(current_version));
    }

    // Why: concurrent bootstraps on one file must serialize on the write lock;
    // a deferred transaction would let two readers both see version 0.
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    // Another connection may have finished bootstrap while we waited for the lock.
    match current_user_version(&tx)? {
        0 => {
            tx.execute_batch(CREATE_RESOURCES_SQL)?;
            tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
        }
        SCHEMA_VERSION => {}
        other => return Err(unsupported(other)),
    }
    tx.commit()?;

    Ok(())
}

fn unsupported(db_version: u32) -> DbError {
    DbError::UnsupportedSchemaVersion {
        db_version,
        latest_supported: SCHEMA_VERSION,
    }
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::{ensure_schema, SCHEMA_VERSION};
    use crate::db::DbError;
    use rusqlite::Connection;

    fn index_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master
                 WHERE type = 'index' AND tbl_name = 'resources' AND sql IS NOT NULL
                 ORDER BY name;",
            )
            .unwrap();
        stmt.query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap()
    }

    #[test]
    fn fresh_database_gets_table_and_unique_index() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();

        let version: u32 = conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
        assert_eq!(
            index_names(&conn),
            vec!["resources_resource_type_resource_id".to_string()]
        );
    }

    #[test]
    fn second_bootstrap_is_a_no_op() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        assert_eq!(index_names(&conn).len(), 1);
    }

    #[test]
    fn foreign_schema_version_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA user_version = 7;").unwrap();
        let err = ensure_schema(&conn).unwrap_err();
        assert!(matches!(
            err,
            DbError::UnsupportedSchemaVersion {
                db_version: 7,
                latest_supported: SCHEMA_VERSION,
            }
        ));
    }
}
