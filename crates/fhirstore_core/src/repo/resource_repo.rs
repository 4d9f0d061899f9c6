//! Resource repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert/select/update/delete over the `resources` table.
//! - Translate engine outcomes into `StoreError` semantics.
//!
//! # Invariants
//! - Insert relies on the unique index; a `SQLITE_CONSTRAINT_UNIQUE` failure
//!   is the only way `AlreadyExists` is produced.
//! - A key matching more than one row is reported as a storage fault and
//!   never silently resolved to one of the rows.
//! - Update and delete touch at most one row; anything else is rolled back.

use crate::db::{ensure_schema, DbError};
use crate::error::{StoreError, StoreResult};
use crate::model::key::ResourceKey;
use rusqlite::{ffi, params, Connection, ErrorCode, Transaction, TransactionBehavior};

/// Repository interface for serialized resource bodies addressed by key.
pub trait ResourceRepository {
    fn insert_record(&self, key: &ResourceKey, body: &str) -> StoreResult<()>;
    fn select_record(&self, key: &ResourceKey) -> StoreResult<String>;
    fn update_record(&self, key: &ResourceKey, body: &str) -> StoreResult<()>;
    fn delete_record(&self, key: &ResourceKey) -> StoreResult<()>;
}

/// SQLite-backed resource repository.
///
/// Update and delete open their own `IMMEDIATE` transaction, so they must be
/// called on a connection in autocommit mode. With a caller transaction
/// still open they fail with `StoreError::Unsupported` and change nothing.
pub struct SqliteResourceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteResourceRepository<'conn> {
    /// Wraps `conn`, creating the resource schema if this is its first use.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_schema(conn)?;
        Ok(Self { conn })
    }

    fn begin_single_row_write(&self) -> StoreResult<Transaction<'conn>> {
        if !self.conn.is_autocommit() {
            return Err(StoreError::Unsupported(
                "update/delete inside a caller-owned transaction; commit or roll it back first"
                    .to_string(),
            ));
        }
        // Why: take the write lock up front so concurrent writers queue on
        // busy_timeout instead of failing on a read-to-write lock upgrade.
        Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate).map_err(Into::into)
    }
}

impl ResourceRepository for SqliteResourceRepository<'_> {
    fn insert_record(&self, key: &ResourceKey, body: &str) -> StoreResult<()> {
        let inserted = self.conn.execute(
            "INSERT INTO resources (
                resource_type,
                resource_id,
                resource
            ) VALUES (?1, ?2, ?3);",
            params![key.resource_type(), key.id(), body],
        );

        match inserted {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => Err(StoreError::AlreadyExists(key.clone())),
            Err(err) => Err(err.into()),
        }
    }

    fn select_record(&self, key: &ResourceKey) -> StoreResult<String> {
        let mut stmt = self.conn.prepare(
            "SELECT resource
             FROM resources
             WHERE resource_type = ?1
               AND resource_id = ?2
             LIMIT 2;",
        )?;

        // Why: one row is the answer and a second proves the index is broken;
        // reading further cannot change the outcome.
        let mut rows = stmt.query(params![key.resource_type(), key.id()])?;
        let mut bodies = Vec::with_capacity(2);
        while let Some(row) = rows.next()? {
            bodies.push(row.get::<_, String>(0)?);
        }

        match bodies.len() {
            0 => Err(StoreError::NotFound(key.clone())),
            1 => Ok(bodies.remove(0)),
            count => Err(duplicate_records(key, count)),
        }
    }

    fn update_record(&self, key: &ResourceKey, body: &str) -> StoreResult<()> {
        let tx = self.begin_single_row_write()?;
        let changed = tx.execute(
            "UPDATE resources
             SET resource = ?3
             WHERE resource_type = ?1
               AND resource_id = ?2;",
            params![key.resource_type(), key.id(), body],
        )?;
        finish_single_row_write(tx, key, changed)
    }

    fn delete_record(&self, key: &ResourceKey) -> StoreResult<()> {
        let tx = self.begin_single_row_write()?;
        let changed = tx.execute(
            "DELETE FROM resources
             WHERE resource_type = ?1
               AND resource_id = ?2;",
            params![key.resource_type(), key.id()],
        )?;
        finish_single_row_write(tx, key, changed)
    }
}

/// Commits `tx` only when exactly one row changed. Dropping `tx` rolls back.
fn finish_single_row_write(
    tx: Transaction<'_>,
    key: &ResourceKey,
    changed: usize,
) -> StoreResult<()> {
    match changed {
        0 => Err(StoreError::NotFound(key.clone())),
        1 => {
            tx.commit()?;
            Ok(())
        }
        count => Err(duplicate_records(key, count)),
    }
}

fn duplicate_records(key: &ResourceKey, count: usize) -> StoreError {
    StoreError::StorageFault(DbError::DuplicateRecords {
        resource_type: key.resource_type().to_string(),
        id: key.id().to_string(),
        count,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}
