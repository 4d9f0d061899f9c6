//! SQLite storage bootstrap and schema entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the resource store.
//! - Create the `resources` table and its unique key index on first use.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write resources before `ensure_schema` succeeds.
//! - Schema evolution is not supported; any foreign version is rejected.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory, open_db_with_config};
pub use schema::{ensure_schema, SCHEMA_VERSION};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// More than one row carries the same `(resource_type, resource_id)`.
    ///
    /// The unique index makes this unreachable on a healthy database.
    DuplicateRecords {
        resource_type: String,
        id: String,
        count: usize,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} cannot be used with supported version {latest_supported}; schema upgrades are not implemented"
            ),
            Self::DuplicateRecords {
                resource_type,
                id,
                count,
            } => write!(
                f,
                "unexpected number of records ({count}) for {resource_type}/{id}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
            Self::DuplicateRecords { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
