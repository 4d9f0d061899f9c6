//! Error taxonomy surfaced by the resource store.
//!
//! # Responsibility
//! - Give callers one exhaustive error type for every store operation.
//! - Keep recoverable outcomes (`AlreadyExists`, `NotFound`) distinct from
//!   faults that indicate corruption or engine failure.
//!
//! # Invariants
//! - No operation swallows an error into a placeholder result.
//! - `StorageFault` is never retried by the store.

use crate::codec::CodecError;
use crate::db::DbError;
use crate::model::key::{KeyError, ResourceKey};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    /// Insert hit the `(resource_type, resource_id)` unique index.
    AlreadyExists(ResourceKey),
    NotFound(ResourceKey),
    /// Unknown type tag or malformed id.
    InvalidArgument(String),
    Codec(CodecError),
    /// Engine failure or a broken uniqueness invariant.
    StorageFault(DbError),
    /// The database needs a capability this build does not have.
    Unsupported(String),
}

impl StoreError {
    /// Stable short code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AlreadyExists(_) => "already_exists",
            Self::NotFound(_) => "not_found",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Codec(_) => "codec_error",
            Self::StorageFault(_) => "storage_fault",
            Self::Unsupported(_) => "unsupported",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyExists(key) => write!(f, "resource already exists: {key}"),
            Self::NotFound(key) => write!(f, "resource not found: {key}"),
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::Codec(err) => write!(f, "codec error: {err}"),
            Self::StorageFault(err) => write!(f, "storage fault: {err}"),
            Self::Unsupported(message) => write!(f, "unsupported: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Codec(err) => Some(err),
            Self::StorageFault(err) => Some(err),
            Self::AlreadyExists(_)
            | Self::NotFound(_)
            | Self::InvalidArgument(_)
            | Self::Unsupported(_) => None,
        }
    }
}

impl From<KeyError> for StoreError {
    fn from(value: KeyError) -> Self {
        Self::InvalidArgument(value.to_string())
    }
}

impl From<CodecError> for StoreError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::UnsupportedSchemaVersion { .. } => Self::Unsupported(value.to_string()),
            other => Self::StorageFault(other),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::StorageFault(DbError::Sqlite(value))
    }
}
