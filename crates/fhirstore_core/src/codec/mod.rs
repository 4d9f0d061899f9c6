//! Codec seam between structured resources and their persisted text form.
//!
//! # Responsibility
//! - Define the encode/decode capability the store depends on.
//! - Keep serialization format choices out of the repository layer.
//!
//! # Invariants
//! - Codecs are pure: they neither own nor retain resource data.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod json;

pub use json::JsonCodec;

pub type CodecResult<T> = Result<T, CodecError>;

/// Converts resources of shape `R` to and from persisted text.
pub trait ResourceCodec<R> {
    fn encode(&self, resource: &R) -> CodecResult<String>;
    fn decode(&self, resource_type: &str, body: &str) -> CodecResult<R>;
}

#[derive(Debug)]
pub enum CodecError {
    Json(serde_json::Error),
    NotAnObject,
    MissingResourceType,
    TypeMismatch { expected: String, found: String },
    /// Body `id` differs from the id the resource is keyed by.
    IdMismatch { expected: String, found: String },
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "{err}"),
            Self::NotAnObject => write!(f, "resource body is not a JSON object"),
            Self::MissingResourceType => write!(f, "resource body has no `resourceType`"),
            Self::TypeMismatch { expected, found } => write!(
                f,
                "resource body has type `{found}`, expected `{expected}`"
            ),
            Self::IdMismatch { expected, found } => write!(
                f,
                "resource body has id `{found}`, expected `{expected}`"
            ),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::NotAnObject
            | Self::MissingResourceType
            | Self::TypeMismatch { .. }
            | Self::IdMismatch { .. } => None,
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
