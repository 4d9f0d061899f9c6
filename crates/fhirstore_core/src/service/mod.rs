//! Store facade over repository and codec.
//!
//! # Responsibility
//! - Validate keys and run the codec before delegating to a repository.
//! - Keep callers decoupled from SQL and serialization details.

pub mod resource_store;
