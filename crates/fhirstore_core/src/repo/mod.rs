//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define key-oriented data access contracts over serialized bodies.
//! - Isolate SQLite query details from the store facade.
//!
//! # Invariants
//! - Key uniqueness violations are detected from the engine's constraint
//!   error, never from a read-before-write check.
//! - Repository APIs return semantic errors (`AlreadyExists`, `NotFound`) in
//!   addition to storage faults.

pub mod resource_repo;
