//! Resource model seen by the store.
//!
//! # Responsibility
//! - Describe the only facts the store needs about a resource: a type tag,
//!   an id and a serializable body.
//! - Map resource shapes to type tags statically, without runtime
//!   introspection.
//!
//! # Invariants
//! - Every persisted resource is addressed by a validated `ResourceKey`.

pub mod key;
pub mod resource;
