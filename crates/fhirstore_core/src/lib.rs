//! Durable, uniquely keyed storage for FHIR resources.
//! Resources are addressed by `(resource_type, id)` and persisted as
//! serialized text in a single SQLite table.

pub mod codec;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use codec::{CodecError, CodecResult, JsonCodec, ResourceCodec};
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LoggingError,
};
pub use model::key::{is_known_resource_type, KeyError, ResourceKey};
pub use model::resource::{FhirResource, Resource, TypedResource};
pub use repo::resource_repo::{ResourceRepository, SqliteResourceRepository};
pub use service::resource_store::ResourceStore;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
