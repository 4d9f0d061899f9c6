//! Resource store facade.
//!
//! # Responsibility
//! - Provide insert/select/update/delete entry points keyed by
//!   `(resource_type, id)`.
//! - Validate keys, run the codec and delegate persistence to a repository.
//!
//! # Invariants
//! - Operations run synchronously on the caller's thread; no retries.
//! - Every failure is returned as a `StoreError`; nothing is swallowed.
//! - Log lines carry type, id and timing only, never resource bodies.

use crate::codec::{JsonCodec, ResourceCodec};
use crate::error::{StoreError, StoreResult};
use crate::model::key::ResourceKey;
use crate::model::resource::{Resource, TypedResource};
use crate::repo::resource_repo::{ResourceRepository, SqliteResourceRepository};
use log::{debug, error};
use rusqlite::Connection;
use std::time::Instant;

/// Uniquely keyed storage of serialized resources.
pub struct ResourceStore<R: ResourceRepository, C> {
    repo: R,
    codec: C,
}

impl<'conn> ResourceStore<SqliteResourceRepository<'conn>, JsonCodec> {
    /// SQLite store using FHIR JSON bodies. Ensures the schema on `conn`.
    pub fn sqlite_json(conn: &'conn Connection) -> StoreResult<Self> {
        Ok(Self::new(SqliteResourceRepository::try_new(conn)?, JsonCodec))
    }
}

impl<R: ResourceRepository, C> ResourceStore<R, C> {
    pub fn new(repo: R, codec: C) -> Self {
        Self { repo, codec }
    }

    /// Stores a new resource.
    ///
    /// # Errors
    /// - `AlreadyExists` when a record with the same key is present; the
    ///   stored record is left untouched.
    /// - `InvalidArgument` for an unknown type tag or malformed id.
    pub fn insert<T>(&self, resource: &T) -> StoreResult<()>
    where
        T: Resource,
        C: ResourceCodec<T>,
    {
        let started_at = Instant::now();
        let result = ResourceKey::new(resource.resource_type(), resource.id())
            .map_err(StoreError::from)
            .and_then(|key| {
                let body = self.codec.encode(resource)?;
                self.repo.insert_record(&key, &body)
            });
        log_outcome(
            "resource_insert",
            resource.resource_type(),
            resource.id(),
            started_at,
            &result,
        );
        result
    }

    /// Loads the resource stored under `(resource_type, id)` and decodes it
    /// into `T`.
    pub fn select<T>(&self, resource_type: &str, id: &str) -> StoreResult<T>
    where
        C: ResourceCodec<T>,
    {
        let started_at = Instant::now();
        let result = ResourceKey::new(resource_type, id)
            .map_err(StoreError::from)
            .and_then(|key| {
                let body = self.repo.select_record(&key)?;
                Ok(self.codec.decode(key.resource_type(), &body)?)
            });
        log_outcome("resource_select", resource_type, id, started_at, &result);
        result
    }

    /// `select` with the type tag taken from the target shape.
    pub fn select_typed<T>(&self, id: &str) -> StoreResult<T>
    where
        T: TypedResource,
        C: ResourceCodec<T>,
    {
        self.select(T::RESOURCE_TYPE, id)
    }

    /// Replaces the body of an existing record in place.
    ///
    /// Never creates a record: an absent key fails with `NotFound`.
    pub fn update<T>(&self, resource: &T) -> StoreResult<()>
    where
        T: Resource,
        C: ResourceCodec<T>,
    {
        let started_at = Instant::now();
        let result = ResourceKey::new(resource.resource_type(), resource.id())
            .map_err(StoreError::from)
            .and_then(|key| {
                let body = self.codec.encode(resource)?;
                self.repo.update_record(&key, &body)
            });
        log_outcome(
            "resource_update",
            resource.resource_type(),
            resource.id(),
            started_at,
            &result,
        );
        result
    }

    /// Removes the record stored under `(resource_type, id)`.
    ///
    /// Deleting an absent key fails with `NotFound`.
    pub fn delete(&self, resource_type: &str, id: &str) -> StoreResult<()> {
        let started_at = Instant::now();
        let result = ResourceKey::new(resource_type, id)
            .map_err(StoreError::from)
            .and_then(|key| self.repo.delete_record(&key));
        log_outcome("resource_delete", resource_type, id, started_at, &result);
        result
    }

    pub fn delete_typed<T: TypedResource>(&self, id: &str) -> StoreResult<()> {
        self.delete(T::RESOURCE_TYPE, id)
    }
}

fn log_outcome<T>(
    event: &str,
    resource_type: &str,
    id: &str,
    started_at: Instant,
    result: &StoreResult<T>,
) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(_) => debug!(
            "event={event} module=store status=ok resource_type={resource_type} id={id} duration_ms={duration_ms}"
        ),
        Err(
            err @ (StoreError::AlreadyExists(_)
            | StoreError::NotFound(_)
            | StoreError::InvalidArgument(_)),
        ) => debug!(
            "event={event} module=store status=rejected resource_type={resource_type} id={id} duration_ms={duration_ms} error_code={}",
            err.code()
        ),
        Err(err) => error!(
            "event={event} module=store status=error resource_type={resource_type} id={id} duration_ms={duration_ms} error_code={} error={err}",
            err.code()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::ResourceStore;
    use crate::codec::{CodecError, CodecResult, ResourceCodec};
    use crate::error::{StoreError, StoreResult};
    use crate::model::key::ResourceKey;
    use crate::model::resource::FhirResource;
    use crate::repo::resource_repo::ResourceRepository;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Map-backed repository for exercising the facade without SQLite.
    #[derive(Default)]
    struct MemoryRepository {
        rows: RefCell<HashMap<ResourceKey, String>>,
    }

    impl ResourceRepository for MemoryRepository {
        fn insert_record(&self, key: &ResourceKey, body: &str) -> StoreResult<()> {
            let mut rows = self.rows.borrow_mut();
            if rows.contains_key(key) {
                return Err(StoreError::AlreadyExists(key.clone()));
            }
            rows.insert(key.clone(), body.to_string());
            Ok(())
        }

        fn select_record(&self, key: &ResourceKey) -> StoreResult<String> {
            self.rows
                .borrow()
                .get(key)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(key.clone()))
        }

        fn update_record(&self, key: &ResourceKey, body: &str) -> StoreResult<()> {
            match self.rows.borrow_mut().get_mut(key) {
                Some(row) => {
                    *row = body.to_string();
                    Ok(())
                }
                None => Err(StoreError::NotFound(key.clone())),
            }
        }

        fn delete_record(&self, key: &ResourceKey) -> StoreResult<()> {
            self.rows
                .borrow_mut()
                .remove(key)
                .map(|_| ())
                .ok_or_else(|| StoreError::NotFound(key.clone()))
        }
    }

    /// Stores only the id; decoding always fails.
    struct BrokenCodec;

    impl ResourceCodec<FhirResource> for BrokenCodec {
        fn encode(&self, resource: &FhirResource) -> CodecResult<String> {
            Ok(resource.id.clone())
        }

        fn decode(&self, _resource_type: &str, _body: &str) -> CodecResult<FhirResource> {
            Err(CodecError::NotAnObject)
        }
    }

    #[test]
    fn invalid_keys_never_reach_the_repository() {
        let store = ResourceStore::new(MemoryRepository::default(), BrokenCodec);

        let err = store
            .insert(&FhirResource::with_id("NotAType", "1"))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));

        let err = store
            .insert(&FhirResource::with_id("Patient", ""))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));

        assert!(store.repo.rows.borrow().is_empty());
    }

    #[test]
    fn decode_failures_surface_as_codec_errors() {
        let store = ResourceStore::new(MemoryRepository::default(), BrokenCodec);
        store.insert(&FhirResource::with_id("Patient", "1")).unwrap();

        let err = store.select::<FhirResource>("Patient", "1").unwrap_err();
        assert!(matches!(err, StoreError::Codec(CodecError::NotAnObject)));
    }
}
