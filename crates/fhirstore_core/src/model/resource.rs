//! Resource traits and the generic FHIR JSON resource.
//!
//! # Responsibility
//! - Expose type tag and id of any storable resource.
//! - Bind concrete resource shapes to their FHIR type tag at compile time.
//!
//! # Invariants
//! - `TypedResource::RESOURCE_TYPE` must equal what `resource_type()` returns
//!   for every value of that shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Anything the store can persist: a type tag, an id and a body the codec
/// knows how to serialize.
pub trait Resource {
    fn resource_type(&self) -> &str;
    fn id(&self) -> &str;
}

/// A resource shape that always carries the same type tag.
///
/// Used where a caller names the target shape instead of a type string,
/// e.g. `store.select_typed::<Patient>("123")`.
pub trait TypedResource: Resource {
    const RESOURCE_TYPE: &'static str;
}

/// Schema-less FHIR resource in its JSON form.
///
/// `resourceType` and `id` are lifted out; every other element is kept as-is
/// in `elements`, so the store round-trips fields it knows nothing about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FhirResource {
    #[serde(rename = "resourceType")]
    pub resource_type: String,
    pub id: String,
    #[serde(flatten)]
    pub elements: Map<String, Value>,
}

impl FhirResource {
    /// Creates an empty resource with a generated UUID v4 id.
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self::with_id(resource_type, Uuid::new_v4().to_string())
    }

    /// Creates an empty resource with a caller-provided id.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            elements: Map::new(),
        }
    }

    /// Sets one top-level element, replacing any previous value.
    ///
    /// `resourceType` and `id` are identity, not elements: they are ignored
    /// here and must be set through the struct fields.
    pub fn with_element(mut self, name: impl Into<String>, value: Value) -> Self {
        let name = name.into();
        if !is_identity_field(&name) {
            self.elements.insert(name, value);
        }
        self
    }

    pub fn element(&self, name: &str) -> Option<&Value> {
        self.elements.get(name)
    }
}

fn is_identity_field(name: &str) -> bool {
    matches!(name, "resourceType" | "id")
}

impl Resource for FhirResource {
    fn resource_type(&self) -> &str {
        &self.resource_type
    }

    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::{FhirResource, Resource};
    use serde_json::json;

    #[test]
    fn new_generates_distinct_ids() {
        let first = FhirResource::new("Patient");
        let second = FhirResource::new("Patient");
        assert_ne!(first.id(), second.id());
        assert_eq!(first.resource_type(), "Patient");
    }

    #[test]
    fn json_shape_keeps_unknown_elements_at_top_level() {
        let patient = FhirResource::with_id("Patient", "123")
            .with_element("name", json!([{ "given": ["Jane"] }]))
            .with_element("active", json!(true));

        let value = serde_json::to_value(&patient).unwrap();
        assert_eq!(value["resourceType"], "Patient");
        assert_eq!(value["id"], "123");
        assert_eq!(value["active"], true);
        assert!(value.get("elements").is_none());

        let parsed: FhirResource = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, patient);
        assert_eq!(parsed.element("active"), Some(&json!(true)));
    }

    #[test]
    fn with_element_ignores_identity_fields() {
        let patient = FhirResource::with_id("Patient", "1")
            .with_element("id", json!("2"))
            .with_element("resourceType", json!("Device"))
            .with_element("active", json!(true));

        assert_eq!(patient.id(), "1");
        assert_eq!(patient.resource_type(), "Patient");
        assert_eq!(patient.elements.len(), 1);
    }
}
