//! FHIR JSON codec backed by `serde_json`.

use super::{CodecError, CodecResult, ResourceCodec};
use crate::model::resource::Resource;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

const RESOURCE_TYPE_FIELD: &str = "resourceType";
const ID_FIELD: &str = "id";

/// Encodes resources as FHIR JSON objects.
///
/// Encoded bodies always carry `resourceType` and `id` equal to the key the
/// body is stored under; shapes that do not serialize them get them stamped
/// from `Resource`. A body that disagrees with its key is refused.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl<R> ResourceCodec<R> for JsonCodec
where
    R: Resource + Serialize + DeserializeOwned,
{
    fn encode(&self, resource: &R) -> CodecResult<String> {
        let mut value = serde_json::to_value(resource)?;
        let object = value.as_object_mut().ok_or(CodecError::NotAnObject)?;

        stamp_or_check(object, RESOURCE_TYPE_FIELD, resource.resource_type()).map_err(
            |found| CodecError::TypeMismatch {
                expected: resource.resource_type().to_string(),
                found,
            },
        )?;
        stamp_or_check(object, ID_FIELD, resource.id()).map_err(|found| {
            CodecError::IdMismatch {
                expected: resource.id().to_string(),
                found,
            }
        })?;

        Ok(serde_json::to_string(&value)?)
    }

    fn decode(&self, resource_type: &str, body: &str) -> CodecResult<R> {
        let value: Value = serde_json::from_str(body)?;
        let found = value
            .as_object()
            .ok_or(CodecError::NotAnObject)?
            .get(RESOURCE_TYPE_FIELD)
            .and_then(Value::as_str)
            .ok_or(CodecError::MissingResourceType)?;

        if found != resource_type {
            return Err(CodecError::TypeMismatch {
                expected: resource_type.to_string(),
                found: found.to_string(),
            });
        }

        Ok(serde_json::from_value(value)?)
    }
}

/// Writes `expected` under `field` when absent; otherwise the present value
/// must be the same string. Returns the conflicting value: strings as-is,
/// anything else as JSON text.
fn stamp_or_check(
    object: &mut Map<String, Value>,
    field: &str,
    expected: &str,
) -> Result<(), String> {
    match object.get(field) {
        Some(Value::String(found)) if found == expected => Ok(()),
        Some(Value::String(found)) => Err(found.clone()),
        Some(other) => Err(other.to_string()),
        None => {
            object.insert(field.to_string(), Value::String(expected.to_string()));
            Ok(())
        }
    }
}
