//! Partial-update payloads.
//!
//! Update DTOs declare their optional fields as [`Patch<T>`] so that a field
//! the caller never sent (`Patch::Absent`) can be told apart from a field sent
//! as `null` (`Patch::Null`). [`create_patch_fields`] then turns a DTO into the
//! JSON object of supplied fields only, which the store layer applies without
//! touching anything else.
//!
//! ```ignore
//! #[derive(Deserialize, Serialize)]
//! struct UpdateCat {
//!     #[serde(default, skip_serializing_if = "Patch::is_absent")]
//!     name: Patch<String>,
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::CoreError;

/// JSON object holding only the fields a caller explicitly supplied.
pub type PatchFields = Map<String, Value>;

/// Tri-state field of an update request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    /// The key was not present in the request.
    #[default]
    Absent,
    /// The key was present with an explicit `null`.
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    /// Borrow the value, if one was supplied.
    pub fn as_value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Only reached when the key exists; `#[serde(default)]` covers absence.
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

impl<T> Serialize for Patch<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Patch::Value(v) => v.serialize(serializer),
            // Absent fields are normally skipped before reaching here.
            Patch::Null | Patch::Absent => serializer.serialize_none(),
        }
    }
}

/// Build the object of supplied fields from an update DTO.
///
/// Every key whose value is the absent marker is omitted; explicit `null`,
/// `0`, `false` and `""` are always kept. The DTO must serialize to a JSON
/// object.
pub fn create_patch_fields<T>(dto: &T) -> Result<PatchFields, CoreError>
where
    T: Serialize,
{
    match serde_json::to_value(dto) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(CoreError::Validation(format!(
            "Update payload must be an object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(CoreError::Internal(format!(
            "Failed to serialize update payload: {e}"
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
