//! Record trait defining the only shape the view engine relies on

use crate::core::field::FieldValue;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque, immutable record identifier
///
/// Backends hand out ids in many shapes (UUIDs, database object ids,
/// integers rendered as strings). The engine only compares them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generate a fresh random id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<Uuid> for RecordId {
    fn from(value: Uuid) -> Self {
        Self(value.to_string())
    }
}

/// An entity listed by a view (user, movie, profile, log entry…)
///
/// The engine never looks at a record beyond the fields a caller names for
/// searching or sorting, which it reads through [`Record::field_value`].
pub trait Record: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// The plural resource name used in routes (e.g., "users", "movies")
    fn resource_name() -> &'static str;

    /// Fields searched when a view does not name its own
    fn searchable_fields() -> &'static [&'static str] {
        &[]
    }

    /// Get the unique identifier for this record
    fn id(&self) -> &RecordId;

    /// Get the value of a specific field by name
    fn field_value(&self, field: &str) -> Option<FieldValue>;

    /// Overwrite a field in place
    ///
    /// Returns `false` when the field does not exist or the value does not
    /// fit its type; the record is left unchanged in that case.
    fn set_field(&mut self, field: &str, value: FieldValue) -> bool;
}
