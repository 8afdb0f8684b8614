//! Reusable field filters
//!
//! These filters normalize form values before validation

use crate::core::field::FieldValue;

/// Filter: trim whitespace from string
pub fn trim() -> impl Fn(&str, FieldValue) -> FieldValue + Send + Sync + Clone {
    |_: &str, value: FieldValue| match value {
        FieldValue::String(s) => FieldValue::String(s.trim().to_string()),
        other => other,
    }
}

/// Filter: convert string to lowercase
pub fn lowercase() -> impl Fn(&str, FieldValue) -> FieldValue + Send + Sync + Clone {
    |_: &str, value: FieldValue| match value {
        FieldValue::String(s) => FieldValue::String(s.to_lowercase()),
        other => other,
    }
}

/// Filter: turn an empty string into null
pub fn empty_as_null() -> impl Fn(&str, FieldValue) -> FieldValue + Send + Sync + Clone {
    |_: &str, value: FieldValue| match value {
        FieldValue::String(s) if s.is_empty() => FieldValue::Null,
        other => other,
    }
}
