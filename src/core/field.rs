//! Field value types, conversions and format validation

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use uuid::Uuid;

/// A polymorphic field value that can hold different types
///
/// This is the only view the engine has of a record: search, sort and
/// in-place patches all go through `FieldValue`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Uuid(Uuid),
    DateTime(DateTime<Utc>),
    List(Vec<FieldValue>),
    Null,
}

/// Normalized key used by the sort comparator
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey<'a> {
    /// Compared with the locale-style text collation
    Text(&'a str),
    /// Compared numerically (dates are epoch milliseconds)
    Number(f64),
}

impl FieldValue {
    /// Get the value as a string if possible
    pub fn as_string(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer if possible
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a float, widening integers
    pub fn as_float(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get the value as a boolean if possible
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the value as a UUID if possible
    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            FieldValue::Uuid(u) => Some(*u),
            _ => None,
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Case-insensitive substring test used by the search filter
    ///
    /// `needle` must already be lower-cased. Only string values (and string
    /// elements of lists) can match.
    pub fn contains_lowercase(&self, needle: &str) -> bool {
        match self {
            FieldValue::String(s) => s.to_lowercase().contains(needle),
            FieldValue::List(items) => items.iter().any(|item| item.contains_lowercase(needle)),
            _ => false,
        }
    }

    /// Key used for ordering, or `None` when the value has no ordering
    ///
    /// NaN has no key.
    pub fn sort_key(&self) -> Option<SortKey<'_>> {
        match self {
            FieldValue::String(s) => Some(SortKey::Text(s)),
            FieldValue::Integer(i) => Some(SortKey::Number(*i as f64)),
            FieldValue::Float(f) if f.is_nan() => None,
            FieldValue::Float(f) => Some(SortKey::Number(*f)),
            FieldValue::DateTime(dt) => Some(SortKey::Number(dt.timestamp_millis() as f64)),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::DateTime(value)
    }
}

/// Conversion between a concrete Rust field type and `FieldValue`
///
/// Implemented for the types records are usually made of. The record macro
/// relies on it to generate `field_value` and `set_field`.
pub trait FieldKind: Sized {
    fn to_field_value(&self) -> FieldValue;

    fn from_field_value(value: FieldValue) -> Option<Self>;
}

impl FieldKind for String {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::String(self.clone())
    }

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }
}

macro_rules! integer_field_kind {
    ($($ty:ty),*) => {
        $(
            impl FieldKind for $ty {
                /// Values beyond `i64` become floats
                fn to_field_value(&self) -> FieldValue {
                    i64::try_from(*self)
                        .map(FieldValue::Integer)
                        .unwrap_or(FieldValue::Float(*self as f64))
                }

                fn from_field_value(value: FieldValue) -> Option<Self> {
                    match value {
                        FieldValue::Integer(i) => <$ty>::try_from(i).ok(),
                        FieldValue::Float(f) if f.fract() == 0.0 => <$ty>::try_from(f as i128).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

integer_field_kind!(i32, i64, u32, u64, usize);

impl FieldKind for f64 {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Float(*self)
    }

    fn from_field_value(value: FieldValue) -> Option<Self> {
        value.as_float()
    }
}

impl FieldKind for bool {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Boolean(*self)
    }

    fn from_field_value(value: FieldValue) -> Option<Self> {
        value.as_bool()
    }
}

impl FieldKind for Uuid {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Uuid(*self)
    }

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Uuid(u) => Some(u),
            FieldValue::String(s) => Uuid::parse_str(&s).ok(),
            _ => None,
        }
    }
}

impl FieldKind for DateTime<Utc> {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::DateTime(*self)
    }

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::DateTime(dt) => Some(dt),
            FieldValue::String(s) => DateTime::parse_from_rfc3339(&s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            _ => None,
        }
    }
}

impl<T: FieldKind> FieldKind for Option<T> {
    fn to_field_value(&self) -> FieldValue {
        match self {
            Some(v) => v.to_field_value(),
            None => FieldValue::Null,
        }
    }

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Null => Some(None),
            other => T::from_field_value(other).map(Some),
        }
    }
}

impl<T: FieldKind> FieldKind for Vec<T> {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::List(self.iter().map(FieldKind::to_field_value).collect())
    }

    fn from_field_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::List(items) => items.into_iter().map(T::from_field_value).collect(),
            _ => None,
        }
    }
}

/// Field format validators for form input
#[derive(Debug, Clone)]
pub enum FieldFormat {
    Email,
    Uuid,
    Url,
    Custom(Regex),
}

impl FieldFormat {
    /// Validate a field value against this format
    pub fn validate(&self, value: &FieldValue) -> bool {
        let string_value = match value.as_string() {
            Some(s) => s,
            None => return false,
        };

        match self {
            FieldFormat::Email => Self::is_valid_email(string_value),
            FieldFormat::Uuid => Uuid::parse_str(string_value).is_ok(),
            FieldFormat::Url => Self::is_valid_url(string_value),
            FieldFormat::Custom(regex) => regex.is_match(string_value),
        }
    }

    fn is_valid_email(email: &str) -> bool {
        static EMAIL_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
        EMAIL_REGEX
            .get_or_init(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").ok())
            .as_ref()
            .is_some_and(|regex| regex.is_match(email))
    }

    fn is_valid_url(url: &str) -> bool {
        static URL_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
        URL_REGEX
            .get_or_init(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").ok())
            .as_ref()
            .is_some_and(|regex| regex.is_match(url))
    }
}
