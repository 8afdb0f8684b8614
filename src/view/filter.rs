//! Filter stage: case-insensitive substring search

use crate::core::record::Record;

/// Search text plus the fields it is matched against
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPredicate {
    pub text: String,
    pub fields: Vec<String>,
}

impl FilterPredicate {
    pub fn new(text: impl Into<String>, fields: &[&str]) -> Self {
        Self {
            text: text.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Whether the record matches on at least one field
    pub fn matches<T: Record>(&self, record: &T) -> bool {
        matches_lowercase(record, &self.text.to_lowercase(), self.fields.as_slice())
    }

    pub fn apply<T: Record>(&self, records: &[T]) -> Vec<T> {
        filter(records, &self.text, self.fields.as_slice())
    }
}

/// Keep the records for which one of `fields` contains `text`, ignoring case
///
/// Missing, null and non-string fields never match. Empty `text` keeps every
/// record. Input order is preserved.
pub fn filter<T, S>(records: &[T], text: &str, fields: &[S]) -> Vec<T>
where
    T: Record,
    S: AsRef<str>,
{
    if text.is_empty() {
        return records.to_vec();
    }

    let needle = text.to_lowercase();
    records
        .iter()
        .filter(|record| matches_lowercase(*record, &needle, fields))
        .cloned()
        .collect()
}

fn matches_lowercase<T: Record, S: AsRef<str>>(record: &T, needle: &str, fields: &[S]) -> bool {
    if needle.is_empty() {
        return true;
    }

    fields.iter().any(|field| {
        record
            .field_value(field.as_ref())
            .is_some_and(|value| value.contains_lowercase(needle))
    })
}
