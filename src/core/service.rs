//! Service trait for the data-access boundary of a view

use crate::core::error::{FetchError, MutationError};
use crate::core::field::FieldValue;
use crate::core::query::{ListQuery, Page};
use crate::core::record::{Record, RecordId};
use async_trait::async_trait;
use indexmap::IndexMap;

/// Submitted form fields, in the order the form declares them
pub type Fields = IndexMap<String, FieldValue>;

/// Successful answer to a mutation
#[derive(Debug, Clone, PartialEq)]
pub struct Ack<T> {
    /// Message returned by the server, if any
    pub message: Option<String>,

    /// The affected record when the server echoes it back
    pub record: Option<T>,
}

impl<T> Ack<T> {
    pub fn empty() -> Self {
        Self {
            message: None,
            record: None,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            record: None,
        }
    }
}

impl<T> Default for Ack<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Service trait for the REST API a view reads and mutates
///
/// Implementations translate raw responses into typed results: a view only
/// ever sees records, a [`FetchError`] or a [`MutationError`].
#[async_trait]
pub trait RecordApi<T: Record>: Send + Sync {
    /// Fetch the whole collection
    async fn list(&self) -> Result<Vec<T>, FetchError>;

    /// Fetch one page of the collection
    async fn list_page(&self, query: ListQuery) -> Result<Page<T>, FetchError>;

    /// Create a record from form fields
    async fn create(&self, fields: Fields) -> Result<Ack<T>, MutationError>;

    /// Update an existing record
    async fn update(&self, id: &RecordId, fields: Fields) -> Result<Ack<T>, MutationError>;

    /// Delete a record
    async fn remove(&self, id: &RecordId) -> Result<Ack<T>, MutationError>;

    /// Set a boolean flag (e.g. `blocked`) on a record
    async fn toggle(&self, id: &RecordId, flag: &str, value: bool) -> Result<Ack<T>, MutationError>;

    /// Delete every record of the collection in one irreversible call
    async fn clear_all(&self) -> Result<Ack<T>, MutationError>;
}
