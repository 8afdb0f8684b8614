//! Record store: the collection a view fetched, and its load state

use crate::core::error::FetchError;
use crate::core::query::PageWindow;
use crate::core::record::{Record, RecordId};
use crate::core::service::Fields;

/// An in-place change to a loaded store
#[derive(Debug, Clone, PartialEq)]
pub enum StorePatch<T> {
    /// Overwrite some fields of one record
    SetFields { id: RecordId, fields: Fields },
    /// Replace the record with the same id, or append it
    Upsert(T),
    /// Drop one record
    Remove(RecordId),
    /// Drop every record
    Clear,
}

impl<T: Record> StorePatch<T> {
    /// Record this patch is about, if any
    pub fn target(&self) -> Option<&RecordId> {
        match self {
            StorePatch::SetFields { id, .. } | StorePatch::Remove(id) => Some(id),
            StorePatch::Upsert(record) => Some(record.id()),
            StorePatch::Clear => None,
        }
    }
}

/// The collection held by one view
///
/// Exactly one of loading, loaded or failed at any time.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordStore<T> {
    /// Nothing usable yet (initial state, and during every full refetch)
    Loading,

    /// A collection was fetched (possibly empty)
    Loaded {
        records: Vec<T>,

        /// Total on the server; equals `records.len()` unless server-paginated
        total: usize,

        /// Page count reported by the server, if it paginates
        total_pages: Option<usize>,
    },

    /// The last fetch failed
    Failed(FetchError),
}

impl<T> Default for RecordStore<T> {
    fn default() -> Self {
        RecordStore::Loading
    }
}

impl<T: Record> RecordStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_loading(&mut self) {
        *self = RecordStore::Loading;
    }

    /// Replace the whole collection
    pub fn replace(&mut self, records: Vec<T>) {
        let total = records.len();
        *self = RecordStore::Loaded {
            records,
            total,
            total_pages: None,
        };
    }

    /// Replace the collection with one server page
    pub fn replace_page(&mut self, records: Vec<T>, total: usize, total_pages: usize) {
        *self = RecordStore::Loaded {
            records,
            total,
            total_pages: Some(total_pages),
        };
    }

    pub fn fail(&mut self, error: FetchError) {
        *self = RecordStore::Failed(error);
    }

    /// Modify one record in place
    ///
    /// Returns `false` when the store is not loaded or the id is unknown.
    pub fn patch<F>(&mut self, id: &RecordId, apply: F) -> bool
    where
        F: FnOnce(&mut T) -> bool,
    {
        match self {
            RecordStore::Loaded { records, .. } => records
                .iter_mut()
                .find(|record| record.id() == id)
                .is_some_and(apply),
            _ => false,
        }
    }

    /// Apply a [`StorePatch`]
    ///
    /// Returns `false`, leaving the store untouched, when the store is not
    /// loaded, the record is unknown or a field does not fit.
    pub fn apply(&mut self, patch: StorePatch<T>) -> bool {
        let RecordStore::Loaded { records, total, .. } = self else {
            return false;
        };

        match patch {
            StorePatch::SetFields { id, fields } => {
                let Some(record) = records.iter_mut().find(|r| r.id() == &id) else {
                    return false;
                };
                let mut updated = record.clone();
                let all_set = fields
                    .into_iter()
                    .all(|(field, value)| updated.set_field(&field, value));
                if all_set {
                    *record = updated;
                }
                all_set
            }
            StorePatch::Upsert(record) => {
                match records.iter_mut().find(|r| r.id() == record.id()) {
                    Some(existing) => *existing = record,
                    None => {
                        records.push(record);
                        *total += 1;
                    }
                }
                true
            }
            StorePatch::Remove(id) => {
                let before = records.len();
                records.retain(|r| r.id() != &id);
                let removed = before - records.len();
                *total = total.saturating_sub(removed);
                removed > 0
            }
            StorePatch::Clear => {
                records.clear();
                *total = 0;
                true
            }
        }
    }

    /// Recount server pages after a local change to `total`
    ///
    /// Does nothing unless the store holds a server page.
    pub fn repaginate(&mut self, page_size: usize) {
        if let RecordStore::Loaded {
            total,
            total_pages: total_pages @ Some(_),
            ..
        } = self
        {
            *total_pages = Some(PageWindow::new(1, page_size, *total).total_pages);
        }
    }

    /// Records currently held; empty unless loaded
    pub fn records(&self) -> &[T] {
        match self {
            RecordStore::Loaded { records, .. } => records,
            _ => &[],
        }
    }

    pub fn get(&self, id: &RecordId) -> Option<&T> {
        self.records().iter().find(|record| record.id() == id)
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            RecordStore::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, RecordStore::Loading)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, RecordStore::Loaded { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RecordStore::Failed(_))
    }
}
