//! In-memory implementation of RecordApi for testing and development

use crate::core::error::{FetchError, MutationError};
use crate::core::query::{ListQuery, Page, PageWindow};
use crate::core::record::{Record, RecordId};
use crate::core::service::{Ack, Fields, RecordApi};
use crate::view::page::paginate;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

/// A failure the next call will run into
#[derive(Debug, Clone, PartialEq)]
pub enum Fault {
    /// The server cannot be reached
    Offline,
    /// The server answers with an error message
    Reject(String),
    /// The list response does not hold the collection
    MissingCollection,
    /// The answer is delayed, then served normally
    Latency(Duration),
}

/// In-memory record API
///
/// Records are kept in insertion order. Uses RwLock for thread-safe access.
/// Faults queued with [`inject`](Self::inject) are consumed one per call, so
/// every error path of a view can be reached without a network.
#[derive(Clone)]
pub struct InMemoryRecordApi<T> {
    records: Arc<RwLock<IndexMap<RecordId, T>>>,
    faults: Arc<Mutex<VecDeque<Fault>>>,
    requests: Arc<AtomicUsize>,
}

impl<T: Record> InMemoryRecordApi<T> {
    /// Create a new, empty in-memory API
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Create an API serving `records`
    pub fn with_records(records: impl IntoIterator<Item = T>) -> Self {
        let records = records
            .into_iter()
            .map(|record| (record.id().clone(), record))
            .collect();

        Self {
            records: Arc::new(RwLock::new(records)),
            faults: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Make the next call fail (or stall) with `fault`
    pub fn inject(&self, fault: Fault) {
        self.faults
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(fault);
    }

    /// Number of calls received so far
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Copy of every stored record
    pub fn snapshot(&self) -> Vec<T> {
        self.records
            .read()
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn get(&self, id: &RecordId) -> Option<T> {
        self.records
            .read()
            .ok()
            .and_then(|records| records.get(id).cloned())
    }

    fn next_fault(&self) -> Option<Fault> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.faults
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
    }

    async fn fetch_fault(&self) -> Result<(), FetchError> {
        match self.next_fault() {
            None => Ok(()),
            Some(Fault::Latency(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            Some(Fault::Offline) => Err(FetchError::Transport("connection refused".to_string())),
            Some(Fault::Reject(message)) => Err(FetchError::Transport(message)),
            Some(Fault::MissingCollection) => Err(FetchError::Shape {
                expected: T::resource_name().to_string(),
            }),
        }
    }

    async fn mutation_fault(&self, operation: &str) -> Result<(), MutationError> {
        match self.next_fault() {
            None => Ok(()),
            Some(Fault::Latency(delay)) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            Some(Fault::Offline) => Err(MutationError::Transport("connection refused".to_string())),
            Some(Fault::Reject(message)) => Err(MutationError::Rejected {
                operation: operation.to_string(),
                message,
            }),
            Some(Fault::MissingCollection) => Err(MutationError::Transport(
                "unexpected response shape".to_string(),
            )),
        }
    }

    fn read_all(&self) -> Result<Vec<T>, FetchError> {
        let records = self
            .records
            .read()
            .map_err(|e| FetchError::Transport(format!("Failed to acquire read lock: {}", e)))?;
        Ok(records.values().cloned().collect())
    }

    fn write<R>(
        &self,
        apply: impl FnOnce(&mut IndexMap<RecordId, T>) -> Result<R, MutationError>,
    ) -> Result<R, MutationError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| MutationError::Transport(format!("Failed to acquire write lock: {}", e)))?;
        apply(&mut records)
    }
}

impl<T: Record> Default for InMemoryRecordApi<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Record> RecordApi<T> for InMemoryRecordApi<T> {
    async fn list(&self) -> Result<Vec<T>, FetchError> {
        self.fetch_fault().await?;
        let records = self.read_all()?;
        tracing::debug!(resource = T::resource_name(), count = records.len(), "Listed records");
        Ok(records)
    }

    async fn list_page(&self, query: ListQuery) -> Result<Page<T>, FetchError> {
        self.fetch_fault().await?;
        let records = self.read_all()?;
        let window = PageWindow::new(query.page, query.limit, records.len());

        Ok(Page {
            items: paginate(&records, query.page, query.limit).to_vec(),
            total: window.total_count,
            total_pages: window.total_pages,
        })
    }

    async fn create(&self, fields: Fields) -> Result<Ack<T>, MutationError> {
        self.mutation_fault("create").await?;

        let mut object = serde_json::Map::new();
        for (name, value) in fields {
            let value = serde_json::to_value(value).map_err(|e| MutationError::Rejected {
                operation: "create".to_string(),
                message: e.to_string(),
            })?;
            object.insert(name, value);
        }
        let id = RecordId::generate();
        object.insert("id".to_string(), serde_json::Value::String(id.to_string()));

        let record: T = serde_json::from_value(serde_json::Value::Object(object)).map_err(|e| {
            MutationError::Rejected {
                operation: "create".to_string(),
                message: format!("Invalid data: {}", e),
            }
        })?;

        self.write(|records| {
            records.insert(id.clone(), record.clone());
            Ok(())
        })?;
        tracing::info!(resource = T::resource_name(), id = %id, "Record created");

        Ok(Ack {
            message: None,
            record: Some(record),
        })
    }

    async fn update(&self, id: &RecordId, fields: Fields) -> Result<Ack<T>, MutationError> {
        self.mutation_fault("update").await?;

        let record = self.write(|records| {
            let stored = records
                .get_mut(id)
                .ok_or_else(|| MutationError::NotFound { id: id.clone() })?;

            let mut updated = stored.clone();
            for (name, value) in fields {
                if name == "id" {
                    continue;
                }
                if !updated.set_field(&name, value) {
                    return Err(MutationError::Rejected {
                        operation: "update".to_string(),
                        message: format!("Invalid value for field '{}'", name),
                    });
                }
            }
            *stored = updated.clone();
            Ok(updated)
        })?;
        tracing::info!(resource = T::resource_name(), id = %id, "Record updated");

        Ok(Ack {
            message: None,
            record: Some(record),
        })
    }

    async fn remove(&self, id: &RecordId) -> Result<Ack<T>, MutationError> {
        self.mutation_fault("remove").await?;

        let removed = self.write(|records| {
            records
                .shift_remove(id)
                .ok_or_else(|| MutationError::NotFound { id: id.clone() })
        })?;
        tracing::info!(resource = T::resource_name(), id = %id, "Record removed");

        Ok(Ack {
            message: None,
            record: Some(removed),
        })
    }

    async fn toggle(&self, id: &RecordId, flag: &str, value: bool) -> Result<Ack<T>, MutationError> {
        let mut fields = Fields::new();
        fields.insert(flag.to_string(), value.into());
        self.update(id, fields).await
    }

    async fn clear_all(&self) -> Result<Ack<T>, MutationError> {
        self.mutation_fault("clear_all").await?;

        let count = self.write(|records| {
            let count = records.len();
            records.clear();
            Ok(count)
        })?;
        tracing::info!(resource = T::resource_name(), count, "Collection cleared");

        Ok(Ack::empty())
    }
}
