//! View events and transient notices
//!
//! The [`EventBus`] decouples the engine from whatever renders it: the
//! controller and the mutation coordinator publish [`ViewEvent`]s, a view
//! binding subscribes and redraws.
//!
//! # Architecture
//!
//! ```text
//! ViewController ──────┐
//!                      ├──▶ EventBus::publish() ──▶ broadcast channel ──▶ view bindings
//! MutationCoordinator ─┘
//!        │
//!        └──▶ NoticeBoard::post() ──▶ cleared after the TTL
//! ```

use crate::core::record::RecordId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient message shown after a mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub id: Uuid,
    pub level: NoticeLevel,
    pub message: String,

    /// Row the notice refers to; `None` for view-wide notices
    pub target: Option<RecordId>,

    pub emitted_at: DateTime<Utc>,
}

impl Notice {
    pub fn success(message: impl Into<String>, target: Option<RecordId>) -> Self {
        Self::new(NoticeLevel::Success, message.into(), target)
    }

    pub fn error(message: impl Into<String>, target: Option<RecordId>) -> Self {
        Self::new(NoticeLevel::Error, message.into(), target)
    }

    fn new(level: NoticeLevel, message: String, target: Option<RecordId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            level,
            message,
            target,
            emitted_at: Utc::now(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// Events published by views
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ViewEvent {
    /// A fetch was issued and the view shows its loading state
    LoadStarted { resource: String, generation: u64 },
    /// A fetch settled with a collection
    Loaded {
        resource: String,
        generation: u64,
        count: usize,
    },
    /// A fetch settled with an error
    LoadFailed {
        resource: String,
        generation: u64,
        code: String,
    },
    /// A response arrived after a newer request was issued, or after unmount
    StaleResponseDropped { resource: String, generation: u64 },
    /// One record was patched in place
    RecordPatched { resource: String, id: RecordId },
    /// A notice became current
    NoticePosted { notice: Notice },
    /// The current notice went away
    NoticeCleared { notice_id: Uuid },
}

/// Envelope wrapping a view event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: ViewEvent,
}

impl EventEnvelope {
    pub fn new(event: ViewEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Broadcast-based event bus
///
/// Cheap to clone. Publishing never fails: with no subscriber the event is
/// dropped, and lagging subscribers get `Lagged` on their next `recv()`.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: ViewEvent) {
        let _ = self.sender.send(EventEnvelope::new(event));
    }

    /// Subscribe to events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Holder of the single current notice
///
/// Posting replaces the current notice and schedules its removal after the
/// TTL. A later notice is never cleared by an earlier notice's timer.
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    current: Arc<Mutex<Option<Notice>>>,
    ttl: Duration,
    bus: EventBus,
}

impl NoticeBoard {
    pub fn new(ttl: Duration, bus: EventBus) -> Self {
        Self {
            current: Arc::new(Mutex::new(None)),
            ttl,
            bus,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The notice currently on display
    pub fn current(&self) -> Option<Notice> {
        self.lock().clone()
    }

    /// Make `notice` current and clear it after the TTL
    ///
    /// Outside a tokio runtime the notice stays until replaced or dismissed.
    pub fn post(&self, notice: Notice) {
        let notice_id = notice.id;
        *self.lock() = Some(notice.clone());
        self.bus.publish(ViewEvent::NoticePosted { notice });

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let board = self.clone();
                handle.spawn(async move {
                    tokio::time::sleep(board.ttl).await;
                    board.dismiss(notice_id);
                });
            }
            Err(_) => {
                tracing::debug!(%notice_id, "No runtime, notice will not expire on its own");
            }
        }
    }

    /// Remove the notice if it is still the current one
    pub fn dismiss(&self, notice_id: Uuid) -> bool {
        let mut current = self.lock();
        if current.as_ref().is_some_and(|n| n.id == notice_id) {
            *current = None;
            drop(current);
            self.bus.publish(ViewEvent::NoticeCleared { notice_id });
            true
        } else {
            false
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Notice>> {
        // A poisoned lock still holds a valid Option<Notice>
        self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}
