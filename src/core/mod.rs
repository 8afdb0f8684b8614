//! Core module containing fundamental traits and types for the engine

pub mod error;
pub mod events;
pub mod field;
pub mod query;
pub mod record;
pub mod service;
pub mod session;
pub mod validation;

pub use error::{ConfigError, FetchError, MutationError, TabulaError, ValidationError};
pub use events::{EventBus, Notice, NoticeBoard, NoticeLevel, ViewEvent};
pub use field::{FieldFormat, FieldKind, FieldValue};
pub use query::{ListQuery, Page, PageWindow, SortDirection, SortSpec};
pub use record::{Record, RecordId};
pub use service::{Ack, Fields, RecordApi};
pub use session::SessionContext;
pub use validation::FormRules;
