//! # Tabula
//!
//! An embeddable engine for the admin listing screens of a REST back office:
//! fetch a collection, search it, sort it, paginate it, and keep it in sync
//! with the create/update/delete/toggle calls made from the same screen.
//!
//! ## Features
//!
//! - **Pure pipeline**: filter → sort → page stages that never touch the source collection
//! - **Explicit load states**: a view is loading, loaded or errored, never in between
//! - **Stale-response safety**: only the latest fetch of a mounted view is applied
//! - **Configurable reconciliation**: patch the row in place or refetch, per operation
//! - **Transient notices**: success and error messages that clear themselves
//! - **Typed boundary**: raw responses are decoded once into records or typed errors
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tabula::prelude::*;
//!
//! impl_record!(
//!     User,
//!     "users",
//!     ["name", "email"],
//!     {
//!         name: String,
//!         email: String,
//!         blocked: bool,
//!     }
//! );
//!
//! let config = TabulaConfig::from_yaml_file("config/views.yaml")?;
//! let view_config = config.view("admin-users")?.clone();
//! let api = HttpRecordApi::<User>::new(&config.api, &view_config, session.clone())?;
//!
//! let mut view = ViewController::new(Arc::new(api), view_config, session);
//! view.mount().await;
//! view.search("jane").await;
//! view.toggle_flag(&user_id, "blocked", true).await?;
//! ```

pub mod config;
pub mod core;
pub mod entities;
pub mod view;

#[cfg(feature = "in-memory")]
pub mod storage;

#[cfg(feature = "http")]
pub mod client;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Types ===
    pub use crate::core::{
        error::{ConfigError, FetchError, FieldError, MutationError, TabulaError, ValidationError},
        events::{EventBus, EventEnvelope, Notice, NoticeBoard, NoticeLevel, ViewEvent},
        field::{FieldFormat, FieldKind, FieldValue},
        query::{ListQuery, Page, PageWindow, SortDirection, SortSpec},
        record::{Record, RecordId},
        service::{Ack, Fields, RecordApi},
        session::SessionContext,
        validation::{FormRules, filters, validators},
    };

    // === Macros ===
    pub use crate::impl_record;

    // === View Engine ===
    pub use crate::view::{
        DisplayState, FetchOutcome, FilterPredicate, ListState, ListView, MutationCoordinator,
        Reconcile, RecordStore, StorePatch, ViewController, filter, paginate, sort,
    };

    // === Storage ===
    #[cfg(feature = "in-memory")]
    pub use crate::storage::{Fault, InMemoryRecordApi};

    // === Client ===
    #[cfg(feature = "http")]
    pub use crate::client::HttpRecordApi;

    // === Config ===
    pub use crate::config::{
        ApiConfig, EndpointConfig, PaginationMode, ReconcileConfig, ReconcilePolicy, TabulaConfig,
        ViewConfig,
    };

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
    pub use uuid::Uuid;
}
