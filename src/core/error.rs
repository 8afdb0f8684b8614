//! Typed error handling for tabula
//!
//! Every error that can reach a view is one of the categories below, so a
//! view never has to guess what went wrong from an untyped payload.
//!
//! # Error Categories
//!
//! - [`FetchError`]: loading a collection failed (transport, shape, parse, timeout)
//! - [`MutationError`]: a create/update/delete/toggle call failed
//! - [`ValidationError`]: form input rejected before any request
//! - [`ConfigError`]: invalid view configuration
//!
//! # Example
//!
//! ```rust,ignore
//! if view.refresh().await == FetchOutcome::Failed {
//!     match view.store().error() {
//!         Some(FetchError::Shape { expected }) => {
//!             tracing::warn!("response had no '{}' collection", expected);
//!         }
//!         Some(e) => tracing::warn!(code = e.error_code(), "{}", e),
//!         None => {}
//!     }
//! }
//! ```

use crate::core::record::RecordId;
use serde::Serialize;
use thiserror::Error;

/// The main error type for tabula
#[derive(Debug, Error)]
pub enum TabulaError {
    /// Loading a collection failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A mutation failed
    #[error(transparent)]
    Mutation(#[from] MutationError),

    /// Form input was rejected
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Configuration is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl TabulaError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            TabulaError::Fetch(e) => e.error_code(),
            TabulaError::Mutation(e) => e.error_code(),
            TabulaError::Validation(_) => "VALIDATION_ERROR",
            TabulaError::Config(_) => "CONFIG_ERROR",
        }
    }
}

// =============================================================================
// Fetch Errors
// =============================================================================

/// Errors raised while loading a collection
///
/// All variants put the view in its errored state with the same generic
/// message; the variant only matters for logs and tests.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// The request never produced a usable response
    #[error("Request failed: {0}")]
    Transport(String),

    /// The response parsed but did not hold the expected collection
    #[error("Response is missing the '{expected}' collection")]
    Shape { expected: String },

    /// The response body or one of its items could not be decoded
    #[error("Failed to decode response: {0}")]
    Parse(String),

    /// No response within the configured delay
    #[error("Request timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },
}

impl FetchError {
    pub fn error_code(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "FETCH_TRANSPORT",
            FetchError::Shape { .. } => "FETCH_SHAPE",
            FetchError::Parse(_) => "FETCH_PARSE",
            FetchError::Timeout { .. } => "FETCH_TIMEOUT",
        }
    }
}

// =============================================================================
// Mutation Errors
// =============================================================================

/// Errors raised by create/update/delete/toggle/clear calls
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MutationError {
    /// The server answered with an error payload
    #[error("{operation} rejected: {message}")]
    Rejected { operation: String, message: String },

    /// The server does not know the record
    #[error("Record with id '{id}' not found")]
    NotFound { id: RecordId },

    /// The request never produced a usable response
    #[error("Request failed: {0}")]
    Transport(String),

    /// No response within the configured delay
    #[error("Request timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    /// A mutation for the same target is still running
    #[error("A {operation} is already in progress for '{target}'")]
    InFlight { operation: String, target: String },

    /// Form input was rejected before the request was sent
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl MutationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            MutationError::Rejected { .. } => "MUTATION_REJECTED",
            MutationError::NotFound { .. } => "RECORD_NOT_FOUND",
            MutationError::Transport(_) => "MUTATION_TRANSPORT",
            MutationError::Timeout { .. } => "MUTATION_TIMEOUT",
            MutationError::InFlight { .. } => "MUTATION_IN_FLIGHT",
            MutationError::Invalid(_) => "VALIDATION_ERROR",
        }
    }

    /// Message shown next to the action that failed
    pub fn user_message(&self) -> String {
        match self {
            MutationError::Rejected { message, .. } => message.clone(),
            MutationError::Invalid(ValidationError::FieldErrors(errors)) => errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            other => other.to_string(),
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// A single field error
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Errors related to form validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// One or more fields failed validation
    #[error("Validation failed: {}", format_field_errors(.0))]
    FieldErrors(Vec<FieldError>),
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to view configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A view has an invalid value
    #[error("Invalid configuration for view '{view}': {message}")]
    InvalidView { view: String, message: String },

    /// Two views share a name
    #[error("View '{0}' is declared more than once")]
    DuplicateView(String),

    /// No view with this name
    #[error("Unknown view '{0}'")]
    UnknownView(String),
}
