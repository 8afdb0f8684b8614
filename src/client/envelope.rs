//! Decoding of raw REST responses into typed results
//!
//! The admin API answers in a handful of shapes:
//!
//! | Call       | Body                                              |
//! |------------|---------------------------------------------------|
//! | list       | `[...]` or `{ "<collection>": [...] }`            |
//! | paged list | `{ "<collection>": [...], total, totalPages }`    |
//! | mutation   | `{ success?: string \| bool, error?: string }`    |
//!
//! Anything else is a [`FetchError`] or a [`MutationError`]; nothing past
//! this module looks at raw JSON.

use crate::core::error::{FetchError, MutationError};
use crate::core::query::{ListQuery, Page, PageWindow};
use crate::core::service::Ack;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decode a list response holding `key`
pub fn decode_list<T: DeserializeOwned>(body: Value, key: &str) -> Result<Vec<T>, FetchError> {
    match body {
        Value::Array(items) => decode_items(items),
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => decode_items(items),
            _ => Err(FetchError::Shape {
                expected: key.to_string(),
            }),
        },
        _ => Err(FetchError::Shape {
            expected: key.to_string(),
        }),
    }
}

/// Decode a server page
///
/// Missing totals are derived from the items received.
pub fn decode_page<T: DeserializeOwned>(
    body: Value,
    key: &str,
    query: ListQuery,
) -> Result<Page<T>, FetchError> {
    let (total, total_pages) = match &body {
        Value::Object(map) => (
            map.get("total").and_then(Value::as_u64),
            map.get("totalPages")
                .or_else(|| map.get("total_pages"))
                .and_then(Value::as_u64),
        ),
        _ => (None, None),
    };

    let items: Vec<T> = decode_list(body, key)?;
    let total = total.map_or(items.len(), |t| t as usize);
    let total_pages = match total_pages {
        Some(pages) => pages as usize,
        None => PageWindow::new(query.page, query.limit, total).total_pages,
    };

    Ok(Page {
        items,
        total,
        total_pages,
    })
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Success {
    Flag(bool),
    Message(String),
}

#[derive(Debug, Deserialize)]
struct AckBody {
    #[serde(default)]
    success: Option<Success>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

/// Decode a mutation response
///
/// An `error` field or `success: false` is a rejection. A non-object body
/// is read as an acknowledgement without message.
pub fn decode_ack<T: DeserializeOwned>(body: Value, operation: &str) -> Result<Ack<T>, MutationError> {
    if !body.is_object() {
        return Ok(Ack::empty());
    }

    let body: AckBody = serde_json::from_value(body)
        .map_err(|e| MutationError::Transport(format!("Invalid response: {}", e)))?;

    let rejected = |message: Option<String>| MutationError::Rejected {
        operation: operation.to_string(),
        message: message.unwrap_or_else(|| "Opération refusée".to_string()),
    };

    if let Some(error) = body.error {
        return Err(rejected(Some(error)));
    }

    let message = match body.success {
        Some(Success::Flag(false)) => return Err(rejected(body.message)),
        Some(Success::Message(message)) => Some(message),
        Some(Success::Flag(true)) | None => body.message,
    };

    let record = body.data.and_then(|data| match serde_json::from_value(data) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!(operation, "Ignoring undecodable record in response: {}", e);
            None
        }
    });

    Ok(Ack { message, record })
}

fn decode_items<T: DeserializeOwned>(items: Vec<Value>) -> Result<Vec<T>, FetchError> {
    serde_json::from_value(Value::Array(items)).map_err(|e| FetchError::Parse(e.to_string()))
}
