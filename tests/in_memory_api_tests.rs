//! Integration tests for InMemoryRecordApi using the view test harness.
//!
//! This file invokes `record_api_tests!` to validate that InMemoryRecordApi
//! fully conforms to the RecordApi<T> contract.

#[macro_use]
mod view_harness;

use tabula::storage::InMemoryRecordApi;
use view_harness::*;

async fn in_memory_api(records: Vec<User>) -> InMemoryRecordApi<User> {
    InMemoryRecordApi::with_records(records)
}

record_api_tests!(in_memory_api);
