//! Macro-generated test suite for `RecordApi<User>` contract validation.
//!
//! The `record_api_tests!` macro generates a test module that validates any
//! `RecordApi<User>` implementation: listing, server pages, every mutation,
//! and unknown ids.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod view_harness;
//!
//! use view_harness::*;
//!
//! async fn in_memory_api(records: Vec<User>) -> InMemoryRecordApi<User> {
//!     InMemoryRecordApi::with_records(records)
//! }
//!
//! record_api_tests!(in_memory_api);
//! ```
//!
//! # Generated Tests
//!
//! ## Listing
//! - `test_list_returns_seeded_records_in_order`
//! - `test_list_empty`
//! - `test_list_page_slices_and_reports_totals`
//! - `test_list_page_beyond_last_page_is_empty`
//!
//! ## Mutations
//! - `test_create_then_list`
//! - `test_update_existing`
//! - `test_update_nonexistent`
//! - `test_remove_existing`
//! - `test_remove_nonexistent`
//! - `test_toggle_flag`
//! - `test_clear_all`

/// Generate a full `RecordApi<User>` conformance test suite.
///
/// `$factory` must name an async function taking the seed `Vec<User>` and
/// returning a `RecordApi<User>` serving exactly those records. It is called
/// once per test.
#[macro_export]
macro_rules! record_api_tests {
    ($factory:path) => {
        mod record_api_contract_tests {
            use super::*;
            use tabula::prelude::*;
            use tokio_test::{assert_err, assert_ok};

            fn new_user_fields(name: &str, email: &str) -> Fields {
                let mut fields = Fields::new();
                fields.insert("name".to_string(), name.into());
                fields.insert("email".to_string(), email.into());
                fields.insert("role".to_string(), "user".into());
                fields.insert("blocked".to_string(), false.into());
                fields
            }

            // ==================================================================
            // Listing
            // ==================================================================

            #[tokio::test]
            async fn test_list_returns_seeded_records_in_order() {
                let api = $factory(three_users()).await;

                let all = assert_ok!(api.list().await);
                assert_ids(&all, &["u1", "u2", "u3"]);
                assert_eq!(all[1].name, "Jane Smith");
            }

            #[tokio::test]
            async fn test_list_empty() {
                let api = $factory(Vec::new()).await;

                let all = assert_ok!(api.list().await);
                assert!(all.is_empty(), "List on empty store should return empty vec");
            }

            #[tokio::test]
            async fn test_list_page_slices_and_reports_totals() {
                let api = $factory(sample_users(23)).await;

                let page = assert_ok!(api.list_page(ListQuery::new(3, 10)).await);
                assert_count(&page.items, 3);
                assert_eq!(page.items[0].id.as_str(), "u20");
                assert_eq!(page.total, 23);
                assert_eq!(page.total_pages, 3);
            }

            #[tokio::test]
            async fn test_list_page_beyond_last_page_is_empty() {
                let api = $factory(sample_users(5)).await;

                let page = assert_ok!(api.list_page(ListQuery::new(9, 10)).await);
                assert!(page.items.is_empty());
                assert_eq!(page.total, 5);
            }

            // ==================================================================
            // Mutations
            // ==================================================================

            #[tokio::test]
            async fn test_create_then_list() {
                let api = $factory(three_users()).await;

                let ack = assert_ok!(api.create(new_user_fields("Nina Simone", "nina@example.com")).await);
                if let Some(record) = &ack.record {
                    assert_eq!(record.name, "Nina Simone");
                }

                let all = assert_ok!(api.list().await);
                assert_count(&all, 4);
                assert!(all.iter().any(|u| u.email == "nina@example.com"));
            }

            #[tokio::test]
            async fn test_update_existing() {
                let api = $factory(three_users()).await;
                let mut fields = Fields::new();
                fields.insert("role".to_string(), "admin".into());

                assert_ok!(api.update(&RecordId::from("u2"), fields).await);

                let all = assert_ok!(api.list().await);
                assert_eq!(all[1].role, "admin");
                assert_eq!(all[0].role, "user");
            }

            #[tokio::test]
            async fn test_update_nonexistent() {
                let api = $factory(three_users()).await;
                let mut fields = Fields::new();
                fields.insert("role".to_string(), "admin".into());

                let err = assert_err!(api.update(&RecordId::from("missing"), fields).await);
                assert_eq!(err.error_code(), "RECORD_NOT_FOUND");
            }

            #[tokio::test]
            async fn test_remove_existing() {
                let api = $factory(three_users()).await;

                assert_ok!(api.remove(&RecordId::from("u1")).await);

                let all = assert_ok!(api.list().await);
                assert_ids(&all, &["u2", "u3"]);
            }

            #[tokio::test]
            async fn test_remove_nonexistent() {
                let api = $factory(three_users()).await;

                let err = assert_err!(api.remove(&RecordId::from("missing")).await);
                assert_eq!(err.error_code(), "RECORD_NOT_FOUND");
                assert_count(&assert_ok!(api.list().await), 3);
            }

            #[tokio::test]
            async fn test_toggle_flag() {
                let api = $factory(three_users()).await;

                assert_ok!(api.toggle(&RecordId::from("u3"), "blocked", true).await);

                let all = assert_ok!(api.list().await);
                assert!(all[2].blocked);
                assert!(!all[0].blocked && !all[1].blocked);

                let mut fields = Fields::new();
                fields.insert("blocked".to_string(), false.into());
                assert_ok!(api.update(&RecordId::from("u3"), fields).await);
                assert!(!assert_ok!(api.list().await)[2].blocked);
            }

            #[tokio::test]
            async fn test_clear_all() {
                let api = $factory(sample_users(12)).await;

                assert_ok!(api.clear_all().await);

                assert!(assert_ok!(api.list().await).is_empty());
            }
        }
    };
}
