//! End-to-end tests of ViewController over the in-memory API.

mod view_harness;

use std::time::Duration;
use tabula::prelude::*;
use tabula::view::Fetched;
use view_harness::*;

fn users_config() -> ViewConfig {
    ViewConfig::for_record::<User>()
}

// =============================================================================
// Lifecycle and load states
// =============================================================================

#[tokio::test]
async fn test_events_follow_the_load_lifecycle() {
    let api = InMemoryRecordApi::with_records(three_users());
    let mut view = ViewController::new(Arc::new(api), users_config(), admin_session());
    let mut events = view.subscribe();

    view.mount().await;

    match events.recv().await.unwrap().event {
        ViewEvent::LoadStarted { resource, generation } => {
            assert_eq!(resource, "users");
            assert_eq!(generation, 1);
        }
        other => panic!("unexpected event: {:?}", other),
    }
    match events.recv().await.unwrap().event {
        ViewEvent::Loaded { count, .. } => assert_eq!(count, 3),
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn test_response_without_collection_is_errored_not_empty() {
    let api = InMemoryRecordApi::with_records(sample_logs(3));
    api.inject(Fault::MissingCollection);
    let config = TabulaConfig::default_config()
        .view("admin-logs")
        .unwrap()
        .clone();
    let mut view = ViewController::new(Arc::new(api), config, admin_session());

    assert_eq!(view.mount().await, FetchOutcome::Failed);
    assert_eq!(
        view.display(),
        DisplayState::Errored {
            message: "Une erreur est survenue lors du chargement des données.".to_string()
        }
    );
    assert_eq!(
        view.store().error(),
        Some(&FetchError::Shape {
            expected: "logs".to_string()
        })
    );
}

#[tokio::test]
async fn test_empty_collection_is_loaded_and_empty() {
    let (view, _api) = mounted_users_view(Vec::new(), users_config()).await;

    match view.display() {
        DisplayState::Loaded { items, is_empty, .. } => {
            assert!(items.is_empty());
            assert!(is_empty);
        }
        other => panic!("unexpected state: {:?}", other),
    }
}

#[tokio::test]
async fn test_every_fetch_failure_shows_the_same_message() {
    let api = InMemoryRecordApi::with_records(three_users());
    let mut view = ViewController::new(Arc::new(api.clone()), users_config(), admin_session());
    view.mount().await;

    let mut messages = Vec::new();
    for fault in [Fault::Offline, Fault::MissingCollection, Fault::Reject("500".to_string())] {
        api.inject(fault);
        assert_eq!(view.refresh().await, FetchOutcome::Failed);
        messages.push(view.display());
    }

    messages.dedup();
    assert_eq!(messages.len(), 1);
}

#[tokio::test]
async fn test_refresh_recovers_after_failure() {
    let api = InMemoryRecordApi::with_records(three_users());
    api.inject(Fault::Offline);
    let mut view = ViewController::new(Arc::new(api), users_config(), admin_session());

    assert_eq!(view.mount().await, FetchOutcome::Failed);
    assert_eq!(view.refresh().await, FetchOutcome::Loaded);
    let (items, _) = displayed(view.display());
    assert_count(&items, 3);
}

#[tokio::test(start_paused = true)]
async fn test_slow_fetch_times_out_into_errored_state() {
    let api = InMemoryRecordApi::with_records(three_users());
    api.inject(Fault::Latency(Duration::from_secs(30)));
    let mut config = users_config();
    config.request_timeout_ms = 1_000;
    let mut view = ViewController::new(Arc::new(api), config, admin_session());

    assert_eq!(view.mount().await, FetchOutcome::Failed);
    assert_eq!(
        view.store().error(),
        Some(&FetchError::Timeout { after_ms: 1_000 })
    );
    assert!(matches!(view.display(), DisplayState::Errored { .. }));
}

// =============================================================================
// Fetch generations
// =============================================================================

#[tokio::test]
async fn test_overlapping_fetches_apply_only_the_latest() {
    let (mut view, _api) = mounted_users_view(three_users(), users_config()).await;
    let mut events = view.subscribe();

    let first = view.begin_fetch();
    let second = view.begin_fetch();
    let first_result: Result<Fetched<User>, FetchError> =
        Ok(Fetched::All(sample_users(4)));
    let second_result = view.fetcher().run(&second).await;

    assert_eq!(view.complete_fetch(second, second_result), FetchOutcome::Loaded);
    assert_eq!(view.complete_fetch(first, first_result), FetchOutcome::Stale);
    assert_ids(view.store().records(), &["u1", "u2", "u3"]);

    let mut dropped = Vec::new();
    while let Ok(envelope) = events.try_recv() {
        if let ViewEvent::StaleResponseDropped { generation, .. } = envelope.event {
            dropped.push(generation);
        }
    }
    assert_eq!(dropped, vec![first.generation()]);
}

#[tokio::test]
async fn test_fetch_completing_after_unmount_is_discarded() {
    let (mut view, _api) = mounted_users_view(three_users(), users_config()).await;

    let ticket = view.begin_fetch();
    let result = view.fetcher().run(&ticket).await;
    view.unmount();

    assert_eq!(view.complete_fetch(ticket, result), FetchOutcome::Unmounted);
    assert!(view.store().is_loading());
    assert!(!view.is_mounted());
}

// =============================================================================
// Controls
// =============================================================================

#[tokio::test]
async fn test_search_jane_in_users_view() {
    let (mut view, _api) = mounted_users_view(three_users(), users_config()).await;

    view.search("jane").await;

    let (items, window) = displayed(view.display());
    assert_count(&items, 1);
    assert_eq!(items[0].name, "Jane Smith");
    assert_eq!(window.total_count, 1);
}

#[tokio::test]
async fn test_navigation_is_refused_at_the_ends() {
    let mut config = users_config();
    config.page_size = 10;
    let (mut view, _api) = mounted_users_view(sample_users(50), config).await;

    let window = view.window().unwrap();
    assert_eq!(window.total_pages, 5);
    assert!(!window.has_prev());
    assert!(!view.prev_page().await);

    assert!(view.go_to_page(5).await);
    assert!(!view.window().unwrap().has_next());
    assert!(!view.next_page().await);
    assert_eq!(view.list_state().page(), 5);
}

#[tokio::test]
async fn test_sort_toggle_keeps_page_and_search_resets_it() {
    let mut config = users_config();
    config.page_size = 5;
    let (mut view, _api) = mounted_users_view(sample_users(12), config).await;

    assert!(view.next_page().await);
    assert_eq!(view.sort_by("name"), SortSpec::ascending("name"));
    assert_eq!(view.sort_by("name"), SortSpec::descending("name"));
    assert_eq!(view.list_state().page(), 2);

    let (items, _) = displayed(view.display());
    assert_ids(&items, &["u06", "u05", "u04", "u03", "u02"]);

    view.search("user").await;
    assert_eq!(view.list_state().page(), 1);
}

#[tokio::test]
async fn test_page_size_change_returns_to_first_page() {
    let (mut view, _api) = mounted_users_view(sample_users(30), users_config()).await;

    assert!(view.go_to_page(3).await);
    view.set_page_size(25).await;

    let (items, window) = displayed(view.display());
    assert_eq!(window.page, 1);
    assert_eq!(window.total_pages, 2);
    assert_count(&items, 25);
}

#[tokio::test]
async fn test_server_paginated_logs_view() {
    let api = InMemoryRecordApi::with_records(sample_logs(45));
    let config = TabulaConfig::default_config()
        .view("admin-logs")
        .unwrap()
        .clone();
    let mut view = ViewController::new(Arc::new(api.clone()), config, admin_session());

    view.mount().await;
    let (items, window) = displayed(view.display());
    assert_count(&items, 20);
    // Newest first within the fetched page
    assert_eq!(items[0].id.as_str(), "l019");
    assert_eq!(window.total_count, 45);
    assert_eq!(window.total_pages, 3);

    assert!(view.next_page().await);
    assert!(view.next_page().await);
    assert!(!view.next_page().await);
    assert_eq!(api.request_count(), 3);

    let (items, window) = displayed(view.display());
    assert_count(&items, 5);
    assert_eq!(items[0].id.as_str(), "l044");
    assert!(!window.has_next());
}

#[tokio::test]
async fn test_patched_removal_recounts_server_pages() {
    let api = InMemoryRecordApi::with_records(sample_logs(41));
    let mut config = TabulaConfig::default_config()
        .view("admin-logs")
        .unwrap()
        .clone();
    config.reconcile.remove = ReconcilePolicy::Patch;
    let mut view = ViewController::new(Arc::new(api.clone()), config, admin_session());

    view.mount().await;
    assert!(view.next_page().await);
    assert!(view.window().unwrap().has_next());

    view.remove(&RecordId::from("l020")).await.unwrap();

    let window = view.window().unwrap();
    assert_eq!(window.total_count, 40);
    assert_eq!(window.total_pages, 2);
    assert!(!window.has_next());
    // Patched locally: mount, page 2, remove
    assert_eq!(api.request_count(), 3);
}

// =============================================================================
// Mutations
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_toggle_blocked_patches_one_record_and_notice_clears_itself() {
    let mut config = users_config();
    config.default_sort = Some(SortSpec::ascending("email"));
    let (mut view, api) = mounted_users_view(three_users(), config).await;

    view.search("john").await;
    view.go_to_page(1).await;
    let state_before = view.list_state().clone();

    view.toggle_flag(&RecordId::from("u3"), "blocked", true)
        .await
        .unwrap();

    // Only Bob Johnson changed, in place, without a refetch
    let records = view.store().records();
    assert!(records[2].blocked);
    assert!(!records[0].blocked && !records[1].blocked);
    assert_eq!(api.request_count(), 2);
    assert_eq!(view.list_state(), &state_before);

    let (items, _) = displayed(view.display());
    assert_ids(&items, &["u3", "u1"]);
    assert!(items[0].blocked);

    let notice = view.notice().expect("success notice");
    assert_eq!(notice.level, NoticeLevel::Success);
    assert_eq!(notice.target, Some(RecordId::from("u3")));

    tokio::time::sleep(Duration::from_millis(2_001)).await;
    assert!(view.notice().is_none());
}

#[tokio::test]
async fn test_remove_reloads_by_default() {
    let (mut view, api) = mounted_users_view(three_users(), users_config()).await;

    view.remove(&RecordId::from("u1")).await.unwrap();

    assert_eq!(api.request_count(), 3);
    assert_eq!(view.generation(), 2);
    assert_ids(view.store().records(), &["u2", "u3"]);
}

#[tokio::test]
async fn test_remove_with_patch_policy_keeps_generation() {
    let mut config = users_config();
    config.reconcile.remove = ReconcilePolicy::Patch;
    let (mut view, api) = mounted_users_view(three_users(), config).await;

    view.remove(&RecordId::from("u1")).await.unwrap();

    assert_eq!(api.request_count(), 2);
    assert_eq!(view.generation(), 1);
    assert_ids(view.store().records(), &["u2", "u3"]);
}

#[tokio::test]
async fn test_rejected_mutation_leaves_store_untouched() {
    let (mut view, api) = mounted_users_view(three_users(), users_config()).await;
    let before = view.store().clone();
    api.inject(Fault::Reject("Action non autorisée".to_string()));

    let err = view
        .toggle_flag(&RecordId::from("u2"), "blocked", true)
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Action non autorisée");
    assert_eq!(view.store(), &before);
    assert!(matches!(view.display(), DisplayState::Loaded { .. }));

    let notice = view.notice().unwrap();
    assert!(notice.is_error());
    assert_eq!(notice.target, Some(RecordId::from("u2")));
}

#[tokio::test]
async fn test_create_validated_by_form_rules() {
    let api = InMemoryRecordApi::with_records(three_users());
    let rules = FormRules::new()
        .filter("name", filters::trim())
        .validate("name", validators::required())
        .filter("email", filters::lowercase())
        .validate("email", validators::email());
    let mut view =
        ViewController::new(Arc::new(api.clone()), users_config(), admin_session()).with_rules(rules);
    view.mount().await;

    let mut invalid = Fields::new();
    invalid.insert("name".to_string(), "   ".into());
    invalid.insert("email".to_string(), "not-an-email".into());
    let err = view.create(invalid).await.unwrap_err();
    assert!(matches!(err, MutationError::Invalid(_)));
    assert_eq!(api.request_count(), 1);

    let mut valid = Fields::new();
    valid.insert("name".to_string(), "  Nina Simone ".into());
    valid.insert("email".to_string(), "NINA@Example.com".into());
    valid.insert("role".to_string(), "user".into());
    valid.insert("blocked".to_string(), false.into());
    let ack = view.create(valid).await.unwrap();

    let created = ack.record.unwrap();
    assert_eq!(created.name, "Nina Simone");
    assert_eq!(created.email, "nina@example.com");
    // Reloaded after create
    assert_count(view.store().records(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_controls_of_an_in_flight_row_are_disabled() {
    let (view, api) = mounted_users_view(three_users(), users_config()).await;
    api.inject(Fault::Latency(Duration::from_millis(500)));
    let id = RecordId::from("u1");

    let running = {
        let mutations = view.mutations().clone();
        let id = id.clone();
        tokio::spawn(async move { mutations.toggle_flag(&id, "blocked", true).await })
    };
    tokio::task::yield_now().await;

    assert!(view.in_flight(&id));
    let second = view.mutations().toggle_flag(&id, "blocked", false).await;
    assert!(matches!(second, Err(MutationError::InFlight { .. })));

    assert!(running.await.unwrap().is_ok());
    assert!(!view.in_flight(&id));
    assert!(api.get(&id).unwrap().blocked);
}

#[tokio::test]
async fn test_clear_all_empties_the_view() {
    let (mut view, _api) = mounted_users_view(sample_users(8), users_config()).await;

    view.clear_all().await.unwrap();

    let (items, window) = displayed(view.display());
    assert!(items.is_empty());
    assert_eq!(window.total_pages, 0);
}
