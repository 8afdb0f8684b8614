//! Shared test harness for view engine testing
//!
//! Provides record types built with `impl_record!` (`User`, `Movie`,
//! `LogEntry`), sample collections, and small helpers to build controllers
//! over an `InMemoryRecordApi`.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod view_harness;
//! use view_harness::*;
//! ```

#![allow(dead_code)]

pub mod record_api_tests;

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;
use tabula::prelude::*;

// ---------------------------------------------------------------------------
// Record types
// ---------------------------------------------------------------------------

impl_record!(User, "users", ["name", "email"], {
    name: String,
    email: String,
    role: String,
    blocked: bool,
});

impl_record!(Movie, "movies", ["title", "genres"], {
    title: String,
    year: i64,
    rating: f64,
    genres: Vec<String>,
});

impl_record!(LogEntry, "logs", ["action", "user"], {
    action: String,
    user: String,
    created_at: DateTime<Utc>,
});

impl_record!(Score, "scores", ["player"], {
    player: String,
    points: Option<i64>,
    ratio: f64,
});

// ---------------------------------------------------------------------------
// Helper functions: record creation
// ---------------------------------------------------------------------------

/// Create a `User` with a deterministic id.
pub fn user(id: &str, name: &str, email: &str) -> User {
    User {
        id: RecordId::from(id),
        name: name.to_string(),
        email: email.to_string(),
        role: "user".to_string(),
        blocked: false,
    }
}

/// The three users of the search scenario, in this order:
/// John Doe, Jane Smith, Bob Johnson.
pub fn three_users() -> Vec<User> {
    vec![
        user("u1", "John Doe", "john@example.com"),
        user("u2", "Jane Smith", "jane@example.com"),
        user("u3", "Bob Johnson", "bob@example.com"),
    ]
}

/// Generate `n` users named `User 00`, `User 01`, ...
pub fn sample_users(n: usize) -> Vec<User> {
    (0..n)
        .map(|i| {
            user(
                &format!("u{:02}", i),
                &format!("User {:02}", i),
                &format!("user{:02}@example.com", i),
            )
        })
        .collect()
}

/// Movies with repeated ratings, for stability checks.
pub fn sample_movies() -> Vec<Movie> {
    let movie = |id: &str, title: &str, year: i64, rating: f64, genres: &[&str]| Movie {
        id: RecordId::from(id),
        title: title.to_string(),
        year,
        rating,
        genres: genres.iter().map(|g| g.to_string()).collect(),
    };

    vec![
        movie("m1", "Inception", 2010, 8.8, &["Sci-Fi", "Thriller"]),
        movie("m2", "amélie", 2001, 8.3, &["Romance"]),
        movie("m3", "Heat", 1995, 8.3, &["Crime"]),
        movie("m4", "Alien", 1979, 8.5, &["Horror", "Sci-Fi"]),
        movie("m5", "Up", 2009, 8.3, &["Animation"]),
        movie("m6", "Zodiac", 2007, 7.7, &["Crime", "Thriller"]),
    ]
}

/// `n` log entries one minute apart, oldest first.
pub fn sample_logs(n: usize) -> Vec<LogEntry> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
    (0..n)
        .map(|i| LogEntry {
            id: RecordId::from(format!("l{:03}", i)),
            action: if i % 2 == 0 { "login" } else { "logout" }.to_string(),
            user: format!("user{}", i % 7),
            created_at: start + Duration::minutes(i as i64),
        })
        .collect()
}

/// `n` scores where every third has no points and every fifth a NaN ratio.
pub fn sample_scores(n: usize) -> Vec<Score> {
    (0..n)
        .map(|i| Score {
            id: RecordId::from(format!("s{:03}", i)),
            player: format!("player{}", i % 11),
            points: (i % 3 != 0).then_some((i * 37 % 101) as i64),
            ratio: if i % 5 == 0 { f64::NAN } else { (i * 13 % 17) as f64 / 4.0 },
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Helper functions: views
// ---------------------------------------------------------------------------

/// Admin session used by controller tests.
pub fn admin_session() -> SessionContext {
    SessionContext::Admin {
        admin_id: RecordId::from("admin-1"),
        token: "admin-token".to_string(),
    }
}

/// A mounted users view over an in-memory API seeded with `records`.
pub async fn mounted_users_view(
    records: Vec<User>,
    config: ViewConfig,
) -> (
    ViewController<User, InMemoryRecordApi<User>>,
    InMemoryRecordApi<User>,
) {
    let api = InMemoryRecordApi::with_records(records);
    let mut view = ViewController::new(Arc::new(api.clone()), config, admin_session());
    let outcome = view.mount().await;
    assert_eq!(outcome, FetchOutcome::Loaded, "view should load on mount");
    (view, api)
}

/// Items currently displayed, or panic if the view is not loaded.
pub fn displayed<T: Record + std::fmt::Debug>(state: DisplayState<T>) -> (Vec<T>, PageWindow) {
    match state {
        DisplayState::Loaded { items, window, .. } => (items, window),
        other => panic!("Expected a loaded view, got {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// Assertions helpers
// ---------------------------------------------------------------------------

/// Assert that records appear with exactly these ids, in order.
pub fn assert_ids<T: Record>(records: &[T], expected: &[&str]) {
    let ids: Vec<&str> = records.iter().map(|r| r.id().as_str()).collect();
    assert_eq!(ids, expected, "Unexpected record order");
}

/// Assert that a list contains exactly `n` records.
pub fn assert_count<T>(list: &[T], expected: usize) {
    assert_eq!(
        list.len(),
        expected,
        "Expected {} items, got {}",
        expected,
        list.len()
    );
}
