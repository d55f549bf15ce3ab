// ABOUTME: Contract tests for the SQLite plan store
// ABOUTME: Runs migrations and CRUD paths against an in-memory database
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 repsmith contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use chrono::{Duration, NaiveDate, Utc};
use sqlx::sqlite::SqlitePoolOptions;

use repsmith::database::{PlanStore, SqliteStore};
use repsmith::models::NewWorkoutRecord;

// In-memory SQLite databases are per-connection, so the pool must be
// pinned to a single connection for the schema to be shared
async fn test_store() -> SqliteStore {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    let store = SqliteStore::new(pool);
    store.migrate().await.expect("migration");
    store
}

async fn seed_user(store: &SqliteStore) -> i64 {
    let result = sqlx::query(
        r"
        INSERT INTO users (username, email, user_goal, recent_state_weight, goal_state_weight)
        VALUES ('alice', 'alice@example.com', 'muscle gain', 62.0, 65.0)
        ",
    )
    .execute(store.pool())
    .await
    .expect("seed user");
    result.last_insert_rowid()
}

async fn seed_exercise(store: &SqliteStore, name: &str, muscle_group: Option<&str>) -> i64 {
    let result = sqlx::query("INSERT INTO exercises (name, muscle_group) VALUES ($1, $2)")
        .bind(name)
        .bind(muscle_group)
        .execute(store.pool())
        .await
        .expect("seed exercise");
    result.last_insert_rowid()
}

fn record(exercise_id: i64, date: NaiveDate, set_number: i64, reps: i64) -> NewWorkoutRecord {
    NewWorkoutRecord {
        exercise_id,
        date,
        set_number,
        reps,
        weight: Some(40.0),
    }
}

#[tokio::test]
async fn test_migrate_is_idempotent() {
    let store = test_store().await;
    store.migrate().await.expect("second migration");
}

#[tokio::test]
async fn test_fetch_user_roundtrip() {
    let store = test_store().await;
    let user_id = seed_user(&store).await;

    let user = store.fetch_user(user_id).await.unwrap().expect("seeded user");
    assert_eq!(user.username, "alice");
    assert_eq!(user.email, "alice@example.com");
    assert_eq!(user.user_goal.as_deref(), Some("muscle gain"));
    assert_eq!(user.recent_state_weight, Some(62.0));
    assert_eq!(user.goal_state_weight, Some(65.0));
    assert!(user.recent_state_height.is_none());
}

#[tokio::test]
async fn test_fetch_unknown_user_is_none() {
    let store = test_store().await;
    assert!(store.fetch_user(404).await.unwrap().is_none());
}

#[tokio::test]
async fn test_fetch_catalog() {
    let store = test_store().await;
    let squat_id = seed_exercise(&store, "Squat", Some("legs")).await;
    let plank_id = seed_exercise(&store, "Plank", None).await;

    let catalog = store.fetch_catalog().await.unwrap();
    assert_eq!(catalog.len(), 2);

    let squat = catalog.iter().find(|e| e.id == squat_id).unwrap();
    assert_eq!(squat.name, "Squat");
    assert_eq!(squat.muscle_group.as_deref(), Some("legs"));

    let plank = catalog.iter().find(|e| e.id == plank_id).unwrap();
    assert!(plank.muscle_group.is_none());
}

#[tokio::test]
async fn test_bulk_insert_reports_count() {
    let store = test_store().await;
    let user_id = seed_user(&store).await;
    let exercise_id = seed_exercise(&store, "Squat", Some("legs")).await;
    let date = Utc::now().date_naive();

    let records: Vec<_> = (1..=4).map(|set| record(exercise_id, date, set, 10)).collect();
    let inserted = store.bulk_insert_records(user_id, &records).await.unwrap();
    assert_eq!(inserted, 4);

    let history = store.fetch_recent_history(user_id, 7).await.unwrap();
    assert_eq!(history.len(), 4);
}

#[tokio::test]
async fn test_bulk_insert_empty_slice() {
    let store = test_store().await;
    let user_id = seed_user(&store).await;

    let inserted = store.bulk_insert_records(user_id, &[]).await.unwrap();
    assert_eq!(inserted, 0);
}

#[tokio::test]
async fn test_history_joins_name_and_orders_recent_first() {
    let store = test_store().await;
    let user_id = seed_user(&store).await;
    let squat_id = seed_exercise(&store, "Squat", Some("legs")).await;
    let bench_id = seed_exercise(&store, "Bench Press", Some("chest")).await;

    let today = Utc::now().date_naive();
    let yesterday = today - Duration::days(1);

    store
        .bulk_insert_records(
            user_id,
            &[
                record(squat_id, yesterday, 2, 8),
                record(squat_id, yesterday, 1, 8),
                record(bench_id, today, 1, 10),
            ],
        )
        .await
        .unwrap();

    let history = store.fetch_recent_history(user_id, 7).await.unwrap();
    assert_eq!(history.len(), 3);

    // Date descending, then set number ascending
    assert_eq!(history[0].date, today);
    assert_eq!(history[0].exercise_name, "Bench Press");
    assert_eq!(history[1].date, yesterday);
    assert_eq!(history[1].set_number, 1);
    assert_eq!(history[2].set_number, 2);
    assert_eq!(history[2].exercise_name, "Squat");
}

#[tokio::test]
async fn test_history_window_excludes_old_records() {
    let store = test_store().await;
    let user_id = seed_user(&store).await;
    let exercise_id = seed_exercise(&store, "Squat", Some("legs")).await;

    let today = Utc::now().date_naive();
    let last_month = today - Duration::days(30);

    store
        .bulk_insert_records(
            user_id,
            &[record(exercise_id, today, 1, 10), record(exercise_id, last_month, 1, 10)],
        )
        .await
        .unwrap();

    let history = store.fetch_recent_history(user_id, 7).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].date, today);
}

#[tokio::test]
async fn test_history_is_scoped_to_user() {
    let store = test_store().await;
    let user_id = seed_user(&store).await;
    let other_id = {
        let result = sqlx::query(
            "INSERT INTO users (username, email) VALUES ('bob', 'bob@example.com')",
        )
        .execute(store.pool())
        .await
        .unwrap();
        result.last_insert_rowid()
    };
    let exercise_id = seed_exercise(&store, "Squat", Some("legs")).await;
    let today = Utc::now().date_naive();

    store
        .bulk_insert_records(other_id, &[record(exercise_id, today, 1, 10)])
        .await
        .unwrap();

    let history = store.fetch_recent_history(user_id, 7).await.unwrap();
    assert!(history.is_empty());
}
