// ABOUTME: Persistence layer with the PlanStore contract and its sqlx SQLite implementation
// ABOUTME: Covers user/catalog/history reads and the transactional bulk insert of plan records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 repsmith contributors

//! # Plan Store
//!
//! The minimal read/write contract the plan generation pipeline needs from
//! durable storage, expressed as the [`PlanStore`] trait so tests can
//! substitute an in-memory double, plus the production [`SqliteStore`]
//! backed by a `sqlx` connection pool.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::errors::{AppError, AppResult};
use crate::models::{Exercise, HistoryRow, NewWorkoutRecord, User};

/// Read/write contract consumed by the plan generation pipeline
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Fetch a user by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn fetch_user(&self, user_id: i64) -> AppResult<Option<User>>;

    /// Fetch the full exercise catalog in its natural return order
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn fetch_catalog(&self) -> AppResult<Vec<Exercise>>;

    /// Fetch workout history for the last `window_days` days
    ///
    /// Rows are ordered by date descending then set number ascending and
    /// carry the exercise name joined in.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn fetch_recent_history(
        &self,
        user_id: i64,
        window_days: i64,
    ) -> AppResult<Vec<HistoryRow>>;

    /// Insert all records in one transaction, returning the inserted count
    ///
    /// All-or-nothing: if any insert fails the transaction rolls back and
    /// no record is persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn bulk_insert_records(
        &self,
        user_id: i64,
        records: &[NewWorkoutRecord],
    ) -> AppResult<usize>;
}

/// Production store over a SQLite connection pool
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a store over an existing pool
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Access the underlying pool (readiness probes)
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the schema if it does not exist yet
    ///
    /// # Errors
    ///
    /// Returns an error if any DDL statement fails.
    pub async fn migrate(&self) -> AppResult<()> {
        let statements = [
            r"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                user_goal TEXT,
                recent_state_height REAL,
                recent_state_weight REAL,
                recent_state_pbf REAL,
                goal_state_height REAL,
                goal_state_weight REAL,
                goal_state_pbf REAL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS exercises (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT,
                muscle_group TEXT
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS exercise_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id),
                exercise_id INTEGER NOT NULL REFERENCES exercises(id),
                date TEXT NOT NULL,
                set_number INTEGER NOT NULL,
                reps INTEGER NOT NULL,
                weight REAL,
                exercise_time INTEGER,
                rest_time INTEGER,
                is_completed INTEGER NOT NULL DEFAULT 0
            )
            ",
        ];

        for statement in statements {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to run migration: {e}")))?;
        }

        debug!("Schema migration complete");
        Ok(())
    }
}

#[async_trait]
impl PlanStore for SqliteStore {
    async fn fetch_user(&self, user_id: i64) -> AppResult<Option<User>> {
        let row = sqlx::query(
            r"
            SELECT id, username, email, user_goal,
                   recent_state_height, recent_state_weight, recent_state_pbf,
                   goal_state_height, goal_state_weight, goal_state_pbf
            FROM users
            WHERE id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to fetch user: {e}")))?;

        Ok(row.map(|r| User {
            id: r.get("id"),
            username: r.get("username"),
            email: r.get("email"),
            user_goal: r.get("user_goal"),
            recent_state_height: r.get("recent_state_height"),
            recent_state_weight: r.get("recent_state_weight"),
            recent_state_pbf: r.get("recent_state_pbf"),
            goal_state_height: r.get("goal_state_height"),
            goal_state_weight: r.get("goal_state_weight"),
            goal_state_pbf: r.get("goal_state_pbf"),
        }))
    }

    async fn fetch_catalog(&self) -> AppResult<Vec<Exercise>> {
        let rows = sqlx::query(
            r"
            SELECT id, name, muscle_group
            FROM exercises
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to fetch exercise catalog: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|r| Exercise {
                id: r.get("id"),
                name: r.get("name"),
                muscle_group: r.get("muscle_group"),
            })
            .collect())
    }

    async fn fetch_recent_history(
        &self,
        user_id: i64,
        window_days: i64,
    ) -> AppResult<Vec<HistoryRow>> {
        let start_date = Utc::now().date_naive() - Duration::days(window_days);

        let rows = sqlx::query(
            r"
            SELECT r.date, e.name AS exercise_name, r.set_number, r.reps, r.weight
            FROM exercise_records r
            JOIN exercises e ON e.id = r.exercise_id
            WHERE r.user_id = $1 AND r.date >= $2
            ORDER BY r.date DESC, r.set_number ASC
            ",
        )
        .bind(user_id)
        .bind(start_date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to fetch workout history: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|r| HistoryRow {
                date: r.get::<NaiveDate, _>("date"),
                exercise_name: r.get("exercise_name"),
                set_number: r.get("set_number"),
                reps: r.get("reps"),
                weight: r.get("weight"),
            })
            .collect())
    }

    async fn bulk_insert_records(
        &self,
        user_id: i64,
        records: &[NewWorkoutRecord],
    ) -> AppResult<usize> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(format!("Failed to begin transaction: {e}")))?;

        for record in records {
            sqlx::query(
                r"
                INSERT INTO exercise_records (user_id, exercise_id, date, set_number, reps, weight)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(user_id)
            .bind(record.exercise_id)
            .bind(record.date)
            .bind(record.set_number)
            .bind(record.reps)
            .bind(record.weight)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::database(format!("Failed to insert workout record: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(format!("Failed to commit plan insert: {e}")))?;

        debug!("Inserted {} workout records for user {}", records.len(), user_id);
        Ok(records.len())
    }
}
