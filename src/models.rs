// ABOUTME: Domain model types for users, the exercise catalog, and workout records
// ABOUTME: Plain serde structs mirroring the database tables plus request/response payloads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 repsmith contributors

//! Core domain types shared across the plan generation pipeline

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A user profile with current and target body metrics
///
/// The metric fields ground the generation prompt; any of them may be
/// unset for a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Primary key
    pub id: i64,
    /// Display name
    pub username: String,
    /// Unique email address
    pub email: String,
    /// Free-text training goal (e.g. "muscle gain")
    pub user_goal: Option<String>,
    /// Current height in cm
    pub recent_state_height: Option<f64>,
    /// Current weight in kg
    pub recent_state_weight: Option<f64>,
    /// Current body fat percentage
    pub recent_state_pbf: Option<f64>,
    /// Target height in cm
    pub goal_state_height: Option<f64>,
    /// Target weight in kg
    pub goal_state_weight: Option<f64>,
    /// Target body fat percentage
    pub goal_state_pbf: Option<f64>,
}

/// One entry of the exercise catalog
///
/// The set of catalog ids fetched at request time is the authoritative
/// constraint on generated plans: a plan may only reference these ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    /// Primary key
    pub id: i64,
    /// Exercise name
    pub name: String,
    /// Primary muscle group
    pub muscle_group: Option<String>,
}

/// A past workout row joined with its exercise name
///
/// Used only as textual prompt grounding; never re-parsed.
#[derive(Debug, Clone)]
pub struct HistoryRow {
    /// Date the set was performed
    pub date: NaiveDate,
    /// Exercise name at the time of the query
    pub exercise_name: String,
    /// Which set this row is (ordinal, 1-based)
    pub set_number: i64,
    /// Repetitions performed
    pub reps: i64,
    /// Weight in kg, if any
    pub weight: Option<f64>,
}

/// A fully validated workout record ready for persistence
///
/// Only records that passed both schema and domain validation are ever
/// represented by this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewWorkoutRecord {
    /// Catalog id of the exercise
    pub exercise_id: i64,
    /// Plan date; always equals the requested target date
    pub date: NaiveDate,
    /// Set ordinal as generated (1-based), persisted as supplied
    pub set_number: i64,
    /// Repetitions for this set
    pub reps: i64,
    /// Weight in kg; 0 for bodyweight movements, may be absent
    pub weight: Option<f64>,
}

/// Request body for `POST /plan/generate-and-save`
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratePlanRequest {
    /// User the plan is generated for
    pub user_id: i64,
    /// Target date, ISO `YYYY-MM-DD`
    pub date: String,
    /// Optional free-text constraints (injuries, available equipment, ...)
    #[serde(default)]
    pub constraints: Option<String>,
}

/// Success response of `POST /plan/generate-and-save`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratePlanResponse {
    /// Number of workout records persisted
    pub inserted: usize,
}
