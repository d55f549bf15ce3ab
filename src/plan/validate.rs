// ABOUTME: Schema and domain validation of normalized plan records
// ABOUTME: Field/type/range checks per element, then catalog and date invariants across the sequence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 repsmith contributors

//! # Schema and Domain Validation
//!
//! Two distinct stages with distinct failure modes. Schema validation
//! builds a [`CandidateRecord`] per element, enforcing field presence,
//! types, and ranges; any violation aborts the whole request naming the
//! offending field and element index. Domain validation then checks
//! cross-record business invariants against the request-time catalog and
//! target date. It only runs once every element passed schema checks, so
//! no partial failure is ever visible mid-sequence.
//!
//! Deliberately unchecked: the prompt asks for exactly four distinct
//! exercises with 3-5 sets each, but only catalog membership and date
//! agreement are enforced here.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use super::PlanError;
use crate::models::NewWorkoutRecord;

/// Inclusive range for the set ordinal
const SET_NUMBER_RANGE: (i64, i64) = (1, 50);
/// Inclusive range for repetitions
const REPS_RANGE: (i64, i64) = (1, 200);

/// A plan record that passed schema validation but not yet domain checks
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRecord {
    /// Claimed catalog id, unverified until domain validation
    pub exercise_id: i64,
    /// Claimed plan date, unverified until domain validation
    pub date: NaiveDate,
    /// Set ordinal in [1, 50]
    pub set_number: i64,
    /// Repetitions in [1, 200]
    pub reps: i64,
    /// Optional weight in kg
    pub weight: Option<f64>,
}

fn require_integer(item: &Map<String, Value>, index: usize, field: &str) -> Result<i64, PlanError> {
    match item.get(field) {
        Some(value) => value.as_i64().ok_or_else(|| PlanError::Schema {
            detail: format!("item[{index}].{field} must be an integer, got {value}"),
        }),
        None => Err(PlanError::Schema {
            detail: format!("item[{index}].{field} is missing"),
        }),
    }
}

fn require_integer_in_range(
    item: &Map<String, Value>,
    index: usize,
    field: &str,
    (min, max): (i64, i64),
) -> Result<i64, PlanError> {
    let value = require_integer(item, index, field)?;
    if value < min || value > max {
        return Err(PlanError::Schema {
            detail: format!("item[{index}].{field} must be in [{min}, {max}], got {value}"),
        });
    }
    Ok(value)
}

fn require_date(item: &Map<String, Value>, index: usize, field: &str) -> Result<NaiveDate, PlanError> {
    let raw = match item.get(field) {
        Some(Value::String(s)) => s,
        Some(value) => {
            return Err(PlanError::Schema {
                detail: format!("item[{index}].{field} must be an ISO date string, got {value}"),
            })
        }
        None => {
            return Err(PlanError::Schema {
                detail: format!("item[{index}].{field} is missing"),
            })
        }
    };

    raw.parse().map_err(|_| PlanError::Schema {
        detail: format!("item[{index}].{field} is not an ISO date: {raw:?}"),
    })
}

fn optional_number(
    item: &Map<String, Value>,
    index: usize,
    field: &str,
) -> Result<Option<f64>, PlanError> {
    match item.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(value) => Err(PlanError::Schema {
            detail: format!("item[{index}].{field} must be numeric, got {value}"),
        }),
    }
}

/// Validate each normalized element against the record schema
///
/// # Errors
///
/// Returns [`PlanError::Schema`] naming the offending field and element
/// index on the first violation; no partial acceptance.
pub fn validate_schema(items: &[Map<String, Value>]) -> Result<Vec<CandidateRecord>, PlanError> {
    let mut records = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        records.push(CandidateRecord {
            exercise_id: require_integer(item, index, "exercise_id")?,
            date: require_date(item, index, "date")?,
            set_number: require_integer_in_range(item, index, "set_number", SET_NUMBER_RANGE)?,
            reps: require_integer_in_range(item, index, "reps", REPS_RANGE)?,
            weight: optional_number(item, index, "weight")?,
        });
    }

    Ok(records)
}

/// Validate cross-record business invariants and produce storable records
///
/// Checks that every claimed exercise id is a member of the request-time
/// catalog id set and that every record's date equals the requested target
/// date.
///
/// # Errors
///
/// Returns [`PlanError::UnknownExercise`] naming the first unknown id, or
/// [`PlanError::DateMismatch`] naming the first mismatching date.
pub fn validate_domain(
    candidates: Vec<CandidateRecord>,
    valid_ids: &HashSet<i64>,
    target_date: NaiveDate,
) -> Result<Vec<NewWorkoutRecord>, PlanError> {
    for candidate in &candidates {
        if !valid_ids.contains(&candidate.exercise_id) {
            return Err(PlanError::UnknownExercise(candidate.exercise_id));
        }
    }

    for candidate in &candidates {
        if candidate.date != target_date {
            return Err(PlanError::DateMismatch {
                actual: candidate.date,
                expected: target_date,
            });
        }
    }

    Ok(candidates
        .into_iter()
        .map(|c| NewWorkoutRecord {
            exercise_id: c.exercise_id,
            date: c.date,
            set_number: c.set_number,
            reps: c.reps,
            weight: c.weight,
        })
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    fn item(json: &str) -> Map<String, Value> {
        match serde_json::from_str(json).unwrap() {
            Value::Object(map) => map,
            _ => panic!("test item must be an object"),
        }
    }

    fn valid_item() -> Map<String, Value> {
        item(r#"{"exercise_id":1,"date":"2024-01-15","set_number":1,"reps":10,"weight":20.0}"#)
    }

    #[test]
    fn test_valid_record_passes() {
        let records = validate_schema(&[valid_item()]).unwrap();
        assert_eq!(records[0].exercise_id, 1);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(records[0].weight, Some(20.0));
    }

    #[test]
    fn test_missing_field_named_with_index() {
        let err = validate_schema(&[item(r#"{"date":"2024-01-15","set_number":1,"reps":10}"#)])
            .unwrap_err();
        match err {
            PlanError::Schema { detail } => {
                assert!(detail.contains("item[0].exercise_id"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_float_exercise_id_rejected() {
        let err = validate_schema(&[item(
            r#"{"exercise_id":1.5,"date":"2024-01-15","set_number":1,"reps":10}"#,
        )])
        .unwrap_err();
        assert!(matches!(err, PlanError::Schema { .. }));
    }

    #[test]
    fn test_reps_out_of_range() {
        let err = validate_schema(&[item(
            r#"{"exercise_id":1,"date":"2024-01-15","set_number":1,"reps":500}"#,
        )])
        .unwrap_err();
        match err {
            PlanError::Schema { detail } => {
                assert!(detail.contains("item[0].reps"));
                assert!(detail.contains("500"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_set_number_zero_rejected() {
        let err = validate_schema(&[item(
            r#"{"exercise_id":1,"date":"2024-01-15","set_number":0,"reps":10}"#,
        )])
        .unwrap_err();
        assert!(matches!(err, PlanError::Schema { .. }));
    }

    #[test]
    fn test_bad_date_rejected() {
        let err = validate_schema(&[item(
            r#"{"exercise_id":1,"date":"tomorrow","set_number":1,"reps":10}"#,
        )])
        .unwrap_err();
        match err {
            PlanError::Schema { detail } => assert!(detail.contains("item[0].date")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_weight_optional_and_nullable() {
        let no_weight = item(r#"{"exercise_id":1,"date":"2024-01-15","set_number":1,"reps":10}"#);
        let null_weight =
            item(r#"{"exercise_id":1,"date":"2024-01-15","set_number":1,"reps":10,"weight":null}"#);
        let records = validate_schema(&[no_weight, null_weight]).unwrap();
        assert_eq!(records[0].weight, None);
        assert_eq!(records[1].weight, None);
    }

    #[test]
    fn test_second_element_failure_is_indexed() {
        let bad = item(r#"{"exercise_id":2,"date":"2024-01-15","set_number":1,"reps":"ten"}"#);
        let err = validate_schema(&[valid_item(), bad]).unwrap_err();
        match err {
            PlanError::Schema { detail } => assert!(detail.contains("item[1].reps")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_exercise_id_fails_domain() {
        let candidates = validate_schema(&[valid_item()]).unwrap();
        let valid_ids: HashSet<i64> = [2, 3].into_iter().collect();
        let target = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        let err = validate_domain(candidates, &valid_ids, target).unwrap_err();
        assert!(matches!(err, PlanError::UnknownExercise(1)));
    }

    #[test]
    fn test_date_mismatch_fails_domain() {
        let candidates = validate_schema(&[valid_item()]).unwrap();
        let valid_ids: HashSet<i64> = [1].into_iter().collect();
        let target = NaiveDate::from_ymd_opt(2024, 1, 16).unwrap();

        let err = validate_domain(candidates, &valid_ids, target).unwrap_err();
        assert!(matches!(err, PlanError::DateMismatch { .. }));
    }

    #[test]
    fn test_domain_pass_produces_storable_records() {
        let candidates = validate_schema(&[valid_item()]).unwrap();
        let valid_ids: HashSet<i64> = [1].into_iter().collect();
        let target = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        let records = validate_domain(candidates, &valid_ids, target).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].exercise_id, 1);
        assert_eq!(records[0].set_number, 1);
    }
}
