// ABOUTME: Parses extracted array text into a uniform sequence of JSON objects
// ABOUTME: One bounded repair retry, object promotion, and double-encoding defense
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 repsmith contributors

//! # Response Normalizer
//!
//! Takes the extractor's candidate text and turns it into an ordered
//! sequence of JSON objects, rejecting the unsalvageable. Parse failure is
//! given exactly one repair retry (strip a dangling comma, append a single
//! `]`); anything beyond that is a syntax failure surfaced to the caller.

use serde_json::{Map, Value};

use super::PlanError;

/// Bounded snippet length for syntax diagnostics
const SNIPPET_LIMIT: usize = 300;

fn snippet_of(text: &str) -> String {
    if text.chars().count() > SNIPPET_LIMIT {
        let prefix: String = text.chars().take(SNIPPET_LIMIT).collect();
        format!("{prefix}...")
    } else {
        text.to_owned()
    }
}

/// Parse the extracted text, retrying once with a bracket/comma repair
fn parse_with_repair(extracted: &str) -> Result<Value, PlanError> {
    match serde_json::from_str(extracted) {
        Ok(value) => Ok(value),
        Err(_) => {
            // Last-ditch defense: some truncations survive extraction with
            // a dangling comma or one missing bracket
            let trimmed = extracted.trim_end();
            let repaired = format!("{}]", trimmed.strip_suffix(',').unwrap_or(trimmed));
            serde_json::from_str(&repaired).map_err(|e| PlanError::Syntax {
                detail: e.to_string(),
                snippet: snippet_of(extracted),
            })
        }
    }
}

/// Normalize a parsed value into a sequence of mapping objects
///
/// A bare object is promoted to a one-element sequence. String elements
/// are parsed again as nested JSON to defend against double-encoded
/// records; an element that is not ultimately an object fails with an
/// error naming its position.
fn normalize_items(value: Value) -> Result<Vec<Map<String, Value>>, PlanError> {
    let items = match value {
        Value::Object(map) => return Ok(vec![map]),
        Value::Array(items) => items,
        _ => {
            return Err(PlanError::Shape {
                detail: "top-level must be array or object".to_owned(),
            })
        }
    };

    let mut normalized = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        let item = match item {
            Value::String(s) => serde_json::from_str(&s).map_err(|_| PlanError::Shape {
                detail: format!("item[{i}] is string, not object"),
            })?,
            other => other,
        };

        match item {
            Value::Object(map) => normalized.push(map),
            _ => {
                return Err(PlanError::Shape {
                    detail: format!("item[{i}] must be object"),
                })
            }
        }
    }

    Ok(normalized)
}

/// Parse extracted array text into an ordered sequence of objects
///
/// # Errors
///
/// Returns [`PlanError::Syntax`] if the text cannot be parsed even after
/// the single repair retry, or [`PlanError::Shape`] if the parsed value is
/// not an array (or single object) of objects.
pub fn parse_plan_items(extracted: &str) -> Result<Vec<Map<String, Value>>, PlanError> {
    normalize_items(parse_with_repair(extracted)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_array() {
        let items = parse_plan_items(r#"[{"a":1},{"b":2}]"#).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["a"], 1);
    }

    #[test]
    fn test_single_object_promoted_to_sequence() {
        let items = parse_plan_items(r#"{"exercise_id": 3, "reps": 12}"#).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["exercise_id"], 3);
    }

    #[test]
    fn test_repair_retry_recovers_dangling_comma() {
        let items = parse_plan_items(r#"[{"a":1},"#).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_double_encoded_element_is_parsed() {
        let items = parse_plan_items(r#"["{\"exercise_id\": 5}"]"#).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["exercise_id"], 5);
    }

    #[test]
    fn test_unparseable_string_element_is_indexed() {
        let err = parse_plan_items(r#"[{"a":1}, "not json"]"#).unwrap_err();
        match err {
            PlanError::Shape { detail } => assert!(detail.contains("item[1]")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_object_element_is_indexed() {
        let err = parse_plan_items("[1, 2]").unwrap_err();
        match err {
            PlanError::Shape { detail } => assert!(detail.contains("item[0]")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_scalar_top_level_rejected() {
        let err = parse_plan_items("42").unwrap_err();
        match err {
            PlanError::Shape { detail } => {
                assert!(detail.contains("top-level must be array or object"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_hopeless_syntax_fails_after_one_retry() {
        let err = parse_plan_items(r#"[{"a": }"#).unwrap_err();
        assert!(matches!(err, PlanError::Syntax { .. }));
    }
}
