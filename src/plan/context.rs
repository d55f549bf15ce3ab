// ABOUTME: Assembles the three grounding text blocks for the generation prompt
// ABOUTME: History lines, the full exercise catalog, and retrieved reference snippets
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 repsmith contributors

//! # Context Assembler
//!
//! Renders the grounding material embedded in the generation prompt. Three
//! independent blocks: recent workout history (with a fixed sentinel when
//! empty, so the prompt never contains an empty grounding section), the full
//! exercise catalog (no truncation; downstream validation trusts this
//! exact set), and up to k retrieved reference snippets (degrades to an
//! empty string when retrieval has nothing).

use std::fmt::Write as _;

use crate::models::{Exercise, HistoryRow, User};
use crate::retrieval::Snippet;

/// Default lookback window for workout history
pub const DEFAULT_HISTORY_WINDOW_DAYS: i64 = 7;

/// Render recent workout history as one line per stored set
///
/// Rows are expected ordered by date descending then set number ascending
/// (the store's contract). An empty history renders a fixed sentinel
/// instead of an empty string.
#[must_use]
pub fn history_text(rows: &[HistoryRow], window_days: i64) -> String {
    if rows.is_empty() {
        return format!("No workout history in the last {window_days} days.");
    }

    let mut out = String::new();
    for row in rows {
        let _ = writeln!(
            out,
            "{} | {} | set {} | {} reps | {} kg",
            row.date,
            row.exercise_name,
            row.set_number,
            row.reps,
            row.weight.unwrap_or(0.0)
        );
    }
    out.truncate(out.trim_end().len());
    out
}

/// Render the full exercise catalog, one `id | name | muscle_group` line each
///
/// The whole catalog is shown in the collaborator's natural return order:
/// these are exactly the ids domain validation will accept.
#[must_use]
pub fn catalog_text(catalog: &[Exercise]) -> String {
    catalog
        .iter()
        .map(|e| {
            format!(
                "{} | {} | {}",
                e.id,
                e.name,
                e.muscle_group.as_deref().unwrap_or("-")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render retrieved reference snippets with an optional leading label
///
/// Returns an empty string when there is nothing to show; retrieval is an
/// enhancement, not a requirement.
#[must_use]
pub fn reference_context_text(snippets: &[Snippet]) -> String {
    snippets
        .iter()
        .map(|s| match s.title.as_deref() {
            Some(title) => format!("- [{title}] {}", s.text),
            None => format!("- {}", s.text),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the similarity-search query from the user profile and constraints
#[must_use]
pub fn retrieval_query(user: &User, constraints: Option<&str>) -> String {
    format!(
        "training goal: {}, current state: {}cm, {}kg, PBF {}%, \
         target state: {}cm, {}kg, PBF {}%, constraints: {}",
        user.user_goal.as_deref().unwrap_or("General Fitness"),
        user.recent_state_height.unwrap_or(0.0),
        user.recent_state_weight.unwrap_or(0.0),
        user.recent_state_pbf.unwrap_or(0.0),
        user.goal_state_height.unwrap_or(0.0),
        user.goal_state_weight.unwrap_or(0.0),
        user.goal_state_pbf.unwrap_or(0.0),
        constraints.unwrap_or("None"),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn history_row(day: u32, set_number: i64) -> HistoryRow {
        HistoryRow {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            exercise_name: "Bench Press".to_owned(),
            set_number,
            reps: 10,
            weight: Some(60.0),
        }
    }

    #[test]
    fn test_history_lines_render_per_set() {
        let text = history_text(&[history_row(15, 1), history_row(15, 2)], 7);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "2024-01-15 | Bench Press | set 1 | 10 reps | 60 kg");
    }

    #[test]
    fn test_empty_history_renders_sentinel() {
        let text = history_text(&[], 7);
        assert_eq!(text, "No workout history in the last 7 days.");
    }

    #[test]
    fn test_missing_weight_renders_zero() {
        let mut row = history_row(15, 1);
        row.weight = None;
        let text = history_text(&[row], 7);
        assert!(text.ends_with("| 0 kg"));
    }

    #[test]
    fn test_catalog_lines() {
        let catalog = vec![
            Exercise {
                id: 1,
                name: "Squat".to_owned(),
                muscle_group: Some("legs".to_owned()),
            },
            Exercise {
                id: 2,
                name: "Plank".to_owned(),
                muscle_group: None,
            },
        ];
        let text = catalog_text(&catalog);
        assert_eq!(text, "1 | Squat | legs\n2 | Plank | -");
    }

    #[test]
    fn test_reference_context_with_and_without_title() {
        let snippets = vec![
            Snippet {
                text: "progressive overload basics".to_owned(),
                title: Some("Guide".to_owned()),
            },
            Snippet {
                text: "rest 90s between sets".to_owned(),
                title: None,
            },
        ];
        let text = reference_context_text(&snippets);
        assert_eq!(
            text,
            "- [Guide] progressive overload basics\n- rest 90s between sets"
        );
    }

    #[test]
    fn test_no_snippets_is_empty_string() {
        assert_eq!(reference_context_text(&[]), "");
    }
}
