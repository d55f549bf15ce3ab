// ABOUTME: Renders the single generation instruction sent to the language model
// ABOUTME: Pure function combining user state, constraints, history, catalog, and retrieved context
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 repsmith contributors

//! # Prompt Builder
//!
//! One pure function: [`PromptInputs`] in, a single rendered instruction
//! string out. The instruction states the full output contract (JSON array
//! only, four distinct catalog exercises, 3-5 sets each, date pinning,
//! bodyweight weight rules, catalog-ids-only), but the builder enforces
//! nothing itself. Enforcement lives downstream in the extractor and the
//! validators; the prompt just makes the contract explicit to the model,
//! including the literal ids it may use.

use chrono::NaiveDate;

/// Everything the template needs, gathered by the orchestrator
#[derive(Debug, Clone)]
pub struct PromptInputs<'a> {
    /// Free-text training goal
    pub user_goal: &'a str,
    /// Current height in cm
    pub recent_height: f64,
    /// Current weight in kg
    pub recent_weight: f64,
    /// Current body fat percentage
    pub recent_pbf: f64,
    /// Target height in cm
    pub goal_height: f64,
    /// Target weight in kg
    pub goal_weight: f64,
    /// Target body fat percentage
    pub goal_pbf: f64,
    /// Free-text constraints, or "None"
    pub constraints: &'a str,
    /// The requested plan date
    pub date: NaiveDate,
    /// Rendered history block (never empty; sentinel when no rows)
    pub history: &'a str,
    /// Rendered retrieved-context block (may be empty)
    pub reference_context: &'a str,
    /// Rendered catalog block (never empty; checked upstream)
    pub catalog: &'a str,
}

/// Render the plan generation instruction
#[must_use]
pub fn build_plan_prompt(inputs: &PromptInputs<'_>) -> String {
    let date = inputs.date;
    format!(
        r#"You are a workout planner. Generate a one-day workout plan as a JSON array based on the user information below.

## Output format
Output ONLY a JSON array shaped exactly like this:
[
  {{"exercise_id": 1, "date": "{date}", "set_number": 1, "reps": 12, "weight": 20.0}},
  {{"exercise_id": 1, "date": "{date}", "set_number": 2, "reps": 12, "weight": 20.0}},
  {{"exercise_id": 1, "date": "{date}", "set_number": 3, "reps": 12, "weight": 20.0}}
]

## Complete example output (4 exercises, 16 records total)
[
  {{"exercise_id": 1, "date": "{date}", "set_number": 1, "reps": 12, "weight": 20.0}},
  {{"exercise_id": 1, "date": "{date}", "set_number": 2, "reps": 12, "weight": 20.0}},
  {{"exercise_id": 1, "date": "{date}", "set_number": 3, "reps": 12, "weight": 20.0}},
  {{"exercise_id": 1, "date": "{date}", "set_number": 4, "reps": 12, "weight": 20.0}},
  {{"exercise_id": 4, "date": "{date}", "set_number": 1, "reps": 10, "weight": 30.0}},
  {{"exercise_id": 4, "date": "{date}", "set_number": 2, "reps": 10, "weight": 30.0}},
  {{"exercise_id": 4, "date": "{date}", "set_number": 3, "reps": 10, "weight": 30.0}},
  {{"exercise_id": 4, "date": "{date}", "set_number": 4, "reps": 10, "weight": 30.0}},
  {{"exercise_id": 7, "date": "{date}", "set_number": 1, "reps": 15, "weight": 0}},
  {{"exercise_id": 7, "date": "{date}", "set_number": 2, "reps": 15, "weight": 0}},
  {{"exercise_id": 7, "date": "{date}", "set_number": 3, "reps": 15, "weight": 0}},
  {{"exercise_id": 7, "date": "{date}", "set_number": 4, "reps": 15, "weight": 0}},
  {{"exercise_id": 8, "date": "{date}", "set_number": 1, "reps": 20, "weight": 5.0}},
  {{"exercise_id": 8, "date": "{date}", "set_number": 2, "reps": 20, "weight": 5.0}},
  {{"exercise_id": 8, "date": "{date}", "set_number": 3, "reps": 20, "weight": 5.0}},
  {{"exercise_id": 8, "date": "{date}", "set_number": 4, "reps": 20, "weight": 5.0}}
]

## Plan composition rules
- Select exactly 4 different exercises (use only exercise_id values from the catalog below)
- Each exercise: perform 3-5 sets
- The set_number field is the set ordinal (starting at 1; 4 sets means 4 separate records with set_number=1,2,3,4)
- All sets of the same exercise use the same reps
- Every date must be exactly {date}
- weight is 0 for bodyweight exercises, an appropriate load for equipment exercises

## User information
- Goal: {user_goal}
- Current state: {recent_height}cm, {recent_weight}kg, body fat {recent_pbf}%
- Target state: {goal_height}cm, {goal_weight}kg, body fat {goal_pbf}%
- Constraints: {constraints}

## Recent workout history (use this pattern for progressive overload)
{history}

## Reference guides
{reference_context}

Important: even when following the history and reference guides, the plan must contain 4 different exercises.

## Allowed exercise catalog (use ONLY exercise_id values from this list)
{catalog}

Important: output ONLY the JSON array. No code fences (```), no explanations, no other text. The output must start with [ and end with ]."#,
        date = date,
        user_goal = inputs.user_goal,
        recent_height = inputs.recent_height,
        recent_weight = inputs.recent_weight,
        recent_pbf = inputs.recent_pbf,
        goal_height = inputs.goal_height,
        goal_weight = inputs.goal_weight,
        goal_pbf = inputs.goal_pbf,
        constraints = inputs.constraints,
        history = inputs.history,
        reference_context = inputs.reference_context,
        catalog = inputs.catalog,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn inputs<'a>(date: NaiveDate, catalog: &'a str, history: &'a str) -> PromptInputs<'a> {
        PromptInputs {
            user_goal: "muscle gain",
            recent_height: 180.0,
            recent_weight: 80.0,
            recent_pbf: 18.0,
            goal_height: 180.0,
            goal_weight: 85.0,
            goal_pbf: 15.0,
            constraints: "None",
            date,
            history,
            reference_context: "",
            catalog,
        }
    }

    #[test]
    fn test_prompt_embeds_catalog_and_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let prompt = build_plan_prompt(&inputs(
            date,
            "1 | Squat | legs\n2 | Bench Press | chest",
            "No workout history in the last 7 days.",
        ));

        assert!(prompt.contains("1 | Squat | legs"));
        assert!(prompt.contains("Every date must be exactly 2024-01-15"));
        assert!(prompt.contains("No workout history in the last 7 days."));
    }

    #[test]
    fn test_prompt_states_output_contract() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let prompt = build_plan_prompt(&inputs(date, "1 | Squat | legs", "none"));

        assert!(prompt.contains("exactly 4 different exercises"));
        assert!(prompt.contains("3-5 sets"));
        assert!(prompt.contains("must start with [ and end with ]"));
        assert!(prompt.contains("weight is 0 for bodyweight exercises"));
    }
}
