// ABOUTME: Plan generation pipeline orchestration and its failure taxonomy
// ABOUTME: Grounded prompt, model call, tolerant extraction, validation, atomic persistence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 repsmith contributors

//! # Plan Generation Pipeline
//!
//! The one non-trivial subsystem of this backend: generate a daily workout
//! plan by prompting a language model and turning its free-form text into
//! validated, persisted records. The stages run strictly in order, each
//! either advancing a value or terminating the request with a specific
//! [`PlanError`]:
//!
//! 1. user lookup and catalog fetch (preconditions)
//! 2. context assembly (history, catalog, retrieved snippets)
//! 3. prompt rendering
//! 4. model invocation (no retries; empty output is terminal)
//! 5. array extraction from untrusted text
//! 6. normalization into a sequence of objects
//! 7. per-record schema validation
//! 8. cross-record domain validation
//! 9. one transactional bulk insert
//!
//! No partial write is possible: every failure aborts before persistence,
//! and the insert itself is all-or-nothing.

pub mod context;
pub mod extract;
pub mod normalize;
pub mod prompt;
pub mod validate;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::config::LlmConfig;
use crate::database::PlanStore;
use crate::errors::AppError;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};
use crate::models::{GeneratePlanRequest, GeneratePlanResponse, User};
use crate::retrieval::SnippetSource;

use context::{
    catalog_text, history_text, reference_context_text, retrieval_query,
    DEFAULT_HISTORY_WINDOW_DAYS,
};
use prompt::{build_plan_prompt, PromptInputs};

/// Failure taxonomy of the plan generation pipeline
///
/// Every variant is non-retryable and aborts the request before
/// any persistence. Retrieval failures are absent on purpose: they degrade
/// to an empty grounding block instead of failing the request.
#[derive(Debug, Error)]
pub enum PlanError {
    /// The requesting user does not exist
    #[error("User {0} not found")]
    UserNotFound(i64),

    /// The catalog has no entries; generation cannot be grounded
    #[error("Exercise catalog is empty")]
    EmptyCatalog,

    /// The model produced nothing (empty or whitespace-only)
    #[error("LLM returned empty output")]
    EmptyModelOutput,

    /// No locatable top-level array in the model output
    #[error("Invalid LLM JSON: cannot locate top-level array. sample={snippet}")]
    Extraction {
        /// Bounded prefix of the raw output
        snippet: String,
    },

    /// Array located but unparseable even after the one repair retry
    #[error("Invalid LLM JSON: {detail}. sample={snippet}")]
    Syntax {
        /// Underlying parse failure
        detail: String,
        /// Bounded prefix of the extracted text
        snippet: String,
    },

    /// Parsed value is not an array of objects
    #[error("Invalid LLM JSON: {detail}")]
    Shape {
        /// What was wrong, including the element index where applicable
        detail: String,
    },

    /// A field violated its type or range constraint
    #[error("Invalid plan record: {detail}")]
    Schema {
        /// Offending field and element index
        detail: String,
    },

    /// A record references an id outside the request-time catalog
    #[error("Unknown exercise_id: {0}")]
    UnknownExercise(i64),

    /// A record's date disagrees with the requested target date
    #[error("date mismatch: {actual} != {expected}")]
    DateMismatch {
        /// Date found in the record
        actual: NaiveDate,
        /// Requested target date
        expected: NaiveDate,
    },
}

impl From<PlanError> for AppError {
    fn from(error: PlanError) -> Self {
        match &error {
            PlanError::UserNotFound(id) => Self::not_found(format!("User {id}")),
            PlanError::EmptyCatalog => Self::invalid_input(error.to_string()),
            PlanError::EmptyModelOutput => Self::external_service("LLM", "returned empty output"),
            PlanError::Extraction { .. }
            | PlanError::Syntax { .. }
            | PlanError::Shape { .. }
            | PlanError::Schema { .. }
            | PlanError::UnknownExercise(_)
            | PlanError::DateMismatch { .. } => Self::validation(error.to_string()),
        }
    }
}

/// Orchestrates the plan generation pipeline over its collaborators
///
/// Stateless between invocations: every request re-reads the catalog and
/// holds no shared mutable state, so concurrent generations need no
/// coordination beyond what storage already provides.
pub struct PlanGenerator {
    store: Arc<dyn PlanStore>,
    snippets: Arc<dyn SnippetSource>,
    provider: Arc<dyn LlmProvider>,
    llm_config: LlmConfig,
    retrieval_top_k: usize,
}

impl PlanGenerator {
    /// Create a generator over the given collaborators
    #[must_use]
    pub fn new(
        store: Arc<dyn PlanStore>,
        snippets: Arc<dyn SnippetSource>,
        provider: Arc<dyn LlmProvider>,
        llm_config: LlmConfig,
        retrieval_top_k: usize,
    ) -> Self {
        Self {
            store,
            snippets,
            provider,
            llm_config,
            retrieval_top_k,
        }
    }

    /// Generate a plan for the request and persist it atomically
    ///
    /// # Errors
    ///
    /// Returns the mapped [`PlanError`] for any pipeline-stage failure, an
    /// invalid-input error for an unparseable target date, or a database
    /// error if a storage call fails.
    #[instrument(skip(self, request), fields(user_id = request.user_id, date = %request.date))]
    pub async fn generate_and_save(
        &self,
        request: &GeneratePlanRequest,
    ) -> Result<GeneratePlanResponse, AppError> {
        let target_date: NaiveDate = request.date.parse().map_err(|_| {
            AppError::invalid_input(format!("date must be ISO YYYY-MM-DD, got {:?}", request.date))
        })?;

        let user = self
            .store
            .fetch_user(request.user_id)
            .await?
            .ok_or(PlanError::UserNotFound(request.user_id))?;

        // Catalog first: without it generation cannot be grounded, and its
        // id set is what domain validation will trust later
        let catalog = self.store.fetch_catalog().await?;
        if catalog.is_empty() {
            return Err(PlanError::EmptyCatalog.into());
        }
        let valid_ids: HashSet<i64> = catalog.iter().map(|e| e.id).collect();

        let history_rows = self
            .store
            .fetch_recent_history(request.user_id, DEFAULT_HISTORY_WINDOW_DAYS)
            .await?;

        let constraints = request.constraints.as_deref();
        let query = retrieval_query(&user, constraints);
        let retrieved = self.snippets.search(&query, self.retrieval_top_k).await;

        let history = history_text(&history_rows, DEFAULT_HISTORY_WINDOW_DAYS);
        let catalog_block = catalog_text(&catalog);
        let reference_context = reference_context_text(&retrieved);

        let rendered = build_plan_prompt(&Self::prompt_inputs(
            &user,
            constraints,
            target_date,
            &history,
            &reference_context,
            &catalog_block,
        ));

        debug!("Rendered plan prompt: {} chars", rendered.len());

        let chat_request = ChatRequest::new(vec![ChatMessage::user(rendered)])
            .with_model(self.llm_config.model.clone())
            .with_temperature(self.llm_config.temperature)
            .with_max_tokens(self.llm_config.max_new_tokens);

        let response = self.provider.complete(&chat_request).await?;

        if response.content.trim().is_empty() {
            warn!("Model {} produced empty output", response.model);
            return Err(PlanError::EmptyModelOutput.into());
        }

        let extracted = extract::extract_json_array(&response.content)?;
        let items = normalize::parse_plan_items(&extracted)?;
        let candidates = validate::validate_schema(&items)?;
        let records = validate::validate_domain(candidates, &valid_ids, target_date)?;

        let inserted = self
            .store
            .bulk_insert_records(request.user_id, &records)
            .await?;

        info!(
            "Persisted {} plan records for user {} on {}",
            inserted, request.user_id, target_date
        );

        Ok(GeneratePlanResponse { inserted })
    }

    fn prompt_inputs<'a>(
        user: &'a User,
        constraints: Option<&'a str>,
        date: NaiveDate,
        history: &'a str,
        reference_context: &'a str,
        catalog: &'a str,
    ) -> PromptInputs<'a> {
        PromptInputs {
            user_goal: user.user_goal.as_deref().unwrap_or("General Fitness"),
            recent_height: user.recent_state_height.unwrap_or(0.0),
            recent_weight: user.recent_state_weight.unwrap_or(0.0),
            recent_pbf: user.recent_state_pbf.unwrap_or(0.0),
            goal_height: user.goal_state_height.unwrap_or(0.0),
            goal_weight: user.goal_state_weight.unwrap_or(0.0),
            goal_pbf: user.goal_state_pbf.unwrap_or(0.0),
            constraints: constraints.unwrap_or("None"),
            date,
            history,
            reference_context,
            catalog,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let cases: [(PlanError, u16); 5] = [
            (PlanError::UserNotFound(7), 404),
            (PlanError::EmptyCatalog, 400),
            (PlanError::EmptyModelOutput, 502),
            (
                PlanError::Extraction {
                    snippet: "hello".to_owned(),
                },
                422,
            ),
            (PlanError::UnknownExercise(99), 422),
        ];

        for (error, status) in cases {
            let app_error: AppError = error.into();
            assert_eq!(app_error.http_status(), status);
        }
    }

    #[test]
    fn test_syntax_error_carries_snippet() {
        let error = PlanError::Syntax {
            detail: "expected value at line 1".to_owned(),
            snippet: "[{bad".to_owned(),
        };
        assert!(error.to_string().contains("sample=[{bad"));
    }
}
