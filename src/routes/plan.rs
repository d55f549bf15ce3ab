// ABOUTME: Plan generation route handler
// ABOUTME: POST /plan/generate-and-save runs the pipeline and returns the inserted count
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 repsmith contributors

//! Plan generation routes
//!
//! One operation: generate a daily workout plan for a user and persist it
//! atomically. All pipeline failures surface through [`crate::errors::AppError`]
//! with their mapped status codes (400 empty catalog, 404 unknown user,
//! 422 validation failures, 502 empty model output).

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};

use super::ServerResources;
use crate::errors::AppError;
use crate::models::GeneratePlanRequest;

/// Plan routes implementation
pub struct PlanRoutes;

impl PlanRoutes {
    /// Create all plan routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/plan/generate-and-save", post(Self::handle_generate))
            .with_state(resources)
    }

    /// Handle plan generation
    async fn handle_generate(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<GeneratePlanRequest>,
    ) -> Result<Response, AppError> {
        let response = resources.generator.generate_and_save(&request).await?;
        Ok((StatusCode::OK, Json(response)).into_response())
    }
}
