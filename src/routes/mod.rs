// ABOUTME: HTTP route assembly and shared server state
// ABOUTME: Builds the axum Router over Arc<ServerResources> with request tracing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 repsmith contributors

//! HTTP routes for the repsmith server

pub mod health;
pub mod plan;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::database::PlanStore;
use crate::llm::LlmProvider;
use crate::plan::PlanGenerator;

/// Shared state handed to every route handler
pub struct ServerResources {
    /// The plan generation pipeline
    pub generator: PlanGenerator,
    /// Storage contract, probed by readiness checks
    pub store: Arc<dyn PlanStore>,
    /// LLM provider, probed by readiness checks
    pub provider: Arc<dyn LlmProvider>,
}

/// Assemble the full application router
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(health::HealthRoutes::routes(resources.clone()))
        .merge(plan::PlanRoutes::routes(resources))
        .layer(TraceLayer::new_for_http())
}
