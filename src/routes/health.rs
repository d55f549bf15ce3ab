// ABOUTME: Health check route handlers for service monitoring
// ABOUTME: Liveness plus a readiness probe covering storage and the LLM provider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 repsmith contributors

//! Health check routes for service monitoring

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use super::ServerResources;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::handle_health))
            .route("/ready", get(Self::handle_ready))
            .with_state(resources)
    }

    async fn handle_health() -> Json<serde_json::Value> {
        Json(serde_json::json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
    }

    /// Readiness: the catalog must be readable and the provider reachable
    async fn handle_ready(State(resources): State<Arc<ServerResources>>) -> Response {
        let database_ok = resources.store.fetch_catalog().await.is_ok();
        let llm_ok = resources
            .provider
            .health_check()
            .await
            .unwrap_or(false);

        let ready = database_ok && llm_ok;
        let status = if ready {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        };

        let body = Json(serde_json::json!({
            "status": if ready { "ready" } else { "degraded" },
            "database": database_ok,
            "llm": llm_ok,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));

        (status, body).into_response()
    }
}
