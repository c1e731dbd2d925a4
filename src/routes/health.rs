// ABOUTME: Health check route handler for service monitoring
// ABOUTME: Reports overall status after probing the database and the media store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Health check route
//!
//! `/health` is the only endpoint served without a session token; load
//! balancers and container probes hit it directly.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::errors::AppError;
use crate::resources::ServerResources;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::handle_health))
            .with_state(resources)
    }

    /// Handle GET /health - Probe the database and the media store
    async fn handle_health(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        resources
            .database
            .ping()
            .await
            .map_err(|e| AppError::database(format!("database is unreachable: {e}")))?;
        resources
            .media
            .ping()
            .await
            .map_err(|e| AppError::storage(format!("media store is unreachable: {e}")))?;

        Ok((
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "timestamp": chrono::Utc::now().to_rfc3339()
            })),
        )
            .into_response())
    }
}
