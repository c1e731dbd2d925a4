// ABOUTME: Route handlers for the training REST API
// ABOUTME: CRUD, draft toggling, and block membership endpoints under /api/v1/trainings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Training routes
//!
//! Thin handlers over [`TrainingService`]; every endpoint requires a session
//! token.
//!
//! [`TrainingService`]: crate::services::trainings::TrainingService

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use crate::errors::AppError;
use crate::models::{ListFilter, TrainingPayload};
use crate::resources::ServerResources;
use crate::routes::{authenticate, parse_id};

/// Training route handlers
pub struct TrainingRoutes;

impl TrainingRoutes {
    /// Create all training routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/v1/trainings/create", post(Self::handle_create))
            .route("/api/v1/trainings/list", post(Self::handle_list))
            .route("/api/v1/trainings/:id", get(Self::handle_get))
            .route("/api/v1/trainings/:id", post(Self::handle_update))
            .route("/api/v1/trainings/:id", delete(Self::handle_delete))
            .route(
                "/api/v1/trainings/:id/toggle_draft",
                post(Self::handle_toggle_draft),
            )
            .route(
                "/api/v1/trainings/:training_id/add/block/:block_id",
                post(Self::handle_add_block),
            )
            .route(
                "/api/v1/trainings/:training_id/remove/block/:block_id",
                post(Self::handle_remove_block),
            )
            .with_state(resources)
    }

    /// Handle POST /api/v1/trainings/create - Create a draft training
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(payload): Json<TrainingPayload>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let training = resources.trainings.create(payload).await?;
        Ok((StatusCode::CREATED, Json(training)).into_response())
    }

    /// Handle POST /api/v1/trainings/list - List trainings per an optional filter
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Option<Json<ListFilter>>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let filter = body.map(|Json(filter)| filter).unwrap_or_default();
        let trainings = resources.trainings.list(&filter).await?;
        Ok((StatusCode::OK, Json(trainings)).into_response())
    }

    /// Handle GET /api/v1/trainings/:id - Fetch one hydrated training
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let id = parse_id(&id, "training")?;
        let training = resources.trainings.find(id).await?;
        Ok((StatusCode::OK, Json(training)).into_response())
    }

    /// Handle POST /api/v1/trainings/:id - Merge-update titles
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(payload): Json<TrainingPayload>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let id = parse_id(&id, "training")?;
        let training = resources.trainings.update(id, payload).await?;
        Ok((StatusCode::OK, Json(training)).into_response())
    }

    /// Handle DELETE /api/v1/trainings/:id - Soft-delete the training
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let id = parse_id(&id, "training")?;
        resources.trainings.delete(id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /api/v1/trainings/:id/toggle_draft - Flip the draft flag
    async fn handle_toggle_draft(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let id = parse_id(&id, "training")?;
        let training = resources.trainings.toggle_draft(id).await?;
        Ok((StatusCode::OK, Json(training)).into_response())
    }

    /// Handle POST /api/v1/trainings/:training_id/add/block/:block_id
    async fn handle_add_block(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((training_id, block_id)): Path<(String, String)>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let training_id = parse_id(&training_id, "training")?;
        let block_id = parse_id(&block_id, "block")?;

        let training = resources.trainings.add_block(training_id, block_id).await?;
        Ok((StatusCode::OK, Json(training)).into_response())
    }

    /// Handle POST /api/v1/trainings/:training_id/remove/block/:block_id
    async fn handle_remove_block(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((training_id, block_id)): Path<(String, String)>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let training_id = parse_id(&training_id, "training")?;
        let block_id = parse_id(&block_id, "block")?;

        let training = resources
            .trainings
            .remove_block(training_id, block_id)
            .await?;
        Ok((StatusCode::OK, Json(training)).into_response())
    }
}
