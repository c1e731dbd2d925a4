// ABOUTME: Route handlers for the block REST API
// ABOUTME: CRUD, draft toggling, and exercise membership endpoints under /api/v1/blocks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Block routes
//!
//! Thin handlers over [`BlockService`]; every endpoint requires a session
//! token.
//!
//! [`BlockService`]: crate::services::blocks::BlockService

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use crate::errors::AppError;
use crate::models::{AddExercisePayload, BlockPayload, ListFilter};
use crate::resources::ServerResources;
use crate::routes::{authenticate, parse_id};

/// Block route handlers
pub struct BlockRoutes;

impl BlockRoutes {
    /// Create all block routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/v1/blocks/create", post(Self::handle_create))
            .route("/api/v1/blocks/list", post(Self::handle_list))
            .route("/api/v1/blocks/:id", get(Self::handle_get))
            .route("/api/v1/blocks/:id", post(Self::handle_update))
            .route("/api/v1/blocks/:id", delete(Self::handle_delete))
            .route(
                "/api/v1/blocks/:id/toggle_draft",
                post(Self::handle_toggle_draft),
            )
            .route(
                "/api/v1/blocks/:block_id/add/exercise/:exercise_id",
                post(Self::handle_add_exercise),
            )
            .route(
                "/api/v1/blocks/:block_id/remove/exercise/:exercise_id",
                post(Self::handle_remove_exercise),
            )
            .with_state(resources)
    }

    /// Handle POST /api/v1/blocks/create - Create a draft block
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(payload): Json<BlockPayload>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let block = resources.blocks.create(payload).await?;
        Ok((StatusCode::CREATED, Json(block)).into_response())
    }

    /// Handle POST /api/v1/blocks/list - List blocks per an optional filter
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Option<Json<ListFilter>>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let filter = body.map(|Json(filter)| filter).unwrap_or_default();
        let blocks = resources.blocks.list(&filter).await?;
        Ok((StatusCode::OK, Json(blocks)).into_response())
    }

    /// Handle GET /api/v1/blocks/:id - Fetch one hydrated block
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let id = parse_id(&id, "block")?;
        let block = resources.blocks.find(id).await?;
        Ok((StatusCode::OK, Json(block)).into_response())
    }

    /// Handle POST /api/v1/blocks/:id - Merge-update titles and timing
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(payload): Json<BlockPayload>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let id = parse_id(&id, "block")?;
        let block = resources.blocks.update(id, payload).await?;
        Ok((StatusCode::OK, Json(block)).into_response())
    }

    /// Handle DELETE /api/v1/blocks/:id - Soft-delete when unreferenced
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let id = parse_id(&id, "block")?;
        resources.blocks.delete(id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /api/v1/blocks/:id/toggle_draft - Flip the draft flag
    async fn handle_toggle_draft(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let id = parse_id(&id, "block")?;
        let block = resources.blocks.toggle_draft(id).await?;
        Ok((StatusCode::OK, Json(block)).into_response())
    }

    /// Handle POST /api/v1/blocks/:block_id/add/exercise/:exercise_id
    ///
    /// The optional JSON body carries the side tag for the new slot.
    async fn handle_add_exercise(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((block_id, exercise_id)): Path<(String, String)>,
        body: Option<Json<AddExercisePayload>>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let block_id = parse_id(&block_id, "block")?;
        let exercise_id = parse_id(&exercise_id, "exercise")?;
        let side = body.map(|Json(payload)| payload.side).unwrap_or_default();

        let block = resources
            .blocks
            .add_exercise(block_id, exercise_id, side)
            .await?;
        Ok((StatusCode::OK, Json(block)).into_response())
    }

    /// Handle POST /api/v1/blocks/:block_id/remove/exercise/:exercise_id
    async fn handle_remove_exercise(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((block_id, exercise_id)): Path<(String, String)>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let block_id = parse_id(&block_id, "block")?;
        let exercise_id = parse_id(&exercise_id, "exercise")?;

        let block = resources
            .blocks
            .remove_exercise(block_id, exercise_id)
            .await?;
        Ok((StatusCode::OK, Json(block)).into_response())
    }
}
