// ABOUTME: Route handlers for the exercise REST API
// ABOUTME: Multipart creation, CRUD, and listing endpoints under /api/v1/exercises
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Exercise routes
//!
//! Creation is `multipart/form-data` because every exercise ships with a
//! media file; the remaining endpoints are plain JSON over
//! [`ExerciseService`].
//!
//! [`ExerciseService`]: crate::services::exercises::ExerciseService

use std::sync::Arc;

use axum::extract::multipart::{Field, Multipart};
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use bytes::Bytes;
use tracing::debug;

use crate::constants::media::MAX_UPLOAD_BYTES;
use crate::errors::{AppError, AppResult};
use crate::models::{ExerciseListFilter, ExercisePayload};
use crate::resources::ServerResources;
use crate::routes::{authenticate, parse_id};
use crate::services::exercises::NewExercise;

/// Content type recorded when the client does not send one for the upload
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Exercise route handlers
pub struct ExerciseRoutes;

impl ExerciseRoutes {
    /// Create all exercise routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/v1/exercises/create", post(Self::handle_create))
            .route("/api/v1/exercises/list", post(Self::handle_list))
            .route("/api/v1/exercises/:id", get(Self::handle_get))
            .route("/api/v1/exercises/:id", post(Self::handle_update))
            .route("/api/v1/exercises/:id", delete(Self::handle_delete))
            .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
            .with_state(resources)
    }

    /// Handle POST /api/v1/exercises/create - Create an exercise from a
    /// multipart form
    ///
    /// Expected fields: `titleEn`, `titleRu`, an optional comma-separated
    /// `tagIds`, and the media payload under `file`.
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        multipart: Multipart,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let upload = parse_upload(multipart).await?;
        let exercise = resources.exercises.create(upload).await?;
        Ok((StatusCode::CREATED, Json(exercise)).into_response())
    }

    /// Handle POST /api/v1/exercises/list - List exercises per an optional filter
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        body: Option<Json<ExerciseListFilter>>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let filter = body.map(|Json(filter)| filter).unwrap_or_default();
        let exercises = resources.exercises.list(&filter).await?;
        Ok((StatusCode::OK, Json(exercises)).into_response())
    }

    /// Handle GET /api/v1/exercises/:id - Fetch one exercise with its tags
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let id = parse_id(&id, "exercise")?;
        let exercise = resources.exercises.find(id).await?;
        Ok((StatusCode::OK, Json(exercise)).into_response())
    }

    /// Handle POST /api/v1/exercises/:id - Merge-update titles and tips
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
        Json(payload): Json<ExercisePayload>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let id = parse_id(&id, "exercise")?;
        let exercise = resources.exercises.update(id, payload).await?;
        Ok((StatusCode::OK, Json(exercise)).into_response())
    }

    /// Handle DELETE /api/v1/exercises/:id - Soft-delete when unreferenced
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let id = parse_id(&id, "exercise")?;
        resources.exercises.delete(id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}

/// Walk the multipart stream and assemble the upload
async fn parse_upload(mut multipart: Multipart) -> AppResult<NewExercise> {
    let mut title_en = String::new();
    let mut title_ru = String::new();
    let mut tag_ids = Vec::new();
    let mut file: Option<(String, String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("malformed multipart body: {e}")))?
    {
        // The name borrows the field, which reading the content consumes
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };

        match name.as_str() {
            "titleEn" => title_en = read_text(field).await?,
            "titleRu" => title_ru = read_text(field).await?,
            "tagIds" => tag_ids = parse_tag_ids(&read_text(field).await?)?,
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_owned();
                let data = field.bytes().await.map_err(|e| {
                    AppError::validation(format!("unreadable file field: {e}"))
                })?;
                file = Some((file_name, content_type, data));
            }
            other => debug!(field = other, "ignoring unknown multipart field"),
        }
    }

    if title_en.trim().is_empty() || title_ru.trim().is_empty() {
        return Err(AppError::validation("titleEn and titleRu must not be empty"));
    }
    let (file_name, content_type, data) =
        file.ok_or_else(|| AppError::validation("file field is required"))?;

    Ok(NewExercise {
        title_en,
        title_ru,
        tag_ids,
        file_name,
        content_type,
        data,
    })
}

/// Read one text field, surfacing stream errors as validation failures
async fn read_text(field: Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::validation(format!("unreadable multipart field: {e}")))
}

/// Parse a comma-separated id list, tolerating whitespace and empty entries
fn parse_tag_ids(raw: &str) -> AppResult<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry.parse().map_err(|_| {
                AppError::validation(format!(
                    "tagIds must be a comma-separated list of integers, got '{entry}'"
                ))
            })
        })
        .collect()
}
