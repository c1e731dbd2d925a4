// ABOUTME: Route handlers for the tag REST API
// ABOUTME: Creation and listing endpoints under /api/v1/tags

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::errors::AppError;
use crate::models::TagPayload;
use crate::resources::ServerResources;
use crate::routes::authenticate;

/// Tag route handlers
pub struct TagRoutes;

impl TagRoutes {
    /// Create all tag routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/v1/tags/create", post(Self::handle_create))
            .route("/api/v1/tags/list", get(Self::handle_list))
            .with_state(resources)
    }

    /// Handle POST /api/v1/tags/create - Create a tag
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(payload): Json<TagPayload>,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let tag = resources.tags.create(payload).await?;
        Ok((StatusCode::CREATED, Json(tag)).into_response())
    }

    /// Handle GET /api/v1/tags/list - List every tag, newest first
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        authenticate(&headers, &resources).await?;

        let tags = resources.tags.list().await?;
        Ok((StatusCode::OK, Json(tags)).into_response())
    }
}
