// ABOUTME: Route handlers for session management
// ABOUTME: Registration, login, and logout endpoints issuing bearer session tokens
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Session routes
//!
//! Registration and login answer with the session token twice: in the JSON
//! body and in an `Authorization` response header, so both programmatic and
//! browser clients can pick it up.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};

use crate::constants::auth::TOKEN_SCHEME_PREFIX;
use crate::errors::AppError;
use crate::models::{CredentialsPayload, SessionResponse};
use crate::resources::ServerResources;
use crate::routes::bearer_token;

/// Session route handlers
pub struct SessionRoutes;

impl SessionRoutes {
    /// Create all session routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/register", post(Self::handle_register))
            .route("/login", post(Self::handle_login))
            .route("/logout", post(Self::handle_logout))
            .with_state(resources)
    }

    /// Handle POST /register - Create an account and open its first session
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        Json(payload): Json<CredentialsPayload>,
    ) -> Result<Response, AppError> {
        let session = resources.sessions.register(payload).await?;
        with_token_header(session)
    }

    /// Handle POST /login - Open a fresh session, discarding older ones
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(payload): Json<CredentialsPayload>,
    ) -> Result<Response, AppError> {
        let session = resources.sessions.login(payload).await?;
        with_token_header(session)
    }

    /// Handle POST /logout - Invalidate the presented session token
    async fn handle_logout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let token = bearer_token(&headers)?;
        resources.sessions.logout(token).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}

/// Mirror the fresh token into the Authorization response header
fn with_token_header(session: SessionResponse) -> Result<Response, AppError> {
    let value = HeaderValue::from_str(&format!("{TOKEN_SCHEME_PREFIX}{}", session.token))
        .map_err(|e| AppError::internal(format!("session token is not header-safe: {e}")))?;

    let mut response = (StatusCode::OK, Json(session)).into_response();
    response.headers_mut().insert(header::AUTHORIZATION, value);
    Ok(response)
}
