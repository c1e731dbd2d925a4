// ABOUTME: Route module organization for the BlockFit HTTP API
// ABOUTME: Domain route builders, shared authentication helper, and the assembled router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! Route modules for the composition API
//!
//! Each domain module owns its route definitions and thin handler functions
//! that delegate to the service layer. Handlers authenticate through the
//! shared [`authenticate`] helper; there is no auth middleware layer.

use std::sync::Arc;

use axum::http::{header, HeaderMap};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::constants::auth::TOKEN_SCHEME_PREFIX;
use crate::errors::{AppError, AppResult};
use crate::middleware::setup_cors;
use crate::models::Session;
use crate::resources::ServerResources;

/// Session register, login, and logout routes
pub mod auth;
/// Block CRUD and exercise membership routes
pub mod blocks;
/// Exercise CRUD and media upload routes
pub mod exercises;
/// Health check routes
pub mod health;
/// Tag creation and listing routes
pub mod tags;
/// Training CRUD and block membership routes
pub mod trainings;

pub use auth::SessionRoutes;
pub use blocks::BlockRoutes;
pub use exercises::ExerciseRoutes;
pub use health::HealthRoutes;
pub use tags::TagRoutes;
pub use trainings::TrainingRoutes;

/// Assemble the full API router with tracing and CORS layers
pub fn router(resources: &Arc<ServerResources>) -> Router {
    Router::new()
        .merge(HealthRoutes::routes(resources.clone()))
        .merge(SessionRoutes::routes(resources.clone()))
        .merge(BlockRoutes::routes(resources.clone()))
        .merge(TrainingRoutes::routes(resources.clone()))
        .merge(ExerciseRoutes::routes(resources.clone()))
        .merge(TagRoutes::routes(resources.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(setup_cors(&resources.config))
}

/// Pull the session token out of the Authorization header
///
/// # Errors
///
/// Returns an auth-required error when the header is missing and an
/// auth-invalid error when it does not carry the expected scheme
pub(crate) fn bearer_token(headers: &HeaderMap) -> AppResult<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(AppError::auth_required)?;

    value
        .strip_prefix(TOKEN_SCHEME_PREFIX)
        .map(str::trim)
        .ok_or_else(|| {
            AppError::auth_invalid(format!(
                "authorization header must use the '{TOKEN_SCHEME_PREFIX}<token>' scheme"
            ))
        })
}

/// Authenticate a request against the stored sessions
///
/// # Errors
///
/// Returns an auth-required error for a missing header and an auth-invalid
/// error for a malformed scheme or an unknown token
pub(crate) async fn authenticate(
    headers: &HeaderMap,
    resources: &Arc<ServerResources>,
) -> AppResult<Session> {
    let token = bearer_token(headers)?;
    resources.sessions.verify(token).await
}

/// Parse a path segment as an entity id
///
/// # Errors
///
/// Returns a validation error when the segment is not an integer
pub(crate) fn parse_id(raw: &str, entity: &str) -> AppResult<i64> {
    raw.parse()
        .map_err(|_| AppError::validation(format!("{entity} id must be an integer, got '{raw}'")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_requires_header() {
        let headers = HeaderMap::new();
        let error = bearer_token(&headers).unwrap_err();
        assert_eq!(error.code, crate::errors::ErrorCode::AuthRequired);
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc"),
        );
        let error = bearer_token(&headers).unwrap_err();
        assert_eq!(error.code, crate::errors::ErrorCode::AuthInvalid);
    }

    #[test]
    fn test_bearer_token_strips_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Token token=abc-123"),
        );
        assert_eq!(bearer_token(&headers).unwrap(), "abc-123");
    }

    #[test]
    fn test_parse_id_rejects_garbage() {
        assert_eq!(parse_id("17", "block").unwrap(), 17);
        assert!(parse_id("seventeen", "block").is_err());
    }
}
