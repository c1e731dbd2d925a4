// ABOUTME: Unified error handling system with typed error codes and HTTP mapping
// ABOUTME: Defines AppError, ErrorCode, and the JSON error envelope returned by every route
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Unified Error Handling System
//!
//! Centralized error handling for the BlockFit server. Every fallible
//! operation returns [`AppResult`], and every error kind carries a stable
//! [`ErrorCode`] that maps to exactly one HTTP status so clients can branch
//! on cause.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Authentication (1000-1999)
    #[serde(rename = "AUTH_REQUIRED")]
    AuthRequired = 1000,
    #[serde(rename = "AUTH_INVALID")]
    AuthInvalid = 1001,

    // Validation (3000-3999)
    #[serde(rename = "VALIDATION_ERROR")]
    ValidationError = 3000,

    // Composition domain (4000-4999)
    #[serde(rename = "NOT_FOUND")]
    NotFound = 4000,
    #[serde(rename = "INVALID_STATE")]
    InvalidState = 4001,
    #[serde(rename = "FULL")]
    Full = 4002,
    #[serde(rename = "REFERENCED_ENTITY")]
    ReferencedEntity = 4003,

    // Configuration (6000-6999)
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError = 6000,

    // Internal Errors (9000-9999)
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError = 9001,
    #[serde(rename = "STORAGE_ERROR")]
    StorageError = 9002,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> u16 {
        match self {
            // 400 Bad Request
            ErrorCode::ValidationError => 400,

            // 401 Unauthorized
            ErrorCode::AuthRequired | ErrorCode::AuthInvalid => 401,

            // 404 Not Found
            ErrorCode::NotFound => 404,

            // 409 Conflict - lifecycle state forbids the mutation
            ErrorCode::InvalidState => 409,

            // 422 Unprocessable - the block's slot capacity is exhausted
            ErrorCode::Full => 422,

            // 423 Locked - a live parent still references the target
            ErrorCode::ReferencedEntity => 423,

            // 500 Internal Server Error
            ErrorCode::InternalError
            | ErrorCode::DatabaseError
            | ErrorCode::StorageError
            | ErrorCode::ConfigError => 500,
        }
    }

    /// Get a user-friendly description of this error
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::AuthRequired => "Authentication is required to access this resource",
            ErrorCode::AuthInvalid => "The provided authentication credentials are invalid",
            ErrorCode::ValidationError => "The provided input is invalid",
            ErrorCode::NotFound => "The requested resource was not found",
            ErrorCode::InvalidState => "The resource is not in the required lifecycle state",
            ErrorCode::Full => "The block has no remaining exercise slots",
            ErrorCode::ReferencedEntity => "The resource is still referenced and cannot be deleted",
            ErrorCode::ConfigError => "Configuration error encountered",
            ErrorCode::InternalError => "An internal server error occurred",
            ErrorCode::DatabaseError => "Database operation failed",
            ErrorCode::StorageError => "Media storage operation failed",
        }
    }
}

/// Additional context that can be attached to errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Request ID for tracing
    pub request_id: Option<String>,
    /// Resource ID if applicable
    pub resource_id: Option<String>,
    /// Additional key-value context
    pub details: serde_json::Value,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            request_id: None,
            resource_id: None,
            details: serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional context
    pub context: ErrorContext,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add a resource ID to the error context
    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.context.resource_id = Some(resource_id.into());
        self
    }

    /// Add details to the error context
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.context.details = details;
        self
    }

    /// Add a source error for error chaining
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> u16 {
        self.code.http_status()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// HTTP error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorResponseDetails,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub details: serde_json::Value,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            error: ErrorResponseDetails {
                code: error.code,
                message: error.message,
                request_id: error.context.request_id,
                details: error.context.details,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(ErrorResponse::from(self))).into_response()
    }
}

/// Convenience functions for creating common errors
impl AppError {
    /// Authentication required
    pub fn auth_required() -> Self {
        Self::new(ErrorCode::AuthRequired, "Authentication required")
    }

    /// Invalid authentication
    pub fn auth_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthInvalid, message)
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::NotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Mutation attempted in a forbidden lifecycle state
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidState, message)
    }

    /// Block slot capacity exhausted
    pub fn full(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Full, message)
    }

    /// Deletion blocked by a live referencing parent
    pub fn referenced_entity(target: impl Into<String>, referrer: impl Into<String>) -> Self {
        let referrer = referrer.into();
        Self::new(
            ErrorCode::ReferencedEntity,
            format!("{} is still referenced by {referrer}", target.into()),
        )
        .with_resource_id(referrer)
    }

    /// Malformed input
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Media storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageError, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }
}

/// Conversion from anyhow::Error to AppError
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        // Surface database constraint failures with their proper status
        // instead of a generic 500
        match error.downcast::<sqlx::Error>() {
            Ok(db_error) => Self::from(db_error),
            Err(error) => match error.source() {
                Some(source) => AppError::new(ErrorCode::InternalError, error.to_string())
                    .with_details(serde_json::json!({
                        "source": source.to_string()
                    })),
                None => AppError::new(ErrorCode::InternalError, error.to_string()),
            },
        }
    }
}

/// Conversion from sqlx::Error to AppError
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        if let Some(db_error) = error.as_database_error() {
            return match db_error.kind() {
                sqlx::error::ErrorKind::UniqueViolation => {
                    AppError::validation("record violates a uniqueness constraint")
                }
                sqlx::error::ErrorKind::ForeignKeyViolation => {
                    AppError::validation("record references a missing row")
                }
                _ => AppError::database(error.to_string()),
            };
        }
        AppError::database(error.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(ErrorCode::AuthRequired.http_status(), 401);
        assert_eq!(ErrorCode::NotFound.http_status(), 404);
        assert_eq!(ErrorCode::InvalidState.http_status(), 409);
        assert_eq!(ErrorCode::Full.http_status(), 422);
        assert_eq!(ErrorCode::ReferencedEntity.http_status(), 423);
        assert_eq!(ErrorCode::ValidationError.http_status(), 400);
        assert_eq!(ErrorCode::DatabaseError.http_status(), 500);
    }

    #[test]
    fn test_domain_kinds_have_distinct_statuses() {
        let kinds = [
            ErrorCode::NotFound,
            ErrorCode::InvalidState,
            ErrorCode::Full,
            ErrorCode::ReferencedEntity,
            ErrorCode::ValidationError,
        ];
        let statuses: std::collections::HashSet<u16> =
            kinds.iter().map(ErrorCode::http_status).collect();
        assert_eq!(statuses.len(), kinds.len());
    }

    #[test]
    fn test_referenced_entity_carries_referrer_id() {
        let error = AppError::referenced_entity("block 5", "training 3");
        assert_eq!(error.code, ErrorCode::ReferencedEntity);
        assert_eq!(error.context.resource_id.as_deref(), Some("training 3"));
        assert!(error.message.contains("block 5"));
    }

    #[test]
    fn test_error_response_serialization() {
        let error = AppError::full("block 9 already holds 30 exercises");
        let response = ErrorResponse::from(error);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("FULL"));
        assert!(json.contains("block 9"));
    }
}
