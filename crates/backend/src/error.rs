//! Unified error handling for the backend API.
//!
//! This module provides a centralized error type that implements `IntoResponse`,
//! allowing handlers to use `?` operator naturally while returning appropriate
//! HTTP status codes and error messages.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::AuthError;
use crate::services::ServiceError;

/// API error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Unified error type for API handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Error raised by a service call
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Login flow failure
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Unexpected failure
    #[error("{0}")]
    Internal(#[from] anyhow::Error),

    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Authentication required but not provided or invalid
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not permitted to access resource
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl ApiError {
    /// Create a not found error with a custom message
    pub fn not_found(resource: impl Into<String>) -> Self {
        ApiError::NotFound(resource.into())
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!("JSON body rejected: {}", rejection.body_text());
        ApiError::BadRequest("Invalid JSON".to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message, details) = match &self {
            ApiError::Service(err) => match err {
                ServiceError::InvalidPlant(e) => (
                    StatusCode::BAD_REQUEST,
                    "Invalid plant settings".to_string(),
                    Some(e.to_string()),
                ),
                ServiceError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
                ServiceError::ActorRequired => (
                    StatusCode::BAD_REQUEST,
                    "watered_by is required".to_string(),
                    None,
                ),
                ServiceError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone(), None),
                ServiceError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
                ServiceError::Storage { context, source } => {
                    tracing::error!("{}: {:?}", context, source);
                    (StatusCode::INTERNAL_SERVER_ERROR, context.clone(), None)
                }
            },
            ApiError::Auth(err) => {
                let status = match err {
                    AuthError::DemoUnavailable => StatusCode::NOT_FOUND,
                    AuthError::EmailRequired
                    | AuthError::MissingCode
                    | AuthError::InvalidState => StatusCode::BAD_REQUEST,
                    AuthError::NotAllowed(_) => StatusCode::FORBIDDEN,
                    AuthError::Exchange(e) | AuthError::Session(e) => {
                        tracing::error!("{}: {:?}", err, e);
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, err.to_string(), None)
            }
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
            ApiError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                format!("{} not found", resource),
                None,
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone(), None),
        };

        let body = Json(ErrorResponse {
            error: error_message,
            details,
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
