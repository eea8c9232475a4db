//! Error types for scribe-pm
//!
//! Every handler returns [`ApiResult`]; failures render as
//! `{"error": {"code", "message", "details"?}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use scribe_common::progress::NavigationError;
use scribe_common::project::ValidationError;
use serde_json::{json, Value};
use thiserror::Error;

use crate::ai_client::AiClientError;
use crate::documents::DocumentError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Setup fields rejected (400), lists every violation
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Step gate refused access (409)
    #[error(transparent)]
    Locked(#[from] NavigationError),

    /// Request conflicts with the resource state (409)
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
        details: Option<Value>,
    },

    /// Upload could not be turned into a reviewable document
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Extracted document failed validation (422)
    #[error("Unprocessable document: {}", .0.join("; "))]
    InvalidDocument(Vec<String>),

    /// AI functions service failed (502)
    #[error("AI service error: {0}")]
    AiService(#[from] AiClientError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// scribe-common error
    #[error("Common error: {0}")]
    Common(#[from] scribe_common::Error),
}

impl ApiError {
    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict {
            message: message.into(),
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            ApiError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_FAILED",
                err.to_string(),
                Some(json!({ "violations": err.violations })),
            ),
            ApiError::Locked(err) => {
                let message = err.to_string();
                let details = serde_json::to_value(&err).ok();
                (StatusCode::CONFLICT, "STEP_LOCKED", message, details)
            }
            ApiError::Conflict { message, details } => {
                (StatusCode::CONFLICT, "CONFLICT", message, details)
            }
            ApiError::Document(err) => {
                let (status, code) = match &err {
                    DocumentError::Unsupported(_) => {
                        (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_FORMAT")
                    }
                    DocumentError::TooLarge { .. } => {
                        (StatusCode::PAYLOAD_TOO_LARGE, "DOCUMENT_TOO_LARGE")
                    }
                    DocumentError::Encoding(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
                    DocumentError::Extraction(_) => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "EXTRACTION_FAILED")
                    }
                };
                (status, code, err.to_string(), None)
            }
            ApiError::InvalidDocument(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_DOCUMENT",
                errors.join("; "),
                Some(json!({ "errors": errors })),
            ),
            ApiError::AiService(err) => {
                (StatusCode::BAD_GATEWAY, "AI_SERVICE_ERROR", err.to_string(), None)
            }
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg, None)
            }
            ApiError::Common(err) => match err {
                scribe_common::Error::NotFound(msg) => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None)
                }
                scribe_common::Error::UnknownSection(name) => (
                    StatusCode::BAD_REQUEST,
                    "UNKNOWN_SECTION",
                    format!("Unknown section: {}", name),
                    None,
                ),
                other => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "COMMON_ERROR",
                    other.to_string(),
                    None,
                ),
            },
        };

        let mut error = json!({
            "code": code,
            "message": message,
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
