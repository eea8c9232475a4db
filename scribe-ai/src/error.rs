//! Error responses of the AI functions
//!
//! Each function keeps its own failure body so clients can always read the
//! collection field: `{error, suggestions: []}`, `{error, tips: []}` or
//! `{error}`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::gateway::GatewayError;

/// Which function failed (selects the body shape)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    AnalyzeText,
    AnalyzeDocument,
    GenerateAbstract,
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct FunctionError {
    pub kind: FunctionKind,
    pub status: StatusCode,
    pub message: String,
}

impl FunctionError {
    pub fn gateway(kind: FunctionKind, err: GatewayError) -> Self {
        Self {
            kind,
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }

    /// Malformed request body
    pub fn rejection(kind: FunctionKind, rejection: JsonRejection) -> Self {
        Self {
            kind,
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for FunctionError {
    fn into_response(self) -> Response {
        let body = match self.kind {
            FunctionKind::AnalyzeText => json!({ "error": self.message, "suggestions": [] }),
            FunctionKind::AnalyzeDocument => json!({ "error": self.message, "tips": [] }),
            FunctionKind::GenerateAbstract => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

/// Result type for function handlers
pub type FunctionResult<T> = Result<T, FunctionError>;
