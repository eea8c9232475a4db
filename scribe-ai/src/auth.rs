//! Service-key middleware
//!
//! Applied to the function routes only; /health stays open. OPTIONS
//! preflight requests never reach it because the CORS layer answers them.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use crate::AppState;

pub async fn service_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let authorization = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match state.service_key.validate(authorization) {
        Ok(()) => next.run(request).await,
        Err(e) => {
            warn!(path = %request.uri().path(), "Rejected request: {}", e);
            (StatusCode::UNAUTHORIZED, Json(json!({ "error": e.to_string() }))).into_response()
        }
    }
}
