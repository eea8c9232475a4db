//! POST /analyze-text
//!
//! Section review: 3-5 short suggestions for one manuscript section.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use scribe_common::api::{AnalyzeTextRequest, AnalyzeTextResponse};
use tracing::{error, info};

use crate::error::{FunctionError, FunctionKind, FunctionResult};
use crate::gateway::{ChatMessage, ChatRequest};
use crate::prompts::{suggestions_user_prompt, SUGGESTIONS_SYSTEM_PROMPT};
use crate::reply::parse_suggestions;
use crate::AppState;

/// Content shorter than this (trimmed, in characters) gets no suggestions
///
/// Checked before the gateway is touched, so short content succeeds even
/// when no API key is configured; longer content then fails with
/// "API key não configurada".
pub const MIN_CONTENT_CHARS: usize = 50;

pub const MAX_TOKENS: u32 = 800;

pub async fn analyze_text(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeTextRequest>, JsonRejection>,
) -> FunctionResult<Json<AnalyzeTextResponse>> {
    let Json(request) =
        payload.map_err(|e| FunctionError::rejection(FunctionKind::AnalyzeText, e))?;

    info!(
        section = %request.section,
        length = request.content.chars().count(),
        "Analyzing section"
    );

    if request.content.trim().chars().count() < MIN_CONTENT_CHARS {
        return Ok(Json(AnalyzeTextResponse::default()));
    }

    let chat = ChatRequest {
        model: state.settings.model.clone(),
        messages: vec![
            ChatMessage::system(SUGGESTIONS_SYSTEM_PROMPT),
            ChatMessage::user(suggestions_user_prompt(&request.section, &request.content)),
        ],
        max_tokens: MAX_TOKENS,
        temperature: None,
    };

    let suggestions = match state.gateway.complete(chat).await {
        Ok(reply) => parse_suggestions(&reply),
        Err(e) => Err(e),
    }
    .map_err(|e| {
        error!("analyze-text failed: {}", e);
        FunctionError::gateway(FunctionKind::AnalyzeText, e)
    })?;

    info!(count = suggestions.len(), "Suggestions generated");

    Ok(Json(AnalyzeTextResponse {
        suggestions,
        error: None,
    }))
}
