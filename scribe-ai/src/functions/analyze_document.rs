//! POST /analyze-document
//!
//! Whole-article review producing ten numbered tips.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use scribe_common::api::{AnalyzeDocumentRequest, AnalyzeDocumentResponse};
use tracing::{error, info};

use crate::error::{FunctionError, FunctionKind, FunctionResult};
use crate::gateway::{ChatMessage, ChatRequest};
use crate::prompts::{tips_user_prompt, TIPS_SYSTEM_PROMPT};
use crate::reply::parse_tips;
use crate::AppState;

pub const MAX_TOKENS: u32 = 2000;

pub async fn analyze_document(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeDocumentRequest>, JsonRejection>,
) -> FunctionResult<Json<AnalyzeDocumentResponse>> {
    let Json(request) =
        payload.map_err(|e| FunctionError::rejection(FunctionKind::AnalyzeDocument, e))?;

    info!(
        area = %request.area,
        length = request.document_text.chars().count(),
        "Analyzing document"
    );

    let chat = ChatRequest {
        model: state.settings.model.clone(),
        messages: vec![
            ChatMessage::system(TIPS_SYSTEM_PROMPT),
            ChatMessage::user(tips_user_prompt(
                &request.area,
                &request.premise,
                &request.document_text,
            )),
        ],
        max_tokens: MAX_TOKENS,
        temperature: None,
    };

    let tips = match state.gateway.complete(chat).await {
        Ok(reply) => parse_tips(&reply),
        Err(e) => Err(e),
    }
    .map_err(|e| {
        error!("analyze-document failed: {}", e);
        FunctionError::gateway(FunctionKind::AnalyzeDocument, e)
    })?;

    info!(count = tips.len(), "Tips generated");

    Ok(Json(AnalyzeDocumentResponse { tips, error: None }))
}
