//! POST /generate-abstract
//!
//! One gateway call per requested language; "Ambos" runs both concurrently
//! and fails if either fails.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use scribe_common::api::{AbstractInput, GenerateAbstractRequest, GenerateAbstractResponse};
use scribe_common::progress::abstract_length_warning;
use scribe_common::text::html_to_plain_text;
use scribe_common::Section;
use tracing::{error, info};

use crate::error::{FunctionError, FunctionKind, FunctionResult};
use crate::gateway::{ChatMessage, ChatRequest, GatewayError};
use crate::prompts::{abstract_prompts, AbstractTarget};
use crate::AppState;

pub const MAX_TOKENS: u32 = 800;
pub const TEMPERATURE: f32 = 0.7;

/// Section HTML converted to text; setup fields are already plain
fn plain_text_input(input: &AbstractInput) -> AbstractInput {
    AbstractInput {
        title: input.title.trim().to_string(),
        premise: input.premise.trim().to_string(),
        area: input.area.trim().to_string(),
        objectives: html_to_plain_text(&input.objectives),
        introduction: html_to_plain_text(&input.introduction),
        methodology: html_to_plain_text(&input.methodology),
        results: html_to_plain_text(&input.results),
    }
}

async fn generate_one(
    state: &AppState,
    target: AbstractTarget,
    input: &AbstractInput,
) -> Result<String, GatewayError> {
    let (system, user) = abstract_prompts(target, input);
    let reply = state
        .gateway
        .complete(ChatRequest {
            model: state.settings.abstract_model.clone(),
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            max_tokens: MAX_TOKENS,
            temperature: Some(TEMPERATURE),
        })
        .await?;
    Ok(reply.trim().to_string())
}

pub async fn generate_abstract(
    State(state): State<AppState>,
    payload: Result<Json<GenerateAbstractRequest>, JsonRejection>,
) -> FunctionResult<Json<GenerateAbstractResponse>> {
    let Json(request) =
        payload.map_err(|e| FunctionError::rejection(FunctionKind::GenerateAbstract, e))?;
    let language = request.language;
    let input = plain_text_input(&request.input);

    info!(area = %input.area, ?language, "Generating abstract");

    let portuguese = async {
        if language.wants_portuguese() {
            generate_one(&state, AbstractTarget::Portuguese, &input)
                .await
                .map(Some)
        } else {
            Ok(None)
        }
    };
    let english = async {
        if language.wants_english() {
            generate_one(&state, AbstractTarget::English, &input)
                .await
                .map(Some)
        } else {
            Ok(None)
        }
    };

    let (resumo_pt, resumo_en) = tokio::try_join!(portuguese, english).map_err(|e| {
        error!("generate-abstract failed: {}", e);
        FunctionError::gateway(FunctionKind::GenerateAbstract, e)
    })?;

    let max_words = state.settings.abstract_max_words;
    let warnings = [
        (Section::AbstractPt, resumo_pt.as_deref()),
        (Section::AbstractEn, resumo_en.as_deref()),
    ]
    .into_iter()
    .filter_map(|(section, text)| abstract_length_warning(section, text?, max_words))
    .collect();

    Ok(Json(GenerateAbstractResponse {
        resumo_pt,
        resumo_en,
        warnings,
        error: None,
    }))
}
