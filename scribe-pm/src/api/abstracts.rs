//! Abstract generation and approval
//!
//! Generated text is returned for review and only stored on approval.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use scribe_common::api::{AbstractInput, AbstractLanguage};
use scribe_common::db::{self, load_thresholds};
use scribe_common::events::ScribeEvent;
use scribe_common::progress::{check_navigation, evaluate, ProgressReport};
use scribe_common::text::word_count_html;
use scribe_common::Step;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub language: AbstractLanguage,
}

#[derive(Debug, Serialize)]
pub struct GeneratedAbstract {
    pub text: String,
    pub word_count: usize,
}

impl GeneratedAbstract {
    fn new(text: String) -> Self {
        Self {
            word_count: word_count_html(&text),
            text,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abstract_pt: Option<GeneratedAbstract>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abstract_en: Option<GeneratedAbstract>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApproveRequest {
    pub abstract_pt: Option<String>,
    pub abstract_en: Option<String>,
}

/// POST /api/projects/:id/abstract/generate
pub async fn generate_abstract(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<GenerateRequest>,
) -> ApiResult<Json<GenerateResponse>> {
    let thresholds = load_thresholds(&state.db).await?;
    let project = db::load_project(&state.db, id).await?;
    let progress = evaluate(&project, &thresholds);

    if !progress.can_generate_abstract {
        let unmet: Vec<_> = progress
            .steps
            .iter()
            .filter(|s| s.step < Step::Abstract)
            .flat_map(|s| s.requirements.iter().filter(|r| !r.met).cloned())
            .collect();
        return Err(ApiError::Conflict {
            message: "Complete objectives, introduction, methodology and results before generating the abstract".to_string(),
            details: Some(json!({ "unmet": unmet })),
        });
    }

    info!(project_id = %id, language = ?request.language, "Requesting abstract");

    let input = AbstractInput {
        title: project.title,
        premise: project.premise,
        area: project.area,
        objectives: project.objectives,
        introduction: project.introduction,
        methodology: project.methodology,
        results: project.results,
    };
    let generated = state.ai.generate_abstract(input, request.language).await?;

    Ok(Json(GenerateResponse {
        abstract_pt: generated.resumo_pt.map(GeneratedAbstract::new),
        abstract_en: generated.resumo_en.map(GeneratedAbstract::new),
        warnings: generated.warnings,
    }))
}

/// POST /api/projects/:id/abstract/approve
pub async fn approve_abstract(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ApproveRequest>,
) -> ApiResult<Json<ProgressReport>> {
    let non_blank = |text: Option<String>| text.filter(|t| !t.trim().is_empty());
    let abstract_pt = non_blank(request.abstract_pt);
    let abstract_en = non_blank(request.abstract_en);

    if abstract_pt.is_none() && abstract_en.is_none() {
        return Err(ApiError::BadRequest(
            "Send abstract_pt, abstract_en or both".to_string(),
        ));
    }

    let thresholds = load_thresholds(&state.db).await?;
    let mut project = db::load_project(&state.db, id).await?;
    check_navigation(&project, Step::Abstract, &thresholds)?;

    db::save_abstracts(&state.db, id, abstract_pt.as_deref(), abstract_en.as_deref()).await?;

    let mut languages = Vec::new();
    if let Some(text) = abstract_pt {
        project.abstract_pt = text;
        languages.push("pt".to_string());
    }
    if let Some(text) = abstract_en {
        project.abstract_en = text;
        languages.push("en".to_string());
    }
    info!(project_id = %id, ?languages, "Abstract approved");

    state.event_bus.emit_lossy(ScribeEvent::AbstractApproved {
        project_id: id,
        languages,
        timestamp: Utc::now(),
    });

    Ok(Json(evaluate(&project, &thresholds)))
}
