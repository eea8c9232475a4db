//! Section reads, saves, drafts and suggestions
//!
//! Every route checks the step gate for the section's step first, so a
//! locked section can be neither read nor written.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use scribe_common::api::Suggestion;
use scribe_common::db::{self, load_thresholds};
use scribe_common::progress::{check_navigation, SectionThresholds};
use scribe_common::project::Project;
use scribe_common::text::{char_count, html_to_plain_text, word_count};
use scribe_common::{Section, Step};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::saving::SaveOutcome;
use crate::suggestions::local_suggestions;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SectionContent {
    pub content: String,
}

/// Optional body of the suggestions route
#[derive(Debug, Default, Deserialize)]
pub struct SuggestionsRequest {
    /// Unsaved editor HTML; the stored section is used when absent
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SectionView {
    pub section: Section,
    pub label: String,
    pub content: String,
    pub word_count: usize,
    pub char_count: usize,
    /// Minimum for step completion; absent for abstracts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_words: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct DraftAccepted {
    pub project_id: Uuid,
    pub section: Section,
    pub save_after_ms: u64,
}

/// Where suggestions came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionSource {
    Ai,
    Local,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub section: Section,
    pub source: SuggestionSource,
    pub suggestions: Vec<Suggestion>,
    /// Why the AI result was not used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_error: Option<String>,
}

/// Load the project and enforce the gate for `section`
async fn open_section(
    state: &AppState,
    id: Uuid,
    section: Section,
) -> ApiResult<(Project, SectionThresholds)> {
    let thresholds = load_thresholds(&state.db).await?;
    let project = db::load_project(&state.db, id).await?;
    check_navigation(&project, Step::for_section(section), &thresholds)?;
    Ok((project, thresholds))
}

fn parse_section(raw: &str) -> ApiResult<Section> {
    raw.parse::<Section>().map_err(ApiError::from)
}

/// GET /api/projects/:id/sections/:section
pub async fn get_section(
    State(state): State<AppState>,
    Path((id, section)): Path<(Uuid, String)>,
) -> ApiResult<Json<SectionView>> {
    let section = parse_section(&section)?;
    let (project, thresholds) = open_section(&state, id, section).await?;

    let content = project.section(section).to_string();
    let plain = html_to_plain_text(&content);

    Ok(Json(SectionView {
        section,
        label: section.label().to_string(),
        word_count: word_count(&plain),
        char_count: char_count(&plain),
        required_words: thresholds.min_words(section),
        content,
    }))
}

/// PUT /api/projects/:id/sections/:section
pub async fn put_section(
    State(state): State<AppState>,
    Path((id, section)): Path<(Uuid, String)>,
    Json(body): Json<SectionContent>,
) -> ApiResult<Json<SaveOutcome>> {
    let section = parse_section(&section)?;
    open_section(&state, id, section).await?;

    // Supersedes any pending draft for this section
    let outcome = state.autosave.save_now(id, section, body.content).await?;
    if outcome.changed {
        info!(project_id = %id, %section, words = outcome.word_count, "Section saved");
    }
    Ok(Json(outcome))
}

/// POST /api/projects/:id/sections/:section/draft
pub async fn post_draft(
    State(state): State<AppState>,
    Path((id, section)): Path<(Uuid, String)>,
    Json(body): Json<SectionContent>,
) -> ApiResult<(StatusCode, Json<DraftAccepted>)> {
    let section = parse_section(&section)?;
    open_section(&state, id, section).await?;

    state.autosave.submit(id, section, body.content).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(DraftAccepted {
            project_id: id,
            section,
            save_after_ms: state.autosave.delay().as_millis() as u64,
        }),
    ))
}

/// POST /api/projects/:id/sections/:section/suggestions
///
/// AI review first; the fixed local advice answers when the AI service
/// fails or returns nothing.
pub async fn post_suggestions(
    State(state): State<AppState>,
    Path((id, section)): Path<(Uuid, String)>,
    body: Option<Json<SuggestionsRequest>>,
) -> ApiResult<Json<SuggestionsResponse>> {
    let section = parse_section(&section)?;
    if !section.is_reviewable() {
        return Err(ApiError::BadRequest(format!(
            "Section '{}' does not take suggestions",
            section
        )));
    }
    let (project, _) = open_section(&state, id, section).await?;

    let html = body
        .and_then(|Json(request)| request.content)
        .unwrap_or_else(|| project.section(section).to_string());
    let plain = html_to_plain_text(&html);

    let ai_error = match state.ai.analyze_text(section, &plain).await {
        Ok(suggestions) if !suggestions.is_empty() => {
            info!(project_id = %id, %section, count = suggestions.len(), "AI suggestions");
            return Ok(Json(SuggestionsResponse {
                section,
                source: SuggestionSource::Ai,
                suggestions,
                ai_error: None,
            }));
        }
        Ok(_) => None,
        Err(e) => {
            warn!(project_id = %id, %section, "AI suggestions unavailable: {}", e);
            Some(e.to_string())
        }
    };

    Ok(Json(SuggestionsResponse {
        section,
        source: SuggestionSource::Local,
        suggestions: local_suggestions(section, &plain),
        ai_error,
    }))
}
