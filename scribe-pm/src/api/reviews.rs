//! Article review workflow: setup, upload, analysis, tips

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use scribe_common::api::AnalyzeDocumentRequest;
use scribe_common::events::ScribeEvent;
use scribe_common::project::NewProject;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::db;
use crate::documents::{decode_upload, extract_text, validate_document, DocumentError, DocumentKind};
use crate::error::{ApiError, ApiResult};
use crate::reviews::{Review, ReviewDetail};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub file_name: String,
    pub content_type: String,
    pub data_base64: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub review: Review,
    pub char_count: usize,
    pub warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TipUpdate {
    pub completed: bool,
}

/// POST /api/reviews
pub async fn create_review(
    State(state): State<AppState>,
    Json(request): Json<NewProject>,
) -> ApiResult<(StatusCode, Json<Review>)> {
    request.validate()?;

    let review = Review::new(request);
    db::insert_review(&state.db, &review).await?;
    info!(review_id = %review.id, "Review created");

    Ok((StatusCode::CREATED, Json(review)))
}

/// GET /api/reviews/:id
pub async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ReviewDetail>> {
    let review = db::load_review(&state.db, id).await?;
    let tips = db::load_tips(&state.db, id).await?;
    Ok(Json(ReviewDetail::new(review, tips)))
}

/// POST /api/reviews/:id/document
pub async fn upload_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UploadRequest>,
) -> ApiResult<Json<UploadResponse>> {
    // Fail on unknown reviews before doing any decoding work
    db::load_review(&state.db, id).await?;

    let kind = DocumentKind::from_content_type(&request.content_type)?;
    let bytes = decode_upload(&request.data_base64)?;
    let size = bytes.len();

    let text = tokio::task::spawn_blocking(move || extract_text(kind, &bytes))
        .await
        .map_err(|e| DocumentError::Extraction(format!("Extraction task failed: {}", e)))??;

    let validation = validate_document(&text);
    if !validation.valid {
        warn!(review_id = %id, file = %request.file_name, "Document rejected");
        return Err(ApiError::InvalidDocument(validation.errors));
    }

    db::attach_document(&state.db, id, &request.file_name, &text, &validation.warnings).await?;
    info!(
        review_id = %id,
        file = %request.file_name,
        bytes = size,
        warnings = validation.warnings.len(),
        "Document attached"
    );

    let review = db::load_review(&state.db, id).await?;
    Ok(Json(UploadResponse {
        review,
        char_count: text.chars().count(),
        warnings: validation.warnings,
    }))
}

/// POST /api/reviews/:id/analyze
///
/// Re-running on an analyzed review replaces its tips.
pub async fn analyze_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ReviewDetail>> {
    let review = db::load_review(&state.db, id).await?;
    let document_text = match (&review.document_text, review.state.has_document()) {
        (Some(text), true) => text.clone(),
        _ => {
            return Err(ApiError::conflict(
                "Attach a document before requesting the analysis",
            ))
        }
    };

    info!(review_id = %id, area = %review.area, "Analyzing article");
    let tips = state
        .ai
        .analyze_document(&AnalyzeDocumentRequest {
            document_text,
            area: review.area.clone(),
            premise: review.premise.clone(),
        })
        .await?;

    db::store_tips(&state.db, id, &tips).await?;
    state.event_bus.emit_lossy(ScribeEvent::ReviewAnalyzed {
        review_id: id,
        tip_count: tips.len(),
        timestamp: Utc::now(),
    });

    let review = db::load_review(&state.db, id).await?;
    let tips = db::load_tips(&state.db, id).await?;
    Ok(Json(ReviewDetail::new(review, tips)))
}

/// PATCH /api/reviews/:id/tips/:tip_id
pub async fn update_tip(
    State(state): State<AppState>,
    Path((id, tip_id)): Path<(Uuid, String)>,
    Json(update): Json<TipUpdate>,
) -> ApiResult<Json<ReviewDetail>> {
    db::set_tip_completed(&state.db, id, &tip_id, update.completed).await?;

    let review = db::load_review(&state.db, id).await?;
    let tips = db::load_tips(&state.db, id).await?;
    Ok(Json(ReviewDetail::new(review, tips)))
}
