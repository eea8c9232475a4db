//! Project CRUD, progress and navigation

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use scribe_common::db::{self, load_thresholds};
use scribe_common::events::ScribeEvent;
use scribe_common::progress::{check_navigation, evaluate, ProgressReport, ProjectStage, StepStatus};
use scribe_common::project::{NewProject, Project, ProjectSetupUpdate};
use scribe_common::Step;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Entry of `GET /api/projects`
#[derive(Debug, Serialize)]
pub struct ProjectSummary {
    pub id: Uuid,
    pub title: String,
    pub area: String,
    pub premise: String,
    pub updated_at: DateTime<Utc>,
    pub percent: u8,
    pub stage: ProjectStage,
}

#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    pub project: Project,
    pub progress: ProgressReport,
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub step: Step,
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    Json(request): Json<NewProject>,
) -> ApiResult<(StatusCode, Json<ProjectDetail>)> {
    request.validate()?;

    let project = Project::new(request);
    db::insert_project(&state.db, &project).await?;
    info!(project_id = %project.id, title = %project.title, "Project created");

    state.event_bus.emit_lossy(ScribeEvent::ProjectCreated {
        project_id: project.id,
        title: project.title.clone(),
        timestamp: project.created_at,
    });

    let thresholds = load_thresholds(&state.db).await?;
    let progress = evaluate(&project, &thresholds);
    Ok((StatusCode::CREATED, Json(ProjectDetail { project, progress })))
}

/// GET /api/projects
pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Json<Vec<ProjectSummary>>> {
    let thresholds = load_thresholds(&state.db).await?;
    let projects = db::list_projects(&state.db).await?;

    let summaries = projects
        .into_iter()
        .map(|project| {
            let progress = evaluate(&project, &thresholds);
            ProjectSummary {
                id: project.id,
                title: project.title,
                area: project.area,
                premise: project.premise,
                updated_at: project.updated_at,
                percent: progress.percent,
                stage: progress.stage,
            }
        })
        .collect();

    Ok(Json(summaries))
}

/// GET /api/projects/:id
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProjectDetail>> {
    let thresholds = load_thresholds(&state.db).await?;
    let project = db::load_project(&state.db, id).await?;
    let progress = evaluate(&project, &thresholds);
    Ok(Json(ProjectDetail { project, progress }))
}

/// PATCH /api/projects/:id
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<ProjectSetupUpdate>,
) -> ApiResult<Json<ProjectDetail>> {
    if update.is_empty() {
        return Err(ApiError::BadRequest(
            "Nothing to update: send title, premise or area".to_string(),
        ));
    }

    let mut project = db::load_project(&state.db, id).await?;
    update.apply(&mut project)?;
    db::update_setup(&state.db, &project).await?;
    info!(project_id = %id, "Project setup updated");

    state.event_bus.emit_lossy(ScribeEvent::ProjectUpdated {
        project_id: id,
        timestamp: project.updated_at,
    });

    let thresholds = load_thresholds(&state.db).await?;
    let progress = evaluate(&project, &thresholds);
    Ok(Json(ProjectDetail { project, progress }))
}

/// DELETE /api/projects/:id
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !db::delete_project(&state.db, id).await? {
        return Err(ApiError::NotFound(format!("Project {}", id)));
    }
    info!(project_id = %id, "Project deleted");

    state.event_bus.emit_lossy(ScribeEvent::ProjectDeleted {
        project_id: id,
        timestamp: Utc::now(),
    });
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/projects/:id/progress
pub async fn get_progress(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProgressReport>> {
    let thresholds = load_thresholds(&state.db).await?;
    let project = db::load_project(&state.db, id).await?;
    Ok(Json(evaluate(&project, &thresholds)))
}

/// POST /api/projects/:id/navigate
///
/// 200 with the target step's status, or 409 naming the blocking step.
pub async fn navigate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<NavigateRequest>,
) -> ApiResult<Json<StepStatus>> {
    let thresholds = load_thresholds(&state.db).await?;
    let project = db::load_project(&state.db, id).await?;

    check_navigation(&project, request.step, &thresholds)?;

    let progress = evaluate(&project, &thresholds);
    Ok(Json(progress.step(request.step).clone()))
}
