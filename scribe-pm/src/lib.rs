//! scribe-pm library - project manager service
//!
//! Owns the database: projects and their sections, the step gate, the
//! autosave worker and article reviews. AI work is delegated to scribe-ai.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use scribe_common::events::EventBus;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod ai_client;
pub mod api;
pub mod autosave;
pub mod config;
pub mod db;
pub mod documents;
pub mod error;
pub mod reviews;
pub mod saving;
pub mod suggestions;

pub use ai_client::AiClient;
pub use autosave::AutosaveHandle;
pub use error::{ApiError, ApiResult};

/// Base64 inflates the 10MB upload limit by a third, plus JSON framing
const UPLOAD_BODY_LIMIT: usize = 16 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub event_bus: Arc<EventBus>,
    pub ai: Arc<AiClient>,
    pub autosave: AutosaveHandle,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        event_bus: Arc<EventBus>,
        ai: AiClient,
        autosave: AutosaveHandle,
    ) -> Self {
        Self {
            db,
            event_bus,
            ai: Arc::new(ai),
            autosave,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, patch, post};

    let projects = Router::new()
        .route("/api/projects", post(api::create_project).get(api::list_projects))
        .route(
            "/api/projects/:id",
            get(api::get_project)
                .patch(api::update_project)
                .delete(api::delete_project),
        )
        .route("/api/projects/:id/progress", get(api::get_progress))
        .route("/api/projects/:id/navigate", post(api::navigate))
        .route(
            "/api/projects/:id/sections/:section",
            get(api::get_section).put(api::put_section),
        )
        .route("/api/projects/:id/sections/:section/draft", post(api::post_draft))
        .route(
            "/api/projects/:id/sections/:section/suggestions",
            post(api::post_suggestions),
        )
        .route("/api/projects/:id/abstract/generate", post(api::generate_abstract))
        .route("/api/projects/:id/abstract/approve", post(api::approve_abstract));

    let reviews = Router::new()
        .route("/api/reviews", post(api::create_review))
        .route("/api/reviews/:id", get(api::get_review))
        .route(
            "/api/reviews/:id/document",
            post(api::upload_document).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/reviews/:id/analyze", post(api::analyze_review))
        .route("/api/reviews/:id/tips/:tip_id", patch(api::update_tip));

    Router::new()
        .merge(projects)
        .merge(reviews)
        .route("/events", get(api::event_stream))
        .merge(api::health_routes())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
