//! HTTP API handlers for scribe-pm

pub mod abstracts;
pub mod health;
pub mod projects;
pub mod reviews;
pub mod sections;
pub mod sse;

pub use abstracts::{approve_abstract, generate_abstract};
pub use health::health_routes;
pub use projects::{
    create_project, delete_project, get_progress, get_project, list_projects, navigate,
    update_project,
};
pub use reviews::{analyze_review, create_review, get_review, update_tip, upload_document};
pub use sections::{get_section, post_draft, post_suggestions, put_section};
pub use sse::event_stream;
