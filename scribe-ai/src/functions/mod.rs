//! AI function endpoints
//!
//! Each function templates a prompt, relays it to the chat gateway and
//! reshapes the reply into the JSON contract of `scribe_common::api::types`.

pub mod analyze_document;
pub mod analyze_text;
pub mod generate_abstract;

pub use analyze_document::analyze_document;
pub use analyze_text::analyze_text;
pub use generate_abstract::generate_abstract;

use axum::{routing::post, Router};

use crate::AppState;

/// Function routes (service-key protected by the caller)
pub fn function_routes() -> Router<AppState> {
    Router::new()
        .route("/analyze-text", post(analyze_text))
        .route("/analyze-document", post(analyze_document))
        .route("/generate-abstract", post(generate_abstract))
}
