//! # Scribe Common Library
//!
//! Shared code for the Scribe services including:
//! - Project model and section definitions
//! - Section gating / progress state machine
//! - Word counting over editor HTML
//! - Database schema, settings and queries
//! - Event types (ScribeEvent enum) and EventBus
//! - API wire types and service-key authentication
//! - Configuration loading

pub mod api;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod events;
pub mod progress;
pub mod project;
pub mod text;

pub use error::{Error, Result};
pub use progress::{ProgressReport, SectionThresholds, Step};
pub use project::{Project, Section};
