//! Database access owned by scribe-pm
//!
//! Schema, settings and project queries live in `scribe_common::db`; the
//! article review tables are only touched here.

pub mod reviews;

pub use reviews::*;
