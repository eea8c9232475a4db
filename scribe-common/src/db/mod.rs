//! Database schema, settings and project queries

pub mod init;
pub mod projects;
pub mod settings;

pub use init::*;
pub use projects::*;
pub use settings::*;

use chrono::{DateTime, SecondsFormat, Utc};

/// Timestamps are stored as fixed-width RFC3339 text so they sort lexically
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(value: &str) -> crate::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| crate::Error::MalformedRecord(format!("timestamp '{}': {}", value, e)))
}
