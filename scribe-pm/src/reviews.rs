//! Article review sessions
//!
//! A review walks a finished article through four linear steps:
//! setup → upload → AI analysis → working through the numbered tips.
//! State only moves forward, except that attaching a new document to an
//! analyzed review discards its tips.

use chrono::{DateTime, Utc};
use scribe_common::api::Tip;
use scribe_common::project::NewProject;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Review workflow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    /// Setup saved, no document yet
    Created,
    DocumentAttached,
    /// Tips generated
    Analyzed,
}

impl ReviewState {
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewState::Created => "created",
            ReviewState::DocumentAttached => "document_attached",
            ReviewState::Analyzed => "analyzed",
        }
    }

    /// Whether a document is available for analysis
    pub fn has_document(self) -> bool {
        !matches!(self, ReviewState::Created)
    }
}

impl fmt::Display for ReviewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewState {
    type Err = scribe_common::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(ReviewState::Created),
            "document_attached" => Ok(ReviewState::DocumentAttached),
            "analyzed" => Ok(ReviewState::Analyzed),
            other => Err(scribe_common::Error::MalformedRecord(format!(
                "review state '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub title: String,
    pub premise: String,
    pub area: String,
    pub state: ReviewState,
    pub document_name: Option<String>,
    /// Extracted text; large, so never serialized
    #[serde(skip)]
    pub document_text: Option<String>,
    pub document_warnings: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// New review from validated setup fields
    pub fn new(setup: NewProject) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: setup.title.trim().to_string(),
            premise: setup.premise.trim().to_string(),
            area: setup.area.trim().to_string(),
            state: ReviewState::Created,
            document_name: None,
            document_text: None,
            document_warnings: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Tip plus its checkbox
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewTip {
    #[serde(flatten)]
    pub tip: Tip,
    pub completed: bool,
}

/// `GET /api/reviews/:id` body
#[derive(Debug, Clone, Serialize)]
pub struct ReviewDetail {
    pub review: Review,
    pub tips: Vec<ReviewTip>,
    pub completed_count: usize,
}

impl ReviewDetail {
    pub fn new(review: Review, tips: Vec<ReviewTip>) -> Self {
        let completed_count = tips.iter().filter(|t| t.completed).count();
        Self {
            review,
            tips,
            completed_count,
        }
    }
}
