//! Event types and EventBus
//!
//! Domain events are broadcast in-process through [`EventBus`] and relayed
//! to clients over SSE by scribe-pm.

use crate::progress::Step;
use crate::project::Section;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Scribe event types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScribeEvent {
    ProjectCreated {
        project_id: Uuid,
        title: String,
        timestamp: DateTime<Utc>,
    },

    /// Setup fields changed
    ProjectUpdated {
        project_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// Section content written to the database
    ///
    /// Emitted by immediate saves and by the autosave worker; clients show
    /// `saved_at` as "last saved".
    SectionSaved {
        project_id: Uuid,
        section: Section,
        word_count: usize,
        saved_at: DateTime<Utc>,
    },

    /// A save made a previously locked step reachable
    StepUnlocked {
        project_id: Uuid,
        step: Step,
        timestamp: DateTime<Utc>,
    },

    AbstractApproved {
        project_id: Uuid,
        /// Languages stored ("pt", "en")
        languages: Vec<String>,
        timestamp: DateTime<Utc>,
    },

    ProjectDeleted {
        project_id: Uuid,
        timestamp: DateTime<Utc>,
    },

    /// Article review tips are ready
    ReviewAnalyzed {
        review_id: Uuid,
        tip_count: usize,
        timestamp: DateTime<Utc>,
    },
}

impl ScribeEvent {
    /// SSE event name
    pub fn event_type(&self) -> &'static str {
        match self {
            ScribeEvent::ProjectCreated { .. } => "ProjectCreated",
            ScribeEvent::ProjectUpdated { .. } => "ProjectUpdated",
            ScribeEvent::SectionSaved { .. } => "SectionSaved",
            ScribeEvent::StepUnlocked { .. } => "StepUnlocked",
            ScribeEvent::AbstractApproved { .. } => "AbstractApproved",
            ScribeEvent::ProjectDeleted { .. } => "ProjectDeleted",
            ScribeEvent::ReviewAnalyzed { .. } => "ReviewAnalyzed",
        }
    }

    /// Project the event concerns, if any
    pub fn project_id(&self) -> Option<Uuid> {
        match self {
            ScribeEvent::ProjectCreated { project_id, .. }
            | ScribeEvent::ProjectUpdated { project_id, .. }
            | ScribeEvent::SectionSaved { project_id, .. }
            | ScribeEvent::StepUnlocked { project_id, .. }
            | ScribeEvent::AbstractApproved { project_id, .. }
            | ScribeEvent::ProjectDeleted { project_id, .. } => Some(*project_id),
            ScribeEvent::ReviewAnalyzed { .. } => None,
        }
    }
}

/// Central event distribution bus
///
/// Wraps a tokio broadcast channel: publishing never blocks, slow
/// subscribers see `Lagged` instead of stalling producers.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ScribeEvent>,
    capacity: usize,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<ScribeEvent> {
        self.tx.subscribe()
    }

    /// Emit an event
    ///
    /// Returns `Err` only when nobody is subscribed.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: ScribeEvent,
    ) -> Result<usize, broadcast::error::SendError<ScribeEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring a missing audience
    pub fn emit_lossy(&self, event: ScribeEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
