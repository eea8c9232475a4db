//! Section writes shared by immediate saves and the autosave worker

use chrono::{DateTime, Utc};
use scribe_common::db::{load_project, load_thresholds, save_section};
use scribe_common::events::{EventBus, ScribeEvent};
use scribe_common::progress::{evaluate, ProgressReport, Step};
use scribe_common::text::word_count_html;
use scribe_common::{Result, Section};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

/// What a save did
#[derive(Debug, Clone, Serialize)]
pub struct SaveOutcome {
    /// False when the stored content was already identical
    pub changed: bool,
    pub word_count: usize,
    /// Set only when the row was written
    pub saved_at: Option<DateTime<Utc>>,
    pub unlocked: Vec<Step>,
    pub progress: ProgressReport,
}

/// Store a section and announce the save plus any steps it unlocked
///
/// Gate checks happen before this is called; adding content can only
/// unlock steps, never lock them.
pub async fn save_section_content(
    db: &SqlitePool,
    event_bus: &EventBus,
    project_id: Uuid,
    section: Section,
    content: &str,
) -> Result<SaveOutcome> {
    let thresholds = load_thresholds(db).await?;
    let mut project = load_project(db, project_id).await?;
    let before = evaluate(&project, &thresholds);

    let changed = save_section(db, project_id, section, content).await?;
    project.set_section(section, content.to_string());
    let progress = evaluate(&project, &thresholds);
    let word_count = word_count_html(content);

    if !changed {
        debug!(project_id = %project_id, %section, "Section unchanged, nothing written");
        return Ok(SaveOutcome {
            changed,
            word_count,
            saved_at: None,
            unlocked: Vec::new(),
            progress,
        });
    }

    let saved_at = Utc::now();
    event_bus.emit_lossy(ScribeEvent::SectionSaved {
        project_id,
        section,
        word_count,
        saved_at,
    });

    let unlocked = progress.newly_unlocked(&before);
    for &step in &unlocked {
        info!(project_id = %project_id, step = ?step, "Step unlocked");
        event_bus.emit_lossy(ScribeEvent::StepUnlocked {
            project_id,
            step,
            timestamp: saved_at,
        });
    }

    Ok(SaveOutcome {
        changed,
        word_count,
        saved_at: Some(saved_at),
        unlocked,
        progress,
    })
}
