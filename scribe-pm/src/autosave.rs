//! Debounced section autosave
//!
//! Drafts are keyed by (project, section). Each new draft replaces the
//! pending content and pushes that key's deadline to `now + delay`; once a
//! deadline passes the content is written (only if it differs from the
//! stored value). A single worker task owns the pending map and handles
//! talk to it over an mpsc channel.
//!
//! Explicit saves also go through the worker: they discard the pending
//! draft for their key before writing, so an older draft can never land on
//! top of a newer save.

use scribe_common::events::EventBus;
use scribe_common::{Error, Result, Section};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::saving::{save_section_content, SaveOutcome};

const COMMAND_BUFFER: usize = 256;

enum Command {
    Draft {
        project_id: Uuid,
        section: Section,
        content: String,
    },
    /// Immediate save that supersedes any pending draft for the key
    Save {
        project_id: Uuid,
        section: Section,
        content: String,
        reply: oneshot::Sender<Result<SaveOutcome>>,
    },
    /// Write everything now; replies with the number of drafts written
    Flush(oneshot::Sender<usize>),
}

struct PendingDraft {
    content: String,
    deadline: Instant,
}

/// Cloneable handle to the autosave worker
#[derive(Clone)]
pub struct AutosaveHandle {
    tx: mpsc::Sender<Command>,
    delay: Duration,
}

impl AutosaveHandle {
    /// Spawn the worker on the current runtime
    pub fn spawn(db: SqlitePool, event_bus: Arc<EventBus>, delay: Duration) -> Self {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        tokio::spawn(run_worker(rx, db, event_bus, delay));
        info!(delay_ms = delay.as_millis() as u64, "Autosave worker started");
        Self { tx, delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Queue a draft, restarting its debounce window
    pub async fn submit(&self, project_id: Uuid, section: Section, content: String) -> Result<()> {
        self.tx
            .send(Command::Draft {
                project_id,
                section,
                content,
            })
            .await
            .map_err(|_| Error::Internal("Autosave worker stopped".to_string()))
    }

    /// Save now, discarding any pending draft for the same section
    pub async fn save_now(
        &self,
        project_id: Uuid,
        section: Section,
        content: String,
    ) -> Result<SaveOutcome> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Command::Save {
                project_id,
                section,
                content,
                reply: reply_tx,
            })
            .await
            .map_err(|_| Error::Internal("Autosave worker stopped".to_string()))?;
        reply_rx
            .await
            .map_err(|_| Error::Internal("Autosave worker dropped save request".to_string()))?
    }

    /// Write every pending draft immediately
    pub async fn flush_all(&self) -> Result<usize> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Command::Flush(reply_tx))
            .await
            .map_err(|_| Error::Internal("Autosave worker stopped".to_string()))?;
        reply_rx
            .await
            .map_err(|_| Error::Internal("Autosave worker dropped flush request".to_string()))
    }
}

async fn run_worker(
    mut rx: mpsc::Receiver<Command>,
    db: SqlitePool,
    event_bus: Arc<EventBus>,
    delay: Duration,
) {
    let mut pending: HashMap<(Uuid, Section), PendingDraft> = HashMap::new();

    loop {
        let next_deadline = pending.values().map(|draft| draft.deadline).min();
        let wait = async {
            match next_deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            command = rx.recv() => match command {
                Some(Command::Draft { project_id, section, content }) => {
                    debug!(project_id = %project_id, %section, "Draft received");
                    pending.insert(
                        (project_id, section),
                        PendingDraft { content, deadline: Instant::now() + delay },
                    );
                }
                Some(Command::Save { project_id, section, content, reply }) => {
                    if pending.remove(&(project_id, section)).is_some() {
                        debug!(project_id = %project_id, %section, "Pending draft superseded");
                    }
                    let outcome =
                        save_section_content(&db, &event_bus, project_id, section, &content).await;
                    let _ = reply.send(outcome);
                }
                Some(Command::Flush(reply)) => {
                    let written = write_due(&db, &event_bus, &mut pending, None).await;
                    let _ = reply.send(written);
                }
                None => {
                    // Every handle dropped
                    let written = write_due(&db, &event_bus, &mut pending, None).await;
                    info!(written, "Autosave worker stopping");
                    break;
                }
            },
            _ = wait => {
                write_due(&db, &event_bus, &mut pending, Some(Instant::now())).await;
            }
        }
    }
}

/// Write drafts whose deadline is at or before `now` (all when `None`)
///
/// Returns how many rows actually changed.
async fn write_due(
    db: &SqlitePool,
    event_bus: &EventBus,
    pending: &mut HashMap<(Uuid, Section), PendingDraft>,
    now: Option<Instant>,
) -> usize {
    let due: Vec<(Uuid, Section)> = pending
        .iter()
        .filter(|(_, draft)| now.map_or(true, |now| draft.deadline <= now))
        .map(|(key, _)| *key)
        .collect();

    let mut written = 0;
    for key in due {
        let Some(draft) = pending.remove(&key) else {
            continue;
        };
        let (project_id, section) = key;

        match save_section_content(db, event_bus, project_id, section, &draft.content).await {
            Ok(outcome) if outcome.changed => {
                debug!(project_id = %project_id, %section, words = outcome.word_count, "Draft saved");
                written += 1;
            }
            Ok(_) => {}
            // Project deleted while the draft waited
            Err(Error::NotFound(_)) => {
                debug!(project_id = %project_id, %section, "Dropping draft for missing project");
            }
            Err(e) => {
                warn!(project_id = %project_id, %section, "Autosave failed: {}", e);
            }
        }
    }
    written
}
