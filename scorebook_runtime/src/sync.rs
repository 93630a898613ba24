//! Remote persistence boundary.
//!
//! A `SyncSink` receives the persisted score after each accepted command.
//! Sync is best effort: the local command log has already been written by
//! the time a sink is called, so a failed push only leaves the `Outbox`
//! holding the newest unsynced score until the next attempt.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use scorebook_engine::domain::PersistedScore;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("sink unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Destination for persisted scores.
pub trait SyncSink: Send {
    fn push(
        &mut self,
        game_id: &str,
        sequence: u64,
        score: &PersistedScore,
    ) -> Result<(), SyncError>;
}

/// Advisory sync state reported to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncStatus {
    /// Nothing has been pushed yet.
    Idle,
    Synced { sequence: u64 },
    Pending {
        sequence: u64,
        attempts: u32,
        last_error: String,
    },
}

struct Unsynced {
    sequence: u64,
    score: PersistedScore,
    attempts: u32,
    last_error: String,
}

/// Holds at most one unsynced score. A newer score replaces an older one
/// because each push carries the complete state.
pub struct Outbox {
    game_id: String,
    sink: Box<dyn SyncSink>,
    pending: Option<Unsynced>,
    last_synced: Option<u64>,
}

impl Outbox {
    pub fn new(game_id: &str, sink: Box<dyn SyncSink>) -> Self {
        Self {
            game_id: game_id.to_string(),
            sink,
            pending: None,
            last_synced: None,
        }
    }

    /// Queue `score` and try to push it straight away.
    pub fn enqueue(&mut self, sequence: u64, score: PersistedScore) -> SyncStatus {
        let attempts = self.pending.as_ref().map_or(0, |p| p.attempts);
        self.pending = Some(Unsynced {
            sequence,
            score,
            attempts,
            last_error: String::new(),
        });
        self.flush()
    }

    /// Retry the pending score, if any.
    pub fn flush(&mut self) -> SyncStatus {
        let Some(mut pending) = self.pending.take() else {
            return self.status();
        };
        match self.sink.push(&self.game_id, pending.sequence, &pending.score) {
            Ok(()) => {
                debug!(game_id = %self.game_id, sequence = pending.sequence, "score synced");
                self.last_synced = Some(pending.sequence);
            }
            Err(e) => {
                pending.attempts += 1;
                pending.last_error = e.to_string();
                warn!(
                    game_id = %self.game_id,
                    sequence = pending.sequence,
                    attempts = pending.attempts,
                    error = %e,
                    "sync failed; score kept for retry"
                );
                self.pending = Some(pending);
            }
        }
        self.status()
    }

    pub fn status(&self) -> SyncStatus {
        match (&self.pending, self.last_synced) {
            (Some(p), _) => SyncStatus::Pending {
                sequence: p.sequence,
                attempts: p.attempts,
                last_error: p.last_error.clone(),
            },
            (None, Some(sequence)) => SyncStatus::Synced { sequence },
            (None, None) => SyncStatus::Idle,
        }
    }
}

/// Writes the latest score of each game to `<dir>/<game_id>.json`.
pub struct JsonFileSink {
    dir: PathBuf,
}

#[derive(Serialize)]
struct SyncedDocument<'a> {
    game_id: &'a str,
    sequence: u64,
    score: &'a PersistedScore,
}

impl JsonFileSink {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }
}

impl SyncSink for JsonFileSink {
    fn push(
        &mut self,
        game_id: &str,
        sequence: u64,
        score: &PersistedScore,
    ) -> Result<(), SyncError> {
        fs::create_dir_all(&self.dir)?;
        let doc = SyncedDocument {
            game_id,
            sequence,
            score,
        };
        let tmp = self.dir.join(format!("{game_id}.json.tmp"));
        let mut file = File::create(&tmp)?;
        file.write_all(serde_json::to_string_pretty(&doc)?.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, self.dir.join(format!("{game_id}.json")))?;
        Ok(())
    }
}

/// A sink that drops everything. Used when no remote is configured.
pub struct NullSink;

impl SyncSink for NullSink {
    fn push(&mut self, _: &str, _: u64, _: &PersistedScore) -> Result<(), SyncError> {
        Ok(())
    }
}
