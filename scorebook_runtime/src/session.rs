//! Session manager: isolated game sessions with persist-after-apply
//! semantics.
//!
//! Each session gets its own directory:
//!   <base_dir>/<session_id>/roster.json   lineup before the first pitch
//!   <base_dir>/<session_id>/commands.log  every accepted command
//!   <base_dir>/<session_id>/snapshots/
//!
//! Apply-before-persist order:
//!   1. engine.apply_command()  rejection stops here, nothing is written
//!   2. event_store.append_event()
//!   3. snapshot if the interval is reached
//!   4. hand the persisted score to the sync outbox (advisory only)

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{error, info, warn};

use scorebook_engine::domain::ScoreState;
use scorebook_engine::engine::CommandOutcome;
use scorebook_engine::events::{EventEnvelope, GameCommand, ScoreEvent, Substitution};
use scorebook_engine::hashing::{canonical_hash, game_hash};
use scorebook_engine::lineup::{LineupEntry, Roster};
use scorebook_engine::vocabulary::{Destination, PitchType, PlateResult};
use scorebook_engine::ScoreEngine;

use crate::config::SessionConfig;
use crate::error::{RuntimeError, RuntimeResult};
use crate::event_store::EventStore;
use crate::proto_bridge::command_to_proto;
use crate::replay;
use crate::snapshot;
use crate::sync::{NullSink, Outbox, SyncSink, SyncStatus};

const ROSTER_FILE: &str = "roster.json";
const LOG_FILE: &str = "commands.log";
const SNAPSHOT_DIR: &str = "snapshots";

/// An isolated scoring session with its own command log and state.
pub struct Session {
    session_id: String,
    dir: PathBuf,
    config: SessionConfig,
    roster: Roster,
    engine: ScoreEngine,
    event_store: EventStore,
    current_sequence: u64,
    outbox: Outbox,
}

impl Session {
    /// Start a new session for `roster`. Fails if the session directory
    /// already holds a game.
    pub fn create(config: &SessionConfig, session_id: &str, roster: Roster) -> RuntimeResult<Self> {
        config.validate()?;
        let dir = config.session_dir(session_id);
        if dir.join(LOG_FILE).exists() || dir.join(ROSTER_FILE).exists() {
            return Err(RuntimeError::SessionExists(session_id.to_string()));
        }
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(ROSTER_FILE), serde_json::to_string_pretty(&roster)?)?;

        let event_store = EventStore::open(&dir.join(LOG_FILE))?;
        let engine = ScoreEngine::new(roster.game_id(), roster.clone(), config.engine_config())?;
        info!(session_id, game_id = roster.game_id(), "session created");

        Ok(Self {
            session_id: session_id.to_string(),
            outbox: Outbox::new(roster.game_id(), Box::new(NullSink)),
            dir,
            config: config.clone(),
            roster,
            engine,
            event_store,
            current_sequence: 0,
        })
    }

    /// Reopen an existing session by replaying its whole command log. The
    /// latest snapshot is checked against the replay at its sequence; a
    /// mismatch is reported and the replayed state wins.
    pub fn open(config: &SessionConfig, session_id: &str) -> RuntimeResult<Self> {
        config.validate()?;
        let dir = config.session_dir(session_id);
        let roster: Roster = serde_json::from_str(&fs::read_to_string(dir.join(ROSTER_FILE))?)?;
        let event_store = EventStore::open(&dir.join(LOG_FILE))?;
        let commands = event_store.load_all_commands()?;

        let snap = snapshot::load_latest_snapshot(&dir.join(SNAPSHOT_DIR))?;
        let mut engine = ScoreEngine::new(roster.game_id(), roster.clone(), config.engine_config())?;
        replay::replay_commands(&mut engine, &commands, |sequence, engine| {
            if let Some(snap) = snap.as_ref().filter(|s| s.sequence == sequence) {
                check_snapshot(snap, engine.state())?;
            }
            Ok(())
        })?;
        if let Some(snap) = snap.as_ref().filter(|s| s.sequence > event_store.last_sequence()) {
            warn!(
                session_id,
                snapshot = snap.sequence,
                log = event_store.last_sequence(),
                "snapshot is ahead of the command log; ignored"
            );
        }

        let current_sequence = event_store.last_sequence();
        info!(session_id, commands = current_sequence, "session reopened");

        Ok(Self {
            session_id: session_id.to_string(),
            outbox: Outbox::new(roster.game_id(), Box::new(NullSink)),
            dir,
            config: config.clone(),
            roster,
            engine,
            event_store,
            current_sequence,
        })
    }

    /// Route persisted scores to `sink` from now on.
    pub fn with_sink(mut self, sink: Box<dyn SyncSink>) -> Self {
        self.outbox = Outbox::new(self.roster.game_id(), sink);
        self
    }

    /// Apply one command, then persist it.
    ///
    /// Undo and redo on an empty stack change nothing and are not logged.
    pub fn apply(&mut self, command: GameCommand) -> RuntimeResult<CommandOutcome> {
        let outcome = self.engine.apply_command(&command)?;
        if matches!(
            outcome,
            CommandOutcome::Undo { applied: false } | CommandOutcome::Redo { applied: false }
        ) {
            return Ok(outcome);
        }

        let sequence = self.current_sequence + 1;
        let proto = command_to_proto(&EventEnvelope::new(sequence, command));
        if let Err(e) = self.event_store.append_event(&proto) {
            error!(session_id = %self.session_id, sequence, error = %e, "command log write failed");
            self.resync_from_log()?;
            return Err(e);
        }
        self.current_sequence = sequence;

        if sequence % self.config.snapshot_interval == 0 {
            let dir = self.dir.join(SNAPSHOT_DIR);
            match snapshot::save_snapshot(&dir, sequence, self.engine.state()) {
                Ok(path) => info!(sequence, path = %path.display(), "snapshot saved"),
                Err(e) => warn!(sequence, error = %e, "snapshot failed; log remains authoritative"),
            }
        }

        self.outbox.enqueue(sequence, self.engine.persisted());
        Ok(outcome)
    }

    pub fn record_pitch(&mut self, pitch: PitchType) -> RuntimeResult<CommandOutcome> {
        let batter = self.engine.current_batter();
        self.apply(ScoreEvent::RecordPitch { pitch, batter }.into())
    }

    pub fn record_result(&mut self, result: PlateResult) -> RuntimeResult<CommandOutcome> {
        let batter = self.engine.current_batter();
        self.apply(ScoreEvent::RecordResult { result, batter }.into())
    }

    pub fn confirm_runners(
        &mut self,
        destinations: BTreeMap<String, Destination>,
    ) -> RuntimeResult<CommandOutcome> {
        self.apply(ScoreEvent::ConfirmRunners { destinations }.into())
    }

    pub fn advance_inning(&mut self) -> RuntimeResult<CommandOutcome> {
        self.apply(ScoreEvent::AdvanceInning.into())
    }

    pub fn undo(&mut self) -> RuntimeResult<bool> {
        Ok(matches!(
            self.apply(GameCommand::Undo)?,
            CommandOutcome::Undo { applied: true }
        ))
    }

    pub fn redo(&mut self) -> RuntimeResult<bool> {
        Ok(matches!(
            self.apply(GameCommand::Redo)?,
            CommandOutcome::Redo { applied: true }
        ))
    }

    pub fn substitute(&mut self, sub: Substitution) -> RuntimeResult<LineupEntry> {
        match self.apply(GameCommand::Substitute(sub))? {
            CommandOutcome::Substituted(entry) => Ok(entry),
            other => Err(RuntimeError::CorruptLog(format!(
                "substitution produced {other:?}"
            ))),
        }
    }

    /// Push the pending score again, if sync previously failed.
    pub fn retry_sync(&mut self) -> SyncStatus {
        self.outbox.flush()
    }

    pub fn sync_status(&self) -> SyncStatus {
        self.outbox.status()
    }

    /// Rebuild the engine from the log twice, require identical hashes,
    /// and adopt the rebuilt engine. Returns the game hash.
    pub fn replay_full(&mut self) -> RuntimeResult<String> {
        let commands = self.event_store.load_all_commands()?;
        let engine_config = self.config.engine_config();
        let hash = replay::verify_determinism(
            self.roster.game_id(),
            &self.roster,
            &engine_config,
            &commands,
        )?;
        self.engine = replay::rebuild_engine(
            self.roster.game_id(),
            self.roster.clone(),
            engine_config,
            &commands,
        )?;
        info!(session_id = %self.session_id, %hash, "full replay complete");
        Ok(hash)
    }

    fn resync_from_log(&mut self) -> RuntimeResult<()> {
        let commands = self.event_store.load_all_commands()?;
        self.engine = replay::rebuild_engine(
            self.roster.game_id(),
            self.roster.clone(),
            self.config.engine_config(),
            &commands,
        )?;
        Ok(())
    }

    pub fn engine(&self) -> &ScoreEngine {
        &self.engine
    }

    pub fn state(&self) -> &ScoreState {
        self.engine.state()
    }

    /// Hash of score plus lineup history.
    pub fn current_hash(&self) -> RuntimeResult<String> {
        Ok(game_hash(self.engine.state(), self.engine.roster())?)
    }

    /// Hash of the persisted score alone, as stored in snapshots.
    pub fn score_hash(&self) -> RuntimeResult<String> {
        Ok(canonical_hash(self.engine.state())?)
    }

    pub fn current_sequence(&self) -> u64 {
        self.current_sequence
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn snapshot_dir(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_DIR)
    }
}

fn check_snapshot(snap: &snapshot::Snapshot, replayed: &ScoreState) -> RuntimeResult<()> {
    let replayed_hash = canonical_hash(replayed)?;
    if !snapshot::verify_snapshot_hash(snap) {
        warn!(sequence = snap.sequence, "snapshot content does not match its hash");
    } else if snap.hash != replayed_hash {
        warn!(
            sequence = snap.sequence,
            snapshot = %snap.hash,
            replayed = %replayed_hash,
            "snapshot disagrees with replay; using replayed state"
        );
    }
    Ok(())
}

/// Thread-safe session handle.
pub struct SharedSession {
    inner: Mutex<Session>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }

    pub fn apply(&self, command: GameCommand) -> RuntimeResult<CommandOutcome> {
        self.with(|s| s.apply(command))?
    }

    pub fn current_hash(&self) -> RuntimeResult<String> {
        self.with(|s| s.current_hash())?
    }

    pub fn current_sequence(&self) -> RuntimeResult<u64> {
        self.with(|s| s.current_sequence())
    }

    /// Run `f` with the session locked.
    pub fn with<T>(&self, f: impl FnOnce(&mut Session) -> T) -> RuntimeResult<T> {
        let mut session = self.inner.lock().map_err(|_| RuntimeError::LockPoisoned)?;
        Ok(f(&mut session))
    }
}
