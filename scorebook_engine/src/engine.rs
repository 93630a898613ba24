//! Top-level orchestrator. Delegates mutation to `transitions`, validates
//! via `invariants`, and owns the undo history, the lineup history and
//! the memoized box score.
//!
//! A rejected command leaves every piece of engine state untouched.

use std::cell::OnceCell;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::count::{display_count, DisplayCount};
use crate::domain::{BatterRef, PersistedScore, PlateAppearance, ScoreState, TransitionResult};
use crate::error::ScoreResult;
use crate::events::{GameCommand, ScoreEvent, Substitution};
use crate::history::UndoHistory;
use crate::invariants::try_validate_invariants;
use crate::lineup::{LineupEntry, Roster};
use crate::state::create_initial_state;
use crate::stats::BoxScore;
use crate::transitions::apply_event;
use crate::views::{attacking_side, runners_on_base, RunnerInfo, ScoreSheet};
use crate::vocabulary::{Destination, PitchType, PlateResult, Side};

/// What a `GameCommand` did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    Transition(TransitionResult),
    /// `applied` is false when the stack was empty.
    Undo { applied: bool },
    Redo { applied: bool },
    Substituted(LineupEntry),
}

/// Stateful scoring engine for one game.
pub struct ScoreEngine {
    state: ScoreState,
    history: UndoHistory,
    roster: Roster,
    config: EngineConfig,
    box_score: OnceCell<BoxScore>,
}

impl ScoreEngine {
    pub fn new(game_id: &str, roster: Roster, config: EngineConfig) -> ScoreResult<Self> {
        config.validate()?;
        Ok(Self {
            state: create_initial_state(game_id),
            history: UndoHistory::with_capacity(config.undo_capacity),
            roster,
            config,
            box_score: OnceCell::new(),
        })
    }

    /// An engine with default configuration and an empty roster.
    pub fn with_defaults(game_id: &str) -> Self {
        let config = EngineConfig::default();
        Self {
            state: create_initial_state(game_id),
            history: UndoHistory::with_capacity(config.undo_capacity),
            roster: Roster::new(game_id),
            config,
            box_score: OnceCell::new(),
        }
    }

    /// Reset everything for a fresh game. The roster survives only if it
    /// already belongs to `game_id`.
    pub fn init_game(&mut self, game_id: &str) {
        self.state = create_initial_state(game_id);
        self.history.clear();
        if self.roster.game_id() != game_id {
            self.roster = Roster::new(game_id);
        }
        self.invalidate();
        info!(game_id, "game initialised");
    }

    /// Adopt a persisted score. The pitch buffer starts empty and undo
    /// history is discarded.
    pub fn restore(&mut self, persisted: PersistedScore) -> ScoreResult<()> {
        let state = ScoreState::from_persisted(persisted);
        try_validate_invariants(&state)?;
        info!(
            game_id = %state.game_id,
            plate_appearances = state.plate_appearances.len(),
            "score restored"
        );
        self.state = state;
        self.history.clear();
        self.invalidate();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Scoring commands
    // -----------------------------------------------------------------------

    /// Record a pitch against the batter currently due up.
    pub fn record_pitch(&mut self, pitch: PitchType) -> ScoreResult<TransitionResult> {
        let batter = self.current_batter();
        self.record_pitch_for(pitch, batter)
    }

    pub fn record_pitch_for(
        &mut self,
        pitch: PitchType,
        batter: BatterRef,
    ) -> ScoreResult<TransitionResult> {
        self.apply(&ScoreEvent::RecordPitch { pitch, batter })
    }

    /// Record the batted-ball result for the batter currently due up.
    pub fn record_result(&mut self, result: PlateResult) -> ScoreResult<TransitionResult> {
        let batter = self.current_batter();
        self.record_result_for(result, batter)
    }

    pub fn record_result_for(
        &mut self,
        result: PlateResult,
        batter: BatterRef,
    ) -> ScoreResult<TransitionResult> {
        self.apply(&ScoreEvent::RecordResult { result, batter })
    }

    pub fn confirm_runners(
        &mut self,
        destinations: BTreeMap<String, Destination>,
    ) -> ScoreResult<TransitionResult> {
        self.apply(&ScoreEvent::ConfirmRunners { destinations })
    }

    pub fn advance_inning(&mut self) -> ScoreResult<TransitionResult> {
        self.apply(&ScoreEvent::AdvanceInning)
    }

    /// Apply one scoring event:
    ///   1. Delegate to `transitions::apply_event` on a clone
    ///   2. Validate invariants on the new state
    ///   3. Push the old state onto the undo stack and store the new one
    pub fn apply(&mut self, event: &ScoreEvent) -> ScoreResult<TransitionResult> {
        let (next, result) = apply_event(&self.state, event)
            .and_then(|(next, result)| {
                try_validate_invariants(&next)?;
                Ok((next, result))
            })
            .inspect_err(|e| {
                warn!(event = event.event_type(), phase = %self.state.phase, error = %e, "event rejected");
            })?;

        let previous = std::mem::replace(&mut self.state, next);
        self.history.record(previous);
        self.invalidate();

        debug!(
            event = event.event_type(),
            phase = %result.phase,
            outs = self.state.outs,
            runs = result.runs_scored,
            "transition applied"
        );
        if let Some(pa) = &result.plate_appearance {
            info!(
                sequence = pa.sequence_in_game,
                inning = pa.inning,
                half = %pa.half,
                batter = %pa.batter_name,
                result = %pa.result,
                "plate appearance confirmed"
            );
        }
        if matches!(event, ScoreEvent::AdvanceInning) {
            info!(
                inning = self.state.current_inning,
                half = %self.state.current_half,
                away = self.state.away_score,
                home = self.state.home_score,
                "half-inning started"
            );
        }
        Ok(result)
    }

    /// Revert to the previous snapshot. No-op when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let applied = self.history.undo(&mut self.state);
        if applied {
            self.invalidate();
            debug!(undo_depth = self.history.undo_depth(), "undo");
        }
        applied
    }

    pub fn redo(&mut self) -> bool {
        let applied = self.history.redo(&mut self.state);
        if applied {
            self.invalidate();
            debug!(redo_depth = self.history.redo_depth(), "redo");
        }
        applied
    }

    /// Record a lineup change. Lineup history is not part of the scoring
    /// snapshot, so undo does not revert substitutions.
    pub fn substitute(&mut self, sub: &Substitution) -> ScoreResult<LineupEntry> {
        let entry = self
            .roster
            .substitute(sub)
            .inspect_err(|e| warn!(side = %sub.side, order = sub.batting_order, error = %e, "substitution rejected"))?
            .clone();
        self.invalidate();
        info!(
            side = %entry.side,
            order = entry.batting_order,
            cycle = entry.cycle,
            player = %entry.player_name,
            kind = %sub.substitution_type,
            "substitution recorded"
        );
        Ok(entry)
    }

    /// Single entry point used by replay and the runtime session.
    pub fn apply_command(&mut self, command: &GameCommand) -> ScoreResult<CommandOutcome> {
        match command {
            GameCommand::Score(event) => self.apply(event).map(CommandOutcome::Transition),
            GameCommand::Undo => Ok(CommandOutcome::Undo {
                applied: self.undo(),
            }),
            GameCommand::Redo => Ok(CommandOutcome::Redo {
                applied: self.redo(),
            }),
            GameCommand::Substitute(sub) => self.substitute(sub).map(CommandOutcome::Substituted),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn state(&self) -> &ScoreState {
        &self.state
    }

    pub fn plate_appearances(&self) -> &[PlateAppearance] {
        &self.state.plate_appearances
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn persisted(&self) -> PersistedScore {
        self.state.to_persisted()
    }

    pub fn current_batter(&self) -> BatterRef {
        self.roster
            .current_batter(self.state.current_half, self.state.current_batter_index)
    }

    pub fn attacking_side(&self) -> Side {
        attacking_side(&self.state)
    }

    pub fn display_count(&self) -> DisplayCount {
        display_count(&self.state.pitches)
    }

    pub fn runners_on_base(&self) -> Vec<RunnerInfo> {
        runners_on_base(&self.state, &self.roster)
    }

    pub fn score_sheet(&self, side: Side) -> ScoreSheet {
        ScoreSheet::build(&self.state, &self.roster, side, self.config.display_innings)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Box score for the current state, recomputed at most once per change.
    pub fn box_score(&self) -> &BoxScore {
        self.box_score
            .get_or_init(|| BoxScore::compute(&self.state, &self.roster))
    }

    fn invalidate(&mut self) {
        self.box_score.take();
    }
}
