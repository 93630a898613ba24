//! Core domain types for the scoring state machine.
//!
//! Pure data. Transition logic lives in `transitions`.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::vocabulary::{Base, Destination, Half, PitchType, PlateResult};

/// One pitch inside the plate appearance in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PitchCall {
    /// 1-based position within the plate appearance.
    pub sequence: u32,
    #[serde(rename = "type")]
    pub kind: PitchType,
}

/// Identity of the batter a command is recorded against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatterRef {
    pub lineup_id: String,
    pub name: String,
    pub batting_order: u8,
}

impl BatterRef {
    pub fn new(lineup_id: impl Into<String>, name: impl Into<String>, batting_order: u8) -> Self {
        Self {
            lineup_id: lineup_id.into(),
            name: name.into(),
            batting_order,
        }
    }
}

/// A confirmed plate appearance. Append-only; never edited after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlateAppearance {
    pub id: String,
    pub game_id: String,
    pub inning: u32,
    pub half: Half,
    pub batter_lineup_id: String,
    pub batter_name: String,
    pub batting_order: u8,
    pub result: PlateResult,
    pub pitch_count: u32,
    pub pitches: Vec<PitchCall>,
    /// Monotonic across the whole game, independent of inning and half.
    pub sequence_in_game: u64,
}

/// Lineup ids of the runners on each base.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Runners {
    pub first: Option<String>,
    pub second: Option<String>,
    pub third: Option<String>,
}

impl Runners {
    pub fn get(&self, base: Base) -> Option<&str> {
        self.slot(base).as_deref()
    }

    pub fn set(&mut self, base: Base, lineup_id: Option<String>) {
        *self.slot_mut(base) = lineup_id;
    }

    pub fn take(&mut self, base: Base) -> Option<String> {
        self.slot_mut(base).take()
    }

    pub fn is_occupied(&self, base: Base) -> bool {
        self.slot(base).is_some()
    }

    pub fn is_empty(&self) -> bool {
        Base::ALL.iter().all(|b| !self.is_occupied(*b))
    }

    /// Occupied bases in order first to third.
    pub fn occupied(&self) -> Vec<(Base, &str)> {
        Base::ALL
            .iter()
            .filter_map(|b| self.get(*b).map(|id| (*b, id)))
            .collect()
    }

    fn slot(&self, base: Base) -> &Option<String> {
        match base {
            Base::First => &self.first,
            Base::Second => &self.second,
            Base::Third => &self.third,
        }
    }

    fn slot_mut(&mut self, base: Base) -> &mut Option<String> {
        match base {
            Base::First => &mut self.first,
            Base::Second => &mut self.second,
            Base::Third => &mut self.third,
        }
    }
}

/// Input phase of the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    /// Awaiting a pitch call.
    Pitching,
    /// Ball in play; awaiting the batted-ball result.
    Result,
    /// Awaiting explicit runner dispositions.
    RunnerAdvance,
    /// Three outs; awaiting the operator to advance the half-inning.
    InningEnd,
}

/// Live scoring state for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoreState {
    pub game_id: String,
    pub current_inning: u32,
    pub current_half: Half,
    /// Position in the attacking side's order, 0..=8.
    pub current_batter_index: u8,
    pub outs: u8,
    pub runners: Runners,
    /// Pitches of the plate appearance in progress only.
    pub pitches: Vec<PitchCall>,
    pub plate_appearances: Vec<PlateAppearance>,
    pub phase: Phase,
    pub sequence_counter: u64,
    pub home_score: u32,
    pub away_score: u32,
    pub pending_batter_lineup_id: Option<String>,
    pub pending_batter_destination: Option<Destination>,
}

impl ScoreState {
    /// The non-ephemeral fields handed to persistence. The pitch buffer is
    /// session-local and deliberately left out.
    pub fn to_persisted(&self) -> PersistedScore {
        PersistedScore {
            game_id: self.game_id.clone(),
            current_inning: self.current_inning,
            current_half: self.current_half,
            current_batter_index: self.current_batter_index,
            outs: self.outs,
            runners: self.runners.clone(),
            plate_appearances: self.plate_appearances.clone(),
            phase: self.phase,
            sequence_counter: self.sequence_counter,
            home_score: self.home_score,
            away_score: self.away_score,
            pending_batter_lineup_id: self.pending_batter_lineup_id.clone(),
            pending_batter_destination: self.pending_batter_destination,
        }
    }

    /// Rebuild a live state from persisted fields with an empty pitch buffer.
    pub fn from_persisted(p: PersistedScore) -> Self {
        Self {
            game_id: p.game_id,
            current_inning: p.current_inning,
            current_half: p.current_half,
            current_batter_index: p.current_batter_index,
            outs: p.outs,
            runners: p.runners,
            pitches: Vec::new(),
            plate_appearances: p.plate_appearances,
            phase: p.phase,
            sequence_counter: p.sequence_counter,
            home_score: p.home_score,
            away_score: p.away_score,
            pending_batter_lineup_id: p.pending_batter_lineup_id,
            pending_batter_destination: p.pending_batter_destination,
        }
    }
}

/// Serializable subset of `ScoreState` for the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PersistedScore {
    pub game_id: String,
    pub current_inning: u32,
    pub current_half: Half,
    pub current_batter_index: u8,
    pub outs: u8,
    pub runners: Runners,
    pub plate_appearances: Vec<PlateAppearance>,
    pub phase: Phase,
    pub sequence_counter: u64,
    pub home_score: u32,
    pub away_score: u32,
    pub pending_batter_lineup_id: Option<String>,
    pub pending_batter_destination: Option<Destination>,
}

/// Structured outcome of one transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionResult {
    pub event_type: String,
    /// The plate appearance confirmed by this transition, if any.
    pub plate_appearance: Option<PlateAppearance>,
    pub runs_scored: u32,
    pub outs_added: u8,
    pub phase: Phase,
}

impl TransitionResult {
    pub fn new(event_type: &str, phase: Phase) -> Self {
        Self {
            event_type: event_type.to_string(),
            plate_appearance: None,
            runs_scored: 0,
            outs_added: 0,
            phase,
        }
    }
}
