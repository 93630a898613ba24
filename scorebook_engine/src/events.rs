//! Event and command definitions.
//!
//! Events are pure data. They carry intent and payload only; all
//! transition logic lives in `transitions` and `engine`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::BatterRef;
use crate::vocabulary::{Destination, FieldingPosition, PitchType, PlateResult, Side, SubstitutionType};

/// Inputs to the scoring reducer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum ScoreEvent {
    RecordPitch {
        pitch: PitchType,
        batter: BatterRef,
    },
    RecordResult {
        result: PlateResult,
        batter: BatterRef,
    },
    /// Disposition of every runner on base, keyed by lineup id.
    ConfirmRunners {
        destinations: BTreeMap<String, Destination>,
    },
    AdvanceInning,
}

impl ScoreEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            ScoreEvent::RecordPitch { .. } => "record_pitch",
            ScoreEvent::RecordResult { .. } => "record_result",
            ScoreEvent::ConfirmRunners { .. } => "confirm_runners",
            ScoreEvent::AdvanceInning => "advance_inning",
        }
    }
}

/// A lineup change requested by the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    pub side: Side,
    pub batting_order: u8,
    pub player_name: String,
    pub position: FieldingPosition,
    pub entered_inning: u32,
    pub substitution_type: SubstitutionType,
}

/// Everything the operator can do to a live game. This is what the
/// runtime logs and replays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum GameCommand {
    Score(ScoreEvent),
    Undo,
    Redo,
    Substitute(Substitution),
}

impl GameCommand {
    pub fn name(&self) -> &'static str {
        match self {
            GameCommand::Score(e) => e.event_type(),
            GameCommand::Undo => "undo",
            GameCommand::Redo => "redo",
            GameCommand::Substitute(_) => "substitute",
        }
    }
}

impl From<ScoreEvent> for GameCommand {
    fn from(event: ScoreEvent) -> Self {
        GameCommand::Score(event)
    }
}

/// A sequence-numbered command as stored in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub sequence: u64,
    pub command: GameCommand,
}

impl EventEnvelope {
    pub fn new(sequence: u64, command: impl Into<GameCommand>) -> Self {
        Self {
            sequence,
            command: command.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_event_is_tagged_by_event_type() {
        let e = ScoreEvent::RecordPitch {
            pitch: PitchType::Ball,
            batter: BatterRef::new("a1", "Ito", 1),
        };
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["event_type"], "record_pitch");
        assert_eq!(v["pitch"], "ball");
        assert_eq!(e.event_type(), "record_pitch");
    }

    #[test]
    fn envelope_json_round_trip() {
        let mut destinations = BTreeMap::new();
        destinations.insert("a1".to_string(), Destination::Home);
        let env = EventEnvelope::new(7, ScoreEvent::ConfirmRunners { destinations });
        let json = serde_json::to_string(&env).unwrap();
        let back: EventEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back, env);
        assert_eq!(back.command.name(), "confirm_runners");
    }
}
