use thiserror::Error;

use crate::domain::Phase;
use crate::vocabulary::Side;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error("{command} is not accepted in phase {phase}")]
    WrongPhase { command: &'static str, phase: Phase },

    #[error("runner {lineup_id} on base {base} has no disposition")]
    MissingDisposition { lineup_id: String, base: u8 },

    #[error("runner {0} is not on base")]
    UnknownRunner(String),

    #[error("base {0} assigned to more than one runner")]
    BaseCollision(u8),

    #[error("batting order {0} is outside 1..=10")]
    InvalidBattingOrder(u8),

    #[error("fielding position {0} is outside 1..=10")]
    InvalidPosition(u8),

    #[error("inning {0} is not a valid inning")]
    InvalidInning(u32),

    #[error("player name must not be empty")]
    EmptyPlayerName,

    #[error("no lineup entry for {side} batting order {batting_order}")]
    UnknownSlot { side: Side, batting_order: u8 },

    #[error("invalid starting lineup for {side}: {reason}")]
    InvalidLineup { side: Side, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invariant violation: {0}")]
    Invariant(String),

    #[error("canonical serialization failed: {0}")]
    Serialization(String),
}

pub type ScoreResult<T> = Result<T, ScoreError>;
