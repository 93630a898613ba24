//! Ball/strike counting over the pitch buffer.
//!
//! Fouls add a strike only while the count is below two strikes, so a
//! foul can never be the third strike.

use serde::{Deserialize, Serialize};

use crate::domain::PitchCall;
use crate::vocabulary::PitchType;

pub const STRIKES_FOR_STRIKEOUT: u32 = 3;
pub const BALLS_FOR_WALK: u32 = 4;

pub fn count_balls(pitches: &[PitchCall]) -> u32 {
    pitches.iter().filter(|p| p.kind == PitchType::Ball).count() as u32
}

/// Strikes in pitch order, applying the two-strike foul rule.
pub fn count_strikes(pitches: &[PitchCall]) -> u32 {
    pitches.iter().fold(0, |strikes, p| match p.kind {
        kind if kind.is_called_or_swinging_strike() => strikes + 1,
        PitchType::Foul if strikes < 2 => strikes + 1,
        _ => strikes,
    })
}

/// Count as shown to the operator while a plate appearance is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayCount {
    pub balls: u32,
    pub strikes: u32,
}

/// Balls capped at 3 and strikes at 2; the fourth ball and the third
/// strike end the plate appearance and are never displayed.
pub fn display_count(pitches: &[PitchCall]) -> DisplayCount {
    DisplayCount {
        balls: count_balls(pitches).min(BALLS_FOR_WALK - 1),
        strikes: count_strikes(pitches).min(STRIKES_FOR_STRIKEOUT - 1),
    }
}
