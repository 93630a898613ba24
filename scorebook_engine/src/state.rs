//! State construction.

use crate::domain::{Phase, Runners, ScoreState};
use crate::vocabulary::Half;

/// A fresh game: top of the first, nobody out, bases empty, no log.
pub fn create_initial_state(game_id: &str) -> ScoreState {
    ScoreState {
        game_id: game_id.to_string(),
        current_inning: 1,
        current_half: Half::Top,
        current_batter_index: 0,
        outs: 0,
        runners: Runners::default(),
        pitches: Vec::new(),
        plate_appearances: Vec::new(),
        phase: Phase::Pitching,
        sequence_counter: 0,
        home_score: 0,
        away_score: 0,
        pending_batter_lineup_id: None,
        pending_batter_destination: None,
    }
}
