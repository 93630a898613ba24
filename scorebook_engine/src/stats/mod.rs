//! Box-score statistics.
//!
//! Pure functions over the plate-appearance log and the roster. Nothing is
//! maintained incrementally: every call recomputes from scratch, so a read
//! of the live state can always be followed by a consistent recomputation.

pub mod batting;
pub mod pitching;

use serde::{Deserialize, Serialize};

use crate::domain::{PlateAppearance, ScoreState};
use crate::lineup::Roster;
use crate::vocabulary::Side;

pub use batting::{compute_batting_line, compute_batting_lines, BattingLine};
pub use pitching::{
    compute_ip, compute_pitching_line, compute_pitching_lines, pitcher_inning_range, PitchingLine,
};

/// Both teams' lines for the game so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxScore {
    pub away_runs: u32,
    pub home_runs: u32,
    /// Team hits from the full log, including players since replaced.
    pub away_hits: u32,
    pub home_hits: u32,
    pub away_batting: Vec<BattingLine>,
    pub home_batting: Vec<BattingLine>,
    pub away_pitching: Vec<PitchingLine>,
    pub home_pitching: Vec<PitchingLine>,
}

impl BoxScore {
    pub fn compute(state: &ScoreState, roster: &Roster) -> Self {
        let pas = &state.plate_appearances;
        Self {
            away_runs: state.away_score,
            home_runs: state.home_score,
            away_hits: team_hits(pas, Side::Away),
            home_hits: team_hits(pas, Side::Home),
            away_batting: compute_batting_lines(pas, roster, Side::Away),
            home_batting: compute_batting_lines(pas, roster, Side::Home),
            away_pitching: compute_pitching_lines(pas, roster, Side::Away, state.current_inning),
            home_pitching: compute_pitching_lines(pas, roster, Side::Home, state.current_inning),
        }
    }

    pub fn runs(&self, side: Side) -> u32 {
        match side {
            Side::Away => self.away_runs,
            Side::Home => self.home_runs,
        }
    }

    pub fn hits(&self, side: Side) -> u32 {
        match side {
            Side::Away => self.away_hits,
            Side::Home => self.home_hits,
        }
    }

    pub fn batting(&self, side: Side) -> &[BattingLine] {
        match side {
            Side::Away => &self.away_batting,
            Side::Home => &self.home_batting,
        }
    }

    pub fn pitching(&self, side: Side) -> &[PitchingLine] {
        match side {
            Side::Away => &self.away_pitching,
            Side::Home => &self.home_pitching,
        }
    }
}

/// Hits by every batter of `side`, whoever holds the slot now.
pub fn team_hits(pas: &[PlateAppearance], side: Side) -> u32 {
    pas.iter()
        .filter(|pa| pa.half.batting_side() == side && pa.result.is_hit())
        .count() as u32
}

/// `num / den` rounded to `places` decimals, `None` when `den` is zero.
pub(crate) fn ratio(num: f64, den: f64, places: i32) -> Option<f64> {
    if den == 0.0 {
        None
    } else {
        Some(round_to(num / den, places))
    }
}

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
