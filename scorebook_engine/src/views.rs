//! Derived views for rendering: result labels, the per-team scoresheet
//! grid and the runner list shown while dispositions are pending.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{PlateAppearance, ScoreState};
use crate::lineup::Roster;
use crate::vocabulary::{position_label, Base, PlateResult, Side, BENCH_ORDER};

/// Base the batter reached on the play: 1..=3, 4 for a home run, 0 if
/// the batter did not reach.
pub fn reached_base(result: PlateResult) -> u8 {
    result.batter_destination().map_or(0, |d| d.number())
}

pub fn is_out_result(result: PlateResult) -> bool {
    result.is_out()
}

/// Scoresheet abbreviation.
pub fn result_label(result: PlateResult) -> &'static str {
    match result {
        PlateResult::Single => "H",
        PlateResult::Double => "2B",
        PlateResult::Triple => "3B",
        PlateResult::HomeRun => "HR",
        PlateResult::Groundout => "G",
        PlateResult::Flyout => "F",
        PlateResult::Lineout => "L",
        PlateResult::StrikeoutSwinging => "K",
        PlateResult::StrikeoutLooking => "Kc",
        PlateResult::SacrificeBunt => "S",
        PlateResult::SacrificeFly => "SF",
        PlateResult::Walk => "BB",
        PlateResult::HitByPitch => "HBP",
        PlateResult::FieldersChoice => "FC",
        PlateResult::ReachedOnError => "E",
        PlateResult::DoublePlay => "DP",
        PlateResult::DroppedThirdStrike => "KS",
    }
}

/// Side currently at bat.
pub fn attacking_side(state: &ScoreState) -> Side {
    state.current_half.batting_side()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCell {
    pub label: String,
    pub reached_base: u8,
    pub is_out: bool,
    pub pitch_count: u32,
}

impl From<&PlateAppearance> for ScoreCell {
    fn from(pa: &PlateAppearance) -> Self {
        Self {
            label: result_label(pa.result).to_string(),
            reached_base: reached_base(pa.result),
            is_out: is_out_result(pa.result),
            pitch_count: pa.pitch_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSheetRow {
    pub batting_order: u8,
    /// Current occupant of the slot, if any.
    pub player_name: Option<String>,
    pub position: Option<String>,
    pub is_current_batter: bool,
    /// One entry per displayed inning, index 0 is the first inning.
    pub cells: Vec<Option<ScoreCell>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSheet {
    pub side: Side,
    pub innings: u32,
    pub rows: Vec<ScoreSheetRow>,
}

impl ScoreSheet {
    /// Grid for `side`: nine rows by `max(min_innings, current inning)`
    /// columns. When a slot batted more than once in an inning the last
    /// plate appearance is shown.
    pub fn build(state: &ScoreState, roster: &Roster, side: Side, min_innings: u32) -> Self {
        let half = side.batting_half();
        let mut grid: BTreeMap<(u8, u32), &PlateAppearance> = BTreeMap::new();
        for pa in state.plate_appearances.iter().filter(|p| p.half == half) {
            grid.insert((pa.batting_order, pa.inning), pa);
        }

        let innings = min_innings.max(state.current_inning);
        let attacking = attacking_side(state) == side;

        let rows = (1..BENCH_ORDER)
            .map(|order| {
                let occupant = roster.current_occupant(side, order);
                ScoreSheetRow {
                    batting_order: order,
                    player_name: occupant.map(|e| e.player_name.clone()),
                    position: occupant.map(|e| position_label(e.position).to_string()),
                    is_current_batter: attacking && state.current_batter_index + 1 == order,
                    cells: (1..=innings)
                        .map(|inning| grid.get(&(order, inning)).map(|pa| ScoreCell::from(*pa)))
                        .collect(),
                }
            })
            .collect();

        Self { side, innings, rows }
    }

    pub fn cell(&self, batting_order: u8, inning: u32) -> Option<&ScoreCell> {
        let row = self.rows.get(usize::from(batting_order).checked_sub(1)?)?;
        row.cells.get(usize::try_from(inning).ok()?.checked_sub(1)?)?.as_ref()
    }
}

/// A runner awaiting a disposition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerInfo {
    pub base: Base,
    pub lineup_id: String,
    pub name: String,
}

/// Occupied bases first to third, with names resolved from the roster.
pub fn runners_on_base(state: &ScoreState, roster: &Roster) -> Vec<RunnerInfo> {
    state
        .runners
        .occupied()
        .into_iter()
        .map(|(base, id)| RunnerInfo {
            base,
            lineup_id: id.to_string(),
            name: roster
                .player_name(id)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Runner on {}", base.number())),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_initial_state;
    use crate::vocabulary::Half;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    #[rstest]
    #[case(PlateResult::Single, 1)]
    #[case(PlateResult::Walk, 1)]
    #[case(PlateResult::ReachedOnError, 1)]
    #[case(PlateResult::DroppedThirdStrike, 1)]
    #[case(PlateResult::Double, 2)]
    #[case(PlateResult::Triple, 3)]
    #[case(PlateResult::HomeRun, 4)]
    #[case(PlateResult::Groundout, 0)]
    #[case(PlateResult::DoublePlay, 0)]
    fn reached_base_table(#[case] result: PlateResult, #[case] base: u8) {
        assert_eq!(reached_base(result), base);
    }

    #[test]
    fn labels_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for r in PlateResult::iter() {
            assert!(seen.insert(result_label(r)), "duplicate label for {r}");
        }
        assert_eq!(result_label(PlateResult::StrikeoutLooking), "Kc");
        assert_eq!(result_label(PlateResult::DroppedThirdStrike), "KS");
    }

    fn pa(order: u8, inning: u32, half: Half, result: PlateResult, seq: u64) -> PlateAppearance {
        PlateAppearance {
            id: format!("g-pa-{seq}"),
            game_id: "g".into(),
            inning,
            half,
            batter_lineup_id: format!("g-away-{order}-1"),
            batter_name: format!("away{order}"),
            batting_order: order,
            result,
            pitch_count: 3,
            pitches: Vec::new(),
            sequence_in_game: seq,
        }
    }

    fn roster() -> Roster {
        let mut r = Roster::new("g");
        for order in 1..=9u8 {
            r.register(Side::Away, order, &format!("away{order}"), order, true)
                .unwrap();
        }
        r
    }

    #[test]
    fn grid_keeps_last_plate_appearance_per_cell() {
        let mut state = create_initial_state("g");
        state.plate_appearances = vec![
            pa(1, 1, Half::Top, PlateResult::Single, 1),
            pa(1, 1, Half::Top, PlateResult::Flyout, 2),
            pa(2, 1, Half::Bottom, PlateResult::HomeRun, 3),
        ];
        let sheet = ScoreSheet::build(&state, &roster(), Side::Away, 9);
        assert_eq!(sheet.innings, 9);
        assert_eq!(sheet.rows.len(), 9);
        let cell = sheet.cell(1, 1).unwrap();
        assert_eq!(cell.label, "F");
        assert!(cell.is_out);
        assert!(sheet.cell(2, 1).is_none());
        assert_eq!(sheet.rows[0].player_name.as_deref(), Some("away1"));
        assert_eq!(sheet.rows[0].position.as_deref(), Some("P"));
    }

    #[test]
    fn grid_extends_past_nine_innings() {
        let mut state = create_initial_state("g");
        state.current_inning = 11;
        state.plate_appearances = vec![pa(4, 11, Half::Top, PlateResult::Double, 1)];
        let sheet = ScoreSheet::build(&state, &roster(), Side::Away, 9);
        assert_eq!(sheet.innings, 11);
        assert_eq!(sheet.cell(4, 11).unwrap().reached_base, 2);
        assert!(sheet.cell(4, 12).is_none());
        assert!(sheet.cell(0, 1).is_none());
    }

    #[test]
    fn current_batter_marked_only_for_attacking_side() {
        let mut state = create_initial_state("g");
        state.current_batter_index = 3;
        let away = ScoreSheet::build(&state, &roster(), Side::Away, 9);
        let home = ScoreSheet::build(&state, &roster(), Side::Home, 9);
        assert!(away.rows[3].is_current_batter);
        assert!(home.rows.iter().all(|r| !r.is_current_batter));
        assert!(home.rows.iter().all(|r| r.player_name.is_none()));
    }

    #[test]
    fn runner_names_fall_back_to_base() {
        let mut state = create_initial_state("g");
        state.runners.set(Base::First, Some("g-away-1-1".into()));
        state.runners.set(Base::Third, Some("unknown".into()));
        let runners = runners_on_base(&state, &roster());
        assert_eq!(runners.len(), 2);
        assert_eq!(runners[0].name, "away1");
        assert_eq!(runners[1].base, Base::Third);
        assert_eq!(runners[1].name, "Runner on 3");
    }
}
