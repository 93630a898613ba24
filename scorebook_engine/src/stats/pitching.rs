//! Pitching lines at whole-inning granularity.

use serde::{Deserialize, Serialize};

use crate::domain::PlateAppearance;
use crate::lineup::{LineupEntry, Roster};
use crate::vocabulary::{PlateResult, Side};

use super::ratio;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchingLine {
    pub lineup_id: String,
    pub player_name: String,
    pub from_inning: u32,
    pub to_inning: u32,
    /// Batters faced.
    pub bfp: u32,
    pub pitches: u32,
    pub ip: u32,
    pub ip_display: String,
    pub h: u32,
    pub so: u32,
    pub bb: u32,
    pub hbp: u32,
    pub opp_avg: Option<f64>,
    pub whip: Option<f64>,
    pub k9: Option<f64>,
    pub bb9: Option<f64>,
    pub kbb: Option<f64>,
}

/// Inclusive inning range a pitcher is responsible for: from the inning
/// they entered to the inning before the next pitcher of the same side
/// entered, or to `current_inning` if nobody relieved them. Pitchers who
/// entered in the same inning share that inning's range.
pub fn pitcher_inning_range(
    pitcher: &LineupEntry,
    staff: &[&LineupEntry],
    current_inning: u32,
) -> (u32, u32) {
    let from = pitcher.entered_inning.unwrap_or(1);
    let next = staff
        .iter()
        .filter(|p| p.side == pitcher.side)
        .map(|p| p.entered_inning.unwrap_or(1))
        .filter(|inning| *inning > from)
        .min();
    let to = match next {
        Some(inning) => inning - 1,
        None => current_inning,
    };
    (from, to)
}

/// Whole innings covered by an inclusive range, never negative.
pub fn compute_ip(from_inning: u32, to_inning: u32) -> (u32, String) {
    let innings = (to_inning + 1).saturating_sub(from_inning);
    (innings, innings.to_string())
}

/// One pitcher's line from the opposing team's plate appearances.
pub fn compute_pitching_line(
    pitcher: &LineupEntry,
    opponent_pas: &[&PlateAppearance],
    staff: &[&LineupEntry],
    current_inning: u32,
) -> PitchingLine {
    let (from_inning, to_inning) = pitcher_inning_range(pitcher, staff, current_inning);
    let faced: Vec<&PlateAppearance> = opponent_pas
        .iter()
        .copied()
        .filter(|p| p.inning >= from_inning && p.inning <= to_inning)
        .collect();

    let count = |r: PlateResult| faced.iter().filter(|p| p.result == r).count() as u32;
    let h = faced.iter().filter(|p| p.result.is_hit()).count() as u32;
    let ab = faced.iter().filter(|p| p.result.counts_as_at_bat()).count() as u32;
    let so = faced.iter().filter(|p| p.result.is_strikeout()).count() as u32;
    let bb = count(PlateResult::Walk);
    let hbp = count(PlateResult::HitByPitch);
    let (ip, ip_display) = compute_ip(from_inning, to_inning);
    let innings = ip as f64;

    PitchingLine {
        lineup_id: pitcher.id.clone(),
        player_name: pitcher.player_name.clone(),
        from_inning,
        to_inning,
        bfp: faced.len() as u32,
        pitches: faced.iter().map(|p| p.pitch_count).sum(),
        ip,
        ip_display,
        h,
        so,
        bb,
        hbp,
        opp_avg: ratio(h as f64, ab as f64, 3),
        whip: ratio((h + bb + hbp) as f64, innings, 2),
        k9: ratio(9.0 * so as f64, innings, 1),
        bb9: ratio(9.0 * bb as f64, innings, 1),
        kbb: ratio(so as f64, bb as f64, 2),
    }
}

/// Lines for every pitcher of the fielding `side`, in order of entry.
pub fn compute_pitching_lines(
    pas: &[PlateAppearance],
    roster: &Roster,
    side: Side,
    current_inning: u32,
) -> Vec<PitchingLine> {
    let staff = roster.pitchers_for_side(side);
    if staff.is_empty() {
        return Vec::new();
    }
    let opponent_half = side.opponent().batting_half();
    let opponent_pas: Vec<&PlateAppearance> =
        pas.iter().filter(|p| p.half == opponent_half).collect();

    staff
        .iter()
        .map(|p| compute_pitching_line(p, &opponent_pas, &staff, current_inning))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Substitution;
    use crate::vocabulary::{Half, SubstitutionType, PITCHER};
    use rstest::rstest;

    fn home_roster_with_reliever(relief_inning: u32) -> Roster {
        let mut r = Roster::new("g");
        for order in 1..=9u8 {
            r.register(Side::Home, order, &format!("H{order}"), order, true)
                .unwrap();
        }
        r.substitute(&Substitution {
            side: Side::Home,
            batting_order: 1,
            player_name: "Reliever".into(),
            position: PITCHER,
            entered_inning: relief_inning,
            substitution_type: SubstitutionType::PitchingChange,
        })
        .unwrap();
        r
    }

    fn away_pa(inning: u32, result: PlateResult, seq: u64) -> PlateAppearance {
        PlateAppearance {
            id: format!("g-pa-{seq}"),
            game_id: "g".into(),
            inning,
            half: Half::Top,
            batter_lineup_id: "g-away-1-1".into(),
            batter_name: "A1".into(),
            batting_order: 1,
            result,
            pitch_count: 4,
            pitches: Vec::new(),
            sequence_in_game: seq,
        }
    }

    #[test]
    fn starter_range_ends_before_reliever() {
        let r = home_roster_with_reliever(4);
        let lines = compute_pitching_lines(&[], &r, Side::Home, 5);
        assert_eq!(lines.len(), 2);
        assert_eq!((lines[0].from_inning, lines[0].to_inning), (1, 3));
        assert_eq!(lines[0].ip, 3);
        assert_eq!(lines[0].ip_display, "3");
        assert_eq!((lines[1].from_inning, lines[1].to_inning), (4, 5));
        assert_eq!(lines[1].ip, 2);
    }

    #[test]
    fn only_plate_appearances_in_range_are_attributed() {
        let r = home_roster_with_reliever(4);
        let pas = vec![
            away_pa(1, PlateResult::Single, 1),
            away_pa(3, PlateResult::StrikeoutSwinging, 2),
            away_pa(4, PlateResult::HomeRun, 3),
            away_pa(5, PlateResult::Walk, 4),
        ];
        let lines = compute_pitching_lines(&pas, &r, Side::Home, 5);
        assert_eq!(lines[0].bfp, 2);
        assert_eq!((lines[0].h, lines[0].so, lines[0].bb), (1, 1, 0));
        assert_eq!(lines[0].pitches, 8);
        assert_eq!(lines[1].bfp, 2);
        assert_eq!((lines[1].h, lines[1].bb), (1, 1));
    }

    #[test]
    fn own_team_plate_appearances_are_ignored() {
        let r = home_roster_with_reliever(4);
        let mut pa = away_pa(1, PlateResult::Single, 1);
        pa.half = Half::Bottom;
        let lines = compute_pitching_lines(&[pa], &r, Side::Home, 1);
        assert_eq!(lines[0].bfp, 0);
    }

    #[test]
    fn whip_and_rates() {
        let r = home_roster_with_reliever(4);
        let pas = vec![
            away_pa(1, PlateResult::Single, 1),
            away_pa(2, PlateResult::Walk, 2),
            away_pa(2, PlateResult::HitByPitch, 3),
            away_pa(3, PlateResult::StrikeoutLooking, 4),
            away_pa(3, PlateResult::StrikeoutSwinging, 5),
            away_pa(3, PlateResult::Groundout, 6),
        ];
        let line = &compute_pitching_lines(&pas, &r, Side::Home, 5)[0];
        assert_eq!(line.whip, Some(1.0));
        assert_eq!(line.k9, Some(6.0));
        assert_eq!(line.bb9, Some(3.0));
        assert_eq!(line.kbb, Some(2.0));
        assert_eq!(line.opp_avg, Some(0.25));
    }

    #[test]
    fn zero_walks_gives_null_strikeout_to_walk() {
        let r = home_roster_with_reliever(4);
        let pas = vec![away_pa(1, PlateResult::StrikeoutSwinging, 1)];
        let line = &compute_pitching_lines(&pas, &r, Side::Home, 5)[0];
        assert_eq!(line.kbb, None);
    }

    #[test]
    fn same_inning_reliever_shares_the_range() {
        let r = home_roster_with_reliever(1);
        let pas = vec![away_pa(1, PlateResult::Single, 1)];
        let lines = compute_pitching_lines(&pas, &r, Side::Home, 2);
        assert_eq!((lines[0].from_inning, lines[0].to_inning), (1, 2));
        assert_eq!(lines[0].bfp, 1);
    }

    #[test]
    fn no_pitchers_gives_no_lines() {
        let pas = vec![away_pa(1, PlateResult::Single, 1)];
        assert!(compute_pitching_lines(&pas, &Roster::new("g"), Side::Home, 3).is_empty());
    }

    #[rstest]
    #[case(1, 3, 3)]
    #[case(4, 4, 1)]
    #[case(5, 4, 0)]
    #[case(6, 2, 0)]
    fn ip_is_whole_innings_never_negative(#[case] from: u32, #[case] to: u32, #[case] ip: u32) {
        assert_eq!(compute_ip(from, to).0, ip);
    }

    #[test]
    fn zero_innings_gives_null_rates() {
        let mut r = Roster::new("g");
        r.register(Side::Home, 1, "P", PITCHER, true).unwrap();
        r.substitute(&Substitution {
            side: Side::Home,
            batting_order: 1,
            player_name: "R".into(),
            position: PITCHER,
            entered_inning: 2,
            substitution_type: SubstitutionType::PitchingChange,
        })
        .unwrap();
        // Current inning 1 while the reliever is recorded as entering in 2.
        let lines = compute_pitching_lines(&[], &r, Side::Home, 1);
        assert_eq!(lines[1].ip, 0);
        assert_eq!(lines[1].whip, None);
        assert_eq!(lines[1].k9, None);
        assert_eq!(lines[1].bb9, None);
    }
}
