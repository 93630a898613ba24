//! Batting lines.

use serde::{Deserialize, Serialize};

use crate::domain::PlateAppearance;
use crate::lineup::{LineupEntry, Roster};
use crate::vocabulary::{PlateResult, Side, BENCH_ORDER};

use super::{ratio, round_to};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattingLine {
    pub lineup_id: String,
    pub player_name: String,
    pub batting_order: u8,
    pub pa: u32,
    pub ab: u32,
    pub h: u32,
    pub doubles: u32,
    pub triples: u32,
    pub hr: u32,
    pub bb: u32,
    pub hbp: u32,
    pub so: u32,
    pub sac: u32,
    pub sf: u32,
    pub dp: u32,
    pub pitches_total: u32,
    pub avg: Option<f64>,
    pub obp: Option<f64>,
    pub slg: Option<f64>,
    pub ops: Option<f64>,
    /// Pitches seen per plate appearance.
    pub ppa: Option<f64>,
}

/// One player's line from the plate appearances attributed to them.
pub fn compute_batting_line(pas: &[&PlateAppearance], entry: &LineupEntry) -> BattingLine {
    let count = |r: PlateResult| pas.iter().filter(|p| p.result == r).count() as u32;

    let pa = pas.len() as u32;
    let ab = pas.iter().filter(|p| p.result.counts_as_at_bat()).count() as u32;
    let h = pas.iter().filter(|p| p.result.is_hit()).count() as u32;
    let total_bases: u32 = pas.iter().map(|p| p.result.total_bases()).sum();
    let bb = count(PlateResult::Walk);
    let hbp = count(PlateResult::HitByPitch);
    let sf = count(PlateResult::SacrificeFly);
    let pitches_total: u32 = pas.iter().map(|p| p.pitch_count).sum();

    let avg = ratio(h as f64, ab as f64, 3);
    let obp = ratio((h + bb + hbp) as f64, (ab + bb + hbp + sf) as f64, 3);
    let slg = ratio(total_bases as f64, ab as f64, 3);
    let ops = match (obp, slg) {
        (Some(o), Some(s)) => Some(round_to(o + s, 3)),
        _ => None,
    };

    BattingLine {
        lineup_id: entry.id.clone(),
        player_name: entry.player_name.clone(),
        batting_order: entry.batting_order,
        pa,
        ab,
        h,
        doubles: count(PlateResult::Double),
        triples: count(PlateResult::Triple),
        hr: count(PlateResult::HomeRun),
        bb,
        hbp,
        so: pas.iter().filter(|p| p.result.is_strikeout()).count() as u32,
        sac: count(PlateResult::SacrificeBunt),
        sf,
        dp: count(PlateResult::DoublePlay),
        pitches_total,
        avg,
        obp,
        slg,
        ops,
        ppa: ratio(pitches_total as f64, pa as f64, 1),
    }
}

/// Lines for the current occupant of every batting slot of `side`.
///
/// A slot that was never substituted reports its only occupant, even with
/// zero plate appearances. A substituted slot reports only the current
/// occupant's own plate appearances and is dropped if there are none.
/// Bench registrations never produce a row.
pub fn compute_batting_lines(
    pas: &[PlateAppearance],
    roster: &Roster,
    side: Side,
) -> Vec<BattingLine> {
    let half = side.batting_half();
    let team_pas: Vec<&PlateAppearance> = pas.iter().filter(|p| p.half == half).collect();

    let mut lines = Vec::new();
    for order in roster.batting_orders(side) {
        if order >= BENCH_ORDER {
            continue;
        }
        let history = roster.slot_history(side, order);
        let Some(current) = history.last() else {
            continue;
        };
        let own: Vec<&PlateAppearance> = team_pas
            .iter()
            .copied()
            .filter(|p| p.batter_lineup_id == current.id)
            .collect();
        if own.is_empty() && history.len() > 1 {
            continue;
        }
        lines.push(compute_batting_line(&own, current));
    }
    lines
}
