//! Versioned lineup history.
//!
//! Every (side, batting order) slot owns an ordered run of occupants
//! numbered by `cycle`, starting at 1 for the starter. Substitutions append
//! a new cycle; a defensive change only rewrites the current occupant's
//! position. Plate appearances point at entries by id, so historical
//! attribution survives any number of substitutions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::BatterRef;
use crate::error::{ScoreError, ScoreResult};
use crate::events::Substitution;
use crate::vocabulary::{
    is_valid_position, FieldingPosition, Half, Side, SubstitutionType, BENCH_ORDER, PITCHER,
};

/// One occupant of one lineup slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineupEntry {
    pub id: String,
    pub game_id: String,
    pub side: Side,
    pub batting_order: u8,
    pub cycle: u32,
    pub player_name: String,
    pub position: FieldingPosition,
    pub is_starter: bool,
    pub entered_inning: Option<u32>,
    pub substitution_type: Option<SubstitutionType>,
}

/// Arena of lineup entries for one game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    game_id: String,
    entries: Vec<LineupEntry>,
}

impl Roster {
    pub fn new(game_id: &str) -> Self {
        Self {
            game_id: game_id.to_string(),
            entries: Vec::new(),
        }
    }

    /// Adopt entries produced by the external setup flow as-is.
    pub fn from_entries(game_id: &str, entries: Vec<LineupEntry>) -> Self {
        Self {
            game_id: game_id.to_string(),
            entries,
        }
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn entries(&self) -> &[LineupEntry] {
        &self.entries
    }

    pub fn entries_for_side(&self, side: Side) -> impl Iterator<Item = &LineupEntry> {
        self.entries.iter().filter(move |e| e.side == side)
    }

    pub fn entry(&self, lineup_id: &str) -> Option<&LineupEntry> {
        self.entries.iter().find(|e| e.id == lineup_id)
    }

    pub fn player_name(&self, lineup_id: &str) -> Option<&str> {
        self.entry(lineup_id).map(|e| e.player_name.as_str())
    }

    /// Register a player at setup time. Starters and bench players
    /// (batting order 10) both enter as the next cycle of their slot.
    pub fn register(
        &mut self,
        side: Side,
        batting_order: u8,
        player_name: &str,
        position: FieldingPosition,
        is_starter: bool,
    ) -> ScoreResult<&LineupEntry> {
        if !(1..=BENCH_ORDER).contains(&batting_order) {
            return Err(ScoreError::InvalidBattingOrder(batting_order));
        }
        let entered_inning = is_starter.then_some(1);
        self.push_entry(side, batting_order, player_name, position, is_starter, entered_inning, None)
    }

    /// Apply a substitution. A defensive change mutates the current
    /// occupant's position in place; every other kind appends a cycle.
    pub fn substitute(&mut self, sub: &Substitution) -> ScoreResult<&LineupEntry> {
        if !(1..BENCH_ORDER).contains(&sub.batting_order) {
            return Err(ScoreError::InvalidBattingOrder(sub.batting_order));
        }
        if sub.entered_inning == 0 {
            return Err(ScoreError::InvalidInning(sub.entered_inning));
        }

        if sub.substitution_type == SubstitutionType::DefensiveChange {
            if !is_valid_position(sub.position) {
                return Err(ScoreError::InvalidPosition(sub.position));
            }
            let idx = self
                .current_index(sub.side, sub.batting_order)
                .ok_or(ScoreError::UnknownSlot {
                    side: sub.side,
                    batting_order: sub.batting_order,
                })?;
            self.entries[idx].position = sub.position;
            return Ok(&self.entries[idx]);
        }

        self.push_entry(
            sub.side,
            sub.batting_order,
            &sub.player_name,
            sub.position,
            false,
            Some(sub.entered_inning),
            Some(sub.substitution_type),
        )
    }

    /// Highest cycle in the slot, 0 if the slot is unpopulated.
    pub fn max_cycle(&self, side: Side, batting_order: u8) -> u32 {
        self.slot(side, batting_order)
            .map(|e| e.cycle)
            .max()
            .unwrap_or(0)
    }

    /// The entry with the highest cycle in the slot.
    pub fn current_occupant(&self, side: Side, batting_order: u8) -> Option<&LineupEntry> {
        self.slot(side, batting_order).max_by_key(|e| e.cycle)
    }

    /// All occupants of a slot in cycle order.
    pub fn slot_history(&self, side: Side, batting_order: u8) -> Vec<&LineupEntry> {
        let mut v: Vec<&LineupEntry> = self.slot(side, batting_order).collect();
        v.sort_by_key(|e| e.cycle);
        v
    }

    /// Batting orders populated for a side, ascending.
    pub fn batting_orders(&self, side: Side) -> Vec<u8> {
        self.entries_for_side(side)
            .map(|e| e.batting_order)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Pitchers of a side ordered by the inning they entered; an unknown
    /// entry inning counts as the first. Bench registrations are skipped
    /// until they enter through a substitution.
    pub fn pitchers_for_side(&self, side: Side) -> Vec<&LineupEntry> {
        let mut v: Vec<&LineupEntry> = self
            .entries_for_side(side)
            .filter(|e| e.position == PITCHER && e.batting_order < BENCH_ORDER)
            .collect();
        v.sort_by_key(|e| e.entered_inning.unwrap_or(1));
        v
    }

    /// Who is up for the attacking side of `half` at `batter_index`.
    /// Falls back to a placeholder when the slot has no entry.
    pub fn current_batter(&self, half: Half, batter_index: u8) -> BatterRef {
        let order = batter_index + 1;
        match self.current_occupant(half.batting_side(), order) {
            Some(e) => BatterRef::new(e.id.clone(), e.player_name.clone(), order),
            None => BatterRef::new(
                format!("placeholder-{batter_index}"),
                format!("Batter {order}"),
                order,
            ),
        }
    }

    /// A game may start only when a side has nine starter slots 1..=9,
    /// each named and positioned.
    pub fn validate_starting_lineup(&self, side: Side) -> ScoreResult<()> {
        let invalid = |reason: String| ScoreError::InvalidLineup { side, reason };

        let starters: Vec<&LineupEntry> = self
            .entries_for_side(side)
            .filter(|e| e.is_starter && e.batting_order < BENCH_ORDER)
            .collect();
        let orders: BTreeSet<u8> = starters.iter().map(|e| e.batting_order).collect();

        if starters.len() != orders.len() {
            return Err(invalid("duplicate starter batting order".to_string()));
        }
        if orders != (1..BENCH_ORDER).collect::<BTreeSet<u8>>() {
            return Err(invalid(format!(
                "expected starters at 1..=9, found {:?}",
                orders
            )));
        }
        for e in &starters {
            if e.player_name.trim().is_empty() {
                return Err(invalid(format!("batting order {} has no name", e.batting_order)));
            }
            if !is_valid_position(e.position) {
                return Err(invalid(format!(
                    "batting order {} has no fielding position",
                    e.batting_order
                )));
            }
        }
        Ok(())
    }

    fn slot(&self, side: Side, batting_order: u8) -> impl Iterator<Item = &LineupEntry> {
        self.entries
            .iter()
            .filter(move |e| e.side == side && e.batting_order == batting_order)
    }

    fn current_index(&self, side: Side, batting_order: u8) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.side == side && e.batting_order == batting_order)
            .max_by_key(|(_, e)| e.cycle)
            .map(|(i, _)| i)
    }

    #[allow(clippy::too_many_arguments)]
    fn push_entry(
        &mut self,
        side: Side,
        batting_order: u8,
        player_name: &str,
        position: FieldingPosition,
        is_starter: bool,
        entered_inning: Option<u32>,
        substitution_type: Option<SubstitutionType>,
    ) -> ScoreResult<&LineupEntry> {
        let name = player_name.trim();
        if name.is_empty() {
            return Err(ScoreError::EmptyPlayerName);
        }
        if !is_valid_position(position) {
            return Err(ScoreError::InvalidPosition(position));
        }
        let cycle = self.max_cycle(side, batting_order) + 1;
        self.entries.push(LineupEntry {
            id: format!("{}-{}-{}-{}", self.game_id, side, batting_order, cycle),
            game_id: self.game_id.clone(),
            side,
            batting_order,
            cycle,
            player_name: name.to_string(),
            position,
            is_starter,
            entered_inning,
            substitution_type,
        });
        let last = self.entries.len() - 1;
        Ok(&self.entries[last])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_side(roster: &mut Roster, side: Side) {
        for order in 1..=9u8 {
            roster
                .register(side, order, &format!("{side}{order}"), order, true)
                .unwrap();
        }
    }

    fn sub(order: u8, name: &str, position: u8, kind: SubstitutionType) -> Substitution {
        Substitution {
            side: Side::Away,
            batting_order: order,
            player_name: name.to_string(),
            position,
            entered_inning: 4,
            substitution_type: kind,
        }
    }

    #[test]
    fn substitution_appends_next_cycle() {
        let mut r = Roster::new("g");
        full_side(&mut r, Side::Away);
        let e = r
            .substitute(&sub(3, "Pinch", 3, SubstitutionType::PinchHit))
            .unwrap()
            .clone();
        assert_eq!(e.cycle, 2);
        assert!(!e.is_starter);
        assert_eq!(e.entered_inning, Some(4));
        assert_eq!(r.current_occupant(Side::Away, 3).unwrap().id, e.id);
        let history: Vec<u32> = r.slot_history(Side::Away, 3).iter().map(|e| e.cycle).collect();
        assert_eq!(history, vec![1, 2]);
    }

    #[test]
    fn defensive_change_mutates_in_place() {
        let mut r = Roster::new("g");
        full_side(&mut r, Side::Away);
        let before = r.entries().len();
        r.substitute(&sub(4, "ignored", 7, SubstitutionType::DefensiveChange))
            .unwrap();
        assert_eq!(r.entries().len(), before);
        let cur = r.current_occupant(Side::Away, 4).unwrap();
        assert_eq!(cur.position, 7);
        assert_eq!(cur.cycle, 1);
    }

    #[test]
    fn defensive_change_needs_an_occupant() {
        let mut r = Roster::new("g");
        let err = r
            .substitute(&sub(2, "x", 5, SubstitutionType::DefensiveChange))
            .unwrap_err();
        assert!(matches!(err, ScoreError::UnknownSlot { batting_order: 2, .. }));
    }

    #[test]
    fn current_batter_falls_back_to_placeholder() {
        let r = Roster::new("g");
        let b = r.current_batter(Half::Top, 2);
        assert_eq!(b.lineup_id, "placeholder-2");
        assert_eq!(b.name, "Batter 3");
        assert_eq!(b.batting_order, 3);
    }

    #[test]
    fn current_batter_uses_latest_cycle() {
        let mut r = Roster::new("g");
        full_side(&mut r, Side::Home);
        r.substitute(&Substitution {
            side: Side::Home,
            batting_order: 1,
            player_name: "PH".into(),
            position: 8,
            entered_inning: 2,
            substitution_type: SubstitutionType::PinchHit,
        })
        .unwrap();
        let b = r.current_batter(Half::Bottom, 0);
        assert_eq!(b.name, "PH");
        assert_eq!(b.lineup_id, "g-home-1-2");
    }

    #[test]
    fn starting_lineup_validation() {
        let mut r = Roster::new("g");
        for order in 1..=8u8 {
            r.register(Side::Away, order, "p", order, true).unwrap();
        }
        assert!(r.validate_starting_lineup(Side::Away).is_err());
        r.register(Side::Away, 9, "Nine", 9, true).unwrap();
        r.register(Side::Away, BENCH_ORDER, "Bench", 1, false).unwrap();
        r.validate_starting_lineup(Side::Away).unwrap();
        assert!(r.validate_starting_lineup(Side::Home).is_err());
    }

    #[test]
    fn register_rejects_blank_names_and_bad_positions() {
        let mut r = Roster::new("g");
        assert_eq!(
            r.register(Side::Away, 1, "   ", 2, true).unwrap_err(),
            ScoreError::EmptyPlayerName
        );
        assert_eq!(
            r.register(Side::Away, 1, "A", 11, true).unwrap_err(),
            ScoreError::InvalidPosition(11)
        );
        assert_eq!(
            r.register(Side::Away, 0, "A", 1, true).unwrap_err(),
            ScoreError::InvalidBattingOrder(0)
        );
    }

    #[test]
    fn pitchers_sorted_by_entry_inning() {
        let mut r = Roster::new("g");
        full_side(&mut r, Side::Home);
        r.substitute(&Substitution {
            side: Side::Home,
            batting_order: 1,
            player_name: "Reliever".into(),
            position: PITCHER,
            entered_inning: 6,
            substitution_type: SubstitutionType::PitchingChange,
        })
        .unwrap();
        let names: Vec<&str> = r
            .pitchers_for_side(Side::Home)
            .iter()
            .map(|e| e.player_name.as_str())
            .collect();
        assert_eq!(names, vec!["home1", "Reliever"]);
        assert!(r.pitchers_for_side(Side::Away).is_empty());
    }
}
