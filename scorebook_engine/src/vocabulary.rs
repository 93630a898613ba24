//! Closed vocabularies: pitch calls, plate-appearance results, sides,
//! bases and substitution kinds.
//!
//! Pure data plus fixed classification tables. Every membership question
//! (is it a hit, an out, where does the batter go) is answered here and
//! nowhere else.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

// ---------------------------------------------------------------------------
// Pitches
// ---------------------------------------------------------------------------

/// A single umpire call on a pitch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PitchType {
    Ball,
    StrikeSwinging,
    StrikeLooking,
    Foul,
    InPlay,
    Hbp,
}

impl PitchType {
    /// Swinging or looking strike. Fouls are handled separately.
    pub fn is_called_or_swinging_strike(self) -> bool {
        matches!(self, PitchType::StrikeSwinging | PitchType::StrikeLooking)
    }
}

// ---------------------------------------------------------------------------
// Plate-appearance results
// ---------------------------------------------------------------------------

/// How a plate appearance ended. Closed set; no exotic rulings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PlateResult {
    Single,
    Double,
    Triple,
    HomeRun,
    Groundout,
    Flyout,
    Lineout,
    StrikeoutSwinging,
    StrikeoutLooking,
    SacrificeBunt,
    SacrificeFly,
    Walk,
    HitByPitch,
    FieldersChoice,
    ReachedOnError,
    DoublePlay,
    DroppedThirdStrike,
}

impl PlateResult {
    pub fn is_hit(self) -> bool {
        matches!(
            self,
            PlateResult::Single | PlateResult::Double | PlateResult::Triple | PlateResult::HomeRun
        )
    }

    /// Out-classified results. Fielder's choice and error are in the set
    /// (an out is charged on the play); a dropped third strike is not.
    pub fn is_out(self) -> bool {
        matches!(
            self,
            PlateResult::Groundout
                | PlateResult::Flyout
                | PlateResult::Lineout
                | PlateResult::StrikeoutSwinging
                | PlateResult::StrikeoutLooking
                | PlateResult::SacrificeBunt
                | PlateResult::SacrificeFly
                | PlateResult::FieldersChoice
                | PlateResult::ReachedOnError
                | PlateResult::DoublePlay
        )
    }

    pub fn is_double_play(self) -> bool {
        matches!(self, PlateResult::DoublePlay)
    }

    pub fn is_strikeout(self) -> bool {
        matches!(
            self,
            PlateResult::StrikeoutSwinging | PlateResult::StrikeoutLooking
        )
    }

    /// Outs charged by the result itself, before any runner dispositions.
    pub fn outs_recorded(self) -> u8 {
        if self.is_double_play() {
            2
        } else if self.is_out() {
            1
        } else {
            0
        }
    }

    /// Walks, HBP and sacrifices are plate appearances but not at-bats.
    pub fn counts_as_at_bat(self) -> bool {
        !matches!(
            self,
            PlateResult::Walk
                | PlateResult::HitByPitch
                | PlateResult::SacrificeBunt
                | PlateResult::SacrificeFly
        )
    }

    /// Bases credited for slugging: 1..=4 for hits, 0 otherwise.
    pub fn total_bases(self) -> u32 {
        match self {
            PlateResult::Single => 1,
            PlateResult::Double => 2,
            PlateResult::Triple => 3,
            PlateResult::HomeRun => 4,
            _ => 0,
        }
    }

    /// Nominal destination of the batter. `None` means the batter is out.
    pub fn batter_destination(self) -> Option<Destination> {
        match self {
            PlateResult::Single
            | PlateResult::ReachedOnError
            | PlateResult::FieldersChoice
            | PlateResult::DroppedThirdStrike
            | PlateResult::Walk
            | PlateResult::HitByPitch => Some(Destination::First),
            PlateResult::Double => Some(Destination::Second),
            PlateResult::Triple => Some(Destination::Third),
            PlateResult::HomeRun => Some(Destination::Home),
            PlateResult::Groundout
            | PlateResult::Flyout
            | PlateResult::Lineout
            | PlateResult::StrikeoutSwinging
            | PlateResult::StrikeoutLooking
            | PlateResult::SacrificeBunt
            | PlateResult::SacrificeFly
            | PlateResult::DoublePlay => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Sides and halves
// ---------------------------------------------------------------------------

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Half {
    Top,
    Bottom,
}

impl Half {
    /// The side at bat in this half: visitors bat in the top.
    pub fn batting_side(self) -> Side {
        match self {
            Half::Top => Side::Away,
            Half::Bottom => Side::Home,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    /// The half-inning in which this side bats.
    pub fn batting_half(self) -> Half {
        match self {
            Side::Away => Half::Top,
            Side::Home => Half::Bottom,
        }
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

// ---------------------------------------------------------------------------
// Bases
// ---------------------------------------------------------------------------

/// An occupiable base.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum Base {
    First,
    Second,
    Third,
}

impl Base {
    pub const ALL: [Base; 3] = [Base::First, Base::Second, Base::Third];

    pub fn number(self) -> u8 {
        match self {
            Base::First => 1,
            Base::Second => 2,
            Base::Third => 3,
        }
    }
}

/// Where a batter or runner ends up after a play.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Destination {
    First,
    Second,
    Third,
    Home,
    Out,
}

impl Destination {
    /// The base this destination occupies, if any.
    pub fn base(self) -> Option<Base> {
        match self {
            Destination::First => Some(Base::First),
            Destination::Second => Some(Base::Second),
            Destination::Third => Some(Base::Third),
            Destination::Home | Destination::Out => None,
        }
    }

    /// 1..=3 for bases, 4 for home, 0 for an out.
    pub fn number(self) -> u8 {
        match self {
            Destination::First => 1,
            Destination::Second => 2,
            Destination::Third => 3,
            Destination::Home => 4,
            Destination::Out => 0,
        }
    }
}

impl From<Base> for Destination {
    fn from(base: Base) -> Self {
        match base {
            Base::First => Destination::First,
            Base::Second => Destination::Second,
            Base::Third => Destination::Third,
        }
    }
}

// ---------------------------------------------------------------------------
// Substitutions
// ---------------------------------------------------------------------------

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SubstitutionType {
    PinchHit,
    PinchRun,
    /// Position swap only: mutates the current occupant, no new cycle.
    DefensiveChange,
    PitchingChange,
}

/// 1=P 2=C 3=1B 4=2B 5=3B 6=SS 7=LF 8=CF 9=RF 10=DH.
pub type FieldingPosition = u8;

pub const PITCHER: FieldingPosition = 1;
pub const DESIGNATED_HITTER: FieldingPosition = 10;

/// Batting order used for pre-registered bench players.
pub const BENCH_ORDER: u8 = 10;

pub fn is_valid_position(position: FieldingPosition) -> bool {
    (PITCHER..=DESIGNATED_HITTER).contains(&position)
}

/// Short scoresheet abbreviation for a fielding position.
pub fn position_label(position: FieldingPosition) -> &'static str {
    match position {
        1 => "P",
        2 => "C",
        3 => "1B",
        4 => "2B",
        5 => "3B",
        6 => "SS",
        7 => "LF",
        8 => "CF",
        9 => "RF",
        10 => "DH",
        _ => "?",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    #[rstest]
    #[case(PlateResult::Single, Some(Destination::First))]
    #[case(PlateResult::Double, Some(Destination::Second))]
    #[case(PlateResult::Triple, Some(Destination::Third))]
    #[case(PlateResult::HomeRun, Some(Destination::Home))]
    #[case(PlateResult::ReachedOnError, Some(Destination::First))]
    #[case(PlateResult::FieldersChoice, Some(Destination::First))]
    #[case(PlateResult::DroppedThirdStrike, Some(Destination::First))]
    #[case(PlateResult::Walk, Some(Destination::First))]
    #[case(PlateResult::HitByPitch, Some(Destination::First))]
    #[case(PlateResult::Groundout, None)]
    #[case(PlateResult::SacrificeFly, None)]
    #[case(PlateResult::DoublePlay, None)]
    #[case(PlateResult::StrikeoutLooking, None)]
    fn batter_destination_table(#[case] result: PlateResult, #[case] expected: Option<Destination>) {
        assert_eq!(result.batter_destination(), expected);
    }

    #[test]
    fn only_double_play_records_two_outs() {
        for r in PlateResult::iter() {
            let expected = if r == PlateResult::DoublePlay {
                2
            } else if r.is_out() {
                1
            } else {
                0
            };
            assert_eq!(r.outs_recorded(), expected, "{r}");
        }
    }

    #[test]
    fn hits_are_never_outs() {
        for r in PlateResult::iter().filter(|r| r.is_hit()) {
            assert!(!r.is_out());
            assert!(r.counts_as_at_bat());
            assert!(r.total_bases() > 0);
        }
    }

    #[test]
    fn dropped_third_strike_is_not_an_out() {
        assert!(!PlateResult::DroppedThirdStrike.is_out());
        assert!(!PlateResult::DroppedThirdStrike.is_strikeout());
    }

    #[test]
    fn sides_bat_in_opposite_halves() {
        assert_eq!(Side::Away.batting_half(), Half::Top);
        assert_eq!(Half::Bottom.batting_side(), Side::Home);
        assert_eq!(Side::Home.opponent().batting_half(), Half::Top);
    }

    #[test]
    fn serde_names_are_snake_case() {
        let json = serde_json::to_string(&PlateResult::DroppedThirdStrike).unwrap();
        assert_eq!(json, "\"dropped_third_strike\"");
        let back: PitchType = serde_json::from_str("\"strike_looking\"").unwrap();
        assert_eq!(back, PitchType::StrikeLooking);
        assert_eq!(SubstitutionType::PinchHit.to_string(), "pinch_hit");
    }
}
