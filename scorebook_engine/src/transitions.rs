//! Centralized transition logic.
//!
//! ALL scoring-state mutation lives here. Every handler works on a clone
//! of the incoming state, so a rejected event leaves the caller's state
//! untouched.

use std::collections::BTreeMap;

use crate::count::{count_balls, count_strikes, BALLS_FOR_WALK, STRIKES_FOR_STRIKEOUT};
use crate::domain::{
    BatterRef, Phase, PitchCall, PlateAppearance, Runners, ScoreState, TransitionResult,
};
use crate::error::{ScoreError, ScoreResult};
use crate::events::ScoreEvent;
use crate::vocabulary::{Base, Destination, Half, PitchType, PlateResult};

pub const MAX_OUTS: u8 = 3;
pub const BATTERS_IN_ORDER: u8 = 9;

// ---------------------------------------------------------------------------
// Public dispatcher
// ---------------------------------------------------------------------------

/// Apply `event` to `state` and return `(new_state, result)`.
pub fn apply_event(
    state: &ScoreState,
    event: &ScoreEvent,
) -> ScoreResult<(ScoreState, TransitionResult)> {
    let mut new_state = state.clone();

    let result = match event {
        ScoreEvent::RecordPitch { pitch, batter } => {
            apply_record_pitch(&mut new_state, *pitch, batter)?
        }
        ScoreEvent::RecordResult { result, batter } => {
            apply_record_result(&mut new_state, *result, batter)?
        }
        ScoreEvent::ConfirmRunners { destinations } => {
            apply_confirm_runners(&mut new_state, destinations)?
        }
        ScoreEvent::AdvanceInning => apply_advance_inning(&mut new_state)?,
    };

    Ok((new_state, result))
}

/// Move runners for a walk or hit-by-pitch and put the batter on first.
/// Only forced runners move. Returns the number of runs forced in.
pub fn force_advance(runners: &mut Runners, batter_lineup_id: &str) -> u32 {
    let mut runs = 0;
    if runners.is_occupied(Base::First) {
        if runners.is_occupied(Base::Second) {
            if runners.take(Base::Third).is_some() {
                runs += 1;
            }
            let from_second = runners.take(Base::Second);
            runners.set(Base::Third, from_second);
        }
        let from_first = runners.take(Base::First);
        runners.set(Base::Second, from_first);
    }
    runners.set(Base::First, Some(batter_lineup_id.to_string()));
    runs
}

// ---------------------------------------------------------------------------
// Individual transition handlers (private)
// ---------------------------------------------------------------------------

fn apply_record_pitch(
    state: &mut ScoreState,
    pitch: PitchType,
    batter: &BatterRef,
) -> ScoreResult<TransitionResult> {
    require_phase(state, Phase::Pitching, "record_pitch")?;

    state.pitches.push(PitchCall {
        sequence: state.pitches.len() as u32 + 1,
        kind: pitch,
    });
    let strikes = count_strikes(&state.pitches);
    let balls = count_balls(&state.pitches);

    let mut out = TransitionResult::new("record_pitch", Phase::Pitching);

    if strikes >= STRIKES_FOR_STRIKEOUT && pitch != PitchType::Foul {
        let result = if pitch == PitchType::StrikeLooking {
            PlateResult::StrikeoutLooking
        } else {
            PlateResult::StrikeoutSwinging
        };
        out.plate_appearance = Some(confirm_plate_appearance(state, result, batter));
        out.outs_added = add_outs(state, 1);
        if state.outs >= MAX_OUTS {
            // Pitch buffer stays for display until the half-inning turns.
            state.phase = Phase::InningEnd;
        } else {
            finish_batter(state);
        }
    } else if balls >= BALLS_FOR_WALK || pitch == PitchType::Hbp {
        let result = if balls >= BALLS_FOR_WALK {
            PlateResult::Walk
        } else {
            PlateResult::HitByPitch
        };
        out.plate_appearance = Some(confirm_plate_appearance(state, result, batter));
        let runs = force_advance(&mut state.runners, &batter.lineup_id);
        credit_runs(state, runs);
        out.runs_scored = runs;
        finish_batter(state);
    } else if pitch == PitchType::InPlay {
        state.phase = Phase::Result;
    }

    out.phase = state.phase;
    Ok(out)
}

fn apply_record_result(
    state: &mut ScoreState,
    result: PlateResult,
    batter: &BatterRef,
) -> ScoreResult<TransitionResult> {
    require_phase(state, Phase::Result, "record_result")?;

    let mut out = TransitionResult::new("record_result", Phase::Result);
    out.plate_appearance = Some(confirm_plate_appearance(state, result, batter));
    out.outs_added = add_outs(state, result.outs_recorded());

    if state.outs >= MAX_OUTS {
        // Half-inning over: runner bookkeeping is skipped entirely.
        state.phase = Phase::InningEnd;
    } else {
        let destination = result.batter_destination();
        state.pitches.clear();
        if destination.is_some() || !state.runners.is_empty() {
            state.phase = Phase::RunnerAdvance;
            state.pending_batter_lineup_id = Some(batter.lineup_id.clone());
            state.pending_batter_destination = destination;
        } else {
            finish_batter(state);
        }
    }

    out.phase = state.phase;
    Ok(out)
}

fn apply_confirm_runners(
    state: &mut ScoreState,
    destinations: &BTreeMap<String, Destination>,
) -> ScoreResult<TransitionResult> {
    require_phase(state, Phase::RunnerAdvance, "confirm_runners")?;

    let batter_id = state.pending_batter_lineup_id.clone().ok_or_else(|| {
        ScoreError::Invariant("runner_advance phase without a pending batter".to_string())
    })?;
    let batter_destination = state.pending_batter_destination;

    let on_base: Vec<(Base, String)> = state
        .runners
        .occupied()
        .into_iter()
        .map(|(b, id)| (b, id.to_string()))
        .collect();
    validate_destinations(&on_base, batter_destination, destinations)?;

    let mut out = TransitionResult::new("confirm_runners", Phase::RunnerAdvance);
    let mut next = Runners::default();
    let mut runs = 0;

    match batter_destination {
        Some(Destination::Home) => runs += 1,
        Some(dest) => {
            if let Some(base) = dest.base() {
                next.set(base, Some(batter_id));
            }
        }
        None => {}
    }

    for (_, lineup_id) in on_base {
        // Presence checked by validate_destinations.
        let Some(dest) = destinations.get(&lineup_id) else {
            continue;
        };
        match dest {
            Destination::Out => out.outs_added += add_outs(state, 1),
            Destination::Home => runs += 1,
            other => {
                if let Some(base) = other.base() {
                    next.set(base, Some(lineup_id));
                }
            }
        }
    }

    state.runners = next;
    credit_runs(state, runs);
    out.runs_scored = runs;
    state.pending_batter_lineup_id = None;
    state.pending_batter_destination = None;

    if state.outs >= MAX_OUTS {
        state.phase = Phase::InningEnd;
    } else {
        finish_batter(state);
    }

    out.phase = state.phase;
    Ok(out)
}

fn apply_advance_inning(state: &mut ScoreState) -> ScoreResult<TransitionResult> {
    require_phase(state, Phase::InningEnd, "advance_inning")?;

    match state.current_half {
        Half::Top => state.current_half = Half::Bottom,
        Half::Bottom => {
            state.current_half = Half::Top;
            state.current_inning += 1;
        }
    }
    // Each half starts from the top of the order.
    state.current_batter_index = 0;
    state.outs = 0;
    state.runners = Runners::default();
    state.pitches.clear();
    state.pending_batter_lineup_id = None;
    state.pending_batter_destination = None;
    state.phase = Phase::Pitching;

    Ok(TransitionResult::new("advance_inning", Phase::Pitching))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn require_phase(state: &ScoreState, expected: Phase, command: &'static str) -> ScoreResult<()> {
    if state.phase != expected {
        return Err(ScoreError::WrongPhase {
            command,
            phase: state.phase,
        });
    }
    Ok(())
}

/// Append a plate appearance built from the current pitch buffer.
fn confirm_plate_appearance(
    state: &mut ScoreState,
    result: PlateResult,
    batter: &BatterRef,
) -> PlateAppearance {
    let sequence = state.sequence_counter + 1;
    let pa = PlateAppearance {
        id: format!("{}-pa-{}", state.game_id, sequence),
        game_id: state.game_id.clone(),
        inning: state.current_inning,
        half: state.current_half,
        batter_lineup_id: batter.lineup_id.clone(),
        batter_name: batter.name.clone(),
        batting_order: batter.batting_order,
        result,
        pitch_count: state.pitches.len() as u32,
        pitches: state.pitches.clone(),
        sequence_in_game: sequence,
    };
    state.sequence_counter = sequence;
    state.plate_appearances.push(pa.clone());
    pa
}

/// Add outs capped at three; returns how many were actually added.
fn add_outs(state: &mut ScoreState, n: u8) -> u8 {
    let before = state.outs;
    state.outs = (state.outs + n).min(MAX_OUTS);
    state.outs - before
}

fn credit_runs(state: &mut ScoreState, runs: u32) {
    match state.current_half {
        Half::Top => state.away_score += runs,
        Half::Bottom => state.home_score += runs,
    }
}

/// Clear the pitch buffer and bring up the next batter.
fn finish_batter(state: &mut ScoreState) {
    state.pitches.clear();
    state.current_batter_index = (state.current_batter_index + 1) % BATTERS_IN_ORDER;
    state.phase = Phase::Pitching;
}

/// Every runner on base needs exactly one disposition, only runners on
/// base may appear, and no base may end up with two occupants.
fn validate_destinations(
    on_base: &[(Base, String)],
    batter_destination: Option<Destination>,
    destinations: &BTreeMap<String, Destination>,
) -> ScoreResult<()> {
    for (base, lineup_id) in on_base {
        if !destinations.contains_key(lineup_id) {
            return Err(ScoreError::MissingDisposition {
                lineup_id: lineup_id.clone(),
                base: base.number(),
            });
        }
    }
    for lineup_id in destinations.keys() {
        if !on_base.iter().any(|(_, id)| id == lineup_id) {
            return Err(ScoreError::UnknownRunner(lineup_id.clone()));
        }
    }

    let mut taken: Vec<Base> = batter_destination.and_then(|d| d.base()).into_iter().collect();
    for dest in destinations.values() {
        if let Some(base) = dest.base() {
            if taken.contains(&base) {
                return Err(ScoreError::BaseCollision(base.number()));
            }
            taken.push(base);
        }
    }
    Ok(())
}
