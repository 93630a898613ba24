//! State invariant checks.
//!
//! Run after every accepted transition and on snapshot restore. Each check
//! returns the first violation it finds as `ScoreError::Invariant`.

use std::collections::BTreeSet;

use crate::domain::{Phase, ScoreState};
use crate::error::{ScoreError, ScoreResult};
use crate::transitions::{BATTERS_IN_ORDER, MAX_OUTS};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run every check, stopping at the first failure.
pub fn try_validate_invariants(state: &ScoreState) -> ScoreResult<()> {
    check_inning(state)?;
    check_outs(state)?;
    check_batter_index(state)?;
    check_pending_batter(state)?;
    check_sequence(state)?;
    check_runners(state)?;
    Ok(())
}

fn violation(name: &str, detail: String) -> ScoreError {
    ScoreError::Invariant(format!("[{name}] {detail}"))
}

// ---------------------------------------------------------------------------
// Individual checks
// ---------------------------------------------------------------------------

fn check_inning(state: &ScoreState) -> ScoreResult<()> {
    if state.current_inning == 0 {
        return Err(violation("inning", "current inning is 0".to_string()));
    }
    Ok(())
}

/// Outs stay within 0..=3 and three outs means the half is over.
fn check_outs(state: &ScoreState) -> ScoreResult<()> {
    if state.outs > MAX_OUTS {
        return Err(violation("outs", format!("{} outs recorded", state.outs)));
    }
    let at_end = state.phase == Phase::InningEnd;
    if (state.outs == MAX_OUTS) != at_end {
        return Err(violation(
            "outs",
            format!("{} outs in phase {}", state.outs, state.phase),
        ));
    }
    Ok(())
}

fn check_batter_index(state: &ScoreState) -> ScoreResult<()> {
    if state.current_batter_index >= BATTERS_IN_ORDER {
        return Err(violation(
            "batter_index",
            format!("batter index {} out of range", state.current_batter_index),
        ));
    }
    Ok(())
}

/// Pending batter fields are populated exactly while runner dispositions
/// are awaited.
fn check_pending_batter(state: &ScoreState) -> ScoreResult<()> {
    let awaiting = state.phase == Phase::RunnerAdvance;
    if awaiting != state.pending_batter_lineup_id.is_some() {
        return Err(violation(
            "pending_batter",
            format!("pending batter set = {} in phase {}", !awaiting, state.phase),
        ));
    }
    if state.pending_batter_destination.is_some() && !awaiting {
        return Err(violation(
            "pending_batter",
            format!("pending destination left over in phase {}", state.phase),
        ));
    }
    Ok(())
}

/// The counter equals the log length and the log is numbered 1..=n.
fn check_sequence(state: &ScoreState) -> ScoreResult<()> {
    let len = state.plate_appearances.len() as u64;
    if state.sequence_counter != len {
        return Err(violation(
            "sequence",
            format!(
                "sequence counter {} but {} plate appearances",
                state.sequence_counter, len
            ),
        ));
    }
    for (i, pa) in state.plate_appearances.iter().enumerate() {
        let expected = i as u64 + 1;
        if pa.sequence_in_game != expected {
            return Err(violation(
                "sequence",
                format!(
                    "plate appearance {} has sequence {}, expected {}",
                    pa.id, pa.sequence_in_game, expected
                ),
            ));
        }
    }
    Ok(())
}

fn check_runners(state: &ScoreState) -> ScoreResult<()> {
    let mut seen = BTreeSet::new();
    for (base, id) in state.runners.occupied() {
        if !seen.insert(id) {
            return Err(violation(
                "runners",
                format!("runner {id:?} occupies more than one base (seen again on {})", base.number()),
            ));
        }
    }
    Ok(())
}
