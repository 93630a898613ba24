use std::collections::BTreeMap;

use proptest::prelude::*;
use proptest::sample::select;
use strum::IntoEnumIterator;

use scorebook_engine::domain::{Phase, ScoreState};
use scorebook_engine::vocabulary::{Destination, PitchType, PlateResult};
use scorebook_engine::ScoreEngine;

// --- STRATEGIES ---

/// One operator input. Which field is used depends on the phase the game
/// is in when the step is applied.
#[derive(Debug, Clone)]
struct Step {
    pitch: PitchType,
    result: PlateResult,
    runners_score: bool,
}

prop_compose! {
    fn arb_step()(
        pitch in select(PitchType::iter().collect::<Vec<_>>()),
        result in select(PlateResult::iter().collect::<Vec<_>>()),
        runners_score in any::<bool>()
    ) -> Step {
        Step { pitch, result, runners_score }
    }
}

prop_compose! {
    fn arb_ball_or_foul()(is_ball in any::<bool>()) -> PitchType {
        if is_ball { PitchType::Ball } else { PitchType::Foul }
    }
}

/// Apply the phase-appropriate command for `step`. Every command built
/// here is legal, so rejection is a test failure.
fn drive(engine: &mut ScoreEngine, step: &Step) {
    match engine.state().phase {
        Phase::Pitching => {
            engine.record_pitch(step.pitch).unwrap();
        }
        Phase::Result => {
            engine.record_result(step.result).unwrap();
        }
        Phase::RunnerAdvance => {
            let to = if step.runners_score {
                Destination::Home
            } else {
                Destination::Out
            };
            let destinations: BTreeMap<String, Destination> = engine
                .state()
                .runners
                .occupied()
                .into_iter()
                .map(|(_, id)| (id.to_string(), to))
                .collect();
            engine.confirm_runners(destinations).unwrap();
        }
        Phase::InningEnd => {
            engine.advance_inning().unwrap();
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn random_games_keep_state_consistent(steps in proptest::collection::vec(arb_step(), 0..200)) {
        let mut engine = ScoreEngine::with_defaults("p");
        for step in &steps {
            let before = engine.state().plate_appearances.len();
            let foul_pitch = engine.state().phase == Phase::Pitching && step.pitch == PitchType::Foul;
            drive(&mut engine, step);

            let s = engine.state();
            prop_assert!(s.outs <= 3);
            prop_assert!(s.current_batter_index < 9);
            prop_assert_eq!(s.sequence_counter as usize, s.plate_appearances.len());
            if foul_pitch {
                prop_assert_eq!(s.plate_appearances.len(), before, "a foul ended a plate appearance");
            }
        }
        for (i, pa) in engine.plate_appearances().iter().enumerate() {
            prop_assert_eq!(pa.sequence_in_game, i as u64 + 1);
            prop_assert_eq!(&pa.id, &format!("p-pa-{}", i + 1));
        }
    }

    #[test]
    fn undo_then_redo_is_identity(steps in proptest::collection::vec(arb_step(), 1..40)) {
        let mut engine = ScoreEngine::with_defaults("p");
        let mut history: Vec<ScoreState> = vec![engine.state().clone()];
        for step in &steps {
            drive(&mut engine, step);
            history.push(engine.state().clone());
        }

        for expected in history.iter().rev().skip(1) {
            prop_assert!(engine.undo());
            prop_assert_eq!(engine.state(), expected);
        }
        prop_assert!(!engine.undo());

        for expected in history.iter().skip(1) {
            prop_assert!(engine.redo());
            prop_assert_eq!(engine.state(), expected);
        }
        prop_assert!(!engine.redo());
    }

    #[test]
    fn fourth_ball_is_always_a_walk(pitches in proptest::collection::vec(arb_ball_or_foul(), 0..30)) {
        let mut engine = ScoreEngine::with_defaults("p");
        let mut balls = 0;
        for pitch in pitches {
            engine.record_pitch(pitch).unwrap();
            if pitch == PitchType::Ball {
                balls += 1;
            }
            let pas = engine.plate_appearances();
            prop_assert_eq!(pas.len(), balls / 4);
            prop_assert!(pas.iter().all(|pa| pa.result == PlateResult::Walk));
            prop_assert!(engine.display_count().strikes <= 2);
        }
    }
}
