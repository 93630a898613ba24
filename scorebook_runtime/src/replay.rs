//! Replay orchestrator: rebuild a game from its command log.
//!
//! All scoring logic is delegated to the kernel engine. Replay feeds the
//! logged commands back through `apply_command` in order; undo, redo and
//! substitutions are ordinary log entries, so the rebuilt engine carries
//! the same undo stacks and lineup history as the live one.

use tracing::{debug, instrument};

use scorebook_engine::config::EngineConfig;
use scorebook_engine::events::EventEnvelope;
use scorebook_engine::hashing::game_hash;
use scorebook_engine::lineup::Roster;
use scorebook_engine::ScoreEngine;

use crate::error::{RuntimeError, RuntimeResult};

/// Apply `commands` to `engine`, which must be fresh or positioned just
/// before the first command. `checkpoint` sees the engine after every
/// command, which is how the session re-derives snapshot hashes.
pub fn replay_commands<F>(
    engine: &mut ScoreEngine,
    commands: &[EventEnvelope],
    mut checkpoint: F,
) -> RuntimeResult<()>
where
    F: FnMut(u64, &ScoreEngine) -> RuntimeResult<()>,
{
    let Some(first) = commands.first() else {
        return Ok(());
    };
    let mut expected = first.sequence;
    for env in commands {
        if env.sequence != expected {
            return Err(RuntimeError::Sequence {
                expected,
                got: env.sequence,
            });
        }
        engine.apply_command(&env.command)?;
        checkpoint(env.sequence, &*engine)?;
        expected += 1;
    }
    Ok(())
}

/// Build a fresh engine for `roster` and fold the whole log into it.
/// The log must start at sequence 1.
#[instrument(skip(roster, config, commands), fields(commands = commands.len()))]
pub fn rebuild_engine(
    game_id: &str,
    roster: Roster,
    config: EngineConfig,
    commands: &[EventEnvelope],
) -> RuntimeResult<ScoreEngine> {
    if let Some(first) = commands.first() {
        if first.sequence != 1 {
            return Err(RuntimeError::Sequence {
                expected: 1,
                got: first.sequence,
            });
        }
    }
    let mut engine = ScoreEngine::new(game_id, roster, config)?;
    replay_commands(&mut engine, commands, |_, _| Ok(()))?;
    debug!(
        plate_appearances = engine.plate_appearances().len(),
        "replay complete"
    );
    Ok(engine)
}

/// Rebuild and return only the game hash (score plus lineup history).
pub fn rebuild_hash(
    game_id: &str,
    roster: &Roster,
    config: &EngineConfig,
    commands: &[EventEnvelope],
) -> RuntimeResult<String> {
    let engine = rebuild_engine(game_id, roster.clone(), config.clone(), commands)?;
    Ok(game_hash(engine.state(), engine.roster())?)
}

/// Replay the same log twice and require identical hashes.
pub fn verify_determinism(
    game_id: &str,
    roster: &Roster,
    config: &EngineConfig,
    commands: &[EventEnvelope],
) -> RuntimeResult<String> {
    let first = rebuild_hash(game_id, roster, config, commands)?;
    let second = rebuild_hash(game_id, roster, config, commands)?;
    if first != second {
        return Err(RuntimeError::Determinism { first, second });
    }
    Ok(first)
}
