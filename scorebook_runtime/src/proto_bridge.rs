//! Proto ↔ kernel conversion bridge.
//!
//! Converts between the protobuf wire types (proto_types.rs) and the
//! kernel's `EventEnvelope`. Encoding is total; decoding rejects frames
//! with a missing command, unknown vocabulary names or out-of-range
//! numbers, since those can only come from a damaged or foreign log.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use scorebook_engine::domain::BatterRef;
use scorebook_engine::events::{EventEnvelope, GameCommand, ScoreEvent, Substitution};

use crate::error::{RuntimeError, RuntimeResult};
use crate::proto_types::*;

/// Convert a kernel envelope to its protobuf form for the append-only log.
pub fn command_to_proto(envelope: &EventEnvelope) -> ProtoCommandEnvelope {
    let kind = match &envelope.command {
        GameCommand::Score(ScoreEvent::RecordPitch { pitch, batter }) => {
            CommandKind::RecordPitch(RecordPitch {
                pitch: pitch.to_string(),
                batter: Some(batter_to_proto(batter)),
            })
        }
        GameCommand::Score(ScoreEvent::RecordResult { result, batter }) => {
            CommandKind::RecordResult(RecordResult {
                result: result.to_string(),
                batter: Some(batter_to_proto(batter)),
            })
        }
        GameCommand::Score(ScoreEvent::ConfirmRunners { destinations }) => {
            CommandKind::ConfirmRunners(ConfirmRunners {
                moves: destinations
                    .iter()
                    .map(|(lineup_id, dest)| RunnerMove {
                        lineup_id: lineup_id.clone(),
                        destination: dest.to_string(),
                    })
                    .collect(),
            })
        }
        GameCommand::Score(ScoreEvent::AdvanceInning) => CommandKind::AdvanceInning(AdvanceInning {}),
        GameCommand::Undo => CommandKind::Undo(Undo {}),
        GameCommand::Redo => CommandKind::Redo(Redo {}),
        GameCommand::Substitute(sub) => CommandKind::Substitute(Substitute {
            side: sub.side.to_string(),
            batting_order: u32::from(sub.batting_order),
            player_name: sub.player_name.clone(),
            position: u32::from(sub.position),
            entered_inning: sub.entered_inning,
            substitution_type: sub.substitution_type.to_string(),
        }),
    };

    ProtoCommandEnvelope {
        sequence: envelope.sequence,
        command: Some(ProtoCommand { kind: Some(kind) }),
    }
}

/// Convert a protobuf frame back to the kernel's envelope.
pub fn proto_to_command(proto: &ProtoCommandEnvelope) -> RuntimeResult<EventEnvelope> {
    let sequence = proto.sequence;
    let malformed = |reason: String| RuntimeError::MalformedCommand { sequence, reason };

    let kind = proto
        .command
        .as_ref()
        .and_then(|c| c.kind.as_ref())
        .ok_or_else(|| malformed("frame carries no command".to_string()))?;

    let command = match kind {
        CommandKind::RecordPitch(rp) => GameCommand::Score(ScoreEvent::RecordPitch {
            pitch: parse_name(sequence, "pitch", &rp.pitch)?,
            batter: batter_from_proto(sequence, rp.batter.as_ref())?,
        }),
        CommandKind::RecordResult(rr) => GameCommand::Score(ScoreEvent::RecordResult {
            result: parse_name(sequence, "result", &rr.result)?,
            batter: batter_from_proto(sequence, rr.batter.as_ref())?,
        }),
        CommandKind::ConfirmRunners(cr) => {
            let mut destinations = BTreeMap::new();
            for m in &cr.moves {
                let dest = parse_name(sequence, "destination", &m.destination)?;
                if destinations.insert(m.lineup_id.clone(), dest).is_some() {
                    return Err(malformed(format!("runner {} listed twice", m.lineup_id)));
                }
            }
            GameCommand::Score(ScoreEvent::ConfirmRunners { destinations })
        }
        CommandKind::AdvanceInning(_) => GameCommand::Score(ScoreEvent::AdvanceInning),
        CommandKind::Undo(_) => GameCommand::Undo,
        CommandKind::Redo(_) => GameCommand::Redo,
        CommandKind::Substitute(s) => GameCommand::Substitute(Substitution {
            side: parse_name(sequence, "side", &s.side)?,
            batting_order: narrow(sequence, "batting_order", s.batting_order)?,
            player_name: s.player_name.clone(),
            position: narrow(sequence, "position", s.position)?,
            entered_inning: s.entered_inning,
            substitution_type: parse_name(sequence, "substitution_type", &s.substitution_type)?,
        }),
    };

    Ok(EventEnvelope { sequence, command })
}

fn batter_to_proto(batter: &BatterRef) -> ProtoBatter {
    ProtoBatter {
        lineup_id: batter.lineup_id.clone(),
        name: batter.name.clone(),
        batting_order: u32::from(batter.batting_order),
    }
}

fn batter_from_proto(sequence: u64, batter: Option<&ProtoBatter>) -> RuntimeResult<BatterRef> {
    let b = batter.ok_or_else(|| RuntimeError::MalformedCommand {
        sequence,
        reason: "missing batter".to_string(),
    })?;
    Ok(BatterRef::new(
        b.lineup_id.clone(),
        b.name.clone(),
        narrow(sequence, "batting_order", b.batting_order)?,
    ))
}

fn parse_name<T>(sequence: u64, field: &str, value: &str) -> RuntimeResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse().map_err(|e| RuntimeError::MalformedCommand {
        sequence,
        reason: format!("{field} {value:?}: {e}"),
    })
}

fn narrow(sequence: u64, field: &str, value: u32) -> RuntimeResult<u8> {
    u8::try_from(value).map_err(|_| RuntimeError::MalformedCommand {
        sequence,
        reason: format!("{field} {value} out of range"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;
    use rstest::rstest;
    use scorebook_engine::vocabulary::{
        Destination, PitchType, PlateResult, Side, SubstitutionType,
    };

    fn every_command() -> Vec<GameCommand> {
        let batter = BatterRef::new("g-away-3-1", "Ito", 3);
        let mut destinations = BTreeMap::new();
        destinations.insert("g-away-1-1".to_string(), Destination::Home);
        destinations.insert("g-away-2-1".to_string(), Destination::Out);
        vec![
            ScoreEvent::RecordPitch {
                pitch: PitchType::StrikeLooking,
                batter: batter.clone(),
            }
            .into(),
            ScoreEvent::RecordResult {
                result: PlateResult::DroppedThirdStrike,
                batter,
            }
            .into(),
            ScoreEvent::ConfirmRunners { destinations }.into(),
            ScoreEvent::AdvanceInning.into(),
            GameCommand::Undo,
            GameCommand::Redo,
            GameCommand::Substitute(Substitution {
                side: Side::Home,
                batting_order: 9,
                player_name: "Closer".into(),
                position: 1,
                entered_inning: 9,
                substitution_type: SubstitutionType::PitchingChange,
            }),
        ]
    }

    #[test]
    fn every_command_survives_the_wire() {
        for (i, command) in every_command().into_iter().enumerate() {
            let env = EventEnvelope::new(i as u64 + 1, command);
            let bytes = command_to_proto(&env).encode_to_vec();
            let decoded = ProtoCommandEnvelope::decode(bytes.as_slice()).unwrap();
            assert_eq!(proto_to_command(&decoded).unwrap(), env);
        }
    }

    #[test]
    fn vocabulary_travels_as_snake_case() {
        let env = EventEnvelope::new(1, every_command().remove(0));
        match command_to_proto(&env).command.and_then(|c| c.kind) {
            Some(CommandKind::RecordPitch(rp)) => assert_eq!(rp.pitch, "strike_looking"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_frame_is_rejected() {
        let proto = ProtoCommandEnvelope {
            sequence: 4,
            command: None,
        };
        let err = proto_to_command(&proto).unwrap_err();
        assert!(matches!(err, RuntimeError::MalformedCommand { sequence: 4, .. }));
    }

    fn substitute(side: &str, batting_order: u32, substitution_type: &str) -> CommandKind {
        CommandKind::Substitute(Substitute {
            side: side.into(),
            batting_order,
            player_name: "X".into(),
            position: 1,
            entered_inning: 1,
            substitution_type: substitution_type.into(),
        })
    }

    #[rstest]
    #[case::unknown_pitch(CommandKind::RecordPitch(RecordPitch {
        pitch: "balk".into(),
        batter: Some(ProtoBatter::default()),
    }))]
    #[case::missing_batter(CommandKind::RecordResult(RecordResult {
        result: "single".into(),
        batter: None,
    }))]
    #[case::unknown_destination(CommandKind::ConfirmRunners(ConfirmRunners {
        moves: vec![RunnerMove { lineup_id: "a".into(), destination: "fourth".into() }],
    }))]
    #[case::duplicate_runner(CommandKind::ConfirmRunners(ConfirmRunners {
        moves: vec![
            RunnerMove { lineup_id: "a".into(), destination: "home".into() },
            RunnerMove { lineup_id: "a".into(), destination: "out".into() },
        ],
    }))]
    #[case::oversized_batting_order(substitute("home", 300, "pinch_hit"))]
    #[case::unknown_side(substitute("visitors", 1, "pinch_hit"))]
    #[case::unknown_substitution(substitute("home", 1, "double_switch"))]
    fn malformed_frames_are_rejected(#[case] kind: CommandKind) {
        let proto = ProtoCommandEnvelope {
            sequence: 2,
            command: Some(ProtoCommand { kind: Some(kind) }),
        };
        assert!(matches!(
            proto_to_command(&proto),
            Err(RuntimeError::MalformedCommand { sequence: 2, .. })
        ));
    }
}
