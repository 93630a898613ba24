//! Canonical hashing of the persisted score.
//!
//! Deterministic serialization + SHA-256. Two replays of the same command
//! log must produce byte-identical output.
//!
//! Rules:
//!   - kernel_version first, then `PersistedScore` fields in declaration order
//!   - runners always present as first/second/third, null when empty
//!   - plate appearances in log order
//!   - UTF-8 JSON, no whitespace, no floats
//!
//! The pitch buffer is session-local and never hashed.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::domain::ScoreState;
use crate::error::{ScoreError, ScoreResult};
use crate::lineup::Roster;
use crate::KERNEL_VERSION;

/// Canonical UTF-8 JSON bytes of the state's persisted fields.
pub fn canonical_serialize(state: &ScoreState) -> ScoreResult<Vec<u8>> {
    let value = build_canonical_value(state, None)?;
    Ok(encode(&value)?.into_bytes())
}

/// Lowercase hex SHA-256 of `canonical_serialize`.
pub fn canonical_hash(state: &ScoreState) -> ScoreResult<String> {
    Ok(hex_digest(&canonical_serialize(state)?))
}

/// Hash of the score together with the lineup history it was scored
/// against. Substitutions change this hash even when no plate appearance
/// has been recorded since.
pub fn game_hash(state: &ScoreState, roster: &Roster) -> ScoreResult<String> {
    let value = build_canonical_value(state, Some(roster))?;
    Ok(hex_digest(encode(&value)?.as_bytes()))
}

fn hex_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn encode(value: &Value) -> ScoreResult<String> {
    serde_json::to_string(value).map_err(|e| ScoreError::Serialization(e.to_string()))
}

fn build_canonical_value(state: &ScoreState, roster: Option<&Roster>) -> ScoreResult<Value> {
    let persisted = serde_json::to_value(state.to_persisted())
        .map_err(|e| ScoreError::Serialization(e.to_string()))?;
    let Value::Object(fields) = persisted else {
        return Err(ScoreError::Serialization(
            "persisted score is not a JSON object".to_string(),
        ));
    };

    // kernel_version MUST be first.
    let mut root = Map::new();
    root.insert(
        "kernel_version".to_string(),
        Value::Number(KERNEL_VERSION.into()),
    );
    root.extend(fields);

    if let Some(roster) = roster {
        let entries = serde_json::to_value(roster.entries())
            .map_err(|e| ScoreError::Serialization(e.to_string()))?;
        root.insert("lineup".to_string(), entries);
    }

    Ok(Value::Object(root))
}
