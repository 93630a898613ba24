//! Snapshot layer: deterministic score snapshots.
//!
//! A snapshot holds the canonical JSON of the persisted score plus its
//! SHA-256. No timestamps in snapshot content. The command log stays the
//! source of truth; a snapshot that disagrees with replay is reported and
//! ignored.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

use scorebook_engine::domain::{PersistedScore, ScoreState};
use scorebook_engine::hashing::{canonical_hash, canonical_serialize};
use scorebook_engine::invariants::try_validate_invariants;
use scorebook_engine::{ScoreError, KERNEL_VERSION};

use crate::error::{RuntimeError, RuntimeResult};

/// Snapshot on-disk format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Sequence number of the last command folded into this snapshot.
    pub sequence: u64,
    /// Canonical JSON of the persisted score (UTF-8).
    pub canonical_json: String,
    /// SHA-256 of the canonical JSON.
    pub hash: String,
    pub kernel_version: u32,
}

fn snapshot_path(dir: &Path, sequence: u64) -> PathBuf {
    dir.join(format!("snapshot_{:06}.json", sequence))
}

/// Build a snapshot of `state` in memory.
pub fn encode_snapshot(sequence: u64, state: &ScoreState) -> RuntimeResult<Snapshot> {
    let canonical_json = String::from_utf8(canonical_serialize(state)?)
        .map_err(|e| ScoreError::Serialization(e.to_string()))?;
    Ok(Snapshot {
        sequence,
        canonical_json,
        hash: canonical_hash(state)?,
        kernel_version: KERNEL_VERSION,
    })
}

/// Save a deterministic snapshot of the current state.
pub fn save_snapshot(dir: &Path, sequence: u64, state: &ScoreState) -> RuntimeResult<PathBuf> {
    fs::create_dir_all(dir)?;

    let snap = encode_snapshot(sequence, state)?;
    let path = snapshot_path(dir, sequence);
    let content = serde_json::to_string(&snap)?;

    let mut file = File::create(&path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;

    debug!(sequence, hash = %snap.hash, "snapshot written");
    Ok(path)
}

/// Load a snapshot at a specific sequence number.
/// Returns None if no snapshot exists at that sequence.
pub fn load_snapshot(dir: &Path, sequence: u64) -> RuntimeResult<Option<Snapshot>> {
    let path = snapshot_path(dir, sequence);
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

/// Load the latest snapshot in a directory.
/// Scans for snapshot_NNNNNN.json files and returns the highest sequence.
pub fn load_latest_snapshot(dir: &Path) -> RuntimeResult<Option<Snapshot>> {
    if !dir.exists() {
        return Ok(None);
    }

    let mut best_seq: Option<u64> = None;
    for entry in fs::read_dir(dir)? {
        let name = entry?.file_name();
        let seq = name
            .to_string_lossy()
            .strip_prefix("snapshot_")
            .and_then(|s| s.strip_suffix(".json"))
            .and_then(|s| s.parse::<u64>().ok());
        if let Some(seq) = seq {
            best_seq = Some(best_seq.map_or(seq, |best| best.max(seq)));
        }
    }

    match best_seq {
        Some(seq) => load_snapshot(dir, seq),
        None => Ok(None),
    }
}

/// Returns true if the hash matches the canonical JSON content.
pub fn verify_snapshot_hash(snap: &Snapshot) -> bool {
    let digest = Sha256::digest(snap.canonical_json.as_bytes());
    let computed: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    computed == snap.hash
}

/// Decode a snapshot's canonical JSON back into a `PersistedScore`.
///
/// Strict: unknown or missing fields fail, and the embedded kernel
/// version must match this build. No invariant validation; use
/// `restore_snapshot` for validated loading.
pub fn decode_snapshot(snap: &Snapshot) -> RuntimeResult<PersistedScore> {
    if snap.kernel_version != KERNEL_VERSION {
        return Err(RuntimeError::KernelVersion {
            expected: KERNEL_VERSION,
            found: snap.kernel_version,
        });
    }
    let mut value: Value = serde_json::from_str(&snap.canonical_json)?;
    let embedded = value
        .as_object_mut()
        .and_then(|fields| fields.remove("kernel_version"))
        .and_then(|v| v.as_u64());
    if embedded != Some(u64::from(KERNEL_VERSION)) {
        return Err(RuntimeError::KernelVersion {
            expected: KERNEL_VERSION,
            found: embedded.map_or(0, |v| v as u32),
        });
    }
    Ok(serde_json::from_value(value)?)
}

/// Verify the hash, decode, and validate kernel invariants.
pub fn restore_snapshot(snap: &Snapshot) -> RuntimeResult<PersistedScore> {
    if !verify_snapshot_hash(snap) {
        return Err(RuntimeError::SnapshotHash {
            sequence: snap.sequence,
        });
    }
    let persisted = decode_snapshot(snap)?;
    try_validate_invariants(&ScoreState::from_persisted(persisted.clone()))?;
    Ok(persisted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scorebook_engine::vocabulary::{PitchType, PlateResult};
    use scorebook_engine::ScoreEngine;
    use tempfile::TempDir;

    fn scored_state() -> ScoreState {
        let mut engine = ScoreEngine::with_defaults("snap");
        engine.record_pitch(PitchType::InPlay).unwrap();
        engine.record_result(PlateResult::Flyout).unwrap();
        engine.state().clone()
    }

    #[test]
    fn save_then_restore_matches_state() {
        let dir = TempDir::new().unwrap();
        let state = scored_state();
        save_snapshot(dir.path(), 3, &state).unwrap();

        let snap = load_snapshot(dir.path(), 3).unwrap().unwrap();
        assert!(verify_snapshot_hash(&snap));
        let persisted = restore_snapshot(&snap).unwrap();
        assert_eq!(persisted, state.to_persisted());
    }

    #[test]
    fn latest_snapshot_wins() {
        let dir = TempDir::new().unwrap();
        let state = scored_state();
        for seq in [2, 10, 7] {
            save_snapshot(dir.path(), seq, &state).unwrap();
        }
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        let latest = load_latest_snapshot(dir.path()).unwrap().unwrap();
        assert_eq!(latest.sequence, 10);
    }

    #[test]
    fn empty_or_missing_dir_has_no_snapshot() {
        let dir = TempDir::new().unwrap();
        assert!(load_latest_snapshot(dir.path()).unwrap().is_none());
        assert!(load_latest_snapshot(&dir.path().join("absent")).unwrap().is_none());
    }

    #[test]
    fn tampered_json_fails_hash_check() {
        let state = scored_state();
        let mut snap = encode_snapshot(1, &state).unwrap();
        snap.canonical_json = snap.canonical_json.replace("\"outs\":1", "\"outs\":2");
        assert!(!verify_snapshot_hash(&snap));
        assert!(matches!(
            restore_snapshot(&snap),
            Err(RuntimeError::SnapshotHash { sequence: 1 })
        ));
    }

    #[test]
    fn foreign_kernel_version_is_rejected() {
        let mut snap = encode_snapshot(1, &scored_state()).unwrap();
        snap.kernel_version = KERNEL_VERSION + 1;
        assert!(matches!(
            decode_snapshot(&snap),
            Err(RuntimeError::KernelVersion { .. })
        ));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let state = scored_state();
        let mut snap = encode_snapshot(1, &state).unwrap();
        snap.canonical_json = snap.canonical_json.replacen('{', "{\"extra\":1,", 1);
        assert!(decode_snapshot(&snap).is_err());
    }

    #[test]
    fn snapshot_bytes_are_deterministic() {
        let state = scored_state();
        let a = encode_snapshot(4, &state).unwrap();
        let b = encode_snapshot(4, &state.clone()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.hash.len(), 64);
    }
}
