use scorebook_engine::ScoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error(transparent)]
    Score(#[from] ScoreError),

    #[error("sequence violation: expected {expected}, got {got}")]
    Sequence { expected: u64, got: u64 },

    #[error("corrupt command log: {0}")]
    CorruptLog(String),

    #[error("malformed command at sequence {sequence}: {reason}")]
    MalformedCommand { sequence: u64, reason: String },

    #[error("snapshot at sequence {sequence} does not match its content hash")]
    SnapshotHash { sequence: u64 },

    #[error("snapshot kernel version {found} is not {expected}")]
    KernelVersion { expected: u32, found: u32 },

    #[error("determinism failure: replays produced {first} and {second}")]
    Determinism { first: String, second: String },

    #[error("session {0} already exists")]
    SessionExists(String),

    #[error("session lock poisoned")]
    LockPoisoned,

    #[error("configuration error: {0}")]
    Config(String),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
