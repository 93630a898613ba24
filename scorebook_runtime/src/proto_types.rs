//! Hand-written protobuf types for the command log.
//!
//! Uses prost derive macros for encode/decode without prost-build.
//! Closed vocabularies travel as their snake_case names so the log stays
//! readable with generic protobuf tooling.

use prost::Message;

// ---------------------------------------------------------------------------
// Command Envelope
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, Message)]
pub struct ProtoCommandEnvelope {
    #[prost(uint64, tag = "1")]
    pub sequence: u64,
    #[prost(message, optional, tag = "2")]
    pub command: Option<ProtoCommand>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ProtoCommand {
    #[prost(oneof = "CommandKind", tags = "1, 2, 3, 4, 5, 6, 7")]
    pub kind: Option<CommandKind>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum CommandKind {
    #[prost(message, tag = "1")]
    RecordPitch(RecordPitch),
    #[prost(message, tag = "2")]
    RecordResult(RecordResult),
    #[prost(message, tag = "3")]
    ConfirmRunners(ConfirmRunners),
    #[prost(message, tag = "4")]
    AdvanceInning(AdvanceInning),
    #[prost(message, tag = "5")]
    Undo(Undo),
    #[prost(message, tag = "6")]
    Redo(Redo),
    #[prost(message, tag = "7")]
    Substitute(Substitute),
}

// ---------------------------------------------------------------------------
// Batter
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, Message)]
pub struct ProtoBatter {
    #[prost(string, tag = "1")]
    pub lineup_id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(uint32, tag = "3")]
    pub batting_order: u32,
}

// ---------------------------------------------------------------------------
// Command Types
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, Message)]
pub struct RecordPitch {
    #[prost(string, tag = "1")]
    pub pitch: String,
    #[prost(message, optional, tag = "2")]
    pub batter: Option<ProtoBatter>,
}

#[derive(Clone, PartialEq, Message)]
pub struct RecordResult {
    #[prost(string, tag = "1")]
    pub result: String,
    #[prost(message, optional, tag = "2")]
    pub batter: Option<ProtoBatter>,
}

#[derive(Clone, PartialEq, Message)]
pub struct RunnerMove {
    #[prost(string, tag = "1")]
    pub lineup_id: String,
    #[prost(string, tag = "2")]
    pub destination: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct ConfirmRunners {
    #[prost(message, repeated, tag = "1")]
    pub moves: Vec<RunnerMove>,
}

#[derive(Clone, PartialEq, Message)]
pub struct AdvanceInning {}

#[derive(Clone, PartialEq, Message)]
pub struct Undo {}

#[derive(Clone, PartialEq, Message)]
pub struct Redo {}

#[derive(Clone, PartialEq, Message)]
pub struct Substitute {
    #[prost(string, tag = "1")]
    pub side: String,
    #[prost(uint32, tag = "2")]
    pub batting_order: u32,
    #[prost(string, tag = "3")]
    pub player_name: String,
    #[prost(uint32, tag = "4")]
    pub position: u32,
    #[prost(uint32, tag = "5")]
    pub entered_inning: u32,
    #[prost(string, tag = "6")]
    pub substitution_type: String,
}
