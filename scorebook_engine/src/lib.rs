#![forbid(unsafe_code)]

//! Scorebook kernel.
//!
//! A single-writer scoring state machine for one baseball game, the
//! versioned lineup history it is scored against, and the pure statistics
//! functions that read both. No I/O lives here; persistence and replay are
//! the runtime crate's business.

/// Persisted-state format version. Bumped whenever `PersistedScore` or the
/// canonical hash layout changes.
pub const KERNEL_VERSION: u32 = 1;

pub mod config;
pub mod count;
pub mod domain;
pub mod engine;
pub mod error;
pub mod events;
pub mod hashing;
pub mod history;
pub mod invariants;
pub mod lineup;
pub mod state;
pub mod stats;
pub mod transitions;
pub mod views;
pub mod vocabulary;

pub use engine::ScoreEngine;
pub use error::{ScoreError, ScoreResult};
