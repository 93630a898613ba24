#![forbid(unsafe_code)]

//! Scorebook runtime.
//!
//! Wraps the scoring kernel with a binary command log, snapshots, replay,
//! per-game sessions and a best-effort sync outbox.
//!
//! No scoring logic lives here; every transition, invariant and statistic
//! is delegated to `scorebook_engine`.

pub mod config;
pub mod error;
pub mod event_store;
pub mod proto_bridge;
pub mod proto_types;
pub mod replay;
pub mod report;
pub mod session;
pub mod snapshot;
pub mod sync;

pub use error::{RuntimeError, RuntimeResult};
pub use session::{Session, SharedSession};
