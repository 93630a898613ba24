use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use serde::{Deserialize, Serialize};

use scorebook_engine::config::{EngineConfig, DEFAULT_DISPLAY_INNINGS};
use scorebook_engine::history::DEFAULT_UNDO_CAPACITY;

use crate::error::{RuntimeError, RuntimeResult};

/// Runtime tunables. Usable as CLI flags or loaded from a JSON file.
#[derive(Args, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Directory holding one subdirectory per game session.
    #[arg(long, default_value = "sessions")]
    pub base_dir: PathBuf,
    /// Write a snapshot every N logged commands.
    #[arg(long, default_value_t = 10)]
    pub snapshot_interval: u64,
    #[arg(long, default_value_t = DEFAULT_UNDO_CAPACITY)]
    pub undo_capacity: usize,
    #[arg(long, default_value_t = DEFAULT_DISPLAY_INNINGS)]
    pub display_innings: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("sessions"),
            snapshot_interval: 10,
            undo_capacity: DEFAULT_UNDO_CAPACITY,
            display_innings: DEFAULT_DISPLAY_INNINGS,
        }
    }
}

impl SessionConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> RuntimeResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> RuntimeResult<()> {
        if self.snapshot_interval == 0 {
            return Err(RuntimeError::Config(
                "snapshot_interval must be at least 1".into(),
            ));
        }
        self.engine_config().validate()?;
        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            undo_capacity: self.undo_capacity,
            display_innings: self.display_innings,
        }
    }

    pub fn session_dir(&self, session_id: &str) -> PathBuf {
        self.base_dir.join(session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scorebook.json");
        fs::write(&path, r#"{"snapshot_interval": 4}"#).unwrap();
        let config = SessionConfig::load_from_file(&path).unwrap();
        assert_eq!(config.snapshot_interval, 4);
        assert_eq!(config.undo_capacity, DEFAULT_UNDO_CAPACITY);
        assert_eq!(config.base_dir, PathBuf::from("sessions"));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = SessionConfig {
            snapshot_interval: 0,
            ..SessionConfig::default()
        };
        assert!(matches!(config.validate(), Err(RuntimeError::Config(_))));
    }

    #[test]
    fn engine_limits_are_checked_too() {
        let config = SessionConfig {
            undo_capacity: 0,
            ..SessionConfig::default()
        };
        assert!(matches!(config.validate(), Err(RuntimeError::Score(_))));
    }
}
