use serde::{Deserialize, Serialize};

use crate::error::{ScoreError, ScoreResult};
use crate::history::DEFAULT_UNDO_CAPACITY;

pub const DEFAULT_DISPLAY_INNINGS: u32 = 9;

/// Tunables for one scoring engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Undo snapshots kept before the oldest is evicted.
    pub undo_capacity: usize,
    /// Minimum inning columns on the scoresheet.
    pub display_innings: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            undo_capacity: DEFAULT_UNDO_CAPACITY,
            display_innings: DEFAULT_DISPLAY_INNINGS,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> ScoreResult<()> {
        if self.undo_capacity == 0 {
            return Err(ScoreError::Config("undo_capacity must be at least 1".into()));
        }
        if self.display_innings == 0 {
            return Err(ScoreError::Config("display_innings must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: EngineConfig = serde_json::from_str(r#"{"undo_capacity": 5}"#).unwrap();
        assert_eq!(cfg.undo_capacity, 5);
        assert_eq!(cfg.display_innings, DEFAULT_DISPLAY_INNINGS);
        cfg.validate().unwrap();
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let cfg = EngineConfig {
            undo_capacity: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ScoreError::Config(_))));
    }
}
