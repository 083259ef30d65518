use bombris_engine::{EngineConfig, EngineSnapshot, PieceSeed};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Game saved by `simulate` and inspected by `show`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedGame {
    /// Timestamp when the game was saved (ISO 8601 format)
    pub saved_at: DateTime<Utc>,
    /// Seed used for piece generation and the input script
    pub seed: PieceSeed,
    /// Rules the game was played with
    pub config: EngineConfig,
    /// Full engine state at the time of saving
    pub snapshot: EngineSnapshot,
}
