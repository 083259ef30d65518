use serde::{Deserialize, Serialize};

use crate::PieceKind;

/// Something notable that happened while the engine advanced.
///
/// Hosts drain these with [`BoardEngine::take_events`](crate::BoardEngine::take_events)
/// to play sounds or show banners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::IsVariant)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    PieceLocked {
        kind: PieceKind,
    },
    LinesCleared {
        rows: usize,
        points: u64,
    },
    /// A bomb resting at `(x, y)` went off, destroying `destroyed` locked cells.
    BombExploded {
        x: i32,
        y: i32,
        destroyed: usize,
    },
    /// The score passed a multiple of `score_milestone`.
    ScoreMilestone {
        score: u64,
    },
    /// The normal fall interval shrank to `fall_interval_ms`.
    SpeedUp {
        fall_interval_ms: u64,
    },
    GameOver {
        score: u64,
    },
}
