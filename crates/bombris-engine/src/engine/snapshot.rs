use serde::{Deserialize, Serialize};

use crate::{Board, FallClock, GameOverAnimator, GameStats, Piece, PieceGenerator};

/// Complete engine state as plain data.
///
/// Produced by [`BoardEngine::export`](crate::BoardEngine::export) and
/// accepted by [`BoardEngine::from_snapshot`](crate::BoardEngine::from_snapshot)
/// and [`BoardEngine::import`](crate::BoardEngine::import). Pending events
/// are not part of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub board: Board,
    pub current: Piece,
    pub next: Piece,
    pub generator: PieceGenerator,
    pub stats: GameStats,
    pub clock: FallClock,
    pub milestones_reached: u64,
    pub game_over: bool,
    pub animation: GameOverAnimator,
}
