//! Game engine logic and state management.
//!
//! This module provides the rules that drive the core data structures:
//!
//! - [`BoardEngine`] - The game: board, falling and next piece, scoring, gravity
//! - [`EngineConfig`] - Tunable rules (board size, intervals, bomb chance, ...)
//! - [`PieceGenerator`] / [`PieceSeed`] - Seeded, deterministic piece stream
//! - [`FallClock`] - Gravity timing and score-driven speed-ups
//! - [`GameStats`] - Score and clear statistics
//! - [`GameOverAnimator`] - Row-by-row animation played after game over
//! - [`EngineSnapshot`] - Plain-data copy of the full engine state
//!
//! # Game Flow
//!
//! 1. Create a [`BoardEngine`] from a validated [`EngineConfig`]
//! 2. The host calls [`BoardEngine::tick`] with the elapsed time and forwards
//!    player commands (move, rotate, fast fall, hard drop)
//! 3. When the falling piece cannot move down it locks: bombs explode, full
//!    rows are cleared and the next piece spawns
//! 4. The host drains [`EngineEvent`]s to play sounds or show banners
//! 5. When a new piece cannot spawn the game is over and ticks drive the
//!    game-over animation
//!
//! # Example
//!
//! ```
//! use bombris_engine::{BoardEngine, EngineConfig, SpeedPreset};
//!
//! let config = EngineConfig::default().with_speed_preset(SpeedPreset::Fast);
//! let mut engine = BoardEngine::new(config).unwrap();
//!
//! while !engine.is_game_over() {
//!     engine.rotate();
//!     engine.move_right();
//!     engine.hard_drop();
//! }
//!
//! while !engine.is_game_over_animation_complete() {
//!     engine.tick(16);
//! }
//!
//! // Save the game and restore it later.
//! let snapshot = engine.export();
//! let restored = BoardEngine::from_snapshot(engine.config().clone(), snapshot).unwrap();
//! assert_eq!(restored.score(), engine.score());
//! ```

pub use self::{
    board_engine::*, config::*, event::*, fall_clock::*, game_over_animation::*, game_stats::*,
    piece_generator::*, snapshot::*,
};

mod board_engine;
mod config;
mod event;
mod fall_clock;
mod game_over_animation;
mod game_stats;
mod piece_generator;
mod snapshot;
