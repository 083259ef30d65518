use std::collections::VecDeque;

use rand::Rng as _;

use crate::{
    Board, Cell, ConfigError, EngineConfig, EngineEvent, EngineSnapshot, FallClock,
    GameOverAnimation, GameOverAnimator, GameStats, Piece, PieceGenerator, PieceSeed,
    SnapshotError, core::board::coord,
};

/// The rules engine of a single game.
///
/// Owns the board, the falling piece, the next piece, scoring and gravity
/// timing. The engine is advanced by [`tick`](Self::tick) with the elapsed
/// time and by player commands. Illegal commands are silently ignored, and
/// once the game is over every command becomes a no-op while ticks drive the
/// game-over animation.
///
/// Notable moments are queued as [`EngineEvent`]s for the host to drain with
/// [`take_events`](Self::take_events). At most
/// [`MAX_PENDING_EVENTS`](Self::MAX_PENDING_EVENTS) are kept; older ones are
/// discarded when the host does not drain the queue.
///
/// # Example
///
/// ```
/// use bombris_engine::{BoardEngine, EngineConfig, PieceSeed};
///
/// let seed: PieceSeed = "000102030405060708090a0b0c0d0e0f".parse().unwrap();
/// let mut engine = BoardEngine::with_seed(EngineConfig::default(), seed).unwrap();
///
/// engine.move_left();
/// engine.rotate();
/// engine.hard_drop();
/// engine.tick(16);
///
/// assert_eq!(engine.stats().completed_pieces(), 1);
/// for event in engine.take_events() {
///     println!("{event:?}");
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardEngine {
    config: EngineConfig,
    board: Board,
    current: Piece,
    next: Piece,
    generator: PieceGenerator,
    stats: GameStats,
    clock: FallClock,
    milestones_reached: u64,
    game_over: bool,
    animation: GameOverAnimator,
    events: VecDeque<EngineEvent>,
}

impl BoardEngine {
    /// Capacity of the event queue.
    pub const MAX_PENDING_EVENTS: usize = 256;

    /// Creates an engine with a random seed.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_seed(config, rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for deterministic piece generation.
    pub fn with_seed(config: EngineConfig, seed: PieceSeed) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut generator = PieceGenerator::with_seed(seed);
        let current = generator.next_piece(&config);
        let next = generator.next_piece(&config);
        Ok(Self {
            board: Board::new(config.width, config.height),
            current,
            next,
            generator,
            stats: GameStats::new(),
            clock: FallClock::new(&config),
            milestones_reached: 0,
            game_over: false,
            animation: GameOverAnimator::default(),
            events: VecDeque::new(),
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn current_piece(&self) -> &Piece {
        &self.current
    }

    #[must_use]
    pub fn next_piece(&self) -> &Piece {
        &self.next
    }

    /// Returns where the current piece would land if hard dropped now.
    #[must_use]
    pub fn ghost_piece(&self) -> Piece {
        self.current.simulate_drop_position(&self.board)
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn score(&self) -> u64 {
        self.stats.score()
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    #[must_use]
    pub fn is_fast_fall(&self) -> bool {
        self.clock.is_fast_fall()
    }

    /// Current normal fall interval, after speed-ups.
    #[must_use]
    pub fn fall_interval_ms(&self) -> u64 {
        self.clock.normal_interval_ms()
    }

    /// Interval gravity runs at right now, taking fast fall into account.
    #[must_use]
    pub fn effective_fall_interval_ms(&self) -> u64 {
        self.clock.effective_interval_ms(&self.config)
    }

    #[must_use]
    pub fn speed_ups_applied(&self) -> u64 {
        self.clock.speed_ups_applied()
    }

    /// Returns `true` for a while after the fall interval has been shortened.
    #[must_use]
    pub fn is_speed_up_signalled(&self) -> bool {
        self.clock.speed_up_signal_ms() > 0
    }

    #[must_use]
    pub fn speed_up_signal_ms(&self) -> u64 {
        self.clock.speed_up_signal_ms()
    }

    #[must_use]
    pub fn game_over_animation(&self) -> GameOverAnimation {
        self.animation.state()
    }

    #[must_use]
    pub fn is_game_over_animation_complete(&self) -> bool {
        self.animation.state().is_done()
    }

    /// Drains the events queued since the last call.
    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain(..).collect()
    }

    fn push_event(&mut self, event: EngineEvent) {
        if self.events.len() == Self::MAX_PENDING_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// Advances time by `elapsed_ms`.
    ///
    /// While playing, performs one gravity step once the accumulated time
    /// reaches the effective fall interval. After game over, advances the
    /// game-over animation instead.
    pub fn tick(&mut self, elapsed_ms: u64) {
        self.clock.decay_signal(elapsed_ms);
        if self.game_over {
            self.animation
                .advance(elapsed_ms, self.config.game_over_row_interval_ms);
            return;
        }
        if self.clock.advance(elapsed_ms, &self.config) {
            self.gravity_step();
        }
    }

    pub fn move_left(&mut self) -> bool {
        self.try_move(-1, 0)
    }

    pub fn move_right(&mut self) -> bool {
        self.try_move(1, 0)
    }

    pub fn set_fast_fall(&mut self, enabled: bool) {
        if self.game_over {
            return;
        }
        self.clock.set_fast_fall(enabled);
    }

    /// Rotates the current piece clockwise, shifting it one column right or
    /// left if it does not fit in place.
    ///
    /// Bombs never rotate.
    pub fn rotate(&mut self) -> bool {
        if self.game_over {
            return false;
        }
        let Some(rotated) = self
            .current
            .rotation_candidates()
            .into_iter()
            .find(|candidate| self.board.is_valid_move(candidate, 0, 0))
        else {
            return false;
        };
        self.current = rotated;
        true
    }

    /// Drops the current piece as far as it goes and locks it.
    ///
    /// Awards `hard_drop_points_per_row` per row and returns the number of
    /// rows dropped.
    pub fn hard_drop(&mut self) -> u32 {
        if self.game_over {
            return 0;
        }
        let dropped = self.current.simulate_drop_position(&self.board);
        let rows = u32::try_from(dropped.y() - self.current.y()).unwrap_or_default();
        self.stats
            .record_hard_drop(u64::from(rows), self.config.hard_drop_points_per_row);
        self.current = dropped;
        self.lock_and_spawn();
        rows
    }

    fn try_move(&mut self, dx: i32, dy: i32) -> bool {
        if self.game_over || !self.board.is_valid_move(&self.current, dx, dy) {
            return false;
        }
        self.current = self.current.moved(dx, dy);
        true
    }

    fn gravity_step(&mut self) {
        if !self.try_move(0, 1) {
            self.lock_and_spawn();
        }
    }

    fn lock_and_spawn(&mut self) {
        let piece = self.current;
        self.push_event(EngineEvent::PieceLocked { kind: piece.kind() });
        if piece.is_bomb() {
            self.explode_bomb(piece.x(), piece.y());
        } else {
            self.board.fill_piece(&piece);
        }

        let rows = self.board.clear_lines();
        let points = self.stats.complete_piece_drop(rows);
        if rows > 0 {
            self.push_event(EngineEvent::LinesCleared { rows, points });
        }
        self.update_score_progress();

        self.current = self.next;
        self.next = self.generator.next_piece(&self.config);

        let spawn_blocked = !self.board.is_valid_move(&self.current, 0, 0);
        let topped_out = self.config.top_out_rows > 0
            && self.board.is_occupied_above(self.config.top_out_rows);
        if spawn_blocked || topped_out {
            self.game_over = true;
            self.animation.start(self.board.height());
            self.push_event(EngineEvent::GameOver {
                score: self.stats.score(),
            });
        }
    }

    /// Destroys the locked cells below, below-left and below-right of a bomb
    /// resting at `(x, y)` and collapses the three columns.
    fn explode_bomb(&mut self, x: i32, y: i32) {
        let mut destroyed = 0;
        for (bx, by) in self.board.blast_cells(x, y) {
            if self.board.is_occupied(bx, by) {
                self.board.set_cell(bx, by, Cell::Empty);
                destroyed += 1;
            }
        }
        for column in (x - 1)..=(x + 1) {
            if let Ok(column) = usize::try_from(column) {
                self.board.collapse_column(column);
            }
        }
        self.stats.record_bomb(destroyed, self.config.bomb_bonus);
        self.push_event(EngineEvent::BombExploded { x, y, destroyed });
    }

    fn update_score_progress(&mut self) {
        let score = self.stats.score();
        let milestone = self.config.score_milestone;
        while self.milestones_reached < score / milestone {
            self.milestones_reached += 1;
            self.push_event(EngineEvent::ScoreMilestone {
                score: self.milestones_reached * milestone,
            });
        }
        if self.clock.apply_score(score, &self.config) > 0 {
            self.push_event(EngineEvent::SpeedUp {
                fall_interval_ms: self.clock.normal_interval_ms(),
            });
        }
    }

    /// Copies the full engine state out as plain data.
    #[must_use]
    pub fn export(&self) -> EngineSnapshot {
        EngineSnapshot {
            board: self.board.clone(),
            current: self.current,
            next: self.next,
            generator: self.generator.clone(),
            stats: self.stats.clone(),
            clock: self.clock.clone(),
            milestones_reached: self.milestones_reached,
            game_over: self.game_over,
            animation: self.animation.clone(),
        }
    }

    /// Rebuilds an engine from a snapshot taken with [`Self::export`].
    ///
    /// The snapshot is checked against `config` before it is accepted.
    pub fn from_snapshot(
        config: EngineConfig,
        snapshot: EngineSnapshot,
    ) -> Result<Self, SnapshotError> {
        config.validate().map_err(SnapshotError::InvalidConfig)?;
        validate_snapshot(&config, &snapshot)?;
        let EngineSnapshot {
            board,
            current,
            next,
            generator,
            stats,
            clock,
            milestones_reached,
            game_over,
            animation,
        } = snapshot;
        Ok(Self {
            config,
            board,
            current,
            next,
            generator,
            stats,
            clock,
            milestones_reached,
            game_over,
            animation,
            events: VecDeque::new(),
        })
    }

    /// Replaces the whole state with `snapshot`, keeping the current config.
    ///
    /// On error the engine is left unchanged. Pending events are dropped.
    pub fn import(&mut self, snapshot: EngineSnapshot) -> Result<(), SnapshotError> {
        *self = Self::from_snapshot(self.config.clone(), snapshot)?;
        Ok(())
    }
}

fn validate_snapshot(config: &EngineConfig, snapshot: &EngineSnapshot) -> Result<(), SnapshotError> {
    let board = &snapshot.board;
    if (board.width(), board.height()) != (config.width, config.height) {
        return Err(SnapshotError::BoardSize {
            expected_width: config.width,
            expected_height: config.height,
            width: board.width(),
            height: board.height(),
        });
    }

    for (which, piece) in [("current", &snapshot.current), ("next", &snapshot.next)] {
        let in_bounds = piece.occupied_positions().all(|(x, y)| {
            (0..coord(board.width())).contains(&x) && y < coord(board.height())
        });
        if !in_bounds {
            return Err(SnapshotError::PieceOutOfBounds { which });
        }
    }
    if !snapshot.game_over && !board.is_valid_move(&snapshot.current, 0, 0) {
        return Err(SnapshotError::PieceOverlap);
    }

    let interval = snapshot.clock.normal_interval_ms();
    if !(config.min_fall_interval_ms..=config.normal_fall_interval_ms).contains(&interval) {
        return Err(SnapshotError::FallInterval {
            interval,
            min: config.min_fall_interval_ms,
            max: config.normal_fall_interval_ms,
        });
    }

    let score = snapshot.stats.score();
    let progress = [
        (
            "milestones_reached",
            snapshot.milestones_reached,
            score / config.score_milestone,
        ),
        (
            "speed_ups_applied",
            snapshot.clock.speed_ups_applied(),
            score / config.speed_up_threshold,
        ),
    ];
    if let Some((field, value, expected)) =
        progress.into_iter().find(|&(_, value, expected)| value != expected)
    {
        return Err(SnapshotError::ScoreProgress {
            field,
            value,
            expected,
            score,
        });
    }

    match (snapshot.game_over, snapshot.animation.state()) {
        (false, GameOverAnimation::Idle) | (true, GameOverAnimation::Done) => Ok(()),
        (true, GameOverAnimation::ExplodingRows(row)) => {
            if row < board.height() {
                Ok(())
            } else {
                Err(SnapshotError::AnimationRow {
                    row,
                    height: board.height(),
                })
            }
        }
        (false, _) | (true, GameOverAnimation::Idle) => Err(SnapshotError::InconsistentAnimation),
    }
}
