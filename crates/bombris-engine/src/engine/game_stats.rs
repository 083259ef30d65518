use serde::{Deserialize, Serialize};

/// Score values for line clears.
///
/// Index corresponds to number of lines cleared simultaneously:
/// - 0 lines: 0 points
/// - 1 line: 100 points
/// - 2 lines: 300 points
/// - 3 lines: 500 points
/// - 4 lines: 800 points
///
/// Larger clears, which only a bomb collapse can produce, score as 4 lines.
const SCORE_TABLE: [u64; 5] = [0, 100, 300, 500, 800];

/// Returns the points awarded for clearing `lines` rows in one lock.
#[must_use]
pub const fn line_clear_points(lines: usize) -> u64 {
    let index = if lines < SCORE_TABLE.len() {
        lines
    } else {
        SCORE_TABLE.len() - 1
    };
    SCORE_TABLE[index]
}

/// Game statistics tracking score, lines cleared, and piece count.
///
/// Tracks various metrics during a game:
///
/// - **Score**: Points earned from line clears, bombs and hard drops
/// - **Completed pieces**: Total number of pieces locked
/// - **Line clear distribution**: Count of single, double, triple, quad line clears
/// - **Bombs exploded**: Number of bombs that went off
///
/// # Example
///
/// ```
/// use bombris_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// let points = stats.complete_piece_drop(4); // Tetris (4 lines)
///
/// assert_eq!(points, 800);
/// assert_eq!(stats.score(), 800);
/// assert_eq!(stats.total_cleared_lines(), 4);
/// assert_eq!(stats.line_cleared_counter()[4], 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    score: u64,
    completed_pieces: u64,
    total_cleared_lines: u64,
    line_cleared_counter: [u64; 5],
    bombs_exploded: u64,
    bomb_cells_destroyed: u64,
    hard_drop_rows: u64,
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    /// Creates a new game statistics tracker with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
            bombs_exploded: 0,
            bomb_cells_destroyed: 0,
            hard_drop_rows: 0,
        }
    }

    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Returns the total number of pieces that have been locked into place.
    #[must_use]
    pub const fn completed_pieces(&self) -> u64 {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> u64 {
        self.total_cleared_lines
    }

    /// Returns a histogram of line clears by count.
    ///
    /// Array indices represent:
    /// - `[0]`: Number of locks with 0 lines cleared
    /// - `[1]`: Number of singles (1 line)
    /// - `[2]`: Number of doubles (2 lines)
    /// - `[3]`: Number of triples (3 lines)
    /// - `[4]`: Number of tetrises (4 or more lines)
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[u64; 5] {
        &self.line_cleared_counter
    }

    #[must_use]
    pub const fn bombs_exploded(&self) -> u64 {
        self.bombs_exploded
    }

    /// Returns the number of locked cells destroyed by bombs.
    #[must_use]
    pub const fn bomb_cells_destroyed(&self) -> u64 {
        self.bomb_cells_destroyed
    }

    /// Returns the number of rows skipped by hard drops.
    #[must_use]
    pub const fn hard_drop_rows(&self) -> u64 {
        self.hard_drop_rows
    }

    /// Updates statistics after a piece lock and returns the line clear points.
    ///
    /// This should be called each time a piece is locked into place, after
    /// any bomb explosion has been resolved.
    pub const fn complete_piece_drop(&mut self, cleared_lines: usize) -> u64 {
        let index = if cleared_lines < self.line_cleared_counter.len() {
            cleared_lines
        } else {
            self.line_cleared_counter.len() - 1
        };
        self.completed_pieces += 1;
        self.total_cleared_lines += cleared_lines as u64;
        self.line_cleared_counter[index] += 1;
        let points = line_clear_points(cleared_lines);
        self.score = self.score.saturating_add(points);
        points
    }

    /// Records a bomb explosion that destroyed `destroyed` cells.
    pub const fn record_bomb(&mut self, destroyed: usize, bonus: u64) {
        self.bombs_exploded += 1;
        self.bomb_cells_destroyed += destroyed as u64;
        self.score = self.score.saturating_add(bonus);
    }

    /// Records a hard drop over `rows` rows.
    pub const fn record_hard_drop(&mut self, rows: u64, points_per_row: u64) {
        self.hard_drop_rows = self.hard_drop_rows.saturating_add(rows);
        self.score = self.score.saturating_add(rows.saturating_mul(points_per_row));
    }
}
