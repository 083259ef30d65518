use serde::{Deserialize, Serialize};

/// Progress of the row-by-row explosion shown after game over.
///
/// The animation starts at the bottom row and moves up one row per interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, derive_more::IsVariant)]
pub enum GameOverAnimation {
    /// The game is still running.
    #[default]
    Idle,
    /// The given row is exploding.
    ExplodingRows(usize),
    /// Every row has exploded.
    Done,
}

/// Tick-driven state machine for [`GameOverAnimation`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameOverAnimator {
    state: GameOverAnimation,
    timer_ms: u64,
}

impl GameOverAnimator {
    #[must_use]
    pub fn state(&self) -> GameOverAnimation {
        self.state
    }

    #[must_use]
    pub fn timer_ms(&self) -> u64 {
        self.timer_ms
    }

    /// Starts the animation at the bottom row of a board `height` rows tall.
    pub fn start(&mut self, height: usize) {
        self.state = match height.checked_sub(1) {
            Some(bottom) => GameOverAnimation::ExplodingRows(bottom),
            None => GameOverAnimation::Done,
        };
        self.timer_ms = 0;
    }

    /// Advances the animation by `elapsed_ms`, moving up one row per
    /// `row_interval_ms`.
    pub fn advance(&mut self, elapsed_ms: u64, row_interval_ms: u64) {
        let GameOverAnimation::ExplodingRows(mut row) = self.state else {
            return;
        };
        self.timer_ms = self.timer_ms.saturating_add(elapsed_ms);
        while self.timer_ms >= row_interval_ms {
            self.timer_ms -= row_interval_ms;
            if row == 0 {
                self.state = GameOverAnimation::Done;
                self.timer_ms = 0;
                return;
            }
            row -= 1;
        }
        self.state = GameOverAnimation::ExplodingRows(row);
    }
}
