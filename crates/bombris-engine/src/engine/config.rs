use serde::{Deserialize, Serialize};

use crate::{Board, ConfigError};

/// Starting fall speed offered to players before a game begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedPreset {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl SpeedPreset {
    /// Normal fall interval this preset starts with.
    #[must_use]
    pub const fn normal_fall_interval_ms(self) -> u64 {
        match self {
            SpeedPreset::Slow => 800,
            SpeedPreset::Normal => 500,
            SpeedPreset::Fast => 300,
        }
    }
}

/// Tunable rules of a game.
///
/// Every field has a default, so partial JSON documents are accepted:
///
/// ```
/// use bombris_engine::EngineConfig;
///
/// let config: EngineConfig = serde_json::from_str(r#"{ "width": 13, "height": 22 }"#).unwrap();
/// assert_eq!((config.width, config.height), (13, 22));
/// assert_eq!(config.normal_fall_interval_ms, 500);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Board width in cells.
    pub width: usize,
    /// Board height in cells.
    pub height: usize,
    /// Starting gravity interval.
    pub normal_fall_interval_ms: u64,
    /// Gravity interval while fast fall is held.
    pub fast_fall_interval_ms: u64,
    /// Floor for score-driven speed-ups.
    pub min_fall_interval_ms: u64,
    /// Chance, in percent, that a generated piece is a bomb.
    pub bomb_percent: u32,
    /// Points awarded per bomb explosion.
    pub bomb_bonus: u64,
    pub hard_drop_points_per_row: u64,
    /// Score step at which the normal fall interval shrinks.
    pub speed_up_threshold: u64,
    /// Share of the current interval removed per speed-up, in percent.
    pub speed_up_percent: u64,
    /// How long the speed-up signal stays raised.
    pub speed_up_signal_ms: u64,
    /// Score step at which a milestone event is emitted.
    pub score_milestone: u64,
    /// Rows at the top that end the game when occupied. `0` disables the check.
    pub top_out_rows: usize,
    /// Time per row of the game-over animation.
    pub game_over_row_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 20,
            normal_fall_interval_ms: SpeedPreset::Normal.normal_fall_interval_ms(),
            fast_fall_interval_ms: 100,
            min_fall_interval_ms: 50,
            bomb_percent: 15,
            bomb_bonus: 100,
            hard_drop_points_per_row: 2,
            speed_up_threshold: 10_000,
            speed_up_percent: 10,
            speed_up_signal_ms: 3_000,
            score_milestone: 200,
            top_out_rows: 0,
            game_over_row_interval_ms: 60,
        }
    }
}

impl EngineConfig {
    /// Upper bound for every time value in milliseconds.
    pub const MAX_INTERVAL_MS: u64 = 3_600_000;
    /// Upper bound for `bomb_bonus` and `hard_drop_points_per_row`.
    pub const MAX_POINTS: u64 = 10_000;

    /// Returns this config with the normal fall interval set by `preset`.
    #[must_use]
    pub fn with_speed_preset(mut self, preset: SpeedPreset) -> Self {
        self.normal_fall_interval_ms = preset.normal_fall_interval_ms();
        self
    }

    /// Checks that the rules describe a playable game.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !Board::is_supported_size(self.width, self.height) {
            return Err(ConfigError::BoardSize {
                width: self.width,
                height: self.height,
            });
        }
        let intervals = [
            ("normal_fall_interval_ms", self.normal_fall_interval_ms),
            ("fast_fall_interval_ms", self.fast_fall_interval_ms),
            ("min_fall_interval_ms", self.min_fall_interval_ms),
            ("game_over_row_interval_ms", self.game_over_row_interval_ms),
            ("speed_up_threshold", self.speed_up_threshold),
            ("score_milestone", self.score_milestone),
        ];
        if let Some((field, _)) = intervals.into_iter().find(|&(_, value)| value == 0) {
            return Err(ConfigError::Zero { field });
        }
        let bounded = [
            ("normal_fall_interval_ms", self.normal_fall_interval_ms, Self::MAX_INTERVAL_MS),
            ("fast_fall_interval_ms", self.fast_fall_interval_ms, Self::MAX_INTERVAL_MS),
            ("game_over_row_interval_ms", self.game_over_row_interval_ms, Self::MAX_INTERVAL_MS),
            ("speed_up_signal_ms", self.speed_up_signal_ms, Self::MAX_INTERVAL_MS),
            ("bomb_bonus", self.bomb_bonus, Self::MAX_POINTS),
            ("hard_drop_points_per_row", self.hard_drop_points_per_row, Self::MAX_POINTS),
        ];
        if let Some((field, value, max)) = bounded.into_iter().find(|&(_, value, max)| value > max) {
            return Err(ConfigError::TooLarge { field, value, max });
        }
        if self.min_fall_interval_ms > self.normal_fall_interval_ms {
            return Err(ConfigError::MinIntervalAboveNormal {
                min: self.min_fall_interval_ms,
                normal: self.normal_fall_interval_ms,
            });
        }
        if self.bomb_percent > 100 {
            return Err(ConfigError::BombPercent {
                percent: self.bomb_percent,
            });
        }
        if self.speed_up_percent >= 100 {
            return Err(ConfigError::SpeedUpPercent {
                percent: self.speed_up_percent,
            });
        }
        if self.top_out_rows > self.height {
            return Err(ConfigError::TopOutRows {
                rows: self.top_out_rows,
                height: self.height,
            });
        }
        Ok(())
    }
}
