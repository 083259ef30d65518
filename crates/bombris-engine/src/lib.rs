pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display(
        "board size {width}x{height} is outside {}x{}..={}x{}",
        Board::MIN_WIDTH,
        Board::MIN_HEIGHT,
        Board::MAX_WIDTH,
        Board::MAX_HEIGHT
    )]
    BoardSize { width: usize, height: usize },
    #[display("{field} must not be zero")]
    Zero { field: &'static str },
    #[display("{field} is {value}, above the maximum of {max}")]
    TooLarge {
        field: &'static str,
        value: u64,
        max: u64,
    },
    #[display("minimum fall interval {min}ms exceeds normal fall interval {normal}ms")]
    MinIntervalAboveNormal { min: u64, normal: u64 },
    #[display("bomb probability {percent}% exceeds 100%")]
    BombPercent { percent: u32 },
    #[display("speed-up percent {percent}% must be below 100%")]
    SpeedUpPercent { percent: u64 },
    #[display("top-out rows {rows} exceed board height {height}")]
    TopOutRows { rows: usize, height: usize },
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ParseSeedError {
    #[display("invalid seed: expected 32 hex digits, got {len} characters")]
    Length { len: usize },
    #[display("invalid seed: {_0}")]
    Hex(std::num::ParseIntError),
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum SnapshotError {
    #[display("invalid config: {_0}")]
    InvalidConfig(ConfigError),
    #[display(
        "snapshot board is {width}x{height}, expected {expected_width}x{expected_height}"
    )]
    BoardSize {
        expected_width: usize,
        expected_height: usize,
        width: usize,
        height: usize,
    },
    #[display("{which} piece is outside the board")]
    PieceOutOfBounds { which: &'static str },
    #[display("current piece overlaps locked cells")]
    PieceOverlap,
    #[display("fall interval {interval}ms is outside {min}ms..={max}ms")]
    FallInterval { interval: u64, min: u64, max: u64 },
    #[display("{field} is {value}, but a score of {score} implies {expected}")]
    ScoreProgress {
        field: &'static str,
        value: u64,
        expected: u64,
        score: u64,
    },
    #[display("game-over animation row {row} is outside a board of height {height}")]
    AnimationRow { row: usize, height: usize },
    #[display("game-over animation does not match the game-over flag")]
    InconsistentAnimation,
}
